use crate::models::Cluster;

/// Opinion-diversity score from the cluster size distribution.
///
/// Shannon entropy of the membership proportions (natural log), scaled by
/// the cluster count and normalized by the batch size. Zero-size clusters
/// contribute nothing, and an empty batch scores 0.0, so the result is
/// always finite and non-negative. One dominant cluster scores near zero;
/// the score grows with evenly spread clusters.
pub fn score_diversity(clusters: &[Cluster]) -> f32 {
    let total: usize = clusters.iter().map(|c| c.size).sum();
    if total == 0 {
        return 0.0;
    }
    let total = total as f32;
    let entropy: f32 = clusters
        .iter()
        .filter(|c| c.size > 0)
        .map(|c| {
            let p = c.size as f32 / total;
            -p * p.ln()
        })
        .sum();
    entropy * clusters.len() as f32 / total
}
