use anyhow::{bail, Result};
use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::bias::score_bias;
use crate::cluster::kmeans;
use crate::config::AnalyzerConfig;
use crate::diversity::score_diversity;
use crate::models::{AnalysisResult, BiasMetrics, Cluster, Comment};
use crate::render::generate_summary;
use crate::theme::extract_theme;
use crate::vectorize::Vectorizer;

/// Full analysis of one comment batch: embed everything, partition, build a
/// summary per cluster, then score the batch as a whole.
///
/// This never fails. Provider trouble is absorbed inside the vectorizer, and
/// a partition that does not cover the batch degrades to a single catch-all
/// cluster.
pub async fn analyze(
    comments: &[Comment],
    vectorizer: &dyn Vectorizer,
    cfg: &AnalyzerConfig,
) -> AnalysisResult {
    let run_start = std::time::Instant::now();
    info!("Analysis started - comments={}", comments.len());

    if comments.is_empty() {
        debug!("Empty batch - returning the empty result");
        let bias_metrics = BiasMetrics::default();
        let summary = generate_summary(&[], &bias_metrics, 0.0);
        return AnalysisResult {
            clusters: Vec::new(),
            diversity_score: 0.0,
            bias_metrics,
            summary,
        };
    }

    // 1) embeddings, fanned out; join_all keeps input order, so
    //    embeddings[i] belongs to comments[i]
    let embed_start = std::time::Instant::now();
    let embeddings: Vec<Vec<f32>> =
        join_all(comments.iter().map(|c| vectorizer.embed(&c.text))).await;
    info!(
        "Embedding stage completed - duration={:.2}s, vectors={}, dimensions={}",
        embed_start.elapsed().as_secs_f32(),
        embeddings.len(),
        vectorizer.dimensions()
    );

    // 2) partition into k index groups
    let k = cfg.clustering.choose_k(comments.len());
    let partition = kmeans(&embeddings, k);

    // 3) per-cluster theme and sentiment
    let cluster_start = std::time::Instant::now();
    let clusters = match build_clusters(comments, &embeddings, &partition, vectorizer).await {
        Ok(clusters) => clusters,
        Err(e) => {
            warn!(
                "Cluster stage degraded - falling back to a single cluster: {:#}",
                e
            );
            vec![fallback_cluster(comments)]
        }
    };
    info!(
        "Cluster stage completed - duration={:.2}s, clusters={}",
        cluster_start.elapsed().as_secs_f32(),
        clusters.len()
    );

    // 4) whole-batch scores
    let texts: Vec<&str> = comments.iter().map(|c| c.text.as_str()).collect();
    let bias_metrics = score_bias(&texts, &cfg.bias_lexicon);
    let diversity_score = score_diversity(&clusters);
    let summary = generate_summary(&clusters, &bias_metrics, diversity_score);

    info!(
        "Analysis completed - duration={:.2}s, clusters={}, diversity={:.3}",
        run_start.elapsed().as_secs_f32(),
        clusters.len(),
        diversity_score
    );

    AnalysisResult {
        clusters,
        diversity_score,
        bias_metrics,
        summary,
    }
}

/// One [`Cluster`] per non-empty partition group, renumbered in group order.
/// Sentiment calls within a group run concurrently; groups run in sequence.
async fn build_clusters(
    comments: &[Comment],
    embeddings: &[Vec<f32>],
    partition: &[Vec<usize>],
    vectorizer: &dyn Vectorizer,
) -> Result<Vec<Cluster>> {
    // the partition must cover every comment exactly once; anything else
    // means the engine misbehaved and the caller degrades to one cluster
    let mut seen = vec![false; comments.len()];
    for &i in partition.iter().flatten() {
        if i >= comments.len() {
            bail!(
                "partition index {} out of range for {} comments",
                i,
                comments.len()
            );
        }
        if seen[i] {
            bail!("partition repeats comment index {}", i);
        }
        seen[i] = true;
    }
    let missing = seen.iter().filter(|&&s| !s).count();
    if missing > 0 {
        bail!("partition dropped {} of {} comments", missing, comments.len());
    }

    let mut clusters = Vec::new();
    for (idx, group) in partition.iter().filter(|g| !g.is_empty()).enumerate() {
        let group_comments: Vec<Comment> = group.iter().map(|&i| comments[i].clone()).collect();

        let sentiments =
            join_all(group_comments.iter().map(|c| vectorizer.sentiment(&c.text))).await;
        let sentiment = sentiments.iter().sum::<f32>() / sentiments.len() as f32;

        let texts: Vec<&str> = group_comments.iter().map(|c| c.text.as_str()).collect();
        let group_embeddings: Vec<&[f32]> =
            group.iter().map(|&i| embeddings[i].as_slice()).collect();
        let theme = extract_theme(&texts, &group_embeddings);

        debug!(
            "Cluster built - id=cluster-{}, size={}, sentiment={:.2}",
            idx,
            group_comments.len(),
            sentiment
        );

        clusters.push(Cluster {
            id: format!("cluster-{}", idx),
            theme: theme.key_phrase,
            headline: theme.headline,
            sentiment,
            size: group_comments.len(),
            comments: group_comments,
        });
    }
    Ok(clusters)
}

/// Catch-all cluster for when the partition cannot be trusted.
fn fallback_cluster(comments: &[Comment]) -> Cluster {
    Cluster {
        id: "cluster-0".to_string(),
        theme: "General Discussion".to_string(),
        headline: comments.first().map(|c| c.text.clone()).unwrap_or_default(),
        comments: comments.to_vec(),
        sentiment: 0.0,
        size: comments.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vectorize::HashedVectorizer;

    fn comment(id: usize, text: &str) -> Comment {
        Comment {
            id: format!("c{}", id),
            text: text.to_string(),
            author: "tester".to_string(),
            like_count: 0,
            published_at: chrono::DateTime::UNIX_EPOCH,
        }
    }

    fn varied_batch(n: usize) -> Vec<Comment> {
        let texts = [
            "the budget debate keeps dragging on",
            "this song slaps so hard",
            "terrible editing ruined the message",
            "love the production quality here",
            "government policy takes center stage again",
            "my cat walked over the keyboard",
        ];
        (0..n).map(|i| comment(i, texts[i % texts.len()])).collect()
    }

    #[tokio::test]
    async fn empty_batch_yields_the_empty_result() {
        let vectorizer = HashedVectorizer::new(32);
        let cfg = AnalyzerConfig::default();
        let result = analyze(&[], &vectorizer, &cfg).await;

        assert!(result.clusters.is_empty());
        assert_eq!(result.diversity_score, 0.0);
        assert_eq!(result.bias_metrics, BiasMetrics::default());
        assert_eq!(
            result.summary,
            "This video has 0 comments organized into 0 distinct viewpoints. \
             The comment section shows low diversity of opinions, suggesting an echo chamber effect. "
        );
    }

    #[tokio::test]
    async fn cluster_sizes_always_sum_to_the_batch_size() {
        let vectorizer = HashedVectorizer::new(64);
        let cfg = AnalyzerConfig::default();
        for n in [1, 2, 5, 14, 15, 20, 40] {
            let comments = varied_batch(n);
            let result = analyze(&comments, &vectorizer, &cfg).await;
            let total: usize = result.clusters.iter().map(|c| c.size).sum();
            assert_eq!(total, n, "sizes must cover the batch for n={}", n);
            for cluster in &result.clusters {
                assert_eq!(cluster.size, cluster.comments.len());
                assert!(cluster.size > 0, "empty clusters must be dropped");
            }
        }
    }

    #[tokio::test]
    async fn cluster_ids_are_sequential() {
        let vectorizer = HashedVectorizer::new(64);
        let cfg = AnalyzerConfig::default();
        let result = analyze(&varied_batch(20), &vectorizer, &cfg).await;
        for (i, cluster) in result.clusters.iter().enumerate() {
            assert_eq!(cluster.id, format!("cluster-{}", i));
        }
    }

    #[tokio::test]
    async fn single_comment_still_produces_a_cluster() {
        let vectorizer = HashedVectorizer::new(32);
        let cfg = AnalyzerConfig::default();
        let comments = vec![comment(0, "lone voice in the comment section")];
        let result = analyze(&comments, &vectorizer, &cfg).await;

        assert_eq!(result.clusters.len(), 1);
        assert_eq!(result.clusters[0].size, 1);
        assert_eq!(result.clusters[0].id, "cluster-0");
        assert!(result.diversity_score.is_finite());
        assert!(result.diversity_score >= 0.0);
    }

    #[tokio::test]
    async fn identical_comments_merge_and_average_sentiment() {
        let vectorizer = HashedVectorizer::new(32);
        let cfg = AnalyzerConfig::default();
        let comments = vec![
            comment(0, "great video love it"),
            comment(1, "great video love it"),
        ];
        let result = analyze(&comments, &vectorizer, &cfg).await;

        assert_eq!(result.clusters.len(), 1);
        assert_eq!(result.clusters[0].size, 2);
        assert!((result.clusters[0].sentiment - 1.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn analysis_is_deterministic() {
        let vectorizer = HashedVectorizer::new(64);
        let cfg = AnalyzerConfig::default();
        let comments = varied_batch(18);
        let first = analyze(&comments, &vectorizer, &cfg).await;
        let second = analyze(&comments, &vectorizer, &cfg).await;
        assert_eq!(
            serde_json::to_value(&first).unwrap(),
            serde_json::to_value(&second).unwrap()
        );
    }

    #[tokio::test]
    async fn broken_partitions_are_rejected() {
        let vectorizer = HashedVectorizer::new(8);
        let comments = varied_batch(3);
        let embeddings = vec![vec![0.0f32; 8]; 3];

        // drops index 2
        let dropped = vec![vec![0, 1]];
        assert!(build_clusters(&comments, &embeddings, &dropped, &vectorizer)
            .await
            .is_err());

        // repeats index 1
        let repeated = vec![vec![0, 1], vec![1, 2]];
        assert!(build_clusters(&comments, &embeddings, &repeated, &vectorizer)
            .await
            .is_err());

        // points past the batch
        let out_of_range = vec![vec![0, 1, 2, 3]];
        assert!(build_clusters(&comments, &embeddings, &out_of_range, &vectorizer)
            .await
            .is_err());
    }

    #[test]
    fn fallback_cluster_holds_the_whole_batch() {
        let comments = varied_batch(4);
        let cluster = fallback_cluster(&comments);
        assert_eq!(cluster.id, "cluster-0");
        assert_eq!(cluster.theme, "General Discussion");
        assert_eq!(cluster.headline, comments[0].text);
        assert_eq!(cluster.size, 4);
        assert_eq!(cluster.sentiment, 0.0);
    }
}
