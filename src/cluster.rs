use tracing::debug;

use crate::similarity::{cosine_distance, mean_centroid};

/// Safety cap for batches that keep oscillating instead of settling.
pub const MAX_ITERATIONS: usize = 100;

/// Partition `embeddings` into `k` index groups with k-means over cosine
/// distance.
///
/// Deterministic by construction: centroids start as the first `k` input
/// vectors, ties go to the lowest centroid index, and iteration stops once
/// the partition repeats (or at [`MAX_ITERATIONS`]). With `k == 0` the whole
/// batch lands in one group; with `k > n` the trailing groups stay empty.
/// Every input index appears in exactly one group.
pub fn kmeans(embeddings: &[Vec<f32>], k: usize) -> Vec<Vec<usize>> {
    if embeddings.is_empty() {
        return Vec::new();
    }
    if k == 0 {
        return vec![(0..embeddings.len()).collect()];
    }

    debug!("Clustering started - points={}, k={}", embeddings.len(), k);

    // fewer points than k leaves fewer centroids; assignment still covers
    // every point, the surplus groups just never fill
    let mut centroids: Vec<Vec<f32>> = embeddings.iter().take(k).cloned().collect();
    let mut groups: Vec<Vec<usize>> = vec![Vec::new(); k];
    let mut converged = false;

    for iteration in 0..MAX_ITERATIONS {
        // assign each point to its nearest centroid, lowest index on ties
        let mut next: Vec<Vec<usize>> = vec![Vec::new(); k];
        for (i, emb) in embeddings.iter().enumerate() {
            let mut best = 0usize;
            let mut best_dist = f32::INFINITY;
            for (j, centroid) in centroids.iter().enumerate() {
                let d = cosine_distance(emb, centroid);
                if d < best_dist {
                    best = j;
                    best_dist = d;
                }
            }
            next[best].push(i);
        }

        if next == groups {
            converged = true;
            debug!("Clustering converged - iterations={}, k={}", iteration, k);
            break;
        }
        groups = next;

        // recompute centroids; empty groups keep their previous centroid
        for (j, group) in groups.iter().enumerate() {
            if group.is_empty() {
                continue;
            }
            let members: Vec<&[f32]> = group.iter().map(|&i| embeddings[i].as_slice()).collect();
            centroids[j] = mean_centroid(&members);
        }
    }

    if !converged {
        debug!("Clustering stopped at the iteration cap - cap={}, k={}", MAX_ITERATIONS, k);
    }

    let sizes: Vec<usize> = groups.iter().map(|g| g.len()).collect();
    debug!("Cluster size distribution - sizes={:?}", sizes);

    groups
}
