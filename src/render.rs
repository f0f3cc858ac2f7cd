use crate::models::{BiasMetrics, Cluster, VideoReport};

// Display buckets for the narrative summary. Presentation policy, not part
// of the scorers' contracts.
const HIGH_DIVERSITY: f32 = 0.7;
const MODERATE_DIVERSITY: f32 = 0.4;
const BIAS_CALLOUT: f32 = 0.5;

/// Short narrative for the whole batch: comment and viewpoint counts, a
/// diversity tier, and one sentence per bias axis that crosses the callout
/// threshold.
pub fn generate_summary(clusters: &[Cluster], bias: &BiasMetrics, diversity_score: f32) -> String {
    let total: usize = clusters.iter().map(|c| c.size).sum();
    let mut summary = format!(
        "This video has {} comments organized into {} distinct viewpoints. ",
        total,
        clusters.len()
    );

    if diversity_score > HIGH_DIVERSITY {
        summary.push_str("The comment section shows high diversity of opinions. ");
    } else if diversity_score > MODERATE_DIVERSITY {
        summary.push_str("The comment section shows moderate diversity of opinions. ");
    } else {
        summary.push_str(
            "The comment section shows low diversity of opinions, suggesting an echo chamber effect. ",
        );
    }

    if bias.political > BIAS_CALLOUT {
        summary.push_str("The discussion is politically charged. ");
    }
    if bias.emotional > BIAS_CALLOUT {
        summary.push_str("The comments show strong emotional engagement. ");
    }
    if bias.moral > BIAS_CALLOUT {
        summary.push_str("The discussion includes significant moral framing. ");
    }

    summary
}

fn diversity_tier(score: f32) -> &'static str {
    if score > HIGH_DIVERSITY {
        "high"
    } else if score > MODERATE_DIVERSITY {
        "moderate"
    } else {
        "low"
    }
}

pub fn render_report_markdown(report: &VideoReport) -> String {
    let mut md = String::new();
    md.push_str(&format!("# EchoScope Report: {}\n\n", report.title));
    md.push_str(&format!(
        "Channel: {}\nVideo: https://www.youtube.com/watch?v={}\n\n",
        report.channel_title, report.video_id
    ));

    md.push_str("## Summary\n");
    md.push_str(&format!("{}\n\n", report.analysis.summary.trim()));

    md.push_str("## Viewpoint Clusters\n");
    for cluster in &report.analysis.clusters {
        let theme = if cluster.theme.is_empty() {
            "(no dominant phrase)"
        } else {
            cluster.theme.as_str()
        };
        md.push_str(&format!(
            "- **{}**: {} comments, sentiment {:+.2}\n",
            theme, cluster.size, cluster.sentiment
        ));
        if !cluster.headline.is_empty() {
            md.push_str(&format!("  > {}\n", cluster.headline));
        }
    }
    md.push('\n');

    md.push_str("## Bias\n");
    md.push_str(&format!("- Political: {:.2}\n", report.analysis.bias_metrics.political));
    md.push_str(&format!("- Emotional: {:.2}\n", report.analysis.bias_metrics.emotional));
    md.push_str(&format!("- Moral: {:.2}\n", report.analysis.bias_metrics.moral));
    md.push_str(&format!("- Toxicity: {:.2}\n\n", report.toxicity));

    md.push_str("## Diversity\n");
    md.push_str(&format!(
        "Score {:.3} ({})\n",
        report.analysis.diversity_score,
        diversity_tier(report.analysis.diversity_score)
    ));

    md
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AnalysisResult;

    fn cluster_of(size: usize) -> Cluster {
        Cluster {
            id: "cluster-0".to_string(),
            theme: "budget cuts".to_string(),
            headline: "the budget cuts go too far".to_string(),
            comments: Vec::new(),
            sentiment: -0.25,
            size,
        }
    }

    #[test]
    fn summary_counts_comments_and_viewpoints() {
        let clusters = vec![cluster_of(6), cluster_of(4)];
        let summary = generate_summary(&clusters, &BiasMetrics::default(), 0.2);
        assert!(summary.starts_with(
            "This video has 10 comments organized into 2 distinct viewpoints. "
        ));
    }

    #[test]
    fn diversity_tiers_pick_the_right_sentence() {
        let clusters = vec![cluster_of(1)];
        let bias = BiasMetrics::default();

        let high = generate_summary(&clusters, &bias, 0.8);
        assert!(high.contains("high diversity of opinions"));

        let moderate = generate_summary(&clusters, &bias, 0.5);
        assert!(moderate.contains("moderate diversity of opinions"));

        let low = generate_summary(&clusters, &bias, 0.1);
        assert!(low.contains("suggesting an echo chamber effect"));

        // boundaries are exclusive
        let at_moderate = generate_summary(&clusters, &bias, 0.4);
        assert!(at_moderate.contains("echo chamber"));
        let at_high = generate_summary(&clusters, &bias, 0.7);
        assert!(at_high.contains("moderate diversity"));
    }

    #[test]
    fn bias_sentences_appear_only_past_the_callout() {
        let clusters = vec![cluster_of(2)];
        let charged = BiasMetrics {
            political: 0.6,
            emotional: 0.51,
            moral: 0.5,
        };
        let summary = generate_summary(&clusters, &charged, 0.5);
        assert!(summary.contains("politically charged"));
        assert!(summary.contains("strong emotional engagement"));
        // exactly 0.5 stays below the strict threshold
        assert!(!summary.contains("moral framing"));
    }

    #[test]
    fn markdown_report_carries_every_section() {
        let report = VideoReport {
            video_id: "dQw4w9WgXcQ".to_string(),
            title: "Some Video".to_string(),
            channel_title: "Some Channel".to_string(),
            analysis: AnalysisResult {
                clusters: vec![cluster_of(3)],
                diversity_score: 0.45,
                bias_metrics: BiasMetrics::default(),
                summary: "A summary. ".to_string(),
            },
            toxicity: 0.25,
        };
        let md = render_report_markdown(&report);
        assert!(md.contains("# EchoScope Report: Some Video"));
        assert!(md.contains("watch?v=dQw4w9WgXcQ"));
        assert!(md.contains("## Viewpoint Clusters"));
        assert!(md.contains("- **budget cuts**: 3 comments, sentiment -0.25"));
        assert!(md.contains("> the budget cuts go too far"));
        assert!(md.contains("- Toxicity: 0.25"));
        assert!(md.contains("Score 0.450 (moderate)"));
    }

    #[test]
    fn empty_theme_gets_a_placeholder_in_markdown() {
        let mut cluster = cluster_of(1);
        cluster.theme = String::new();
        cluster.headline = String::new();
        let report = VideoReport {
            video_id: "x".to_string(),
            title: "t".to_string(),
            channel_title: "c".to_string(),
            analysis: AnalysisResult {
                clusters: vec![cluster],
                diversity_score: 0.0,
                bias_metrics: BiasMetrics::default(),
                summary: String::new(),
            },
            toxicity: 0.0,
        };
        let md = render_report_markdown(&report);
        assert!(md.contains("(no dominant phrase)"));
    }
}
