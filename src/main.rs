mod api_types;
mod bias;
mod cluster;
mod config;
mod diversity;
mod fetch;
mod models;
mod orchestrator;
mod render;
mod similarity;
mod theme;
mod vectorize;

use anyhow::{bail, Result};
use clap::Parser;
use config::{AnalyzerConfig, VectorizerBackend};
use models::VideoReport;
use reqwest::Client;
use tracing::{debug, info};

/// EchoScope - YouTube comment section analyzer
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// YouTube video URL or bare 11-character video id
    video: String,

    /// Maximum number of comments to fetch
    #[arg(short, long, default_value_t = 100)]
    max_results: usize,

    /// Output directory for generated files (default: "out")
    #[arg(short, long, default_value = "out")]
    output_dir: String,

    /// Path to config file (overrides ECHOSCOPE_CONFIG environment variable)
    #[arg(short, long)]
    config: Option<String>,

    /// Vectorizer backend override: "remote" or "local"
    #[arg(short, long)]
    backend: Option<String>,
}

fn resolve_config_path(args: &Args) -> Option<std::path::PathBuf> {
    if let Some(ref path) = args.config {
        debug!("Using config file from --config argument: {}", path);
        return Some(std::path::PathBuf::from(path));
    }
    if let Ok(path) = std::env::var("ECHOSCOPE_CONFIG") {
        debug!("Using config file from ECHOSCOPE_CONFIG: {}", path);
        return Some(std::path::PathBuf::from(path));
    }
    let default = std::path::PathBuf::from("echoscope.yaml");
    default.exists().then_some(default)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_thread_ids(false)
        .with_line_number(true)
        .init();

    info!("Starting echoscope");

    let args = Args::parse();

    let mut cfg = match resolve_config_path(&args) {
        Some(path) => {
            // Friendlier error if missing
            if !path.exists() {
                return Err(anyhow::anyhow!(
                    "config not found at {}\n\
                     Use --config to specify a config file, or set ECHOSCOPE_CONFIG.\n\
                     Example echoscope.yaml:\n\
                     youtube_api_key: \"YOUR_KEY\"\nvectorizer:\n  backend: local\n",
                    path.display()
                ));
            }
            config::load_config(&path)?
        }
        None => {
            debug!("No config file found - using defaults with environment overrides");
            AnalyzerConfig::from_env()
        }
    };

    if let Some(ref backend) = args.backend {
        cfg.vectorizer.backend = match backend.to_lowercase().as_str() {
            "remote" => VectorizerBackend::Remote,
            "local" => VectorizerBackend::Local,
            other => bail!(
                "unknown vectorizer backend {:?} (expected \"remote\" or \"local\")",
                other
            ),
        };
    }

    let Some(video_id) = fetch::extract_video_id(&args.video) else {
        bail!("could not extract a video id from {:?}", args.video);
    };

    if cfg.youtube_api_key.is_empty() {
        bail!(
            "no YouTube API key configured - set youtube_api_key in the config file \
             or the YOUTUBE_API_KEY environment variable"
        );
    }

    info!(
        "Run parameters - video_id={}, max_results={}, output_dir={}",
        video_id, args.max_results, args.output_dir
    );

    let client = Client::builder().build()?;

    let fetch_start = std::time::Instant::now();
    let (video, comments) = tokio::try_join!(
        fetch::fetch_video_details(&client, &cfg.youtube_api_key, &video_id),
        fetch::fetch_comments(&client, &cfg.youtube_api_key, &video_id, args.max_results),
    )?;
    info!(
        "Fetch completed - duration={:.2}s, title={:?}, comments={}",
        fetch_start.elapsed().as_secs_f32(),
        video.title,
        comments.len()
    );

    let vectorizer = vectorize::build_vectorizer(&client, &cfg.vectorizer);
    let analysis = orchestrator::analyze(&comments, vectorizer.as_ref(), &cfg).await;

    // presentation-level extras live outside the analysis proper
    let texts: Vec<&str> = comments.iter().map(|c| c.text.as_str()).collect();
    let toxicity = bias::score_toxicity(&texts);

    let report = VideoReport {
        video_id: video.video_id,
        title: video.title,
        channel_title: video.channel_title,
        analysis,
        toxicity,
    };

    let out_dir = std::path::Path::new(&args.output_dir).join(&video_id);
    std::fs::create_dir_all(&out_dir)?;

    let json_path = out_dir.join("analysis.json");
    std::fs::write(&json_path, serde_json::to_vec_pretty(&report)?)?;

    let md_path = out_dir.join("report.md");
    std::fs::write(&md_path, render::render_report_markdown(&report))?;

    info!(
        "Report written - json={}, markdown={}",
        json_path.display(),
        md_path.display()
    );
    info!("Summary: {}", report.analysis.summary.trim_end());

    Ok(())
}
