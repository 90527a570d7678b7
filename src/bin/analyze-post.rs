use civic_lens::core::config::load_lens_config;
use civic_lens::inference::{DeepfakeModel, ImageScorer};
use civic_lens::nlp::HeuristicEntityTagger;
use civic_lens::verify::{FactCheckClient, PostAnalyzer};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init()
        .ok();

    let post_text = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    if post_text.trim().is_empty() {
        eprintln!("Usage: analyze-post <post text>");
        eprintln!("\nEnv:");
        eprintln!("  DEEPFAKE_MODEL_PATH=deepfake_model.onnx (model file to load)");
        eprintln!("  FACT_CHECK_API_KEY=... (optional, claim lookups degrade without it)");
        eprintln!("  ANALYZE_MAX_CONCURRENT=4 (optional)");
        std::process::exit(2);
    }

    let http_timeout = std::env::var("HTTP_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(30);
    let connect_timeout = std::env::var("HTTP_CONNECT_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(10);

    let http_client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(http_timeout))
        .connect_timeout(std::time::Duration::from_secs(connect_timeout))
        .build()?;

    let config = load_lens_config();
    let model_path = config.models.resolve_deepfake_path();
    let model = tokio::task::spawn_blocking(move || DeepfakeModel::load(&model_path)).await??;

    let fact_check = FactCheckClient::new(
        http_client.clone(),
        config.fact_check.resolve_endpoint(),
        config.fact_check.resolve_api_key(),
    );
    let analyzer = PostAnalyzer::new(
        http_client,
        Arc::new(model) as Arc<dyn ImageScorer>,
        fact_check,
        Arc::new(HeuristicEntityTagger),
    )
    .with_max_concurrent(config.analyze.resolve_max_concurrent());

    let report = analyzer.analyze(&post_text, &[]).await;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
