use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use std::env;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use civic_lens::health::SkinTriage;
use civic_lens::inference::{DeepfakeModel, ImageScorer, SkinClassifier};
use civic_lens::nlp::HeuristicEntityTagger;
use civic_lens::verify::{FactCheckClient, PostAnalyzer};
use civic_lens::{types::*, AppState};

fn parse_port_from_args() -> Option<u16> {
    let mut args = std::env::args().peekable();
    while let Some(a) = args.next() {
        if a == "--port" {
            if let Some(v) = args.next() {
                if let Ok(p) = v.parse::<u16>() {
                    return Some(p);
                }
            }
        } else if let Some(rest) = a.strip_prefix("--port=") {
            if let Ok(p) = rest.parse::<u16>() {
                return Some(p);
            }
        }
    }
    None
}

fn port_from_env() -> Option<u16> {
    for k in ["CIVIC_LENS_PORT", "PORT"] {
        if let Ok(v) = std::env::var(k) {
            if let Ok(p) = v.trim().parse::<u16>() {
                return Some(p);
            }
        }
    }
    None
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=warn"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    info!("Starting Civic Lens server");

    // Create HTTP client
    let http_timeout = env::var("HTTP_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(30);
    let connect_timeout = env::var("HTTP_CONNECT_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(10);
    let http_client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(http_timeout))
        .connect_timeout(std::time::Duration::from_secs(connect_timeout))
        .build()?;

    // Create application state
    let mut state = AppState::new(http_client.clone());

    // Load the deepfake model if its file exists
    let deepfake_path = state.lens_config.models.resolve_deepfake_path();
    if tokio::fs::metadata(&deepfake_path).await.is_ok() {
        let path = deepfake_path.clone();
        match tokio::task::spawn_blocking(move || DeepfakeModel::load(&path)).await? {
            Ok(model) => {
                let fact_check = FactCheckClient::new(
                    http_client.clone(),
                    state.lens_config.fact_check.resolve_endpoint(),
                    state.lens_config.fact_check.resolve_api_key(),
                );
                let analyzer = PostAnalyzer::new(
                    http_client.clone(),
                    Arc::new(model) as Arc<dyn ImageScorer>,
                    fact_check,
                    Arc::new(HeuristicEntityTagger),
                )
                .with_outbound_limit(Arc::clone(&state.outbound_limit))
                .with_max_concurrent(state.lens_config.analyze.resolve_max_concurrent());
                state = state.with_analyzer(Arc::new(analyzer));
                info!("Deepfake model loaded from {}", deepfake_path.display());
            }
            Err(e) => {
                warn!(
                    "Failed to load deepfake model from {}: {}. Post analysis disabled.",
                    deepfake_path.display(),
                    e
                );
            }
        }
    } else {
        info!(
            "Deepfake model not found at {}. Post analysis disabled.",
            deepfake_path.display()
        );
    }

    // Load the skin-lesion model if its file exists
    let skin_path = state.lens_config.models.resolve_skin_path();
    if tokio::fs::metadata(&skin_path).await.is_ok() {
        let path = skin_path.clone();
        match tokio::task::spawn_blocking(move || SkinClassifier::load(&path)).await? {
            Ok(classifier) => {
                let mut skin = SkinTriage::new(Arc::new(classifier));
                if let Some(chat) = &state.chat_model {
                    skin = skin.with_chat_model(Arc::clone(chat));
                }
                if let Some(search) = &state.search_provider {
                    skin = skin.with_search_provider(Arc::clone(search));
                }
                state = state.with_skin_triage(Arc::new(skin));
                info!("Skin model loaded from {}", skin_path.display());
            }
            Err(e) => {
                warn!(
                    "Failed to load skin model from {}: {}. Health check disabled.",
                    skin_path.display(),
                    e
                );
            }
        }
    } else {
        info!(
            "Skin model not found at {}. Health check disabled.",
            skin_path.display()
        );
    }

    let state = Arc::new(state);

    // Build router
    let app = Router::new()
        .route("/", get(health_check))
        .route("/health", get(health_check))
        .route("/analyze_post", post(analyze_post_handler))
        .route("/process_complaint", post(process_complaint_handler))
        .route("/health_check", post(skin_check_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    // Start server
    let port: u16 = parse_port_from_args()
        .or_else(port_from_env)
        .unwrap_or(7122);
    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = match tokio::net::TcpListener::bind(&bind_addr).await {
        Ok(l) => l,
        Err(e) if e.kind() == std::io::ErrorKind::AddrInUse => {
            anyhow::bail!(
                "Address already in use: {}. Stop the existing process or run with --port {} (or set PORT/CIVIC_LENS_PORT).",
                bind_addr,
                port.saturating_add(1)
            )
        }
        Err(e) => return Err(e.into()),
    };
    info!("Civic Lens listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate()).ok();
        let mut sigint = signal(SignalKind::interrupt()).ok();

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = async {
                if let Some(ref mut s) = sigterm {
                    s.recv().await;
                } else {
                    futures::future::pending::<()>().await;
                }
            } => {},
            _ = async {
                if let Some(ref mut s) = sigint {
                    s.recv().await;
                } else {
                    futures::future::pending::<()>().await;
                }
            } => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

async fn health_check(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "model_loaded": state.analyzer.is_some(),
        "skin_model_loaded": state.skin.is_some(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn analyze_post_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AnalyzePostRequest>,
) -> Result<Json<PostAnalysisReport>, (StatusCode, Json<ErrorResponse>)> {
    let post_text = match request.post_text.filter(|t| !t.is_empty()) {
        Some(t) => t,
        None => {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new("Post text is required")),
            ))
        }
    };
    let analyzer = match &state.analyzer {
        Some(a) => a,
        None => {
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Deepfake model is not loaded")),
            ))
        }
    };

    let report = analyzer.analyze(&post_text, &request.image_paths).await;
    Ok(Json(report))
}

async fn process_complaint_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ComplaintRequest>,
) -> Result<Json<ComplaintResponse>, (StatusCode, Json<ErrorResponse>)> {
    let complaint = request.complaint.filter(|c| !c.is_empty());
    let location = request.location.filter(|l| !l.is_empty());
    let (complaint, location) = match (complaint, location) {
        (Some(c), Some(l)) => (c, l),
        _ => {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new("Complaint and location are required")),
            ))
        }
    };

    let triaged = state
        .triage
        .process(&complaint, &location, request.image_path.as_deref())
        .await;
    Ok(Json(ComplaintResponse {
        complainer_view: triaged.complainer_view,
        officer_view: triaged.officer_view,
    }))
}

async fn skin_check_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<HealthCheckRequest>,
) -> Result<Json<civic_lens::health::SkinAssessment>, (StatusCode, Json<ErrorResponse>)> {
    let image_path = match request.image_path.filter(|p| !p.is_empty()) {
        Some(p) => p,
        None => {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new("Image path is required")),
            ))
        }
    };
    let skin = match &state.skin {
        Some(s) => s,
        None => {
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Skin model is not loaded")),
            ))
        }
    };

    match skin.assess(&image_path).await {
        Ok(assessment) => Ok(Json(assessment)),
        Err(e) => Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(e.to_string())),
        )),
    }
}
