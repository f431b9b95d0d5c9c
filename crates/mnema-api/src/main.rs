//! mnema-api - HTTP API server for mnema.

mod auth;
mod error;
mod handlers;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::Request;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use mnema_core::{defaults, CompletionBackend, PipelineConfig, ProviderConfig, SearchBackend};
use mnema_db::Database;
use mnema_inference::{GeminiBackend, TavilyBackend, WhisperBackend};
use mnema_pipeline::{NotePipeline, QuizGenerator, TextExtractionStage};

use handlers::wikipedia::WikipediaProxy;
use state::AppState;

/// Generates time-ordered UUIDv7 request correlation IDs.
///
/// UUIDv7 embeds a Unix timestamp, so IDs sort chronologically. Useful
/// for log correlation when tracing a pipeline run across stages.
#[derive(Clone, Default)]
struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Assemble the router over prepared application state.
fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/notes", post(handlers::notes::create_note))
        .route("/api/v1/notes/process", post(handlers::notes::process_note))
        .route("/api/v1/extract-text", post(handlers::extract::extract_text))
        .route(
            "/api/v1/transcribe-audio",
            post(handlers::transcribe::transcribe_audio),
        )
        .route(
            "/api/v1/quizzes/generate",
            post(handlers::quizzes::generate_quiz),
        )
        .route("/api/v1/wikipedia", get(handlers::wikipedia::wikipedia))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        // Browser clients are served from arbitrary origins; pre-flight
        // must succeed everywhere. Deployment requirement, not a choice.
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        // Bound request bodies; audio uploads are the largest legitimate
        // payload.
        .layer(RequestBodyLimitLayer::new(25 * 1024 * 1024))
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,mnema=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let provider_config = ProviderConfig::from_env()?;
    let pipeline_config = PipelineConfig::from_env();

    let database_url = std::env::var(defaults::ENV_DATABASE_URL)
        .map_err(|_| anyhow::anyhow!("{} is not set", defaults::ENV_DATABASE_URL))?;
    let db = Database::connect(&database_url).await?;

    let completion: Arc<dyn CompletionBackend> = Arc::new(GeminiBackend::new(&provider_config));
    let search: Option<Arc<dyn SearchBackend>> = TavilyBackend::from_config(&provider_config)
        .map(|backend| Arc::new(backend) as Arc<dyn SearchBackend>);
    if search.is_none() {
        info!("Search key not configured; research enrichment disabled");
    }
    let transcription = WhisperBackend::from_config(&provider_config).map(Arc::new);
    if transcription.is_none() {
        info!("Cloudflare credentials not configured; transcription disabled");
    }

    let pipeline = Arc::new(NotePipeline::new(
        Arc::new(db.notes.clone()),
        completion.clone(),
        search,
        pipeline_config.clone(),
    ));
    let extraction = Arc::new(TextExtractionStage::new(
        completion.clone(),
        pipeline_config.fast_model.clone(),
    ));
    let quizzes = Arc::new(QuizGenerator::new(
        completion,
        Arc::new(db.quizzes.clone()),
        pipeline_config.fast_model.clone(),
    ));

    let state = AppState {
        db,
        pipeline,
        extraction,
        quizzes,
        transcription,
        wikipedia: Arc::new(WikipediaProxy::from_defaults()),
    };

    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(state)).await?;

    Ok(())
}
