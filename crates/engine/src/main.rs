//! Gumshoe Engine - Main entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{HeaderValue, Method};
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gumshoe_engine::api;
use gumshoe_engine::app::App;
use gumshoe_engine::infrastructure::{
    case_store::CaseStore,
    clock::SystemClock,
    ollama::OllamaClient,
    persistence::SqliteGameRepo,
    resilient_llm::{ResilientLlmClient, RetryConfig},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv_from_repo_root();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gumshoe_engine=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Gumshoe Engine");

    // Load configuration
    let db_path = std::env::var("GUMSHOE_DB").unwrap_or_else(|_| "gumshoe.db".into());
    let cases_dir = std::env::var("CASES_DIR").unwrap_or_else(|_| "data/cases".into());
    let ollama_url = std::env::var("OLLAMA_URL")
        .or_else(|_| std::env::var("OLLAMA_BASE_URL"))
        .unwrap_or_else(|_| "http://localhost:11434".into());
    let ollama_model = std::env::var("OLLAMA_MODEL").unwrap_or_else(|_| "llama3.2".into());
    let server_host = std::env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let server_port: u16 = std::env::var("SERVER_PORT")
        .or_else(|_| std::env::var("PORT"))
        .unwrap_or_else(|_| "3000".into())
        .parse()
        .unwrap_or(3000);

    // Open persistence
    tracing::info!(db_path, "Opening game database");
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .connect(&format!("sqlite://{db_path}?mode=rwc"))
        .await?;
    let repo = Arc::new(SqliteGameRepo::new(pool).await?);

    // Case library
    let cases = Arc::new(CaseStore::new(&cases_dir));
    match cases.list() {
        Ok(ids) => tracing::info!(cases_dir, count = ids.len(), "Case library loaded"),
        Err(e) => tracing::warn!(cases_dir, error = %e, "Case library unreadable"),
    }

    // LLM client with retry
    let ollama_client = Arc::new(OllamaClient::new(&ollama_url, &ollama_model));
    let retry_config = RetryConfig::default();
    tracing::info!(
        "LLM client configured with retry: max_retries={}, base_delay_ms={}",
        retry_config.max_retries,
        retry_config.base_delay_ms
    );
    let llm = Arc::new(ResilientLlmClient::new(ollama_client, retry_config));

    // Create application
    let app = Arc::new(App::new(repo, cases, llm, Arc::new(SystemClock)));

    // Bring persisted games back before accepting traffic
    app.registry.restore_games().await;

    // Build router
    let mut router = api::http::routes()
        .with_state(app.clone())
        .route("/ws", get(api::websocket::ws_handler).with_state(app))
        .layer(TraceLayer::new_for_http());

    if let Some(cors) = build_cors_layer_from_env() {
        router = router.layer(cors);
    }

    // Start server
    let addr: SocketAddr = format!("{server_host}:{server_port}").parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}

fn build_cors_layer_from_env() -> Option<CorsLayer> {
    let allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())?;

    let mut cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    if allowed_origins == "*" {
        cors = cors.allow_origin(Any);
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .filter_map(|s| HeaderValue::from_str(s).ok())
            .collect();

        if origins.is_empty() {
            return None;
        }

        cors = cors.allow_origin(origins);
    }

    Some(cors)
}
