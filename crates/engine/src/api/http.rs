//! HTTP routes for the dashboard.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use std::sync::Arc;

use gumshoe_domain::GuildId;
use gumshoe_protocol::DashboardState;

use crate::app::App;

/// Create all HTTP routes.
pub fn routes() -> Router<Arc<App>> {
    Router::new()
        .route("/", get(health))
        .route("/api/health", get(health))
        .route("/api/cases", get(list_cases))
        .route("/api/guilds", get(list_guilds))
        .route("/api/guilds/{id}/state", get(guild_state))
}

async fn health() -> &'static str {
    "OK"
}

async fn list_cases(State(app): State<Arc<App>>) -> Result<Json<Vec<String>>, ApiError> {
    let ids = app
        .cases
        .list()
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(Json(ids.into_iter().map(|id| id.into_string()).collect()))
}

async fn list_guilds(State(app): State<Arc<App>>) -> Json<Vec<String>> {
    Json(
        app.registry
            .guild_ids()
            .into_iter()
            .map(|id| id.into_string())
            .collect(),
    )
}

async fn guild_state(
    State(app): State<Arc<App>>,
    Path(id): Path<String>,
) -> Result<Json<DashboardState>, ApiError> {
    let shared = app
        .registry
        .get(&GuildId::new(id))
        .ok_or(ApiError::NotFound)?;
    let state = {
        let game = shared.lock().await;
        game.dashboard_state(app.clock.now())
    };
    Ok(Json(state))
}

/// Errors surfaced by the HTTP layer.
#[derive(Debug)]
enum ApiError {
    NotFound,
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::NotFound => (StatusCode::NOT_FOUND, "not found".to_string()),
            Self::Internal(message) => {
                tracing::error!(error = %message, "Internal API error");
                (StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}
