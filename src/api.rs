use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tracing::error;

use crate::catalog::ChannelCatalog;
use crate::feeds::{MatchFeeds, MultiSourceFeeds};
use crate::orchestrator::MatchView;

#[derive(Clone)]
pub struct AppState {
    pub view: Arc<RwLock<MatchView>>,
    pub feeds: Arc<MultiSourceFeeds>,
    pub catalog: Arc<ChannelCatalog>,
}

/// Uniform JSON envelope for every endpoint.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

fn success<T: Serialize>(data: T) -> (StatusCode, Json<Envelope<T>>) {
    (
        StatusCode::OK,
        Json(Envelope {
            success: true,
            data: Some(data),
            error: None,
            timestamp: Utc::now(),
        }),
    )
}

fn failure<T: Serialize>(message: &str) -> (StatusCode, Json<Envelope<T>>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(Envelope {
            success: false,
            data: None,
            error: Some(message.to_string()),
            timestamp: Utc::now(),
        }),
    )
}

/// Build the read-only API router. Disallowed verbs get axum's built-in 405.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/match", get(match_handler))
        .route("/api/match/commentary", get(commentary_handler))
        .route("/api/match/stats", get(stats_handler))
        .route("/api/channels", get(channels_handler))
        .route("/api/channels/categories", get(categories_handler))
        .route("/api/channels/search", get(search_handler))
        .route("/api/channels/:id", get(channel_handler))
        .route("/api/matches/current", get(current_matches_handler))
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

/// GET /api/match — the whole aggregate view.
async fn match_handler(State(state): State<Arc<AppState>>) -> impl axum::response::IntoResponse {
    let view = state.view.read().await.clone();
    success(view)
}

/// GET /api/match/commentary — fetched through the feed on demand.
async fn commentary_handler(
    State(state): State<Arc<AppState>>,
) -> impl axum::response::IntoResponse {
    match state.feeds.commentary().await {
        Ok(entries) => success(entries),
        Err(e) => {
            error!("API error: {}", e);
            failure("Failed to fetch commentary")
        }
    }
}

/// GET /api/match/stats
async fn stats_handler(State(state): State<Arc<AppState>>) -> impl axum::response::IntoResponse {
    match state.feeds.match_stats().await {
        Ok(stats) => success(stats),
        Err(e) => {
            error!("API error: {}", e);
            failure("Failed to fetch match stats")
        }
    }
}

/// GET /api/channels
async fn channels_handler(State(state): State<Arc<AppState>>) -> impl axum::response::IntoResponse {
    success(state.catalog.live_channels())
}

/// GET /api/channels/categories
async fn categories_handler(
    State(state): State<Arc<AppState>>,
) -> impl axum::response::IntoResponse {
    success(state.catalog.categories())
}

/// GET /api/channels/:id
async fn channel_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl axum::response::IntoResponse {
    match state.catalog.channel_by_id(&id) {
        Some(channel) => success(channel),
        None => (
            StatusCode::NOT_FOUND,
            Json(Envelope {
                success: false,
                data: None,
                error: Some(format!("Channel not found: {id}")),
                timestamp: Utc::now(),
            }),
        ),
    }
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    #[serde(default)]
    q: String,
}

/// GET /api/channels/search?q=
async fn search_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> impl axum::response::IntoResponse {
    success(state.catalog.search(&params.q))
}

/// GET /api/matches/current
async fn current_matches_handler(
    State(state): State<Arc<AppState>>,
) -> impl axum::response::IntoResponse {
    success(state.feeds.current_matches().await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_envelope_shape() {
        let (status, Json(env)) = success(vec![1, 2, 3]);
        assert_eq!(status, StatusCode::OK);
        let json = serde_json::to_value(&env).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"], serde_json::json!([1, 2, 3]));
        assert!(json.get("error").is_none());
        assert!(json["timestamp"].is_string());
    }

    #[test]
    fn test_failure_envelope_shape() {
        let (status, Json(env)) = failure::<()>("boom");
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let json = serde_json::to_value(&env).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "boom");
        assert!(json.get("data").is_none());
    }
}
