use std::path::Path;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{favorites, messages, notifications};

pub fn app(state: AppState, static_dir: &Path) -> Router {
    Router::new()
        .route("/", get(messages::home))
        .route("/submit", post(messages::submit))
        .route("/delete", post(messages::delete))
        .route("/submitRecommend", post(favorites::submit_recommend))
        .route("/deleteFavorite", post(favorites::delete_favorite))
        .route("/recommend", get(favorites::recommend))
        .route("/notifications", get(notifications::notifications))
        .route("/health", get(health))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
