use axum::{
    Json,
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse},
};

use board_types::api::{IdQuery, RecommendRequest, RecommendResponse};

use crate::error::ApiError;
use crate::render;
use crate::state::AppState;

/// POST /submitRecommend — the message id comes from `?id=` or from a JSON
/// body `{"msg_id": ...}`. Re-favoriting succeeds without a second row.
pub async fn submit_recommend(
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let raw_id = match query.id {
        Some(id) => Some(id),
        None if body.is_empty() => None,
        None => {
            let req: RecommendRequest = serde_json::from_slice(&body)
                .map_err(|e| ApiError::validation(format!("Bad request: {}", e)))?;
            Some(req.msg_id.into_raw())
        }
    };

    state.board.add_favorite(raw_id.as_deref()).await?;

    Ok(Json(RecommendResponse { success: true }))
}

/// POST /deleteFavorite?id= — idempotent.
pub async fn delete_favorite(
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
) -> Result<impl IntoResponse, ApiError> {
    state.board.remove_favorite(query.id.as_deref()).await?;
    Ok(StatusCode::OK)
}

/// GET /recommend
pub async fn recommend(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let favorites = state.board.list_favorites().await?;
    Ok(Html(render::recommend_page(&favorites)?))
}
