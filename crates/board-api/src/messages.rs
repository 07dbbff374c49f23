use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect},
};
use tracing::info;

use board_types::api::{IdQuery, SubmitForm};

use crate::error::ApiError;
use crate::render;
use crate::state::AppState;

/// GET / — every message, newest first, followed by the favorites.
pub async fn home(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let messages = state.board.list_messages().await?;
    let favorites = state.board.list_favorites().await?;

    Ok(Html(render::index_page(&messages, &favorites)?))
}

/// POST /submit — form field `content`. Redirects back to the board.
pub async fn submit(
    State(state): State<AppState>,
    Form(form): Form<SubmitForm>,
) -> Result<impl IntoResponse, ApiError> {
    state.board.create_message(&form.content).await?;
    Ok(Redirect::to("/"))
}

/// POST /delete?id= — removes the message and any favorite pointing at it.
pub async fn delete(
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
) -> Result<impl IntoResponse, ApiError> {
    info!("Received request to delete message {:?}", query.id);
    state.board.delete_message(query.id.as_deref()).await?;
    Ok(StatusCode::OK)
}
