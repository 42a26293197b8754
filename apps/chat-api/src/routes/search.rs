//! Message search by author or by text.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};

use crate::chat;
use crate::error::{ApiError, ApiErrorBody, FieldError};
use crate::models::Message;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/search/username/{name}", get(search_by_username))
        .route("/api/search/message/{text}", get(search_by_text))
}

fn required(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::validation(vec![FieldError::new(
            field,
            "Search term is required",
        )]));
    }
    Ok(())
}

#[utoipa::path(
    get,
    path = "/api/search/username/{name}",
    tag = "Search",
    params(("name" = String, Path, description = "Exact, case-sensitive author name")),
    responses(
        (status = 200, description = "Messages by that author, newest first", body = [Message]),
        (status = 401, description = "Not logged in", body = ApiErrorBody),
    ),
)]
pub async fn search_by_username(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Vec<Message>>, ApiError> {
    required("name", &name)?;
    Ok(Json(chat::search_by_author(state.messages.as_ref(), &name).await?))
}

#[utoipa::path(
    get,
    path = "/api/search/message/{text}",
    tag = "Search",
    params(("text" = String, Path, description = "Case-insensitive substring of the message text")),
    responses(
        (status = 200, description = "Matching messages, newest first", body = [Message]),
        (status = 401, description = "Not logged in", body = ApiErrorBody),
    ),
)]
pub async fn search_by_text(
    State(state): State<AppState>,
    Path(text): Path<String>,
) -> Result<Json<Vec<Message>>, ApiError> {
    required("text", &text)?;
    Ok(Json(chat::search_by_text(state.messages.as_ref(), &text).await?))
}
