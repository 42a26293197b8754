//! Chat API: polling snapshot and message posting.

use axum::extract::State;
use axum::http::header::LOCATION;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::auth::session::SessionContext;
use crate::chat::{self, PostOutcome, Snapshot};
use crate::error::{ApiError, ApiErrorBody, FieldError};
use crate::AppState;

/// Body returned when a message was stored.
pub const SEND_SUCCESS: &str = "success";
/// Body returned when the caller does not own the claimed name.
pub const SEND_FAILURE: &str = "failure";
/// Longest accepted message, in characters.
pub const MAX_TEXT_CHARS: usize = 4000;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/chat/update", get(update))
        .route(
            "/api/chat/send-message",
            get(send_message_wrong_method).post(send_message),
        )
}

// ---------------------------------------------------------------------------
// GET /api/chat/update
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/api/chat/update",
    tag = "Chat",
    responses(
        (status = 200, description = "Participants and the five newest messages", body = Snapshot),
        (status = 401, description = "Not logged in", body = ApiErrorBody),
    ),
)]
pub async fn update(State(state): State<AppState>) -> Result<Json<Snapshot>, ApiError> {
    let snapshot = chat::snapshot(state.identities.as_ref(), state.messages.as_ref()).await?;
    Ok(Json(snapshot))
}

// ---------------------------------------------------------------------------
// POST /api/chat/send-message
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, ToSchema)]
pub struct SendMessageRequest {
    /// Name to post under; must be the caller's own.
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub text: String,
}

#[utoipa::path(
    post,
    path = "/api/chat/send-message",
    tag = "Chat",
    request_body = SendMessageRequest,
    responses(
        (status = 200, description = "Message stored; body is `success`", body = String),
        (status = 303, description = "Caller does not own `user`; body is `failure`", body = String),
        (status = 400, description = "Missing user or text", body = ApiErrorBody),
        (status = 401, description = "Not logged in", body = ApiErrorBody),
    ),
)]
pub async fn send_message(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Json(body): Json<SendMessageRequest>,
) -> Result<Response, ApiError> {
    let user = body.user.trim();
    let text = body.text.trim();

    let mut errors = Vec::new();
    if user.is_empty() {
        errors.push(FieldError::new("user", "User name is required"));
    }
    if text.is_empty() {
        errors.push(FieldError::new("text", "Message text is required"));
    } else if text.chars().count() > MAX_TEXT_CHARS {
        errors.push(FieldError::new(
            "text",
            format!("Message text must be {MAX_TEXT_CHARS} characters or fewer"),
        ));
    }
    if !errors.is_empty() {
        return Err(ApiError::validation(errors));
    }

    let outcome = chat::post(
        state.identities.as_ref(),
        state.messages.as_ref(),
        &state.snowflake,
        user,
        text,
        &session.session_id,
    )
    .await?;

    match outcome {
        PostOutcome::Accepted(message) => {
            tracing::debug!(id = message.id, user, "message posted");
            Ok(SEND_SUCCESS.into_response())
        }
        PostOutcome::RejectedNotLoggedIn => {
            tracing::info!(user, session_id = %session.session_id, "post rejected: name not owned");
            Ok((StatusCode::SEE_OTHER, [(LOCATION, "/")], SEND_FAILURE).into_response())
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/chat/send-message",
    tag = "Chat",
    responses((status = 400, description = "Wrong method", body = ApiErrorBody)),
)]
pub async fn send_message_wrong_method() -> ApiError {
    ApiError::bad_request("This function requires a post request.")
}
