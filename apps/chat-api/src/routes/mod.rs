pub mod chat;
pub mod health;
pub mod pages;
pub mod search;

use axum::{middleware, Router};
use utoipa::OpenApi;

use crate::auth::middleware::require_login;
use crate::AppState;

/// All routes, with the request gate in front of `/chat`, `/search`,
/// `/api/chat/**` and `/api/search/**`.
pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .merge(pages::protected_router())
        .merge(chat::router())
        .merge(search::router())
        .route_layer(middleware::from_fn_with_state(state.clone(), require_login));

    Router::new()
        .merge(health::router())
        .merge(pages::router())
        .merge(protected)
        .with_state(state)
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        chat::update,
        chat::send_message,
        chat::send_message_wrong_method,
        search::search_by_username,
        search::search_by_text,
    ),
    components(
        schemas(
            crate::error::ApiErrorBody,
            crate::error::ApiErrorDetail,
            crate::error::FieldError,
            crate::models::Identity,
            crate::models::Message,
            crate::chat::Snapshot,
            health::HealthResponse,
            chat::SendMessageRequest,
        )
    ),
    tags(
        (name = "Health", description = "Health check"),
        (name = "Chat", description = "Polling and posting (session cookie required)"),
        (name = "Search", description = "Message search (session cookie required)"),
    )
)]
pub struct ApiDoc;
