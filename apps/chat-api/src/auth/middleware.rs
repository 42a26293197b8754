//! Request gate for the protected routes.

use axum::extract::{Request, State};
use axum::http::header::LOCATION;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};

use crate::auth::session::CurrentSession;
use crate::error::ApiError;
use crate::AppState;

/// Let the request through only if the caller's login is valid for this
/// process incarnation.
///
/// On success the caller's [`SessionContext`](crate::auth::session::SessionContext)
/// is inserted into the request extensions for the handler. On failure the
/// handler is never invoked: page routes get a `303` to `/`, API routes a
/// `401` carrying `Location: /`.
pub async fn require_login(
    State(state): State<AppState>,
    current: CurrentSession,
    mut request: Request,
    next: Next,
) -> Response {
    if !state.validity.is_valid(current.context.login_time) {
        let path = request.uri().path();
        tracing::debug!(path, session_id = %current.context.session_id, "request gated: not logged in");
        return login_redirect(path);
    }

    request.extensions_mut().insert(current.context);
    next.run(request).await
}

fn login_redirect(path: &str) -> Response {
    if path.starts_with("/api/") {
        let mut response = ApiError::unauthorized("Please log in.").into_response();
        response
            .headers_mut()
            .insert(LOCATION, axum::http::HeaderValue::from_static("/"));
        response
    } else {
        Redirect::to("/").into_response()
    }
}
