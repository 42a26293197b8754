//! HTML pages: login, chat, search, logout.

use axum::extract::State;
use axum::http::header::LOCATION;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::{Form, Router};
use chrono::Utc;
use serde::Deserialize;

use crate::auth::binding;
use crate::auth::session::CurrentSession;
use crate::error::ApiError;
use crate::views::LoginPage;
use crate::AppState;

/// Longest accepted participant name, in characters.
pub const MAX_NAME_CHARS: usize = 32;

/// Notice shown after logging out.
pub const LOGGED_OUT_NOTICE: &str = "Please log in.";

/// Pages reachable without a valid login.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/login", get(login_redirect).post(login))
        .route("/chat/logout", get(logout))
        .route("/error", get(error_page))
}

/// Pages behind the request gate.
pub fn protected_router() -> Router<AppState> {
    Router::new()
        .route("/chat", get(chat))
        .route("/search", get(search))
}

// ---------------------------------------------------------------------------
// GET /
// ---------------------------------------------------------------------------

async fn home(State(state): State<AppState>, current: CurrentSession) -> Result<Response, ApiError> {
    if state.validity.is_valid(current.context.login_time) {
        return Ok(Redirect::to("/chat").into_response());
    }
    let page = LoginPage {
        notice: current.take_notice().await?,
        ..LoginPage::default()
    };
    Ok(state.views.login(&page)?.into_response())
}

// ---------------------------------------------------------------------------
// POST /login
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub name: String,
}

async fn login(
    State(state): State<AppState>,
    mut current: CurrentSession,
    Form(form): Form<LoginForm>,
) -> Result<Response, ApiError> {
    let name = form.name.trim();

    if let Some(problem) = validate_name(name) {
        let page = state.views.login(&LoginPage::invalid(name, problem))?;
        return Ok((StatusCode::BAD_REQUEST, page).into_response());
    }

    let outcome = binding::login(state.identities.as_ref(), name, current.session_id()).await?;
    tracing::info!(name, ?outcome, "login attempt");

    if !outcome.is_accepted() {
        let page = LoginPage::invalid(name, "That name is already taken.");
        return Ok(state.views.login(&page)?.into_response());
    }

    current.stamp_login(Utc::now()).await?;
    Ok(Redirect::to("/chat").into_response())
}

fn validate_name(name: &str) -> Option<String> {
    if name.is_empty() {
        Some("Name is required.".to_string())
    } else if name.chars().count() > MAX_NAME_CHARS {
        Some(format!("Name must be {MAX_NAME_CHARS} characters or fewer."))
    } else {
        None
    }
}

async fn login_redirect() -> Redirect {
    Redirect::to("/")
}

// ---------------------------------------------------------------------------
// GET /chat
// ---------------------------------------------------------------------------

async fn chat(State(state): State<AppState>, mut current: CurrentSession) -> Result<Response, ApiError> {
    let identity = state
        .identities
        .find_by_session(current.session_id())
        .await?;

    // A valid login with no bound name means the binding vanished underneath
    // us; start over rather than bounce between `/` and `/chat`.
    let Some(identity) = identity else {
        current.reset().await?;
        return Ok(Redirect::to("/").into_response());
    };

    Ok(state
        .views
        .chat(&identity.name, state.config.poll_interval_secs)?
        .into_response())
}

// ---------------------------------------------------------------------------
// GET /search, GET /error
// ---------------------------------------------------------------------------

async fn search(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    state.views.search()
}

async fn error_page(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    state.views.error()
}

// ---------------------------------------------------------------------------
// GET /chat/logout
// ---------------------------------------------------------------------------

async fn logout(State(state): State<AppState>, mut current: CurrentSession) -> Result<Response, ApiError> {
    if let Some(identity) = binding::logout(state.identities.as_ref(), current.session_id()).await? {
        tracing::info!(name = %identity.name, "logged out");
    }
    current.reset().await?;
    current.set_notice(LOGGED_OUT_NOTICE).await?;

    Ok((StatusCode::SEE_OTHER, [(LOCATION, "/")], LOGGED_OUT_NOTICE).into_response())
}
