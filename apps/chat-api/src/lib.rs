pub mod auth;
pub mod chat;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod views;

use std::sync::Arc;

use axum::Router;
use chatroom_common::SnowflakeGenerator;
use tower_http::trace::TraceLayer;
use tower_sessions::cookie::SameSite;
use tower_sessions::{SessionManagerLayer, SessionStore};

use auth::validity::SessionValidity;
use config::Config;
use db::identities::IdentityStore;
use db::messages::MessageStore;
use views::Views;

/// Shared application state available to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub identities: Arc<dyn IdentityStore>,
    pub messages: Arc<dyn MessageStore>,
    pub validity: SessionValidity,
    pub snowflake: Arc<SnowflakeGenerator>,
    pub views: Arc<Views>,
    pub config: Arc<Config>,
}

/// The complete service: routes, request gate, cookie sessions and tracing.
pub fn app<Store>(state: AppState, sessions: Store) -> Router
where
    Store: SessionStore + Clone,
{
    let session_layer = SessionManagerLayer::new(sessions)
        .with_name(state.config.session_cookie_name.clone())
        .with_secure(state.config.session_cookie_secure)
        .with_same_site(SameSite::Lax);

    routes::router(state)
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
}
