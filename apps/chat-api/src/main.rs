use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tower_sessions::{MemoryStore, SessionStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chat_api::auth::validity::SessionValidity;
use chat_api::config::Config;
use chat_api::db::identities::{IdentityStore, MemoryIdentityStore, PgIdentityStore};
use chat_api::db::messages::{MemoryMessageStore, MessageStore, PgMessageStore};
use chat_api::db::sessions::PgSessionStore;
use chat_api::views::Views;
use chat_api::AppState;
use chatroom_common::SnowflakeGenerator;

const EXPIRED_SESSION_SWEEP: Duration = Duration::from_secs(60 * 60);

#[tokio::main]
async fn main() {
    // Load .env file (silently skip if missing; env vars may be set externally)
    if dotenvy::dotenv().is_err() {
        let env_path = Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
        let _ = dotenvy::from_path(env_path);
    }

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    match config.database_url.clone() {
        Some(database_url) => {
            let db = chat_api::db::pool::connect(&database_url).await;
            let sessions = PgSessionStore::new(db.clone());
            spawn_session_sweeper(sessions.clone());

            tracing::info!("using PostgreSQL stores");
            serve(
                config,
                Arc::new(PgIdentityStore::new(db.clone())),
                Arc::new(PgMessageStore::new(db)),
                sessions,
            )
            .await;
        }
        None => {
            tracing::warn!("DATABASE_URL not set; state is kept in memory");
            serve(
                config,
                Arc::new(MemoryIdentityStore::new()),
                Arc::new(MemoryMessageStore::new()),
                MemoryStore::default(),
            )
            .await;
        }
    }
}

async fn serve<Store>(
    config: Config,
    identities: Arc<dyn IdentityStore>,
    messages: Arc<dyn MessageStore>,
    sessions: Store,
) where
    Store: SessionStore + Clone,
{
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind");

    // Identities never outlive the process that created them.
    identities
        .clear()
        .await
        .expect("failed to reset identity store");

    let views = Views::new().expect("failed to compile templates");

    // Any login stamped before this instant belongs to a previous incarnation.
    let validity = SessionValidity::new(Utc::now());

    let state = AppState {
        identities,
        messages,
        validity,
        snowflake: Arc::new(SnowflakeGenerator::new(0)),
        views: Arc::new(views),
        config: Arc::new(config),
    };

    let app = chat_api::app(state, sessions);

    tracing::info!(%addr, started_at = %validity.started_at(), "chat-api listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");
}

fn spawn_session_sweeper(sessions: PgSessionStore) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(EXPIRED_SESSION_SWEEP);
        loop {
            interval.tick().await;
            match sessions.delete_expired().await {
                Ok(removed) if removed > 0 => tracing::debug!(removed, "expired sessions deleted"),
                Ok(_) => {}
                Err(err) => tracing::warn!(%err, "expired session sweep failed"),
            }
        }
    });
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(%err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
