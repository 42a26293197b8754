//! Standalone migration runner for chat-api.
//!
//! Creates the `identities`, `messages` and `http_sessions` tables.
//!
//! Usage:
//!   cargo run -p chat-api --bin chat-migrate
//!   cargo run -p chat-api --bin chat-migrate -- --test
//!
//! Reads DATABASE_URL from the environment (or .env via dotenvy).

use std::error::Error;
use std::path::Path;

use diesel::pg::PgConnection;
use diesel::Connection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

use chat_api::db::pool::with_test_db_suffix;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("./migrations");

fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    if dotenvy::dotenv().is_err() {
        let _ = dotenvy::from_path(Path::new(env!("CARGO_MANIFEST_DIR")).join(".env"));
    }

    let base_url = std::env::var("DATABASE_URL").map_err(|_| "DATABASE_URL env var is required")?;
    let database_url = if std::env::args().any(|arg| arg == "--test") {
        with_test_db_suffix(&base_url)
    } else {
        base_url
    };

    println!("Connecting to database...");
    let mut conn = PgConnection::establish(&database_url)?;

    let applied = conn.run_pending_migrations(MIGRATIONS)?;
    if applied.is_empty() {
        println!("Schema is up to date.");
    }
    for migration in &applied {
        println!("  Applied: {migration}");
    }
    Ok(())
}
