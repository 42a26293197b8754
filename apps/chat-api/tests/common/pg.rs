//! PostgreSQL fixtures for the store tests.
//!
//! Tests run against the `<db>_test` database derived from `DATABASE_URL`
//! and are skipped when no database is configured.

use std::path::Path;
use std::sync::Once;

use diesel::pg::PgConnection;
use diesel::Connection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

use chat_api::config::Config;
use chat_api::db::pool::{self, DbPool};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("./migrations");

static MIGRATE: Once = Once::new();

/// Pool on the test database with the schema applied, or `None` when
/// `DATABASE_URL` is unset.
pub async fn test_pool() -> Option<DbPool> {
    let _ = dotenvy::from_path(Path::new(env!("CARGO_MANIFEST_DIR")).join(".env"));

    let Some(database_url) = Config::from_env().database_url else {
        eprintln!("DATABASE_URL not set; skipping PostgreSQL test");
        return None;
    };
    let database_url = pool::with_test_db_suffix(&database_url);

    let url = database_url.clone();
    tokio::task::spawn_blocking(move || {
        MIGRATE.call_once(|| {
            let mut conn = PgConnection::establish(&url).expect("connect to test database");
            conn.run_pending_migrations(MIGRATIONS).expect("run migrations");
        });
    })
    .await
    .expect("migration task");

    Some(pool::connect(&database_url).await)
}

/// Clean up identities bound to any of `session_ids`.
pub async fn delete_identities(db: &DbPool, session_ids: &[String]) {
    use chat_api::db::schema::identities;
    use diesel::prelude::*;
    use diesel_async::RunQueryDsl;

    let mut conn = db.get().await.expect("pool");
    diesel::delete(identities::table.filter(identities::session_id.eq_any(session_ids.to_vec())))
        .execute(&mut conn)
        .await
        .ok();
}

/// Clean up messages posted under `author`.
pub async fn delete_messages_by(db: &DbPool, author: &str) {
    use chat_api::db::schema::messages;
    use diesel::prelude::*;
    use diesel_async::RunQueryDsl;

    let mut conn = db.get().await.expect("pool");
    diesel::delete(messages::table.filter(messages::author.eq(author)))
        .execute(&mut conn)
        .await
        .ok();
}
