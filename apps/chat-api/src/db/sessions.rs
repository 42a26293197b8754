//! PostgreSQL-backed `tower-sessions` store.
//!
//! Transport sessions saved here survive a server restart while the identity
//! table does not; the login watermark in [`crate::auth::validity`] is what
//! keeps such sessions from counting as authenticated.

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::result::OptionalExtension;
use tower_sessions::session::{Id, Record};
use tower_sessions::session_store::{self, SessionStore};

use crate::db::pool::DbPool;
use crate::db::schema::http_sessions;

#[derive(Clone)]
pub struct PgSessionStore {
    pool: DbPool,
}

impl PgSessionStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Delete every session whose expiry has passed. Returns how many were removed.
    pub async fn delete_expired(&self) -> session_store::Result<usize> {
        let mut conn = self.pool.get().await.map_err(backend)?;
        diesel_async::RunQueryDsl::execute(
            diesel::delete(http_sessions::table.filter(http_sessions::expires_at.le(Utc::now()))),
            &mut conn,
        )
        .await
        .map_err(backend)
    }
}

impl fmt::Debug for PgSessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PgSessionStore").finish_non_exhaustive()
    }
}

#[derive(Insertable, AsChangeset)]
#[diesel(table_name = http_sessions)]
struct SessionRow {
    id: String,
    data: serde_json::Value,
    expires_at: DateTime<Utc>,
}

impl SessionRow {
    fn from_record(record: &Record) -> session_store::Result<Self> {
        let data = serde_json::to_value(record)
            .map_err(|err| session_store::Error::Encode(err.to_string()))?;
        let expires_at = DateTime::from_timestamp(record.expiry_date.unix_timestamp(), 0)
            .ok_or_else(|| session_store::Error::Encode("expiry out of range".to_string()))?;
        Ok(Self {
            id: record.id.to_string(),
            data,
            expires_at,
        })
    }
}

fn backend(err: impl fmt::Display) -> session_store::Error {
    session_store::Error::Backend(err.to_string())
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        let mut conn = self.pool.get().await.map_err(backend)?;

        // Retry on the (unlikely) event of an ID collision.
        loop {
            let row = SessionRow::from_record(record)?;
            let inserted = diesel_async::RunQueryDsl::execute(
                diesel::insert_into(http_sessions::table)
                    .values(&row)
                    .on_conflict_do_nothing(),
                &mut conn,
            )
            .await
            .map_err(backend)?;

            if inserted == 1 {
                return Ok(());
            }
            record.id = Id::default();
        }
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        let row = SessionRow::from_record(record)?;
        let mut conn = self.pool.get().await.map_err(backend)?;

        diesel_async::RunQueryDsl::execute(
            diesel::insert_into(http_sessions::table)
                .values(&row)
                .on_conflict(http_sessions::id)
                .do_update()
                .set(&row),
            &mut conn,
        )
        .await
        .map_err(backend)?;

        Ok(())
    }

    async fn load(&self, session_id: &Id) -> session_store::Result<Option<Record>> {
        let mut conn = self.pool.get().await.map_err(backend)?;

        let data: Option<serde_json::Value> = diesel_async::RunQueryDsl::get_result(
            http_sessions::table
                .filter(http_sessions::id.eq(session_id.to_string()))
                .filter(http_sessions::expires_at.gt(Utc::now()))
                .select(http_sessions::data),
            &mut conn,
        )
        .await
        .optional()
        .map_err(backend)?;

        data.map(|value| {
            serde_json::from_value(value).map_err(|err| session_store::Error::Decode(err.to_string()))
        })
        .transpose()
    }

    async fn delete(&self, session_id: &Id) -> session_store::Result<()> {
        let mut conn = self.pool.get().await.map_err(backend)?;

        diesel_async::RunQueryDsl::execute(
            diesel::delete(http_sessions::table.filter(http_sessions::id.eq(session_id.to_string()))),
            &mut conn,
        )
        .await
        .map_err(backend)?;

        Ok(())
    }
}
