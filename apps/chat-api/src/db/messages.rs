//! Message store: append-only log of posted messages.

use async_trait::async_trait;
use diesel::prelude::*;
use parking_lot::RwLock;

use crate::db::pool::DbPool;
use crate::db::schema::messages;
use crate::error::ApiError;
use crate::models::Message;

/// Every listing is newest first: `posted_at` descending, then `id` descending.
#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn append(&self, message: &Message) -> Result<Message, ApiError>;
    /// Messages whose author is exactly `author`.
    async fn find_by_author(&self, author: &str) -> Result<Vec<Message>, ApiError>;
    /// Messages whose text contains `needle`, ignoring case.
    async fn find_containing(&self, needle: &str) -> Result<Vec<Message>, ApiError>;
    async fn most_recent(&self, limit: usize) -> Result<Vec<Message>, ApiError>;
}

// ---------------------------------------------------------------------------
// In-memory implementation (tests / no DATABASE_URL)
// ---------------------------------------------------------------------------

/// Keeps messages sorted oldest → newest so listings are a reverse scan.
#[derive(Default)]
pub struct MemoryMessageStore {
    log: RwLock<Vec<Message>>,
}

impl MemoryMessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn newest_first(&self, keep: impl Fn(&Message) -> bool) -> Vec<Message> {
        self.log
            .read()
            .iter()
            .rev()
            .filter(|m| keep(m))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl MessageStore for MemoryMessageStore {
    async fn append(&self, message: &Message) -> Result<Message, ApiError> {
        let mut log = self.log.write();
        let at = log.partition_point(|m| m.recency() <= message.recency());
        log.insert(at, message.clone());
        Ok(message.clone())
    }

    async fn find_by_author(&self, author: &str) -> Result<Vec<Message>, ApiError> {
        Ok(self.newest_first(|m| m.author == author))
    }

    async fn find_containing(&self, needle: &str) -> Result<Vec<Message>, ApiError> {
        let needle = needle.to_lowercase();
        Ok(self.newest_first(|m| m.text.to_lowercase().contains(&needle)))
    }

    async fn most_recent(&self, limit: usize) -> Result<Vec<Message>, ApiError> {
        Ok(self.log.read().iter().rev().take(limit).cloned().collect())
    }
}

// ---------------------------------------------------------------------------
// PostgreSQL implementation
// ---------------------------------------------------------------------------

pub struct PgMessageStore {
    pool: DbPool,
}

impl PgMessageStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageStore for PgMessageStore {
    async fn append(&self, message: &Message) -> Result<Message, ApiError> {
        let mut conn = self.pool.get().await?;

        let stored = diesel_async::RunQueryDsl::get_result(
            diesel::insert_into(messages::table)
                .values(message)
                .returning(Message::as_returning()),
            &mut conn,
        )
        .await?;

        Ok(stored)
    }

    async fn find_by_author(&self, author: &str) -> Result<Vec<Message>, ApiError> {
        let mut conn = self.pool.get().await?;

        let found = diesel_async::RunQueryDsl::load(
            messages::table
                .filter(messages::author.eq(author))
                .order((messages::posted_at.desc(), messages::id.desc()))
                .select(Message::as_select()),
            &mut conn,
        )
        .await?;

        Ok(found)
    }

    async fn find_containing(&self, needle: &str) -> Result<Vec<Message>, ApiError> {
        let mut conn = self.pool.get().await?;
        let pattern = format!("%{}%", escape_like(needle));

        let found = diesel_async::RunQueryDsl::load(
            messages::table
                .filter(messages::text.ilike(pattern))
                .order((messages::posted_at.desc(), messages::id.desc()))
                .select(Message::as_select()),
            &mut conn,
        )
        .await?;

        Ok(found)
    }

    async fn most_recent(&self, limit: usize) -> Result<Vec<Message>, ApiError> {
        let mut conn = self.pool.get().await?;

        let recent = diesel_async::RunQueryDsl::load(
            messages::table
                .order((messages::posted_at.desc(), messages::id.desc()))
                .limit(limit as i64)
                .select(Message::as_select()),
            &mut conn,
        )
        .await?;

        Ok(recent)
    }
}

/// Escape `LIKE` wildcards so the needle matches literally (Postgres' default escape is `\`).
fn escape_like(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len());
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
