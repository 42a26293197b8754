//! Identity store: the name → session binding table.
//!
//! Name uniqueness is enforced by the store itself (primary key on `name` in
//! Postgres, the map's entry API in memory), so two racing logins for the same
//! free name cannot both succeed.

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use diesel::prelude::*;
use diesel::result::OptionalExtension;

use crate::db::pool::DbPool;
use crate::db::schema::identities;
use crate::error::ApiError;
use crate::models::Identity;

#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Insert a new identity. Returns `false` when the name is already taken.
    async fn insert(&self, identity: &Identity) -> Result<bool, ApiError>;
    async fn find_by_name(&self, name: &str) -> Result<Option<Identity>, ApiError>;
    async fn find_by_session(&self, session_id: &str) -> Result<Option<Identity>, ApiError>;
    /// Whether `name` is currently bound to exactly `session_id`.
    async fn is_bound(&self, name: &str, session_id: &str) -> Result<bool, ApiError>;
    async fn list(&self) -> Result<Vec<Identity>, ApiError>;
    /// Remove whatever identity is bound to `session_id`, returning it.
    async fn delete_by_session(&self, session_id: &str) -> Result<Option<Identity>, ApiError>;
    /// Remove every identity bound to `session_id` except `keep`.
    async fn release_others(&self, session_id: &str, keep: &str) -> Result<Vec<Identity>, ApiError>;
    /// Drop every identity. Run once at startup.
    async fn clear(&self) -> Result<(), ApiError>;
}

// ---------------------------------------------------------------------------
// In-memory implementation (tests / no DATABASE_URL)
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryIdentityStore {
    by_name: DashMap<String, Identity>,
}

impl MemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove the identities bound to `session_id` whose name passes `pick`.
    fn remove_where(&self, session_id: &str, pick: impl Fn(&str) -> bool) -> Vec<Identity> {
        // Resolve the keys first: removing while iterating would deadlock the shard.
        let names: Vec<String> = self
            .by_name
            .iter()
            .filter(|entry| entry.session_id == session_id && pick(entry.key()))
            .map(|entry| entry.key().clone())
            .collect();

        names
            .iter()
            .filter_map(|name| {
                self.by_name
                    .remove_if(name, |_, identity| identity.session_id == session_id)
                    .map(|(_, identity)| identity)
            })
            .collect()
    }
}

#[async_trait]
impl IdentityStore for MemoryIdentityStore {
    async fn insert(&self, identity: &Identity) -> Result<bool, ApiError> {
        match self.by_name.entry(identity.name.clone()) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(identity.clone());
                Ok(true)
            }
        }
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Identity>, ApiError> {
        Ok(self.by_name.get(name).map(|entry| entry.value().clone()))
    }

    async fn find_by_session(&self, session_id: &str) -> Result<Option<Identity>, ApiError> {
        Ok(self
            .by_name
            .iter()
            .find(|entry| entry.session_id == session_id)
            .map(|entry| entry.value().clone()))
    }

    async fn is_bound(&self, name: &str, session_id: &str) -> Result<bool, ApiError> {
        Ok(self
            .by_name
            .get(name)
            .is_some_and(|entry| entry.session_id == session_id))
    }

    async fn list(&self) -> Result<Vec<Identity>, ApiError> {
        let mut all: Vec<Identity> = self.by_name.iter().map(|e| e.value().clone()).collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(all)
    }

    async fn delete_by_session(&self, session_id: &str) -> Result<Option<Identity>, ApiError> {
        Ok(self.remove_where(session_id, |_| true).into_iter().next())
    }

    async fn release_others(&self, session_id: &str, keep: &str) -> Result<Vec<Identity>, ApiError> {
        Ok(self.remove_where(session_id, |name| name != keep))
    }

    async fn clear(&self) -> Result<(), ApiError> {
        self.by_name.clear();
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// PostgreSQL implementation
// ---------------------------------------------------------------------------

pub struct PgIdentityStore {
    pool: DbPool,
}

impl PgIdentityStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityStore for PgIdentityStore {
    async fn insert(&self, identity: &Identity) -> Result<bool, ApiError> {
        let mut conn = self.pool.get().await?;

        let inserted = diesel_async::RunQueryDsl::execute(
            diesel::insert_into(identities::table)
                .values(identity)
                .on_conflict_do_nothing(),
            &mut conn,
        )
        .await?;

        Ok(inserted == 1)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Identity>, ApiError> {
        let mut conn = self.pool.get().await?;

        let identity = diesel_async::RunQueryDsl::get_result(
            identities::table
                .find(name)
                .select(Identity::as_select()),
            &mut conn,
        )
        .await
        .optional()?;

        Ok(identity)
    }

    async fn find_by_session(&self, session_id: &str) -> Result<Option<Identity>, ApiError> {
        let mut conn = self.pool.get().await?;

        let identity = diesel_async::RunQueryDsl::first(
            identities::table
                .filter(identities::session_id.eq(session_id))
                .order(identities::created_at.asc())
                .select(Identity::as_select()),
            &mut conn,
        )
        .await
        .optional()?;

        Ok(identity)
    }

    async fn is_bound(&self, name: &str, session_id: &str) -> Result<bool, ApiError> {
        let mut conn = self.pool.get().await?;

        let bound = diesel_async::RunQueryDsl::get_result(
            diesel::select(diesel::dsl::exists(
                identities::table
                    .filter(identities::name.eq(name))
                    .filter(identities::session_id.eq(session_id)),
            )),
            &mut conn,
        )
        .await?;

        Ok(bound)
    }

    async fn list(&self) -> Result<Vec<Identity>, ApiError> {
        let mut conn = self.pool.get().await?;

        let all = diesel_async::RunQueryDsl::load(
            identities::table
                .order(identities::created_at.asc())
                .select(Identity::as_select()),
            &mut conn,
        )
        .await?;

        Ok(all)
    }

    async fn delete_by_session(&self, session_id: &str) -> Result<Option<Identity>, ApiError> {
        let mut conn = self.pool.get().await?;

        let removed: Vec<Identity> = diesel_async::RunQueryDsl::get_results(
            diesel::delete(identities::table.filter(identities::session_id.eq(session_id)))
                .returning(Identity::as_returning()),
            &mut conn,
        )
        .await?;

        Ok(removed.into_iter().next())
    }

    async fn release_others(&self, session_id: &str, keep: &str) -> Result<Vec<Identity>, ApiError> {
        let mut conn = self.pool.get().await?;

        let released = diesel_async::RunQueryDsl::get_results(
            diesel::delete(
                identities::table
                    .filter(identities::session_id.eq(session_id))
                    .filter(identities::name.ne(keep)),
            )
            .returning(Identity::as_returning()),
            &mut conn,
        )
        .await?;

        Ok(released)
    }

    async fn clear(&self) -> Result<(), ApiError> {
        let mut conn = self.pool.get().await?;
        let removed = diesel_async::RunQueryDsl::execute(diesel::delete(identities::table), &mut conn).await?;
        tracing::info!(removed, "identity store cleared");
        Ok(())
    }
}
