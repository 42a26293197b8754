use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use utoipa::ToSchema;

use crate::db::schema::identities;

/// A participant's claim on a name, bound to the transport session that made it.
///
/// Only the name is ever serialized; the session identifier stays server-side.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Insertable, Serialize, ToSchema)]
#[diesel(table_name = identities)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Identity {
    pub name: String,
    #[serde(skip)]
    pub session_id: String,
    #[serde(skip)]
    pub created_at: DateTime<Utc>,
}

impl Identity {
    pub fn new(name: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            session_id: session_id.into(),
            created_at: Utc::now(),
        }
    }
}
