use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use utoipa::ToSchema;

use crate::db::schema::messages;

/// A posted chat message. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Insertable, Serialize, ToSchema)]
#[diesel(table_name = messages)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Message {
    /// Snowflake ID, serialized as a string so JavaScript clients keep full precision.
    #[serde(serialize_with = "serialize_i64_as_string")]
    #[schema(value_type = String)]
    pub id: i64,
    /// Name the message was posted under.
    #[serde(rename = "user")]
    pub author: String,
    pub text: String,
    pub posted_at: DateTime<Utc>,
}

impl Message {
    /// Ordering key for "most recent first" listings; the ID breaks timestamp ties.
    pub fn recency(&self) -> (DateTime<Utc>, i64) {
        (self.posted_at, self.id)
    }
}

fn serialize_i64_as_string<S: serde::Serializer>(val: &i64, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&val.to_string())
}
