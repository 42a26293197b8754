//! Chat room operations: polling snapshot, posting, search.
//!
//! Transport-agnostic; the route layer maps outcomes to HTTP responses.

use chatroom_common::snowflake::snowflake_datetime;
use chatroom_common::SnowflakeGenerator;
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::db::identities::IdentityStore;
use crate::db::messages::MessageStore;
use crate::error::ApiError;
use crate::models::{Identity, Message};

/// How many messages a snapshot carries.
pub const RECENT_MESSAGE_LIMIT: usize = 5;

/// Point-in-time view of the room handed to polling clients.
#[derive(Debug, Serialize, ToSchema)]
pub struct Snapshot {
    #[serde(rename = "users")]
    pub participants: Vec<Identity>,
    /// Newest first, at most [`RECENT_MESSAGE_LIMIT`].
    #[serde(rename = "messages")]
    pub recent_messages: Vec<Message>,
}

pub async fn snapshot(
    identities: &dyn IdentityStore,
    messages: &dyn MessageStore,
) -> Result<Snapshot, ApiError> {
    Ok(Snapshot {
        participants: identities.list().await?,
        recent_messages: messages.most_recent(RECENT_MESSAGE_LIMIT).await?,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostOutcome {
    Accepted(Message),
    /// The caller's session does not own `author`. Nothing was stored.
    RejectedNotLoggedIn,
}

/// Post `text` as `author`, provided `session_id` currently owns that name.
pub async fn post(
    identities: &dyn IdentityStore,
    messages: &dyn MessageStore,
    ids: &SnowflakeGenerator,
    author: &str,
    text: &str,
    session_id: &str,
) -> Result<PostOutcome, ApiError> {
    if !identities.is_bound(author, session_id).await? {
        return Ok(PostOutcome::RejectedNotLoggedIn);
    }

    let id = ids.generate();
    let message = Message {
        id,
        author: author.to_string(),
        text: text.to_string(),
        posted_at: snowflake_datetime(id).unwrap_or_else(Utc::now),
    };

    Ok(PostOutcome::Accepted(messages.append(&message).await?))
}

/// All messages posted under exactly `author`, newest first.
pub async fn search_by_author(
    messages: &dyn MessageStore,
    author: &str,
) -> Result<Vec<Message>, ApiError> {
    messages.find_by_author(author).await
}

/// All messages whose text contains `needle` (case-insensitive), newest first.
pub async fn search_by_text(
    messages: &dyn MessageStore,
    needle: &str,
) -> Result<Vec<Message>, ApiError> {
    messages.find_containing(needle).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::binding;
    use crate::db::identities::MemoryIdentityStore;
    use crate::db::messages::MemoryMessageStore;

    struct Room {
        identities: MemoryIdentityStore,
        messages: MemoryMessageStore,
        ids: SnowflakeGenerator,
    }

    impl Room {
        fn new() -> Self {
            Self {
                identities: MemoryIdentityStore::new(),
                messages: MemoryMessageStore::new(),
                ids: SnowflakeGenerator::new(0),
            }
        }

        async fn post(&self, author: &str, text: &str, session_id: &str) -> PostOutcome {
            post(&self.identities, &self.messages, &self.ids, author, text, session_id)
                .await
                .unwrap()
        }
    }

    #[tokio::test]
    async fn owner_can_post() {
        let room = Room::new();
        binding::login(&room.identities, "alice", "ses_a").await.unwrap();

        let PostOutcome::Accepted(message) = room.post("alice", "hi", "ses_a").await else {
            panic!("post rejected");
        };
        assert_eq!(message.author, "alice");
        assert_eq!(message.text, "hi");

        let snap = snapshot(&room.identities, &room.messages).await.unwrap();
        assert_eq!(snap.recent_messages, vec![message]);
        assert_eq!(snap.participants.len(), 1);
    }

    #[tokio::test]
    async fn posting_under_someone_elses_name_is_rejected() {
        let room = Room::new();
        binding::login(&room.identities, "alice", "ses_a").await.unwrap();

        assert_eq!(room.post("alice", "spoof", "ses_b").await, PostOutcome::RejectedNotLoggedIn);
        assert_eq!(room.post("bob", "ghost", "ses_a").await, PostOutcome::RejectedNotLoggedIn);
        assert!(room.messages.most_recent(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn snapshot_keeps_only_the_five_newest() {
        let room = Room::new();
        binding::login(&room.identities, "alice", "ses_a").await.unwrap();
        for i in 0..12 {
            room.post("alice", &format!("m{i}"), "ses_a").await;
        }

        let snap = snapshot(&room.identities, &room.messages).await.unwrap();
        assert_eq!(snap.recent_messages.len(), RECENT_MESSAGE_LIMIT);
        assert!(snap
            .recent_messages
            .windows(2)
            .all(|w| w[0].recency() > w[1].recency()));
        assert_eq!(snap.recent_messages[0].text, "m11");
    }

    #[tokio::test]
    async fn snapshot_of_quiet_room_has_fewer_messages() {
        let room = Room::new();
        binding::login(&room.identities, "alice", "ses_a").await.unwrap();
        room.post("alice", "only one", "ses_a").await;

        let snap = snapshot(&room.identities, &room.messages).await.unwrap();
        assert_eq!(snap.recent_messages.len(), 1);
    }

    #[tokio::test]
    async fn messages_outlive_their_author_identity() {
        let room = Room::new();
        binding::login(&room.identities, "alice", "ses_a").await.unwrap();
        room.post("alice", "before logout", "ses_a").await;
        binding::logout(&room.identities, "ses_a").await.unwrap();

        let found = search_by_author(&room.messages, "alice").await.unwrap();
        assert_eq!(found.len(), 1);
        let found = search_by_text(&room.messages, "LOGOUT").await.unwrap();
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn snapshot_serializes_users_and_messages_keys() {
        let snap = Snapshot {
            participants: vec![Identity::new("alice", "ses_secret")],
            recent_messages: vec![Message {
                id: 42,
                author: "alice".to_string(),
                text: "hi".to_string(),
                posted_at: Utc::now(),
            }],
        };

        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["users"][0], serde_json::json!({ "name": "alice" }));
        assert_eq!(json["messages"][0]["id"], "42");
        assert_eq!(json["messages"][0]["user"], "alice");
        assert!(!json.to_string().contains("ses_secret"));
    }
}
