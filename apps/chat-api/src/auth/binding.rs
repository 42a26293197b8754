//! Name ↔ session binding: login and logout.
//!
//! These functions only talk to the [`IdentityStore`]; stamping or clearing
//! the caller's login time is left to the transport layer.

use crate::db::identities::IdentityStore;
use crate::error::ApiError;
use crate::models::Identity;

/// Result of a login attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    /// The name was free and is now bound to the caller's session.
    AcceptedNew,
    /// The name was already bound to the caller's session.
    AcceptedReturning,
    /// The name is bound to a different session. Nothing was changed.
    RejectedNameTaken,
}

impl LoginOutcome {
    pub fn is_accepted(self) -> bool {
        !matches!(self, LoginOutcome::RejectedNameTaken)
    }
}

/// Bind `name` to `session_id`.
///
/// `name` must already be validated (non-empty). Comparison is exact and
/// case-sensitive. A rejected attempt changes nothing. Once the new name is
/// bound, any other name the session held is released, so a session owns at
/// most one identity.
pub async fn login(
    identities: &dyn IdentityStore,
    name: &str,
    session_id: &str,
) -> Result<LoginOutcome, ApiError> {
    if let Some(existing) = identities.find_by_name(name).await? {
        return Ok(if existing.session_id == session_id {
            LoginOutcome::AcceptedReturning
        } else {
            LoginOutcome::RejectedNameTaken
        });
    }

    if !identities.insert(&Identity::new(name, session_id)).await? {
        // Lost the race for a free name. The store decided who owns it.
        let winner = identities.find_by_name(name).await?;
        return Ok(match winner {
            Some(identity) if identity.session_id == session_id => LoginOutcome::AcceptedReturning,
            _ => LoginOutcome::RejectedNameTaken,
        });
    }

    for previous in identities.release_others(session_id, name).await? {
        tracing::debug!(from = %previous.name, to = name, "session switched names");
    }
    Ok(LoginOutcome::AcceptedNew)
}

/// Release whatever name `session_id` holds. Safe to call repeatedly.
pub async fn logout(
    identities: &dyn IdentityStore,
    session_id: &str,
) -> Result<Option<Identity>, ApiError> {
    identities.delete_by_session(session_id).await
}
