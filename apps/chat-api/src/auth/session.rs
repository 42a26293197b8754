//! Per-client session context carried by the `tower-sessions` cookie.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use chatroom_common::id::{prefix, prefixed_ulid};
use chrono::{DateTime, Utc};
use tower_sessions::Session;

use crate::error::ApiError;

/// Session key holding the client's stable session identifier.
pub const SESSION_ID_KEY: &str = "session_id";
/// Session key holding the time of the last successful login.
pub const LOGIN_TIME_KEY: &str = "login_time";
/// Session key holding a one-shot notice for the next login page.
pub const NOTICE_KEY: &str = "notice";

/// What the protocol layer knows about the caller's transport session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    pub session_id: String,
    /// `None` means "never logged in" (or logged out).
    pub login_time: Option<DateTime<Utc>>,
}

/// Extractor pairing the [`SessionContext`] with the underlying session so
/// handlers can stamp or reset the login time.
///
/// A session identifier is minted on first contact and kept for the
/// lifetime of the cookie.
pub struct CurrentSession {
    session: Session,
    pub context: SessionContext,
}

impl CurrentSession {
    pub async fn load(session: Session) -> Result<Self, ApiError> {
        let session_id = match session.get::<String>(SESSION_ID_KEY).await? {
            Some(id) => id,
            None => {
                let id = prefixed_ulid(prefix::SESSION);
                session.insert(SESSION_ID_KEY, &id).await?;
                id
            }
        };
        let login_time = session.get::<DateTime<Utc>>(LOGIN_TIME_KEY).await?;

        Ok(Self {
            session,
            context: SessionContext {
                session_id,
                login_time,
            },
        })
    }

    pub fn session_id(&self) -> &str {
        &self.context.session_id
    }

    /// Record a successful login at `at`.
    pub async fn stamp_login(&mut self, at: DateTime<Utc>) -> Result<(), ApiError> {
        self.session.insert(LOGIN_TIME_KEY, at).await?;
        self.context.login_time = Some(at);
        Ok(())
    }

    /// Return the session to the "never logged in" state. The session
    /// identifier itself is kept.
    pub async fn reset(&mut self) -> Result<(), ApiError> {
        self.session.remove::<DateTime<Utc>>(LOGIN_TIME_KEY).await?;
        self.context.login_time = None;
        Ok(())
    }

    /// Leave `notice` for the next page that calls [`CurrentSession::take_notice`].
    pub async fn set_notice(&self, notice: &str) -> Result<(), ApiError> {
        self.session.insert(NOTICE_KEY, notice).await?;
        Ok(())
    }

    /// Remove and return the pending notice, if any.
    pub async fn take_notice(&self) -> Result<Option<String>, ApiError> {
        Ok(self.session.remove::<String>(NOTICE_KEY).await?)
    }
}

impl<S: Send + Sync> FromRequestParts<S> for CurrentSession {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;

        Self::load(session).await.map_err(IntoResponse::into_response)
    }
}
