//! Where the session lives between requests.
//!
//! The store holds three independent values, keyed like the browser client
//! kept them: `access_token`, `refresh_token` and `user`. Any subset may be
//! present. Reads and writes are not coordinated with in-flight requests.

mod file;
mod memory;

pub use file::FileSessionStore;
pub use memory::InMemorySessionStore;

use async_trait::async_trait;
use paywise_utils::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::session::{Session, UserProfile};

/// Failures reading or writing session state.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("session storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("session storage is corrupt: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Injected session storage capability.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn access_token(&self) -> Result<Option<SecretString>, SessionError>;

    async fn refresh_token(&self) -> Result<Option<SecretString>, SessionError>;

    async fn user(&self) -> Result<Option<UserProfile>, SessionError>;

    /// Replace the access token only (token rotation after a refresh).
    async fn set_access_token(&self, token: SecretString) -> Result<(), SessionError>;

    /// Replace all three values.
    async fn save(&self, session: Session) -> Result<(), SessionError>;

    /// Remove all three values.
    async fn clear(&self) -> Result<(), SessionError>;
}

/// The three stored values. Also the on-disk layout of [`FileSessionStore`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct StoredSession {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) access_token: Option<SecretString>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) refresh_token: Option<SecretString>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) user: Option<UserProfile>,
}

impl StoredSession {
    pub(crate) fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none() && self.user.is_none()
    }
}

impl From<Session> for StoredSession {
    fn from(session: Session) -> Self {
        Self {
            access_token: Some(session.access_token),
            refresh_token: Some(session.refresh_token),
            user: Some(session.user),
        }
    }
}
