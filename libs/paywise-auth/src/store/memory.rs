use async_trait::async_trait;
use parking_lot::RwLock;
use paywise_utils::SecretString;

use super::{SessionError, SessionStore, StoredSession};
use crate::session::{Session, UserProfile};

/// Process-local session store for tests and embedding.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    state: RwLock<StoredSession>,
}

impl InMemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with a full session.
    #[must_use]
    pub fn with_session(session: Session) -> Self {
        Self {
            state: RwLock::new(session.into()),
        }
    }

    /// Store holding only the given tokens, without a cached user.
    #[must_use]
    pub fn with_tokens(access_token: Option<&str>, refresh_token: Option<&str>) -> Self {
        Self {
            state: RwLock::new(StoredSession {
                access_token: access_token.map(SecretString::from),
                refresh_token: refresh_token.map(SecretString::from),
                user: None,
            }),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.read().is_empty()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn access_token(&self) -> Result<Option<SecretString>, SessionError> {
        Ok(self.state.read().access_token.clone())
    }

    async fn refresh_token(&self) -> Result<Option<SecretString>, SessionError> {
        Ok(self.state.read().refresh_token.clone())
    }

    async fn user(&self) -> Result<Option<UserProfile>, SessionError> {
        Ok(self.state.read().user.clone())
    }

    async fn set_access_token(&self, token: SecretString) -> Result<(), SessionError> {
        self.state.write().access_token = Some(token);
        Ok(())
    }

    async fn save(&self, session: Session) -> Result<(), SessionError> {
        *self.state.write() = session.into();
        Ok(())
    }

    async fn clear(&self) -> Result<(), SessionError> {
        *self.state.write() = StoredSession::default();
        Ok(())
    }
}
