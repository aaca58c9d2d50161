use paywise_auth::{AuthenticatedClient, Session, UserProfile, format_http_error};
use paywise_utils::SecretString;

use crate::error::{ApiError, read_json, read_session_json};
use crate::models::{AuthResponse, LoginRequest, LogoutRequest, RegisterRequest};

/// `auth/*` endpoints. Obtained from [`PayWiseClient::auth`](crate::PayWiseClient::auth).
pub struct AuthApi<'a> {
    client: &'a AuthenticatedClient,
}

impl<'a> AuthApi<'a> {
    pub(crate) fn new(client: &'a AuthenticatedClient) -> Self {
        Self { client }
    }

    /// Sign in and store the new session.
    ///
    /// # Errors
    ///
    /// [`ApiError::Rejected`] carries the server's validation errors for bad
    /// credentials; transport and store failures are passed through.
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<Session, ApiError> {
        let url = self.client.endpoint("auth/login/")?;
        let response = self
            .client
            .unauthenticated()
            .post(url.as_str())
            .json(&LoginRequest { email, password })?
            .send()
            .await?;
        self.start_session(read_json(response).await?).await
    }

    /// Create an account and store the new session.
    ///
    /// # Errors
    ///
    /// Same as [`login`](Self::login).
    pub async fn register(&self, request: &RegisterRequest) -> Result<Session, ApiError> {
        let url = self.client.endpoint("auth/register/")?;
        let response = self
            .client
            .unauthenticated()
            .post(url.as_str())
            .json(request)?
            .send()
            .await?;
        self.start_session(read_json(response).await?).await
    }

    async fn start_session(&self, body: AuthResponse) -> Result<Session, ApiError> {
        let session = Session {
            access_token: body.tokens.access,
            refresh_token: body.tokens.refresh,
            user: body.user,
        };
        self.client.store().save(session.clone()).await?;
        tracing::info!(
            user_id = session.user.id,
            server_message = body.message.as_deref().unwrap_or_default(),
            "session started"
        );
        Ok(session)
    }

    /// Fetch the signed-in user's profile from the server.
    ///
    /// # Errors
    ///
    /// [`ApiError::SessionExpired`] if the session could not be refreshed.
    pub async fn profile(&self) -> Result<UserProfile, ApiError> {
        let response = self.client.get("auth/profile/").await?;
        read_session_json(response).await
    }

    /// Blacklist the refresh token on the server (best effort) and clear the
    /// local session.
    ///
    /// # Errors
    ///
    /// Only a failure to clear the session store is reported.
    pub async fn logout(&self) -> Result<(), ApiError> {
        let store = self.client.store();
        if let Some(refresh) = store.refresh_token().await? {
            match self
                .client
                .post("auth/logout/", &LogoutRequest { refresh: &refresh })
                .await
            {
                Ok(response) if response.status().is_success() => {
                    tracing::debug!("refresh token revoked");
                }
                Ok(response) => {
                    tracing::warn!(status = %response.status(), "logout rejected by server");
                }
                Err(e) => tracing::warn!("{}", format_http_error(&e, "logout")),
            }
        }
        store.clear().await?;
        Ok(())
    }

    /// Cached profile from the session store; no network call.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Session`] if the store cannot be read.
    pub async fn current_user(&self) -> Result<Option<UserProfile>, ApiError> {
        Ok(self.client.store().user().await?)
    }

    /// Whether an access token is stored.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Session`] if the store cannot be read.
    pub async fn is_logged_in(&self) -> Result<bool, ApiError> {
        Ok(self.client.store().access_token().await?.is_some())
    }
}
