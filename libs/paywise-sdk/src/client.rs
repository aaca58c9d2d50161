use std::sync::Arc;

use paywise_auth::{AuthClientConfig, AuthenticatedClient, SessionStore};

use crate::auth_api::AuthApi;
use crate::error::ApiError;
use crate::expenses_api::ExpensesApi;

/// Entry point of the typed PayWise API.
///
/// ```ignore
/// let client = PayWiseClient::new(AuthClientConfig::default(), store)?;
/// client.auth().login("asha@paywise.in", &password).await?;
/// let summary = client.expenses().summary().await?;
/// ```
#[derive(Clone)]
pub struct PayWiseClient {
    http: AuthenticatedClient,
}

impl PayWiseClient {
    /// # Errors
    ///
    /// Returns [`ApiError::Config`] if the configuration is invalid or the
    /// HTTP clients cannot be built.
    pub fn new(config: AuthClientConfig, store: Arc<dyn SessionStore>) -> Result<Self, ApiError> {
        Ok(Self::from_client(AuthenticatedClient::new(config, store)?))
    }

    #[must_use]
    pub fn from_client(http: AuthenticatedClient) -> Self {
        Self { http }
    }

    #[must_use]
    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi::new(&self.http)
    }

    #[must_use]
    pub fn expenses(&self) -> ExpensesApi<'_> {
        ExpensesApi::new(&self.http)
    }

    /// Underlying client, for endpoints without a typed wrapper.
    #[must_use]
    pub fn http(&self) -> &AuthenticatedClient {
        &self.http
    }
}
