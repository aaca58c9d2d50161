use http::StatusCode;
use paywise_http::{HttpClient, HttpError};
use paywise_utils::SecretString;
use serde::{Deserialize, Serialize};
use url::Url;

/// HTTP-level result of one refresh call.
#[derive(Debug)]
pub enum RefreshOutcome {
    /// 2xx carrying a non-empty `access` field.
    Refreshed(SecretString),
    /// 2xx whose body has no usable `access` field.
    MissingAccessToken,
    /// Any non-2xx status; the refresh token is no longer accepted.
    Rejected(StatusCode),
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
    refresh: &'a str,
}

#[derive(Deserialize)]
struct RefreshResponse {
    #[serde(default)]
    access: Option<String>,
}

/// Client for `POST {api}/auth/refresh/`.
///
/// Uses its own [`HttpClient`] without the session layer, so the refresh call
/// never carries a bearer token and can never recurse into another refresh.
#[derive(Clone)]
pub struct RefreshClient {
    http: HttpClient,
    url: Url,
}

impl RefreshClient {
    #[must_use]
    pub fn new(http: HttpClient, url: Url) -> Self {
        Self { http, url }
    }

    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Exchange a refresh token for a new access token.
    ///
    /// # Errors
    ///
    /// Transport failures and an unparseable 2xx body are returned as
    /// [`HttpError`]; every HTTP status is reported through [`RefreshOutcome`].
    pub async fn refresh(&self, refresh_token: &SecretString) -> Result<RefreshOutcome, HttpError> {
        let response = self
            .http
            .post(self.url.as_str())
            .json(&RefreshRequest {
                refresh: refresh_token.expose(),
            })?
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Ok(RefreshOutcome::Rejected(status));
        }

        let body: RefreshResponse = serde_json::from_slice(&response.bytes().await?)?;
        Ok(match body.access {
            Some(access) if !access.is_empty() => RefreshOutcome::Refreshed(access.into()),
            _ => RefreshOutcome::MissingAccessToken,
        })
    }
}
