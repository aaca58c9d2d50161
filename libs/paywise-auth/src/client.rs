use std::sync::Arc;

use bytes::Bytes;
use http::header::{HeaderMap, HeaderName, HeaderValue};
use http::Method;
use paywise_http::{HttpClient, HttpClientBuilder, HttpError, HttpResponse, InvalidUriKind};
use serde::Serialize;
use url::Url;

use crate::builder_ext::HttpClientBuilderExt;
use crate::config::{AuthClientConfig, ConfigError};
use crate::refresh::RefreshClient;
use crate::store::SessionStore;

/// Method, headers and body of one [`AuthenticatedClient::send`] call.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

impl RequestOptions {
    #[must_use]
    pub fn new(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn get() -> Self {
        Self::new(Method::GET)
    }

    /// Set a header, replacing earlier values for the same name.
    #[must_use]
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Serialize `body` as JSON.
    ///
    /// # Errors
    ///
    /// Returns `HttpError::Json` if serialization fails.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, HttpError> {
        self.body = Some(Bytes::from(serde_json::to_vec(body)?));
        Ok(self)
    }
}

/// HTTP client that authorizes every request from the session store.
///
/// Wraps an [`HttpClient`] whose stack carries the
/// [`SessionAuthLayer`](crate::SessionAuthLayer): a 401 is answered by one
/// refresh call and one replay, and a rejected refresh clears the session.
/// Every HTTP status comes back as `Ok`; only transport failures are errors.
///
/// A second, unauthenticated client is kept for the endpoints that must not
/// carry a bearer token (login, registration and the refresh call itself).
#[derive(Clone)]
pub struct AuthenticatedClient {
    http: HttpClient,
    public: HttpClient,
    store: Arc<dyn SessionStore>,
    config: Arc<AuthClientConfig>,
}

impl AuthenticatedClient {
    /// Validate `config` and build both clients.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for an invalid base URL or refresh path, or if
    /// the underlying HTTP clients cannot be built (TLS initialization).
    pub fn new(
        mut config: AuthClientConfig,
        store: Arc<dyn SessionStore>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let public = HttpClientBuilder::with_config(config.http.clone()).build()?;
        let refresher = RefreshClient::new(public.clone(), config.refresh_url()?);
        let http = HttpClientBuilder::with_config(config.http.clone())
            .with_session_auth(Arc::clone(&store), refresher)
            .build()?;

        tracing::debug!(api_base_url = %config.api_base_url, "authenticated client ready");

        Ok(Self {
            http,
            public,
            store,
            config: Arc::new(config),
        })
    }

    /// Send one request with the stored session.
    ///
    /// `url` is either absolute or resolved against the API root, so both
    /// `"expenses/groups/"` and `"/api/expenses/"` work.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] for an unparseable URL and for transport
    /// failures of the request, the refresh call or the replay.
    pub async fn send(&self, url: &str, options: RequestOptions) -> Result<HttpResponse, HttpError> {
        let url = self.resolve(url)?;
        tracing::debug!(method = %options.method, %url, "sending authenticated request");

        let mut builder = self
            .http
            .request(options.method, url.as_str())
            .headers(options.headers);
        if let Some(body) = options.body {
            builder = builder.body_bytes(body);
        }
        builder.send().await
    }

    /// # Errors
    ///
    /// Same as [`send`](Self::send).
    pub async fn get(&self, url: &str) -> Result<HttpResponse, HttpError> {
        self.send(url, RequestOptions::get()).await
    }

    /// POST `body` as JSON.
    ///
    /// # Errors
    ///
    /// Same as [`send`](Self::send), plus `HttpError::Json` if `body` does
    /// not serialize.
    pub async fn post<T: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &T,
    ) -> Result<HttpResponse, HttpError> {
        self.send(url, RequestOptions::new(Method::POST).json(body)?)
            .await
    }

    /// # Errors
    ///
    /// See [`post`](Self::post).
    pub async fn put<T: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &T,
    ) -> Result<HttpResponse, HttpError> {
        self.send(url, RequestOptions::new(Method::PUT).json(body)?)
            .await
    }

    /// # Errors
    ///
    /// See [`post`](Self::post).
    pub async fn patch<T: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &T,
    ) -> Result<HttpResponse, HttpError> {
        self.send(url, RequestOptions::new(Method::PATCH).json(body)?)
            .await
    }

    /// # Errors
    ///
    /// Same as [`send`](Self::send).
    pub async fn delete(&self, url: &str) -> Result<HttpResponse, HttpError> {
        self.send(url, RequestOptions::new(Method::DELETE)).await
    }

    /// Client without the session layer, for login and registration.
    #[must_use]
    pub fn unauthenticated(&self) -> &HttpClient {
        &self.public
    }

    #[must_use]
    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    #[must_use]
    pub fn config(&self) -> &AuthClientConfig {
        &self.config
    }

    /// Resolve an endpoint path against the API root.
    ///
    /// # Errors
    ///
    /// See [`AuthClientConfig::endpoint`].
    pub fn endpoint(&self, path: &str) -> Result<Url, ConfigError> {
        self.config.endpoint(path)
    }

    fn resolve(&self, url: &str) -> Result<Url, HttpError> {
        let parsed = match Url::parse(url) {
            Err(url::ParseError::RelativeUrlWithoutBase) => self.config.api_base_url.join(url),
            other => other,
        };
        parsed.map_err(|e| HttpError::InvalidUri {
            url: url.to_owned(),
            kind: InvalidUriKind::ParseError,
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::store::InMemorySessionStore;
    use paywise_http::HttpClientConfig;

    fn client(base: &str) -> AuthenticatedClient {
        let config = AuthClientConfig {
            http: HttpClientConfig::for_testing(),
            ..AuthClientConfig::for_base_url(base).unwrap()
        };
        AuthenticatedClient::new(config, Arc::new(InMemorySessionStore::new())).unwrap()
    }

    #[tokio::test]
    async fn relative_urls_resolve_against_api_root() {
        let c = client("http://127.0.0.1:8000/api");
        assert_eq!(
            c.resolve("expenses/groups/").unwrap().as_str(),
            "http://127.0.0.1:8000/api/expenses/groups/"
        );
        assert_eq!(
            c.resolve("/api/expenses/").unwrap().as_str(),
            "http://127.0.0.1:8000/api/expenses/"
        );
        assert_eq!(
            c.resolve("https://other.example/x").unwrap().as_str(),
            "https://other.example/x"
        );
    }

    #[tokio::test]
    async fn bad_url_is_invalid_uri() {
        let c = client("http://127.0.0.1:8000/api/");
        assert!(matches!(
            c.resolve("http://[::1"),
            Err(HttpError::InvalidUri { .. })
        ));
    }

    #[tokio::test]
    async fn invalid_config_is_rejected() {
        let config = AuthClientConfig {
            refresh_path: "/auth/refresh/".to_owned(),
            ..AuthClientConfig::default()
        };
        assert!(matches!(
            AuthenticatedClient::new(config, Arc::new(InMemorySessionStore::new())),
            Err(ConfigError::InvalidPath { .. })
        ));
    }

    #[test]
    fn options_builders() {
        let opts = RequestOptions::new(Method::POST)
            .header(
                http::header::ACCEPT,
                HeaderValue::from_static("application/json"),
            )
            .json(&serde_json::json!({"a": 1}))
            .unwrap();
        assert_eq!(opts.method, Method::POST);
        assert_eq!(opts.body.as_deref(), Some(&br#"{"a":1}"#[..]));
        assert_eq!(opts.headers.len(), 1);
        assert_eq!(RequestOptions::default().method, Method::GET);
    }
}
