use paywise_http::{HttpClientConfig, TransportSecurity};
use thiserror::Error;
use url::Url;

/// Default API root of a locally running PayWise backend.
pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000/api/";

/// Refresh endpoint, relative to the API root.
pub const DEFAULT_REFRESH_PATH: &str = "auth/refresh/";

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("invalid API base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("invalid endpoint path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("failed to build HTTP client: {0}")]
    Http(#[from] paywise_http::HttpError),
}

/// Configuration of an [`AuthenticatedClient`](crate::AuthenticatedClient).
#[derive(Debug, Clone)]
pub struct AuthClientConfig {
    /// API root; relative request URLs and endpoint paths resolve against it.
    ///
    /// Normalized to end with `/` by [`validate`](Self::validate) so that
    /// `Url::join` keeps the `/api` segment.
    pub api_base_url: Url,

    /// Refresh endpoint path relative to `api_base_url` (default `auth/refresh/`).
    pub refresh_path: String,

    /// Transport settings shared by API calls and the refresh call.
    pub http: HttpClientConfig,
}

impl Default for AuthClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_base_url(),
            refresh_path: DEFAULT_REFRESH_PATH.to_owned(),
            http: HttpClientConfig::default().with_transport(TransportSecurity::AllowInsecureHttp),
        }
    }
}

#[allow(clippy::expect_used)] // constant URL, it doesn't panic
fn default_base_url() -> Url {
    Url::parse(DEFAULT_API_BASE_URL).expect("DEFAULT_API_BASE_URL is a valid URL")
}

impl AuthClientConfig {
    /// Config for the given API root with default transport settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] if `api_base_url` does not parse.
    pub fn for_base_url(api_base_url: &str) -> Result<Self, ConfigError> {
        let api_base_url =
            Url::parse(api_base_url).map_err(|e| ConfigError::InvalidBaseUrl(e.to_string()))?;
        let mut config = Self {
            api_base_url,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration and normalize the base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if:
    /// - the base URL is not `http`/`https`, has no host, or carries a query
    /// - the base URL is `http` while the transport is `TlsOnly`
    /// - the refresh path is empty or absolute
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        let url = &mut self.api_base_url;
        match url.scheme() {
            "https" => {}
            "http" if self.http.transport == TransportSecurity::AllowInsecureHttp => {}
            "http" => {
                return Err(ConfigError::InvalidBaseUrl(
                    "http:// base URL requires insecure HTTP to be allowed".to_owned(),
                ));
            }
            other => {
                return Err(ConfigError::InvalidBaseUrl(format!(
                    "unsupported scheme '{other}'"
                )));
            }
        }
        if url.host_str().is_none() {
            return Err(ConfigError::InvalidBaseUrl("missing host".to_owned()));
        }
        if url.query().is_some() || url.fragment().is_some() {
            return Err(ConfigError::InvalidBaseUrl(
                "base URL must not carry a query or fragment".to_owned(),
            ));
        }
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }

        check_relative(&self.refresh_path)?;
        Ok(())
    }

    /// Absolute refresh endpoint URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPath`] if the refresh path cannot be joined.
    pub fn refresh_url(&self) -> Result<Url, ConfigError> {
        self.endpoint(&self.refresh_path)
    }

    /// Resolve an endpoint path such as `expenses/groups/` against the API root.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPath`] for empty or absolute paths.
    pub fn endpoint(&self, path: &str) -> Result<Url, ConfigError> {
        check_relative(path)?;
        self.api_base_url
            .join(path)
            .map_err(|e| ConfigError::InvalidPath {
                path: path.to_owned(),
                reason: e.to_string(),
            })
    }
}

fn check_relative(path: &str) -> Result<(), ConfigError> {
    let reason = if path.trim().is_empty() {
        "path must not be empty"
    } else if path.starts_with('/') {
        "path must be relative to the API root"
    } else if path.contains("://") {
        "path must not be an absolute URL"
    } else {
        return Ok(());
    };
    Err(ConfigError::InvalidPath {
        path: path.to_owned(),
        reason: reason.to_owned(),
    })
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn default_points_at_local_backend() {
        let cfg = AuthClientConfig::default();
        assert_eq!(cfg.api_base_url.as_str(), DEFAULT_API_BASE_URL);
        assert_eq!(
            cfg.refresh_url().unwrap().as_str(),
            "http://127.0.0.1:8000/api/auth/refresh/"
        );
    }

    #[test]
    fn missing_trailing_slash_is_added() {
        let cfg = AuthClientConfig::for_base_url("https://paywise.example.com/api").unwrap();
        assert_eq!(
            cfg.endpoint("expenses/groups/").unwrap().as_str(),
            "https://paywise.example.com/api/expenses/groups/"
        );
    }

    #[test]
    fn http_base_rejected_when_tls_only() {
        let mut cfg = AuthClientConfig {
            http: HttpClientConfig::default(),
            ..AuthClientConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidBaseUrl(_))
        ));
    }

    #[test]
    fn bad_schemes_and_paths_rejected() {
        assert!(AuthClientConfig::for_base_url("ftp://host/api/").is_err());
        assert!(AuthClientConfig::for_base_url("not a url").is_err());
        assert!(AuthClientConfig::for_base_url("https://h/api/?x=1").is_err());

        let cfg = AuthClientConfig::default();
        assert!(cfg.endpoint("").is_err());
        assert!(cfg.endpoint("/auth/login/").is_err());
        assert!(cfg.endpoint("https://evil.example/").is_err());

        let mut cfg = AuthClientConfig {
            refresh_path: String::new(),
            ..AuthClientConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidPath { .. })
        ));
    }
}
