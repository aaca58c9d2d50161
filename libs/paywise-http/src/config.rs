use std::time::Duration;

/// `User-Agent` sent when the caller does not pick one.
pub const DEFAULT_USER_AGENT: &str = concat!("paywise-http/", env!("CARGO_PKG_VERSION"));

/// Cap on requests in flight at once. Requests past the cap fail with
/// [`HttpError::Overloaded`](crate::HttpError::Overloaded) instead of waiting.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub max_concurrent_requests: usize,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_concurrent_requests: 100,
        }
    }
}

impl RateLimitConfig {
    #[must_use]
    pub fn unlimited() -> Self {
        Self {
            max_concurrent_requests: usize::MAX,
        }
    }
}

/// Where trusted root certificates come from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[non_exhaustive]
pub enum TlsRootConfig {
    /// Bundled Mozilla roots.
    #[default]
    WebPki,
    /// The operating system's store.
    Native,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[non_exhaustive]
pub enum TransportSecurity {
    #[default]
    TlsOnly,
    /// Also dial `http://` URLs.
    ///
    /// A local PayWise backend serves plain HTTP on `127.0.0.1:8000`; keep
    /// this off for anything remote.
    AllowInsecureHttp,
}

/// Settings for [`HttpClientBuilder`](crate::HttpClientBuilder).
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Per request, from send to the last header byte. Default 30s.
    pub request_timeout: Duration,
    /// Counted after decompression. Default 10 MiB.
    pub max_body_size: usize,
    pub user_agent: String,
    /// `None` lifts the in-flight cap entirely.
    pub rate_limit: Option<RateLimitConfig>,
    pub transport: TransportSecurity,
    pub tls_roots: TlsRootConfig,
    /// Queue depth in front of the shared service; clones of the client
    /// push into it. Zero is treated as one.
    pub buffer_capacity: usize,
    pub pool_idle_timeout: Option<Duration>,
    pub pool_max_idle_per_host: usize,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            max_body_size: 10 * 1024 * 1024,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            rate_limit: Some(RateLimitConfig::default()),
            transport: TransportSecurity::TlsOnly,
            tls_roots: TlsRootConfig::WebPki,
            buffer_capacity: 1024,
            pool_idle_timeout: Some(Duration::from_secs(90)),
            pool_max_idle_per_host: 32,
        }
    }
}

impl HttpClientConfig {
    /// Plain HTTP, no in-flight cap and small pools, for talking to a mock
    /// server on localhost.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
            max_body_size: 1024 * 1024,
            rate_limit: None,
            transport: TransportSecurity::AllowInsecureHttp,
            buffer_capacity: 256,
            pool_idle_timeout: Some(Duration::from_secs(10)),
            pool_max_idle_per_host: 4,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_transport(self, transport: TransportSecurity) -> Self {
        Self { transport, ..self }
    }
}
