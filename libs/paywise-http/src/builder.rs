use std::time::Duration;

use bytes::Bytes;
use http::Response;
use http_body_util::{BodyExt, Full};
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::{TokioExecutor, TokioTimer};
use tower::buffer::Buffer;
use tower::limit::ConcurrencyLimitLayer;
use tower::load_shed::LoadShedLayer;
use tower::timeout::TimeoutLayer;
use tower::util::BoxCloneService;
use tower::{ServiceBuilder, ServiceExt};
use tower_http::decompression::DecompressionLayer;

use crate::client::{BufferedService, HttpClient};
use crate::config::{HttpClientConfig, RateLimitConfig, TlsRootConfig, TransportSecurity};
use crate::error::HttpError;
use crate::layers::DefaultHeadersLayer;
use crate::response::ResponseBody;
use crate::tls;

/// Type-erased service handed to the auth layer slot of [`HttpClientBuilder`].
pub type InnerService =
    BoxCloneService<http::Request<Full<Bytes>>, http::Response<ResponseBody>, HttpError>;

type AuthWrap = Box<dyn FnOnce(InnerService) -> InnerService + Send>;

/// Assembles an [`HttpClient`] from an [`HttpClientConfig`].
///
/// Request flow, outer to inner:
///
/// ```text
/// Buffer -> LoadShed + ConcurrencyLimit -> [auth] -> error mapping
///        -> Timeout -> default headers -> Decompression -> hyper
/// ```
///
/// Every HTTP status comes back as `Ok`. Redirects are not followed and
/// nothing is retried at this level.
pub struct HttpClientBuilder {
    config: HttpClientConfig,
    auth_layer: Option<AuthWrap>,
}

impl HttpClientBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(HttpClientConfig::default())
    }

    #[must_use]
    pub fn with_config(config: HttpClientConfig) -> Self {
        Self {
            config,
            auth_layer: None,
        }
    }

    /// Per-call timeout. A request replayed after a token refresh gets a
    /// fresh one, and so does the refresh call itself.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    #[must_use]
    pub fn max_body_size(mut self, size: usize) -> Self {
        self.config.max_body_size = size;
        self
    }

    #[must_use]
    pub fn transport(mut self, transport: TransportSecurity) -> Self {
        self.config.transport = transport;
        self
    }

    /// Install the auth layer between the concurrency limit and the timeout.
    ///
    /// The wrapped service may be called more than once per request (the
    /// replay after a refresh). Setting a second layer replaces the first.
    #[must_use]
    pub fn with_auth_layer(
        mut self,
        wrap: impl FnOnce(InnerService) -> InnerService + Send + 'static,
    ) -> Self {
        self.auth_layer = Some(Box::new(wrap));
        self
    }

    /// # Errors
    ///
    /// Returns [`HttpError::Tls`] if the root store cannot be loaded and
    /// [`HttpError::InvalidHeaderValue`] for an unusable user agent.
    pub fn build(self) -> Result<HttpClient, HttpError> {
        let Self { config, auth_layer } = self;

        if config.transport == TransportSecurity::AllowInsecureHttp {
            tracing::warn!(
                target: "paywise_http::security",
                "plain http:// allowed; use only against a local backend or a mock server"
            );
        }

        let mut service = core_service(&config)?;
        if let Some(wrap) = auth_layer {
            service = wrap(service);
        }
        if let Some(limit) = config.rate_limit {
            service = limit_concurrency(service, limit);
        }

        // tower's Buffer panics on a zero capacity
        let service: BufferedService = Buffer::new(service, config.buffer_capacity.max(1));

        Ok(HttpClient {
            service,
            max_body_size: config.max_body_size,
            transport_security: config.transport,
        })
    }
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything below the auth slot: timeout, default headers, decompression
/// and the pooled hyper client.
fn core_service(config: &HttpClientConfig) -> Result<InnerService, HttpError> {
    let connector = https_connector(config.tls_roots, config.transport)?;

    let mut pool = Client::builder(TokioExecutor::new());
    // the idle timeout only fires with a timer installed
    pool.pool_timer(TokioTimer::new())
        .pool_max_idle_per_host(config.pool_max_idle_per_host)
        .pool_idle_timeout(config.pool_idle_timeout);
    let hyper_client = pool.build::<_, Full<Bytes>>(connector);

    let timeout = config.request_timeout;
    let service = ServiceBuilder::new()
        .layer(TimeoutLayer::new(timeout))
        .layer(DefaultHeadersLayer::for_json_api(&config.user_agent)?)
        .layer(DecompressionLayer::new())
        .service(hyper_client)
        .map_response(box_body)
        .map_err(move |e: tower::BoxError| map_tower_error(e, timeout));

    Ok(service.boxed_clone())
}

/// Fail fast with [`HttpError::Overloaded`] once `max_concurrent_requests`
/// calls are in flight.
fn limit_concurrency(service: InnerService, limit: RateLimitConfig) -> InnerService {
    if limit.max_concurrent_requests == usize::MAX {
        return service;
    }
    ServiceBuilder::new()
        .layer(LoadShedLayer::new())
        .layer(ConcurrencyLimitLayer::new(limit.max_concurrent_requests))
        .service(service)
        .map_err(map_load_shed_error)
        .boxed_clone()
}

fn map_tower_error(err: tower::BoxError, timeout: Duration) -> HttpError {
    if err.is::<tower::timeout::error::Elapsed>() {
        return HttpError::Timeout(timeout);
    }
    unbox(err)
}

fn map_load_shed_error(err: tower::BoxError) -> HttpError {
    if err.is::<tower::load_shed::error::Overloaded>() {
        return HttpError::Overloaded;
    }
    unbox(err)
}

/// Recover an `HttpError` boxed on its way through tower; anything else is
/// a transport failure.
fn unbox(err: tower::BoxError) -> HttpError {
    match err.downcast::<HttpError>() {
        Ok(http_err) => *http_err,
        Err(other) => HttpError::Transport(other),
    }
}

fn box_body<B>(response: Response<B>) -> Response<ResponseBody>
where
    B: hyper::body::Body<Data = Bytes> + Send + Sync + 'static,
    B::Error: Into<tower::BoxError>,
{
    response.map(|body| body.map_err(Into::into).boxed())
}

/// HTTPS connector over the configured root store; `http://` is accepted
/// only with [`TransportSecurity::AllowInsecureHttp`].
fn https_connector(
    roots: TlsRootConfig,
    transport: TransportSecurity,
) -> Result<HttpsConnector<HttpConnector>, HttpError> {
    let builder = match roots {
        TlsRootConfig::WebPki => HttpsConnectorBuilder::new()
            .with_provider_and_webpki_roots(tls::get_crypto_provider())
            .map_err(|e| HttpError::Tls(Box::new(e)))?,
        TlsRootConfig::Native => {
            let tls_config =
                tls::native_roots_client_config().map_err(|e| HttpError::Tls(e.into()))?;
            HttpsConnectorBuilder::new().with_tls_config(tls_config)
        }
    };

    let builder = match transport {
        TransportSecurity::AllowInsecureHttp => builder.https_or_http(),
        TransportSecurity::TlsOnly => builder.https_only(),
    };
    Ok(builder.enable_all_versions().build())
}
