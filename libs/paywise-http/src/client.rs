use crate::builder::HttpClientBuilder;
use crate::config::TransportSecurity;
use crate::error::HttpError;
use crate::request::RequestBuilder;
use crate::response::ResponseBody;
use bytes::Bytes;
use http::{Method, Request, Response};
use http_body_util::Full;
use std::future::Future;
use std::pin::Pin;
use tower::Service;
use tower::buffer::Buffer;

/// Future type of the boxed inner service
pub type ServiceFuture =
    Pin<Box<dyn Future<Output = Result<Response<ResponseBody>, HttpError>> + Send>>;

/// `Buffer<Req, F>` in tower 0.5: request type and inner service future
pub type BufferedService = Buffer<Request<Full<Bytes>>, ServiceFuture>;

/// HTTP client over a tower service stack (timeout, user agent,
/// decompression, optional concurrency limit and auth layer).
///
/// `HttpClient` is `Clone + Send + Sync`; cloning only clones the buffer
/// channel, so store it directly instead of behind a `Mutex`.
///
/// ```ignore
/// let client = HttpClient::builder()
///     .transport(TransportSecurity::AllowInsecureHttp)
///     .build()?;
/// let categories: serde_json::Value = client
///     .get("http://127.0.0.1:8000/api/expenses/categories/")
///     .send()
///     .await?
///     .json()
///     .await?;
/// ```
#[derive(Clone)]
pub struct HttpClient {
    pub(crate) service: BufferedService,
    pub(crate) max_body_size: usize,
    pub(crate) transport_security: TransportSecurity,
}

impl HttpClient {
    /// Create a new HTTP client with default configuration
    ///
    /// # Errors
    /// Returns an error if TLS initialization fails
    pub fn new() -> Result<Self, HttpError> {
        HttpClientBuilder::new().build()
    }

    #[must_use]
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::new()
    }

    /// Request builder for an arbitrary method.
    ///
    /// The URL must be absolute; relative URLs fail with
    /// [`HttpError::InvalidUri`] on `send()`.
    pub fn request(&self, method: Method, url: &str) -> RequestBuilder {
        RequestBuilder::new(
            self.service.clone(),
            self.max_body_size,
            method,
            url.to_owned(),
            self.transport_security,
        )
    }

    pub fn get(&self, url: &str) -> RequestBuilder {
        self.request(Method::GET, url)
    }

    pub fn post(&self, url: &str) -> RequestBuilder {
        self.request(Method::POST, url)
    }

    pub fn put(&self, url: &str) -> RequestBuilder {
        self.request(Method::PUT, url)
    }

    pub fn patch(&self, url: &str) -> RequestBuilder {
        self.request(Method::PATCH, url)
    }

    pub fn delete(&self, url: &str) -> RequestBuilder {
        self.request(Method::DELETE, url)
    }

    /// Transport security mode this client was built with.
    #[must_use]
    pub fn transport_security(&self) -> TransportSecurity {
        self.transport_security
    }
}

/// Map buffer errors to `HttpError`.
///
/// Inner service errors pass through; anything else means the buffer
/// worker is gone.
pub(crate) fn map_buffer_error(err: tower::BoxError) -> HttpError {
    match err.downcast::<HttpError>() {
        Ok(http_err) => *http_err,
        Err(err) => {
            tracing::error!(
                error = %err,
                "buffer worker closed unexpectedly; service unavailable"
            );
            HttpError::ServiceClosed
        }
    }
}

/// Poll the buffer once; a full buffer fails with `Overloaded` instead of
/// queueing the caller.
pub(crate) async fn try_acquire_buffer_slot(
    service: &mut BufferedService,
) -> Result<(), HttpError> {
    use std::task::Poll;

    let poll_result = std::future::poll_fn(|cx| match service.poll_ready(cx) {
        Poll::Ready(result) => Poll::Ready(Some(result)),
        Poll::Pending => Poll::Ready(None),
    })
    .await;

    match poll_result {
        Some(Ok(())) => Ok(()),
        Some(Err(e)) => Err(map_buffer_error(e)),
        None => Err(HttpError::Overloaded),
    }
}
