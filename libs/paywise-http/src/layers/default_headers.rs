use std::task::{Context, Poll};

use http::header::{ACCEPT, USER_AGENT};
use http::{HeaderMap, HeaderValue, Request};
use tower::{Layer, Service};

use crate::error::HttpError;

/// Fills in headers every PayWise request carries unless the caller set
/// them: `User-Agent` and `Accept: application/json`.
///
/// Values already present on the request are never replaced, so a caller
/// asking for `text/csv` still gets it.
#[derive(Clone, Debug)]
pub struct DefaultHeadersLayer {
    defaults: HeaderMap,
}

impl DefaultHeadersLayer {
    /// JSON API defaults with the given user agent.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::InvalidHeaderValue`] if `user_agent` contains
    /// characters not allowed in a header.
    pub fn for_json_api(user_agent: &str) -> Result<Self, HttpError> {
        let mut defaults = HeaderMap::with_capacity(2);
        defaults.insert(USER_AGENT, HeaderValue::from_str(user_agent)?);
        defaults.insert(ACCEPT, HeaderValue::from_static("application/json"));
        Ok(Self { defaults })
    }

    #[must_use]
    pub fn defaults(&self) -> &HeaderMap {
        &self.defaults
    }
}

impl<S> Layer<S> for DefaultHeadersLayer {
    type Service = DefaultHeadersService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        DefaultHeadersService {
            inner,
            defaults: self.defaults.clone(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct DefaultHeadersService<S> {
    inner: S,
    defaults: HeaderMap,
}

impl<S, B> Service<Request<B>> for DefaultHeadersService<S>
where
    S: Service<Request<B>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<B>) -> Self::Future {
        let headers = req.headers_mut();
        for (name, value) in &self.defaults {
            if !headers.contains_key(name) {
                headers.insert(name, value.clone());
            }
        }
        self.inner.call(req)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use tower::ServiceExt;

    /// Answers with the headers it received.
    async fn echo_headers(req: Request<()>) -> Result<HeaderMap, HttpError> {
        Ok(req.headers().clone())
    }

    async fn send(req: Request<()>) -> HeaderMap {
        DefaultHeadersLayer::for_json_api("paywise-http/0.1.0")
            .unwrap()
            .layer(tower::service_fn(echo_headers))
            .oneshot(req)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn missing_headers_are_filled_in() {
        let headers = send(Request::new(())).await;
        assert_eq!(headers[USER_AGENT], "paywise-http/0.1.0");
        assert_eq!(headers[ACCEPT], "application/json");
    }

    #[tokio::test]
    async fn caller_values_win() {
        let req = Request::builder()
            .header(USER_AGENT, "paywise-cli/0.1.0")
            .header(ACCEPT, "text/csv")
            .body(())
            .unwrap();
        let headers = send(req).await;
        assert_eq!(headers[USER_AGENT], "paywise-cli/0.1.0");
        assert_eq!(headers.get_all(ACCEPT).iter().count(), 1);
        assert_eq!(headers[ACCEPT], "text/csv");
    }

    #[test]
    fn control_characters_are_rejected() {
        assert!(matches!(
            DefaultHeadersLayer::for_json_api("paywise\x00cli"),
            Err(HttpError::InvalidHeaderValue(_))
        ));
    }
}
