use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use bytes::Bytes;
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use http::{HeaderMap, HeaderValue, Method, Request, Response, StatusCode, Uri, Version};
use http_body_util::Full;
use paywise_http::HttpError;
use paywise_utils::SecretString;
use tower::{Layer, Service, ServiceExt};

use crate::refresh::{RefreshClient, RefreshOutcome};
use crate::store::{SessionError, SessionStore};

/// Tower layer that authorizes requests from a [`SessionStore`] and recovers
/// from an expired access token.
///
/// Every request gets `Content-Type: application/json` (unless the caller set
/// one) and `Authorization: Bearer <access>` when an access token is stored.
/// A 401 triggers at most one refresh call followed by at most one replay.
#[derive(Clone)]
pub struct SessionAuthLayer {
    store: Arc<dyn SessionStore>,
    refresher: RefreshClient,
}

impl SessionAuthLayer {
    #[must_use]
    pub fn new(store: Arc<dyn SessionStore>, refresher: RefreshClient) -> Self {
        Self { store, refresher }
    }
}

impl<S> Layer<S> for SessionAuthLayer {
    type Service = SessionAuthService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        SessionAuthService {
            inner,
            store: Arc::clone(&self.store),
            refresher: self.refresher.clone(),
        }
    }
}

/// Created by [`SessionAuthLayer`].
#[derive(Clone)]
pub struct SessionAuthService<S> {
    inner: S,
    store: Arc<dyn SessionStore>,
    refresher: RefreshClient,
}

impl<S, ResBody> Service<Request<Full<Bytes>>> for SessionAuthService<S>
where
    S: Service<Request<Full<Bytes>>, Response = Response<ResBody>, Error = HttpError>
        + Clone
        + Send
        + 'static,
    S::Future: Send,
    ResBody: Send + 'static,
{
    type Response = Response<ResBody>;
    type Error = HttpError;
    type Future = Pin<Box<dyn Future<Output = Result<Response<ResBody>, HttpError>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Full<Bytes>>) -> Self::Future {
        // Clone-swap: the ready service handles this request.
        let clone = self.inner.clone();
        let inner = std::mem::replace(&mut self.inner, clone);
        let store = Arc::clone(&self.store);
        let refresher = self.refresher.clone();

        Box::pin(send_with_session(inner, store, refresher, req))
    }
}

/// Progress of one logical request after its first attempt came back 401.
enum AuthState<R> {
    /// First attempt rejected; look for a refresh token.
    Unauthenticated { rejected: R },
    /// Refresh call in flight with the stored refresh token.
    Refreshing {
        rejected: R,
        refresh_token: SecretString,
    },
    /// Replay once with the new access token. Terminal.
    Retried { access_token: SecretString },
}

async fn send_with_session<S, ResBody>(
    mut inner: S,
    store: Arc<dyn SessionStore>,
    refresher: RefreshClient,
    req: Request<Full<Bytes>>,
) -> Result<Response<ResBody>, HttpError>
where
    S: Service<Request<Full<Bytes>>, Response = Response<ResBody>, Error = HttpError>,
{
    let template = RequestTemplate::new(req);

    let access_token = store.access_token().await.map_err(store_error)?;
    let response = inner
        .call(authorize(template.build(), access_token.as_ref())?)
        .await?;
    if response.status() != StatusCode::UNAUTHORIZED {
        return Ok(response);
    }

    let mut state = AuthState::Unauthenticated { rejected: response };
    loop {
        state = match state {
            AuthState::Unauthenticated { rejected } => {
                let stored = store.refresh_token().await.map_err(store_error)?;
                match stored.filter(|t| !t.is_empty()) {
                    Some(refresh_token) => AuthState::Refreshing {
                        rejected,
                        refresh_token,
                    },
                    None => {
                        tracing::debug!(uri = %template.uri, "401 without a refresh token");
                        return Ok(rejected);
                    }
                }
            }
            AuthState::Refreshing {
                rejected,
                refresh_token,
            } => match refresher.refresh(&refresh_token).await? {
                RefreshOutcome::Refreshed(access_token) => {
                    store
                        .set_access_token(access_token.clone())
                        .await
                        .map_err(store_error)?;
                    tracing::info!(uri = %template.uri, "access token refreshed, replaying request");
                    AuthState::Retried { access_token }
                }
                RefreshOutcome::Rejected(status) => {
                    tracing::warn!(%status, "refresh token rejected, clearing session");
                    store.clear().await.map_err(store_error)?;
                    return Ok(rejected);
                }
                RefreshOutcome::MissingAccessToken => {
                    tracing::warn!("refresh response carried no access token");
                    return Ok(rejected);
                }
            },
            AuthState::Retried { access_token } => {
                let inner = inner.ready().await?;
                return inner
                    .call(authorize(template.build(), Some(&access_token))?)
                    .await;
            }
        };
    }
}

/// Owned copy of a request that can be rebuilt for the replay.
struct RequestTemplate {
    method: Method,
    uri: Uri,
    version: Version,
    headers: HeaderMap,
    body: Full<Bytes>,
}

impl RequestTemplate {
    fn new(req: Request<Full<Bytes>>) -> Self {
        let (parts, body) = req.into_parts();
        Self {
            method: parts.method,
            uri: parts.uri,
            version: parts.version,
            headers: parts.headers,
            body,
        }
    }

    fn build(&self) -> Request<Full<Bytes>> {
        let mut req = Request::new(self.body.clone());
        *req.method_mut() = self.method.clone();
        *req.uri_mut() = self.uri.clone();
        *req.version_mut() = self.version;
        *req.headers_mut() = self.headers.clone();
        req
    }
}

/// Apply the default content type and the bearer header.
///
/// A caller-supplied `Authorization` is always replaced or removed so that
/// the header reflects the stored session.
fn authorize(
    mut req: Request<Full<Bytes>>,
    access_token: Option<&SecretString>,
) -> Result<Request<Full<Bytes>>, HttpError> {
    let headers = req.headers_mut();
    headers
        .entry(CONTENT_TYPE)
        .or_insert(HeaderValue::from_static("application/json"));
    headers.remove(AUTHORIZATION);

    if let Some(token) = access_token.filter(|t| !t.is_empty()) {
        let raw = zeroize::Zeroizing::new(format!("Bearer {}", token.expose()));
        let mut value = HeaderValue::from_str(&raw)?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }
    Ok(req)
}

fn store_error(e: SessionError) -> HttpError {
    HttpError::Transport(Box::new(e))
}
