use std::sync::Arc;

use tower::ServiceExt;

use crate::layer::SessionAuthLayer;
use crate::refresh::RefreshClient;
use crate::store::SessionStore;

/// Extension trait for adding session auth to [`paywise_http::HttpClientBuilder`].
///
/// ```ignore
/// use paywise_auth::HttpClientBuilderExt;
///
/// let client = HttpClientBuilder::with_config(config)
///     .with_session_auth(store, refresher)
///     .build()?;
/// ```
pub trait HttpClientBuilderExt {
    /// Authorize requests from `store` and refresh through `refresher` on 401.
    #[must_use]
    fn with_session_auth(self, store: Arc<dyn SessionStore>, refresher: RefreshClient) -> Self;
}

impl HttpClientBuilderExt for paywise_http::HttpClientBuilder {
    fn with_session_auth(self, store: Arc<dyn SessionStore>, refresher: RefreshClient) -> Self {
        let layer = SessionAuthLayer::new(store, refresher);
        self.with_auth_layer(move |svc| {
            tower::ServiceBuilder::new()
                .layer(layer)
                .service(svc)
                .boxed_clone()
        })
    }
}
