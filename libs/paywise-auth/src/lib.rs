#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![warn(warnings)]

//! Session handling for the PayWise API client.
//!
//! [`AuthenticatedClient`] sends every request with the stored access token.
//! When the API answers 401 it exchanges the refresh token once, stores the
//! new access token and replays the request once. A refresh the server
//! rejects clears the whole session. HTTP statuses are never turned into
//! errors here; only transport failures are.
//!
//! ```ignore
//! let store = Arc::new(FileSessionStore::new(path));
//! let client = AuthenticatedClient::new(AuthClientConfig::default(), store)?;
//! let response = client.get("expenses/expenses/").await?;
//! ```

pub mod builder_ext;
pub mod client;
pub mod config;
pub mod http_error;
pub mod layer;
pub mod refresh;
pub mod session;
pub mod store;

pub use builder_ext::HttpClientBuilderExt;
pub use client::{AuthenticatedClient, RequestOptions};
pub use config::{AuthClientConfig, ConfigError, DEFAULT_API_BASE_URL, DEFAULT_REFRESH_PATH};
pub use http_error::format_http_error;
pub use layer::{SessionAuthLayer, SessionAuthService};
pub use refresh::{RefreshClient, RefreshOutcome};
pub use session::{Session, UserProfile};
pub use store::{FileSessionStore, InMemorySessionStore, SessionError, SessionStore};
