//! Tower layers owned by the transport.
//!
//! The session auth layer is not here; `paywise-auth` plugs it in through
//! [`HttpClientBuilder::with_auth_layer`](crate::HttpClientBuilder::with_auth_layer).

mod default_headers;

pub use default_headers::{DefaultHeadersLayer, DefaultHeadersService};
