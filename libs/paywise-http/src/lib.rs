#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![warn(warnings)]

//! HTTP transport for the PayWise client.
//!
//! A hyper-based client with:
//! - TLS via rustls (HTTPS only unless insecure HTTP is allowed explicitly)
//! - Connection pooling
//! - Per-request timeouts
//! - Default `User-Agent` and `Accept: application/json` headers
//! - Optional concurrency limiting
//! - Transparent response decompression (gzip, brotli, deflate)
//! - A single slot for an authentication layer (see [`HttpClientBuilder::with_auth_layer`])
//!
//! `send()` resolves to `Ok` for every HTTP status, including 4xx and 5xx.
//! Only transport, TLS and timeout failures surface as [`HttpError`].
//! There is no retry layer; callers decide when a request is
//! worth repeating.
//!
//! # Example
//!
//! ```ignore
//! use paywise_http::HttpClient;
//! use std::time::Duration;
//!
//! let client = HttpClient::builder()
//!     .timeout(Duration::from_secs(10))
//!     .build()?;
//!
//! let groups: serde_json::Value = client
//!     .get("https://paywise.example.com/api/expenses/groups/")
//!     .send()
//!     .await?
//!     .json()
//!     .await?;
//! ```

mod builder;
mod client;
mod config;
mod error;
mod layers;
mod request;
mod response;
mod tls;

pub use builder::{HttpClientBuilder, InnerService};
pub use client::HttpClient;
pub use config::{
    DEFAULT_USER_AGENT, HttpClientConfig, RateLimitConfig, TlsRootConfig, TransportSecurity,
};
pub use error::{HttpError, InvalidUriKind};
pub use layers::{DefaultHeadersLayer, DefaultHeadersService};
pub use request::RequestBuilder;
pub use response::{ERROR_BODY_PREVIEW_LIMIT, HttpResponse, ResponseBody};
