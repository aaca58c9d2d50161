use std::time::Duration;

use thiserror::Error;

/// Why a request URL was rejected before anything went on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum InvalidUriKind {
    ParseError,
    /// No host, e.g. a bare path that was never joined onto the API base.
    MissingAuthority,
    MissingScheme,
}

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Everything that can go wrong between building a request and reading its
/// body.
///
/// `send()` never fails on a status code. A 4xx or 5xx only turns into
/// [`HttpError::HttpStatus`] when the body is read with one of the checked
/// readers ([`HttpResponse::json`](crate::HttpResponse::json),
/// [`HttpResponse::text`](crate::HttpResponse::text)).
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum HttpError {
    #[error("could not assemble request: {0}")]
    RequestBuild(#[from] http::Error),

    #[error("bad header name: {0}")]
    InvalidHeaderName(#[from] http::header::InvalidHeaderName),

    #[error("bad header value: {0}")]
    InvalidHeaderValue(#[from] http::header::InvalidHeaderValue),

    #[error("no response within {0:?}")]
    Timeout(Duration),

    /// Connection failures, and anything a layer below the auth slot reports
    /// (session storage included).
    #[error("transport failure: {0}")]
    Transport(#[source] BoxError),

    #[error("TLS setup failed: {0}")]
    Tls(#[source] BoxError),

    #[error("response body over {limit} bytes (read {actual})")]
    BodyTooLarge { limit: usize, actual: usize },

    /// Non-2xx status seen by a checked body reader. `body_preview` is
    /// truncated and meant for messages, not parsing.
    #[error("server answered {status}: {body_preview}")]
    HttpStatus {
        status: http::StatusCode,
        body_preview: String,
        content_type: Option<String>,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The in-flight limit is reached; the request was shed, not queued.
    #[error("too many requests in flight")]
    Overloaded,

    #[error("HTTP client worker is gone")]
    ServiceClosed,

    /// `reason` is free text for logs; match on `kind`.
    #[error("invalid URL '{url}': {reason}")]
    InvalidUri {
        url: String,
        kind: InvalidUriKind,
        reason: String,
    },

    #[error("scheme '{scheme}' refused: {reason}")]
    InvalidScheme { scheme: String, reason: String },
}

impl HttpError {
    /// Status code of an [`HttpError::HttpStatus`], if that is what this is.
    #[must_use]
    pub fn status(&self) -> Option<http::StatusCode> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<hyper::Error> for HttpError {
    fn from(err: hyper::Error) -> Self {
        Self::Transport(err.into())
    }
}

impl From<hyper_util::client::legacy::Error> for HttpError {
    fn from(err: hyper_util::client::legacy::Error) -> Self {
        Self::Transport(err.into())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use std::error::Error;
    use std::fmt;

    #[derive(Debug)]
    struct StoreFailure;

    impl fmt::Display for StoreFailure {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("session file unreadable")
        }
    }

    impl Error for StoreFailure {}

    #[test]
    fn transport_error_keeps_source_for_downcast() {
        let err = HttpError::Transport(Box::new(StoreFailure));
        let source = err.source().unwrap();
        assert!(source.downcast_ref::<StoreFailure>().is_some());
        assert_eq!(err.to_string(), "transport failure: session file unreadable");
    }

    #[test]
    fn status_accessor_only_for_http_status() {
        let err = HttpError::HttpStatus {
            status: http::StatusCode::UNAUTHORIZED,
            body_preview: String::new(),
            content_type: None,
        };
        assert_eq!(err.status(), Some(http::StatusCode::UNAUTHORIZED));
        assert_eq!(HttpError::Overloaded.status(), None);
    }
}
