use http::StatusCode;
use paywise_auth::{ConfigError, SessionError};
use paywise_http::{ERROR_BODY_PREVIEW_LIMIT, HttpError, HttpResponse};
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Errors returned by the PayWise API calls.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    #[error(transparent)]
    Http(#[from] HttpError),

    /// The server answered with a non-2xx status. `body` holds the start of
    /// the server's error payload (usually DRF validation errors).
    #[error("request rejected with HTTP {status}")]
    Rejected { status: StatusCode, body: String },

    /// A 401 that the refresh cycle could not recover from.
    #[error("session expired, please login again")]
    SessionExpired,

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid amount '{0}'")]
    InvalidAmount(String),
}

impl ApiError {
    /// HTTP status for `Rejected`, `SessionExpired` and transport status errors.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            Self::SessionExpired => Some(StatusCode::UNAUTHORIZED),
            Self::Http(e) => e.status(),
            _ => None,
        }
    }
}

/// Decode a 2xx body; any other status becomes [`ApiError::Rejected`].
pub(crate) async fn read_json<T: DeserializeOwned>(response: HttpResponse) -> Result<T, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let body = response.bytes().await?;
    let preview = &body[..body.len().min(ERROR_BODY_PREVIEW_LIMIT)];
    Err(ApiError::Rejected {
        status,
        body: String::from_utf8_lossy(preview).into_owned(),
    })
}

/// Like [`read_json`], for calls made with the session: a 401 that got past
/// the refresh cycle means the session is gone.
pub(crate) async fn read_session_json<T: DeserializeOwned>(
    response: HttpResponse,
) -> Result<T, ApiError> {
    if response.status() == StatusCode::UNAUTHORIZED {
        return Err(ApiError::SessionExpired);
    }
    read_json(response).await
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn display_never_includes_body() {
        let err = ApiError::Rejected {
            status: StatusCode::BAD_REQUEST,
            body: r#"{"password":["too short"]}"#.to_owned(),
        };
        assert_eq!(err.to_string(), "request rejected with HTTP 400 Bad Request");
        assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
    }

    #[test]
    fn session_expired_message() {
        assert_eq!(
            ApiError::SessionExpired.to_string(),
            "session expired, please login again"
        );
        assert_eq!(
            ApiError::SessionExpired.status(),
            Some(StatusCode::UNAUTHORIZED)
        );
        assert_eq!(ApiError::InvalidAmount("abc".to_owned()).status(), None);
    }
}
