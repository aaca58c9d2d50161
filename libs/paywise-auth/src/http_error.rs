/// Render an [`HttpError`](paywise_http::HttpError) for logs with a context
/// prefix such as `"token refresh"`.
///
/// Status errors show only the status code. Response bodies are left out
/// because the auth endpoints echo credentials and validation details.
#[must_use]
pub fn format_http_error(e: &paywise_http::HttpError, prefix: &str) -> String {
    use paywise_http::HttpError;

    match e {
        HttpError::HttpStatus { status, .. } => format!("{prefix} HTTP {status}"),
        HttpError::Json(err) => format!("{prefix} JSON parse failed: {err}"),
        HttpError::Timeout(duration) => {
            format!("{prefix} request timed out after {duration:?}")
        }
        HttpError::Transport(err) => format!("{prefix} transport error: {err}"),
        HttpError::BodyTooLarge { limit, actual } => {
            format!("{prefix} response too large: limit {limit} bytes, got {actual} bytes")
        }
        HttpError::Tls(err) => format!("{prefix} TLS error: {err}"),
        HttpError::RequestBuild(err) => format!("{prefix} request build failed: {err}"),
        HttpError::InvalidHeaderName(err) => format!("{prefix} invalid header name: {err}"),
        HttpError::InvalidHeaderValue(_) => format!("{prefix} invalid header value"),
        HttpError::Overloaded => format!("{prefix} request rejected: client overloaded"),
        HttpError::ServiceClosed => format!("{prefix} client unavailable"),
        HttpError::InvalidUri { url, reason, .. } => {
            format!("{prefix} invalid URL '{url}': {reason}")
        }
        HttpError::InvalidScheme { scheme, reason } => {
            format!("{prefix} invalid scheme '{scheme}': {reason}")
        }
        // unknown future variants: no detail
        _ => format!("{prefix} request failed"),
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use paywise_http::HttpError;
    use std::time::Duration;

    #[test]
    fn http_status_excludes_body() {
        let err = HttpError::HttpStatus {
            status: http::StatusCode::BAD_REQUEST,
            body_preview: r#"{"password":["hunter2 is too common"]}"#.into(),
            content_type: Some("application/json".into()),
        };
        let msg = format_http_error(&err, "login");
        assert_eq!(msg, "login HTTP 400 Bad Request");
        assert!(!msg.contains("hunter2"));
    }

    #[test]
    fn timeout_and_overload_render() {
        assert_eq!(
            format_http_error(&HttpError::Timeout(Duration::from_secs(30)), "token refresh"),
            "token refresh request timed out after 30s"
        );
        assert_eq!(
            format_http_error(&HttpError::Overloaded, "profile"),
            "profile request rejected: client overloaded"
        );
    }

    #[test]
    fn invalid_header_value_hides_value() {
        let bad = http::HeaderValue::from_str("Bearer tok\n").unwrap_err();
        let msg = format_http_error(&HttpError::InvalidHeaderValue(bad), "auth");
        assert_eq!(msg, "auth invalid header value");
    }
}
