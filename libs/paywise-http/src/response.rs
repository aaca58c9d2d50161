use crate::error::HttpError;
use bytes::{Bytes, BytesMut};
use http::{HeaderMap, Response, StatusCode};
use http_body_util::BodyExt;
use serde::de::DeserializeOwned;

/// Most of a non-2xx body kept in [`HttpError::HttpStatus`]'s `body_preview`.
///
/// PayWise error bodies are `{"detail": ...}` or a field error map.
pub const ERROR_BODY_PREVIEW_LIMIT: usize = 8 * 1024;

/// Response body after the decompression layer, boxed.
pub type ResponseBody =
    http_body_util::combinators::BoxBody<Bytes, Box<dyn std::error::Error + Send + Sync>>;

/// A response whose body has not been read yet.
///
/// [`json`](Self::json), [`text`](Self::text) and
/// [`checked_bytes`](Self::checked_bytes) turn a non-2xx status into
/// [`HttpError::HttpStatus`]; [`bytes`](Self::bytes) reads whatever came
/// back. Every reader stops at the client's `max_body_size`.
#[derive(Debug)]
pub struct HttpResponse {
    pub(crate) inner: Response<ResponseBody>,
    pub(crate) max_body_size: usize,
}

impl HttpResponse {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.inner.status()
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    /// Fail on a non-2xx status, leaving the body unread.
    ///
    /// # Errors
    ///
    /// `HttpError::HttpStatus` with an empty preview.
    pub fn error_for_status(self) -> Result<Self, HttpError> {
        let status = self.inner.status();
        if status.is_success() {
            Ok(self)
        } else {
            Err(HttpError::HttpStatus {
                status,
                body_preview: String::new(),
                content_type: content_type(self.inner.headers()),
            })
        }
    }

    /// Raw body, whatever the status.
    ///
    /// # Errors
    ///
    /// `HttpError::BodyTooLarge` past the size limit, `HttpError::Transport`
    /// if the connection drops mid-body.
    pub async fn bytes(self) -> Result<Bytes, HttpError> {
        collect_capped(self.inner, self.max_body_size).await
    }

    /// # Errors
    ///
    /// As [`bytes`](Self::bytes), plus `HttpError::HttpStatus` for a non-2xx
    /// status.
    pub async fn checked_bytes(self) -> Result<Bytes, HttpError> {
        collect_success(self.inner, self.max_body_size).await
    }

    /// Deserialize a 2xx JSON body.
    ///
    /// # Errors
    ///
    /// As [`checked_bytes`](Self::checked_bytes), plus `HttpError::Json` when
    /// the body does not match `T`.
    pub async fn json<T: DeserializeOwned>(self) -> Result<T, HttpError> {
        let body = collect_success(self.inner, self.max_body_size).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// A 2xx body as text; invalid UTF-8 is replaced, not rejected.
    ///
    /// # Errors
    ///
    /// As [`checked_bytes`](Self::checked_bytes).
    pub async fn text(self) -> Result<String, HttpError> {
        let body = collect_success(self.inner, self.max_body_size).await?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

fn content_type(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(http::header::CONTENT_TYPE)?;
    value.to_str().ok().map(str::to_owned)
}

async fn collect_success(
    response: Response<ResponseBody>,
    max_body_size: usize,
) -> Result<Bytes, HttpError> {
    let status = response.status();
    if status.is_success() {
        return collect_capped(response, max_body_size).await;
    }

    let content_type = content_type(response.headers());
    let cap = max_body_size.min(ERROR_BODY_PREVIEW_LIMIT);
    // the status matters more than an oversized error page
    let body_preview = match collect_capped(response, cap).await {
        Ok(body) => String::from_utf8_lossy(&body).into_owned(),
        Err(HttpError::BodyTooLarge { .. }) => "<body too large for preview>".to_owned(),
        Err(e) => return Err(e),
    };
    Err(HttpError::HttpStatus {
        status,
        body_preview,
        content_type,
    })
}

/// Gather data frames until the body ends or `limit` bytes would be passed.
async fn collect_capped(response: Response<ResponseBody>, limit: usize) -> Result<Bytes, HttpError> {
    let mut body = std::pin::pin!(response.into_body());
    let mut buf = BytesMut::new();

    while let Some(frame) = body.frame().await {
        let Ok(data) = frame.map_err(HttpError::Transport)?.into_data() else {
            continue;
        };
        let actual = buf.len() + data.len();
        if actual > limit {
            return Err(HttpError::BodyTooLarge { limit, actual });
        }
        buf.extend_from_slice(&data);
    }
    Ok(buf.freeze())
}
