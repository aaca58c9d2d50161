use crate::client::{BufferedService, map_buffer_error, try_acquire_buffer_slot};
use crate::config::TransportSecurity;
use crate::error::{HttpError, InvalidUriKind};
use crate::response::{HttpResponse, ResponseBody};
use bytes::Bytes;
use http::header::{HeaderMap, HeaderName, HeaderValue};
use http::{Request, Response};
use http_body_util::Full;
use serde::Serialize;
use tower::Service;

#[derive(Clone, Debug)]
enum BodyKind {
    Empty,
    Bytes(Bytes),
    /// Serialized JSON; gets a default `Content-Type: application/json`
    Json(Bytes),
}

/// HTTP request builder with fluent API
///
/// Created by [`HttpClient::get`](crate::HttpClient::get),
/// [`HttpClient::request`](crate::HttpClient::request) and friends.
///
/// Query strings are not composed here. Build the final URL with `url::Url`
/// and pass it in as a string:
///
/// ```ignore
/// let mut url = base.join("expenses/expenses/")?;
/// url.query_pairs_mut().append_pair("category", "Food");
/// let resp = client.get(url.as_str()).send().await?;
/// ```
#[must_use = "RequestBuilder does nothing until .send() is called"]
pub struct RequestBuilder {
    service: BufferedService,
    max_body_size: usize,
    method: http::Method,
    url: String,
    headers: HeaderMap,
    body: BodyKind,
    /// Error captured during building, reported by `send()`
    error: Option<HttpError>,
    transport_security: TransportSecurity,
}

impl RequestBuilder {
    pub(crate) fn new(
        service: BufferedService,
        max_body_size: usize,
        method: http::Method,
        url: String,
        transport_security: TransportSecurity,
    ) -> Self {
        Self {
            service,
            max_body_size,
            method,
            url,
            headers: HeaderMap::new(),
            body: BodyKind::Empty,
            error: None,
            transport_security,
        }
    }

    /// Add a single header. Invalid names or values are reported by `send()`.
    pub fn header(mut self, name: &str, value: &str) -> Self {
        if self.error.is_some() {
            return self;
        }

        match (HeaderName::try_from(name), HeaderValue::try_from(value)) {
            (Ok(name), Ok(value)) => {
                self.headers.append(name, value);
            }
            (Err(e), _) => {
                self.error = Some(HttpError::InvalidHeaderName(e));
            }
            (_, Err(e)) => {
                self.error = Some(HttpError::InvalidHeaderValue(e));
            }
        }
        self
    }

    /// Merge an already-validated header map into the request.
    ///
    /// Values for names present in `headers` replace earlier ones.
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        let mut last_name = None;
        for (name, value) in headers {
            // HeaderMap's owned iterator yields the name only on the first value
            if let Some(name) = name {
                self.headers.remove(&name);
                last_name = Some(name);
            }
            if let Some(name) = &last_name {
                self.headers.append(name.clone(), value);
            }
        }
        self
    }

    /// Serialize `body` as the JSON request body.
    ///
    /// Sets `Content-Type: application/json` unless the caller set one.
    ///
    /// # Errors
    ///
    /// Returns a deferred builder error, or `HttpError::Json` if
    /// serialization fails.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, HttpError> {
        if let Some(e) = self.error.take() {
            return Err(e);
        }

        let json_bytes = serde_json::to_vec(body)?;
        self.body = BodyKind::Json(Bytes::from(json_bytes));
        Ok(self)
    }

    pub fn body_bytes(mut self, body: Bytes) -> Self {
        self.body = BodyKind::Bytes(body);
        self
    }

    /// Send the request.
    ///
    /// Every HTTP status, including 4xx and 5xx, is an `Ok` response.
    ///
    /// # Errors
    ///
    /// Returns `HttpError` for deferred builder errors, a URL or scheme the
    /// transport mode rejects, network and TLS failures, timeouts, and a
    /// saturated client (`Overloaded`).
    pub async fn send(mut self) -> Result<HttpResponse, HttpError> {
        if let Some(e) = self.error.take() {
            return Err(e);
        }

        let uri = checked_uri(&self.url, self.transport_security)?;

        if matches!(self.body, BodyKind::Json(_))
            && !self.headers.contains_key(http::header::CONTENT_TYPE)
        {
            self.headers.insert(
                http::header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            );
        }

        let body_bytes = match self.body {
            BodyKind::Empty => Bytes::new(),
            BodyKind::Bytes(b) | BodyKind::Json(b) => b,
        };

        let mut request = Request::builder()
            .method(self.method)
            .uri(uri)
            .body(Full::new(body_bytes))?;
        *request.headers_mut() = self.headers;

        try_acquire_buffer_slot(&mut self.service).await?;

        let inner: Response<ResponseBody> =
            self.service.call(request).await.map_err(map_buffer_error)?;

        Ok(HttpResponse {
            inner,
            max_body_size: self.max_body_size,
        })
    }
}

/// Parse `url` and refuse anything the transport mode would not dial.
fn checked_uri(url: &str, transport: TransportSecurity) -> Result<http::Uri, HttpError> {
    let invalid = |kind, reason: String| HttpError::InvalidUri {
        url: url.to_owned(),
        kind,
        reason,
    };

    let uri = url
        .parse::<http::Uri>()
        .map_err(|e| invalid(InvalidUriKind::ParseError, e.to_string()))?;
    if uri.authority().is_none() {
        return Err(invalid(
            InvalidUriKind::MissingAuthority,
            "no host; was the path joined onto the API base?".to_owned(),
        ));
    }

    let refused = |scheme: &str, reason: &str| HttpError::InvalidScheme {
        scheme: scheme.to_owned(),
        reason: reason.to_owned(),
    };
    match (uri.scheme_str(), transport) {
        (Some("https"), _) | (Some("http"), TransportSecurity::AllowInsecureHttp) => Ok(uri),
        (Some("http"), TransportSecurity::TlsOnly) => Err(refused(
            "http",
            "client is TlsOnly; plain http needs AllowInsecureHttp",
        )),
        (Some(other), _) => Err(refused(other, "expected http or https")),
        (None, _) => Err(invalid(InvalidUriKind::MissingScheme, "no scheme".to_owned())),
    }
}
