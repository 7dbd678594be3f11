//! Generic REST adapter for the ABS2 web API.
//!
//! All network I/O goes through [`RestAdapter::execute`]. It knows nothing
//! about individual endpoints beyond path and verb: it attaches the default
//! headers, sends the JSON body, decodes the JSON response and classifies it
//! by status code.

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method};
use serde_json::Value;
use tracing::{Instrument, Span, debug, debug_span, error, info_span, warn};

use crate::config::Abs2Config;
use crate::error::{Abs2Error, Abs2Result};
use crate::models::ApiResponse;

/// Header carrying the API key on every request.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Query-string parameters for a request.
pub type QueryParams<'a> = &'a [(&'a str, &'a str)];

/// Bytes escaped in a single path segment: the URL path set, the segment
/// separators `/` and `\`, and `%` itself.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Endpoint path `collection/name` with `name` escaped as one segment.
///
/// Empty names and the dot segments `.` and `..` are rejected, since URL
/// parsing would otherwise address the collection or its parent.
pub fn resource_path(collection: &str, name: &str) -> Abs2Result<String> {
    if matches!(name, "" | "." | "..") {
        return Err(Abs2Error::InvalidName(name.to_string()));
    }
    Ok(format!("{collection}/{}", utf8_percent_encode(name, SEGMENT)))
}

/// Whether `status` counts as success (`200..=299`).
pub fn is_success(status: u16) -> bool {
    (200..=299).contains(&status)
}

/// Build an `Authorization: Bearer <token>` header map.
pub fn bearer(token: &str) -> Abs2Result<HeaderMap> {
    let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
        .map_err(|_| Abs2Error::InvalidHeader(AUTHORIZATION.to_string()))?;
    value.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, value);
    Ok(headers)
}

/// Low-level HTTP adapter.
///
/// Holds only immutable configuration and a `reqwest::Client`, so clones are
/// cheap and can be used from several tasks at once.
#[derive(Clone)]
pub struct RestAdapter {
    client: Client,
    /// Base URL, always ending with `/`.
    base_url: String,
    api_key: HeaderValue,
    /// Span all request events are emitted under.
    span: Span,
}

impl std::fmt::Debug for RestAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestAdapter")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl RestAdapter {
    /// Create an adapter that logs under an `abs2_client` span.
    pub fn new(config: &Abs2Config) -> Abs2Result<Self> {
        let span = info_span!("abs2_client", host = %config.host);
        Self::with_span(config, span)
    }

    /// Create an adapter that emits its trace events under `span`.
    pub fn with_span(config: &Abs2Config, span: Span) -> Abs2Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(timeout) = config.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        if !config.ssl_verify {
            warn!(parent: &span, "TLS certificate verification is disabled");
            builder = builder.danger_accept_invalid_certs(true);
        }
        let client = builder.build()?;

        let mut api_key = HeaderValue::from_str(&config.api_key)
            .map_err(|_| Abs2Error::InvalidHeader(API_KEY_HEADER.to_string()))?;
        api_key.set_sensitive(true);

        Ok(Self {
            client,
            base_url: config.base_url(),
            api_key,
            span,
        })
    }

    /// Base URL endpoint paths are appended to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Span the adapter logs under.
    pub fn span(&self) -> &Span {
        &self.span
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    /// Default headers with `extra` merged over them.
    fn headers(&self, extra: Option<&HeaderMap>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(HeaderName::from_static(API_KEY_HEADER), self.api_key.clone());
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(extra) = extra {
            for (name, value) in extra {
                headers.insert(name.clone(), value.clone());
            }
        }
        headers
    }

    /// Send one request and classify the response.
    ///
    /// The body must decode as JSON before the status is looked at, so a
    /// non-JSON error page yields [`Abs2Error::Decode`]. A decoded body with
    /// a status outside `200..=299` yields [`Abs2Error::Api`].
    pub async fn execute(
        &self,
        method: Method,
        endpoint: &str,
        params: Option<QueryParams<'_>>,
        body: Option<&Value>,
        extra_headers: Option<&HeaderMap>,
    ) -> Abs2Result<ApiResponse> {
        let url = self.url(endpoint);
        let span = debug_span!(parent: &self.span, "request", method = %method, url = %url);
        let headers = self.headers(extra_headers);

        self.send(method, url, params, body, headers)
            .instrument(span)
            .await
    }

    async fn send(
        &self,
        method: Method,
        url: String,
        params: Option<QueryParams<'_>>,
        body: Option<&Value>,
        headers: HeaderMap,
    ) -> Abs2Result<ApiResponse> {
        debug!(?params, "sending request");

        let mut request = self.client.request(method, &url).headers(headers);
        if let Some(params) = params {
            request = request.query(params);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            error!(error = %e, "request failed");
            Abs2Error::Transport(e)
        })?;

        let status = response.status();
        let code = status.as_u16();
        let reason = status.canonical_reason().unwrap_or_default().to_string();

        let raw = response.bytes().await.map_err(|e| {
            error!(status = code, error = %e, "failed to read response body");
            Abs2Error::Transport(e)
        })?;

        let data: Value = serde_json::from_slice(&raw).map_err(|e| {
            error!(success = false, status = code, error = %e, "bad JSON in response");
            Abs2Error::decode("response body", e)
        })?;

        if is_success(code) {
            debug!(success = true, status = code, reason = %reason, "request complete");
            return Ok(ApiResponse::new(code, reason, data));
        }

        error!(success = false, status = code, reason = %reason, "request rejected");
        let message = server_message(&data)
            .or_else(|| (!reason.is_empty()).then_some(reason))
            .unwrap_or_else(|| code.to_string());
        Err(Abs2Error::Api {
            status: code,
            message,
        })
    }

    /// `GET` an endpoint.
    pub async fn get(
        &self,
        endpoint: &str,
        params: Option<QueryParams<'_>>,
        extra_headers: Option<&HeaderMap>,
    ) -> Abs2Result<ApiResponse> {
        self.execute(Method::GET, endpoint, params, None, extra_headers)
            .await
    }

    /// `POST` to an endpoint.
    pub async fn post(
        &self,
        endpoint: &str,
        params: Option<QueryParams<'_>>,
        body: Option<&Value>,
        extra_headers: Option<&HeaderMap>,
    ) -> Abs2Result<ApiResponse> {
        self.execute(Method::POST, endpoint, params, body, extra_headers)
            .await
    }

    /// `PUT` to an endpoint.
    pub async fn put(
        &self,
        endpoint: &str,
        params: Option<QueryParams<'_>>,
        body: Option<&Value>,
        extra_headers: Option<&HeaderMap>,
    ) -> Abs2Result<ApiResponse> {
        self.execute(Method::PUT, endpoint, params, body, extra_headers)
            .await
    }

    /// `DELETE` an endpoint.
    pub async fn delete(
        &self,
        endpoint: &str,
        params: Option<QueryParams<'_>>,
        body: Option<&Value>,
        extra_headers: Option<&HeaderMap>,
    ) -> Abs2Result<ApiResponse> {
        self.execute(Method::DELETE, endpoint, params, body, extra_headers)
            .await
    }
}

/// The `message` field of an error body, when the server sent one.
fn server_message(data: &Value) -> Option<String> {
    data.get("message")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}
