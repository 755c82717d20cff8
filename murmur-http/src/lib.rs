//! Minimal single-attempt HTTP JSON client with safe logging.
//!
//! - Per-client default headers (e.g. a browser `User-Agent`)
//! - No timeout unless one is opted into per client or per request
//! - Per-request options: extra headers, bearer auth, query params, timeout
//! - Exactly one attempt per request: failures are classified, never retried
//! - Never logs secret values; `Authorization` is always redacted
//! - Optional *raw* request/response logging via `MURMUR_HTTP_RAW=1`
//!
//! Example (no_run):
//! ```rust
//! # async fn demo() -> Result<(), murmur_http::HttpError> {
//! let client = murmur_http::HttpClient::new("https://www.reddit.com")?;
//! let got: serde_json::Value = client
//!     .get_json("r/rust/hot.json", murmur_http::RequestOpts::default())
//!     .await?;
//! # Ok(()) }
//! ```
//!
//! Observability: structured `tracing` events are emitted for request start,
//! response headers, body snippets (truncated), final errors, and (optionally)
//! raw request/response lines under target `http.raw`.

use murmur_common::{FailureKind, MurmurError};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use reqwest::{Client, Method, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::borrow::Cow;
use std::env;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use thiserror::Error;

// ==============================
// Raw logging toggles
// ==============================

const RAW_ENV: &str = "MURMUR_HTTP_RAW";
const RAW_MAX_BODY: usize = 64 * 1024;
const SNIPPET_MAX: usize = 500;

static REQUEST_SEQ: AtomicU64 = AtomicU64::new(1);

fn raw_enabled() -> bool {
    matches!(
        env::var(RAW_ENV).as_deref(),
        Ok("1") | Ok("true") | Ok("yes")
    )
}

/// Best-effort curl line for repro/debug. Query strings are dropped so that a
/// token passed as a parameter never reaches the logs.
fn make_curl(method: &Method, url: &Url, headers: &HeaderMap, body: Option<&[u8]>) -> String {
    let mut parts = vec!["curl".to_string(), format!("-X{method}")];
    for (name, val) in redact_headers(headers) {
        parts.push(format!("-H '{}: {}'", name, val.replace('\'', r"'\''")));
    }
    if let Some(bytes) = body {
        match std::str::from_utf8(bytes) {
            Ok(s) => {
                let s = truncate_chars(s, RAW_MAX_BODY);
                parts.push(format!("-d '{}'", s.replace('\'', r"'\''")));
            }
            Err(_) => parts.push(format!("--data-binary @- # ({} bytes)", bytes.len())),
        }
    }
    let mut bare = url.clone();
    bare.set_query(None);
    parts.push(format!("'{}'", bare.as_str()));
    parts.join(" ")
}

fn redact_headers(h: &HeaderMap) -> Vec<(String, String)> {
    h.iter()
        .map(|(k, v)| {
            let key = k.as_str().to_string();
            let val = if key.eq_ignore_ascii_case("authorization") {
                "Bearer <redacted>".to_string()
            } else {
                v.to_str().unwrap_or("").to_string()
            };
            (key, val)
        })
        .collect()
}

// ==============================
// Errors
// ==============================

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("invalid URL: {0}")]
    Url(String),
    #[error("request build failed: {0}")]
    Build(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("decode error: {0}, body_snippet: {1}")]
    Decode(String, String),
    #[error("server returned error {status}: {message}")]
    Api { status: StatusCode, message: String },
}

impl HttpError {
    /// Runtime failure class, `None` for errors raised before sending.
    pub fn kind(&self) -> Option<FailureKind> {
        match self {
            HttpError::Network(_) => Some(FailureKind::Transport),
            HttpError::Api { .. } => Some(FailureKind::Status),
            HttpError::Decode(..) => Some(FailureKind::Malformed),
            HttpError::Url(_) | HttpError::Build(_) => None,
        }
    }
}

impl From<HttpError> for MurmurError {
    fn from(e: HttpError) -> Self {
        match e {
            HttpError::Network(m) => MurmurError::Transport(m),
            HttpError::Api { status, message } => MurmurError::Status {
                status: status.as_u16(),
                message,
            },
            HttpError::Decode(m, _) => MurmurError::Malformed(m),
            // A URL assembled from caller input (e.g. a forum name) that fails
            // to parse never reaches the network; report it as a transport
            // failure so the call degrades instead of aborting.
            HttpError::Url(m) | HttpError::Build(m) => MurmurError::Transport(m),
        }
    }
}

// ==============================
// Auth & Request Options
// ==============================

/// Authentication strategies supported by the client.
///
/// ```
/// use murmur_http::Auth;
///
/// let bearer = Auth::Bearer("token");
/// match bearer {
///     Auth::Bearer(value) => assert_eq!(value, "token"),
///     Auth::None => unreachable!(),
/// }
/// ```
#[derive(Clone, Debug, Default)]
pub enum Auth<'a> {
    /// Authorization: Bearer <token>
    Bearer(&'a str),
    #[default]
    None,
}

/// Per-request tuning knobs.
///
/// ```
/// use murmur_http::{Auth, RequestOpts};
/// use std::time::Duration;
///
/// let opts = RequestOpts {
///     timeout: Some(Duration::from_secs(30)),
///     auth: Auth::Bearer("demo"),
///     query: vec![("limit", "25".into())],
///     ..Default::default()
/// };
///
/// assert_eq!(opts.timeout.unwrap().as_secs(), 30);
/// assert_eq!(opts.query.len(), 1);
/// ```
#[derive(Clone, Debug, Default)]
pub struct RequestOpts<'a> {
    pub timeout: Option<Duration>,
    pub auth: Auth<'a>,
    pub headers: Option<HeaderMap>,
    pub query: Vec<(&'a str, Cow<'a, str>)>,
}

// ==============================
// Client
// ==============================

#[derive(Clone, Debug)]
pub struct HttpClient {
    base: Url,
    inner: Client,
    default_headers: HeaderMap,
    /// Applied to every request that sets no timeout of its own.
    pub default_timeout: Option<Duration>,
}

impl HttpClient {
    /// Construct a client anchored to a base URL. A trailing slash is added to
    /// the base so relative paths extend it rather than replace its last
    /// segment.
    ///
    /// ```no_run
    /// use murmur_http::{HttpClient, HttpError};
    /// use std::time::Duration;
    ///
    /// let client = HttpClient::new("https://api.example.com/v1")?;
    /// assert_eq!(client.base_url().as_str(), "https://api.example.com/v1/");
    /// assert_eq!(client.default_timeout, None);
    ///
    /// let bounded = client.with_timeout(Duration::from_secs(30));
    /// assert_eq!(bounded.default_timeout, Some(Duration::from_secs(30)));
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn new(base: &str) -> Result<Self, HttpError> {
        let normalized = if base.ends_with('/') {
            base.to_string()
        } else {
            format!("{base}/")
        };
        let base = Url::parse(&normalized).map_err(|e| HttpError::Url(e.to_string()))?;
        let inner = Client::builder()
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;
        Ok(Self {
            base,
            inner,
            default_headers: HeaderMap::new(),
            default_timeout: None,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Bound every request by `dur`.
    pub fn with_timeout(mut self, dur: Duration) -> Self {
        self.default_timeout = Some(dur);
        self
    }

    /// Attach a static `User-Agent` sent with every request.
    ///
    /// ```
    /// use murmur_http::HttpClient;
    ///
    /// let client = HttpClient::new("https://www.reddit.com")
    ///     .unwrap()
    ///     .with_user_agent("Mozilla/5.0")
    ///     .unwrap();
    /// assert_eq!(client.default_headers()["user-agent"], "Mozilla/5.0");
    /// ```
    pub fn with_user_agent(self, agent: &str) -> Result<Self, HttpError> {
        self.with_header(USER_AGENT, agent)
    }

    /// Attach a static header sent with every request.
    pub fn with_header(mut self, name: HeaderName, value: &str) -> Result<Self, HttpError> {
        let value = HeaderValue::from_str(value)
            .map_err(|e| HttpError::Build(format!("invalid header {name}: {e}")))?;
        self.default_headers.insert(name, value);
        Ok(self)
    }

    pub fn default_headers(&self) -> &HeaderMap {
        &self.default_headers
    }

    /// GET JSON with per-request options.
    pub async fn get_json<T>(&self, path: &str, opts: RequestOpts<'_>) -> Result<T, HttpError>
    where
        T: DeserializeOwned,
    {
        self.request_json::<(), T>(Method::GET, path, None, opts)
            .await
    }

    /// POST a JSON body with per-request options.
    pub async fn post_json<B, T>(
        &self,
        path: &str,
        body: &B,
        opts: RequestOpts<'_>,
    ) -> Result<T, HttpError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request_json(Method::POST, path, Some(body), opts)
            .await
    }

    // ==============================
    // Core request implementation
    // ==============================

    async fn request_json<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        opts: RequestOpts<'_>,
    ) -> Result<T, HttpError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self
            .base
            .join(path.trim_start_matches('/'))
            .map_err(|e| HttpError::Url(e.to_string()))?;
        let timeout = opts.timeout.or(self.default_timeout);
        let req_id = format!("r{}", REQUEST_SEQ.fetch_add(1, Ordering::Relaxed));

        // ----- Build request -----
        let mut headers = self.default_headers.clone();
        if let Some(extra) = &opts.headers {
            for (k, v) in extra.iter() {
                headers.insert(k, v.clone());
            }
        }

        let mut rb = self.inner.request(method.clone(), url.clone());
        if let Some(timeout) = timeout {
            rb = rb.timeout(timeout);
        }

        if !opts.query.is_empty() {
            let pairs: Vec<(&str, &str)> = opts.query.iter().map(|(k, v)| (*k, v.as_ref())).collect();
            rb = rb.query(&pairs);
        }

        let body_bytes = match body {
            Some(b) => {
                let bytes = serde_json::to_vec(b).map_err(|e| HttpError::Build(e.to_string()))?;
                headers.insert(
                    reqwest::header::CONTENT_TYPE,
                    HeaderValue::from_static("application/json"),
                );
                Some(bytes)
            }
            None => None,
        };

        let auth_kind = match opts.auth {
            Auth::Bearer(tok) => {
                let tok = sanitize_api_key(tok)?;
                rb = rb.bearer_auth(tok);
                "bearer"
            }
            Auth::None => "none",
        };

        rb = rb.headers(headers.clone());
        if let Some(bytes) = &body_bytes {
            rb = rb.body(bytes.clone());
        }

        // ----- Safe request logging (pre-send) -----
        let query_log: Vec<(&str, &str)> = opts
            .query
            .iter()
            .map(|(k, v)| {
                if is_secret_param(k) {
                    (*k, "<redacted>")
                } else {
                    (*k, v.as_ref())
                }
            })
            .collect();

        tracing::debug!(
            req_id=%req_id,
            method=%method,
            host_path=%format!("{}{}", url.host_str().unwrap_or("-"), url.path()),
            query=?query_log,
            timeout_ms=?timeout.map(|t| t.as_millis() as u64),
            auth_kind,
            has_body=%body_bytes.is_some(),
            "http.request.start"
        );

        if raw_enabled() {
            let curl = make_curl(&method, &url, &headers, body_bytes.as_deref());
            tracing::debug!(target: "http.raw", %req_id, %curl, "request");
        }

        // ----- Send (single attempt) -----
        let t0 = Instant::now();
        let resp = rb.send().await.map_err(|err| {
            let message = err.to_string();
            tracing::warn!(req_id=%req_id, message=%message, "http.network_error.send");
            HttpError::Network(message)
        })?;
        let status = resp.status();
        let resp_headers = resp.headers().clone();
        let bytes = resp.bytes().await.map_err(|err| {
            let message = err.to_string();
            tracing::warn!(req_id=%req_id, message=%message, "http.network_error.body");
            HttpError::Network(message)
        })?;
        let dur_ms = t0.elapsed().as_millis() as u64;

        let header_str = |name: &str| resp_headers.get(name).and_then(|v| v.to_str().ok());

        tracing::debug!(
            req_id=%req_id,
            %status,
            duration_ms=dur_ms,
            body_len=bytes.len(),
            rate_limit.used=?header_str("x-ratelimit-used"),
            rate_limit.remaining=?header_str("x-ratelimit-remaining"),
            rate_limit.reset=?header_str("x-ratelimit-reset"),
            "http.response.headers"
        );

        if raw_enabled() {
            let text = String::from_utf8_lossy(&bytes);
            tracing::debug!(
                target: "http.raw",
                %req_id,
                status=%status,
                duration_ms=dur_ms,
                headers=?redact_headers(&resp_headers),
                body=%truncate_chars(&text, RAW_MAX_BODY),
                "response"
            );
        }

        let snippet = snip_body(&bytes);
        tracing::trace!(req_id=%req_id, body_snippet=%snippet, "http.response.body_snippet");

        if status.is_success() {
            return serde_json::from_slice::<T>(&bytes).map_err(|e| {
                tracing::warn!(
                    req_id=%req_id,
                    serde_line=%e.line(),
                    serde_col=%e.column(),
                    serde_err=%e,
                    body_snippet=%snippet,
                    "http.response.decode_error"
                );
                HttpError::Decode(e.to_string(), snippet)
            });
        }

        let message = extract_error_message(&bytes);
        tracing::warn!(
            req_id=%req_id,
            %status,
            message=%message,
            body_snippet=%snippet,
            "http.error"
        );
        Err(HttpError::Api { status, message })
    }
}

// ==============================
// Helpers
// ==============================

fn is_secret_param(name: &str) -> bool {
    matches!(
        name.to_ascii_lowercase().as_str(),
        "access_token" | "authorization" | "auth" | "key" | "api_key" | "token" | "secret"
    )
}

/// Pull a human-readable message out of an error body.
///
/// Understands `{"error":{"message":..}}`, `{"message":..}`, `{"detail":..}`
/// and `{"error":".."}`; anything else falls back to a body snippet, or the
/// status reason when the body is empty.
fn extract_error_message(body: &[u8]) -> String {
    if let Ok(v) = serde_json::from_slice::<Value>(body) {
        let nested = v
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(Value::as_str);
        let flat = ["message", "detail", "error"]
            .iter()
            .find_map(|k| v.get(*k).and_then(Value::as_str));
        if let Some(msg) = nested.or(flat).filter(|m| !m.is_empty()) {
            return msg.to_string();
        }
    }
    let snip = snip_body(body);
    if snip.trim().is_empty() {
        "empty response body".to_string()
    } else {
        snip
    }
}

fn snip_body(body: &[u8]) -> String {
    truncate_chars(&String::from_utf8_lossy(body), SNIPPET_MAX)
}

fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

fn sanitize_api_key(raw: &str) -> Result<String, HttpError> {
    let mut s = raw
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .to_string();
    s.retain(|ch| !ch.is_ascii_whitespace());

    if !s.is_ascii() {
        return Err(HttpError::Build("API key contains non-ASCII bytes".into()));
    }
    if s.bytes().any(|b| b < 0x20 || b == 0x7F) {
        return Err(HttpError::Build(
            "API key contains control characters".into(),
        ));
    }
    HeaderValue::from_str(&format!("Bearer {s}"))
        .map_err(|e| HttpError::Build(format!("invalid Authorization header: {e}")))?;
    Ok(s)
}
