//! Error types for igview.
//!
//! [`UpstreamError`] is the closed taxonomy of everything that can go wrong when
//! talking to IMAI. Each variant carries an [`UpstreamContext`] describing the
//! request that failed: path, parameters, status, allowlisted headers and body.
//! The API key is never part of that context.
//!
//! [`IgviewError`] wraps upstream failures together with the errors raised at the
//! edges of the system (configuration, caller input, image proxy).

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;
use thiserror::Error;

use crate::constants::MAX_DIAGNOSTIC_BODY_BYTES;

/// Result type alias using `IgviewError`.
pub type Result<T> = std::result::Result<T, IgviewError>;

// ═══════════════════════════════════════════════════════════════════════════════
// UPSTREAM CONTEXT
// ═══════════════════════════════════════════════════════════════════════════════

/// Body of a failed upstream response, parsed as JSON when possible.
#[derive(Clone, Debug, PartialEq)]
pub enum UpstreamBody {
    /// Body parsed as JSON.
    Json(Value),
    /// Body that was not valid JSON, kept as (truncated) text.
    Text(String),
    /// No body.
    Empty,
}

impl UpstreamBody {
    /// Parses a raw body: JSON first, then raw text.
    pub fn parse(raw: &str) -> Self {
        if raw.trim().is_empty() {
            return UpstreamBody::Empty;
        }
        match serde_json::from_str(raw) {
            Ok(value) => UpstreamBody::Json(value),
            Err(_) => UpstreamBody::Text(truncate(raw)),
        }
    }

    /// Returns the JSON value if the body parsed.
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            UpstreamBody::Json(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for UpstreamBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpstreamBody::Json(v) => write!(f, "{}", v),
            UpstreamBody::Text(t) => f.write_str(t),
            UpstreamBody::Empty => Ok(()),
        }
    }
}

/// Truncates diagnostic text on a char boundary.
pub(crate) fn truncate(raw: &str) -> String {
    if raw.len() <= MAX_DIAGNOSTIC_BODY_BYTES {
        return raw.to_string();
    }
    let mut end = MAX_DIAGNOSTIC_BODY_BYTES;
    while !raw.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &raw[..end])
}

/// Describes the upstream request that produced an error.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UpstreamContext {
    /// HTTP status returned by the upstream, if a response was received
    pub status: Option<u16>,
    /// Operation path relative to the base URL (e.g. `raw/ig/user/info/`)
    pub path: String,
    /// Query parameters sent (never includes the API key)
    pub params: Vec<(String, String)>,
    /// Allowlisted response headers
    pub headers: BTreeMap<String, String>,
    /// Response body, if one was read
    pub body: Option<UpstreamBody>,
}

impl UpstreamContext {
    /// Creates a context for a request path and its query parameters.
    pub fn new(path: impl Into<String>, params: Vec<(String, String)>) -> Self {
        Self {
            path: path.into(),
            params,
            ..Default::default()
        }
    }

    /// Sets the upstream status.
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets the (already sanitized) response headers.
    pub fn with_headers(mut self, headers: BTreeMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    /// Sets the response body.
    pub fn with_body(mut self, body: UpstreamBody) -> Self {
        self.body = Some(body);
        self
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// UPSTREAM ERRORS
// ═══════════════════════════════════════════════════════════════════════════════

/// Discriminant of [`UpstreamError`], useful for matching and metrics labels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UpstreamErrorKind {
    /// HTTP 429
    RateLimited,
    /// HTTP 401 / 403
    AuthFailed,
    /// Other 4xx
    ClientError,
    /// 5xx or any other non-2xx
    ServerError,
    /// 2xx with an unparseable body
    MalformedResponse,
    /// Transport failure (DNS, timeout, reset)
    NetworkFailure,
    /// 2xx whose envelope `status` is not `"ok"`
    NonOkEnvelope,
}

impl UpstreamErrorKind {
    /// Stable machine-readable code.
    pub fn as_str(&self) -> &'static str {
        match self {
            UpstreamErrorKind::RateLimited => "UPSTREAM_RATE_LIMITED",
            UpstreamErrorKind::AuthFailed => "UPSTREAM_AUTH_FAILED",
            UpstreamErrorKind::ClientError => "UPSTREAM_CLIENT_ERROR",
            UpstreamErrorKind::ServerError => "UPSTREAM_SERVER_ERROR",
            UpstreamErrorKind::MalformedResponse => "UPSTREAM_MALFORMED_RESPONSE",
            UpstreamErrorKind::NetworkFailure => "UPSTREAM_NETWORK_FAILURE",
            UpstreamErrorKind::NonOkEnvelope => "UPSTREAM_NON_OK_ENVELOPE",
        }
    }
}

impl fmt::Display for UpstreamErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classified failure of an upstream call.
///
/// Constructed at the point of failure and propagated unchanged; nothing in the
/// client retries on any of these.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Upstream answered 429.
    #[error("Rate limit exceeded. Please try again later.")]
    RateLimited {
        /// Request context
        context: UpstreamContext,
    },

    /// Upstream rejected the API key (401/403).
    #[error("Upstream API authentication failed. Please verify IMAI_API_KEY.")]
    AuthFailed {
        /// Request context
        context: UpstreamContext,
    },

    /// Any other 4xx.
    #[error("Upstream API error (HTTP {status})")]
    ClientError {
        /// HTTP status
        status: u16,
        /// Request context, including the parsed-or-raw body
        context: UpstreamContext,
    },

    /// 5xx or any other non-2xx status.
    #[error("Upstream service unavailable (HTTP {status})")]
    ServerError {
        /// HTTP status
        status: u16,
        /// Request context, including the parsed-or-raw body
        context: UpstreamContext,
    },

    /// 2xx whose body is not the expected JSON shape.
    #[error("Upstream API returned invalid JSON (status: {status})")]
    MalformedResponse {
        /// HTTP status
        status: u16,
        /// Raw body (truncated), for diagnostics only
        raw_body: String,
        /// Request context
        context: UpstreamContext,
    },

    /// The request never produced a response.
    #[error("Failed to connect to upstream service: {reason}")]
    NetworkFailure {
        /// Transport error description
        reason: String,
        /// Request context
        context: UpstreamContext,
    },

    /// 2xx with an envelope whose `status` is not the success sentinel.
    #[error("Upstream returned non-ok status{}", envelope_suffix(.envelope_status))]
    NonOkEnvelope {
        /// Envelope status value (`None` when the field was required but absent)
        envelope_status: Option<String>,
        /// Request context
        context: UpstreamContext,
    },
}

fn envelope_suffix(status: &Option<String>) -> String {
    match status {
        Some(s) => format!(" '{}'", s),
        None => " (missing status field)".to_string(),
    }
}

impl UpstreamError {
    /// Builds a `MalformedResponse`, truncating the raw body.
    pub fn malformed(status: u16, raw_body: &str, context: UpstreamContext) -> Self {
        UpstreamError::MalformedResponse {
            status,
            raw_body: truncate(raw_body),
            context,
        }
    }

    /// Builds a `NetworkFailure` from any displayable transport error.
    pub fn network(reason: impl fmt::Display, context: UpstreamContext) -> Self {
        UpstreamError::NetworkFailure {
            reason: reason.to_string(),
            context,
        }
    }

    /// Returns the variant discriminant.
    pub fn kind(&self) -> UpstreamErrorKind {
        match self {
            UpstreamError::RateLimited { .. } => UpstreamErrorKind::RateLimited,
            UpstreamError::AuthFailed { .. } => UpstreamErrorKind::AuthFailed,
            UpstreamError::ClientError { .. } => UpstreamErrorKind::ClientError,
            UpstreamError::ServerError { .. } => UpstreamErrorKind::ServerError,
            UpstreamError::MalformedResponse { .. } => UpstreamErrorKind::MalformedResponse,
            UpstreamError::NetworkFailure { .. } => UpstreamErrorKind::NetworkFailure,
            UpstreamError::NonOkEnvelope { .. } => UpstreamErrorKind::NonOkEnvelope,
        }
    }

    /// Returns the request context.
    pub fn context(&self) -> &UpstreamContext {
        match self {
            UpstreamError::RateLimited { context }
            | UpstreamError::AuthFailed { context }
            | UpstreamError::ClientError { context, .. }
            | UpstreamError::ServerError { context, .. }
            | UpstreamError::MalformedResponse { context, .. }
            | UpstreamError::NetworkFailure { context, .. }
            | UpstreamError::NonOkEnvelope { context, .. } => context,
        }
    }

    /// Returns the HTTP status the upstream answered with, if any.
    pub fn upstream_status(&self) -> Option<u16> {
        self.context().status
    }

    /// Returns true if the upstream said the resource does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, UpstreamError::ClientError { status: 404, .. })
    }

    /// Human-readable details safe to show a caller (upstream body, if any).
    pub fn details(&self) -> Option<String> {
        match self {
            UpstreamError::NetworkFailure { reason, .. } => Some(reason.clone()),
            UpstreamError::MalformedResponse { .. } => None,
            _ => self
                .context()
                .body
                .as_ref()
                .filter(|b| !matches!(b, UpstreamBody::Empty))
                .map(|b| b.to_string()),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// APPLICATION ERRORS
// ═══════════════════════════════════════════════════════════════════════════════

/// Main error type for igview operations outside the upstream client.
#[derive(Debug, Error)]
pub enum IgviewError {
    /// Classified upstream failure.
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    /// Caller input failed validation (missing or empty parameter).
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Requested entity does not exist upstream.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Image proxy could not deliver an image.
    #[error("Image proxy error: {0}")]
    ImageProxy(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// File I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Internal invariant violation (should never happen).
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl IgviewError {
    /// Returns true if this is a caller input error.
    pub fn is_validation_error(&self) -> bool {
        matches!(self, IgviewError::ValidationError(_))
    }

    /// Returns true if this error originated upstream.
    pub fn is_upstream_error(&self) -> bool {
        matches!(self, IgviewError::Upstream(_) | IgviewError::ImageProxy(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx() -> UpstreamContext {
        UpstreamContext::new("raw/ig/user/info/", vec![("url".into(), "alice".into())])
    }

    #[test]
    fn test_body_parse_prefers_json() {
        assert_eq!(
            UpstreamBody::parse(r#"{"message":"nope"}"#),
            UpstreamBody::Json(json!({"message": "nope"}))
        );
        assert_eq!(
            UpstreamBody::parse("<html>bad gateway</html>"),
            UpstreamBody::Text("<html>bad gateway</html>".into())
        );
        assert_eq!(UpstreamBody::parse("  "), UpstreamBody::Empty);
    }

    #[test]
    fn test_body_text_truncated() {
        let raw = "x".repeat(MAX_DIAGNOSTIC_BODY_BYTES * 2);
        match UpstreamBody::parse(&raw) {
            UpstreamBody::Text(t) => assert!(t.len() < raw.len()),
            other => panic!("unexpected body: {:?}", other),
        }
    }

    #[test]
    fn test_error_display() {
        let err = UpstreamError::RateLimited { context: ctx() };
        assert!(err.to_string().contains("Rate limit"));

        let err = UpstreamError::ServerError { status: 503, context: ctx() };
        assert!(err.to_string().contains("503"));

        let err = UpstreamError::NonOkEnvelope {
            envelope_status: Some("fail".into()),
            context: ctx(),
        };
        assert!(err.to_string().contains("'fail'"));

        let err = UpstreamError::NonOkEnvelope { envelope_status: None, context: ctx() };
        assert!(err.to_string().contains("missing status"));
    }

    #[test]
    fn test_error_kind_and_context() {
        let err = UpstreamError::ClientError {
            status: 404,
            context: ctx().with_status(404).with_body(UpstreamBody::Json(json!({"message": "gone"}))),
        };
        assert_eq!(err.kind(), UpstreamErrorKind::ClientError);
        assert_eq!(err.upstream_status(), Some(404));
        assert_eq!(err.context().path, "raw/ig/user/info/");
        assert!(err.is_not_found());
        assert_eq!(err.details().as_deref(), Some(r#"{"message":"gone"}"#));
    }

    #[test]
    fn test_malformed_hides_raw_body_from_details() {
        let err = UpstreamError::malformed(200, "<html>", ctx().with_status(200));
        assert_eq!(err.kind(), UpstreamErrorKind::MalformedResponse);
        assert!(err.details().is_none());
    }

    #[test]
    fn test_upstream_converts_into_app_error() {
        let err: IgviewError = UpstreamError::network("connection reset", ctx()).into();
        assert!(err.is_upstream_error());
        assert!(!err.is_validation_error());
        assert!(err.to_string().contains("connection reset"));
    }
}
