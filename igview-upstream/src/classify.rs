//! Classification of upstream HTTP responses.
//!
//! Pure functions over (status, headers, body) so the whole taxonomy is
//! testable without a network.

use std::collections::BTreeMap;

use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{error, warn};

use igview_core::constants::{is_safe_header, STATUS_OK};
use igview_core::{UpstreamBody, UpstreamContext, UpstreamError};

/// Keeps only allowlisted response headers.
pub(crate) fn sanitize_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    headers
        .iter()
        .filter(|(name, _)| is_safe_header(name.as_str()))
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect()
}

/// Maps a non-2xx status to its error variant. Returns `None` for 2xx.
pub(crate) fn classify_status(status: u16, body: &str, context: UpstreamContext) -> Option<UpstreamError> {
    if (200..300).contains(&status) {
        return None;
    }
    let context = context.with_body(UpstreamBody::parse(body));
    let err = match status {
        429 => UpstreamError::RateLimited { context },
        401 | 403 => {
            error!(
                path = %context.path,
                status,
                "upstream authentication failed; check IMAI_API_KEY"
            );
            UpstreamError::AuthFailed { context }
        }
        400..=499 => UpstreamError::ClientError { status, context },
        _ => UpstreamError::ServerError { status, context },
    };
    Some(err)
}

/// Reads the envelope `status` field. `null` counts as absent.
fn envelope_status(value: &Value) -> Option<String> {
    match value.get("status")? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Classifies a complete upstream response and decodes the success payload.
///
/// `require_status` decides whether a payload without a `status` field is a
/// [`UpstreamError::NonOkEnvelope`] or an (uncacheable) success.
pub(crate) fn classify_response<T: DeserializeOwned>(
    status: u16,
    body: &str,
    require_status: bool,
    context: UpstreamContext,
) -> Result<T, UpstreamError> {
    if let Some(err) = classify_status(status, body, context.clone()) {
        return Err(err);
    }

    let value: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(e) => {
            warn!(path = %context.path, status, error = %e, "upstream returned unparseable body");
            return Err(UpstreamError::malformed(status, body, context));
        }
    };

    match envelope_status(&value) {
        Some(s) if s == STATUS_OK => {}
        Some(s) => {
            return Err(UpstreamError::NonOkEnvelope {
                envelope_status: Some(s),
                context: context.with_body(UpstreamBody::Json(value)),
            });
        }
        None if require_status => {
            return Err(UpstreamError::NonOkEnvelope {
                envelope_status: None,
                context: context.with_body(UpstreamBody::Json(value)),
            });
        }
        None => {}
    }

    serde_json::from_value(value).map_err(|e| {
        warn!(path = %context.path, error = %e, "upstream payload has unexpected shape");
        UpstreamError::malformed(status, body, context)
    })
}
