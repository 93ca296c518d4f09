//! API error handling.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use igview_core::{IgviewError, UpstreamError, UpstreamErrorKind};

/// API error type.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    code: String,
    details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(status: StatusCode, message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            code: code.into(),
            details: None,
        }
    }

    /// Attaches caller-visible details.
    pub fn with_details(mut self, details: Option<String>) -> Self {
        self.details = details;
        self
    }

    /// Bad request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message, "BAD_REQUEST")
    }

    /// Not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message, "NOT_FOUND")
    }

    /// Bad gateway error.
    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, message, "BAD_GATEWAY")
    }

    /// Internal server error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message, "INTERNAL_ERROR")
    }

    /// HTTP status of this error.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Machine-readable code.
    pub fn code(&self) -> &str {
        &self.code
    }
}

/// Error response body.
#[derive(Serialize)]
struct ErrorBody {
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            code: self.code,
            message: self.message,
            details: self.details,
        };

        (self.status, Json(body)).into_response()
    }
}

impl From<UpstreamError> for ApiError {
    fn from(err: UpstreamError) -> Self {
        match err.kind() {
            UpstreamErrorKind::AuthFailed | UpstreamErrorKind::MalformedResponse => {
                tracing::error!(error = %err, path = %err.context().path, "upstream failure");
            }
            _ => {
                tracing::warn!(error = %err, path = %err.context().path, "upstream failure");
            }
        }
        let details = err.details();
        ApiError::new(StatusCode::BAD_GATEWAY, err.to_string(), err.kind().as_str()).with_details(details)
    }
}

impl From<IgviewError> for ApiError {
    fn from(err: IgviewError) -> Self {
        match err {
            IgviewError::Upstream(upstream) => upstream.into(),
            IgviewError::ValidationError(msg) => ApiError::bad_request(msg),
            IgviewError::NotFound(msg) => ApiError::not_found(msg),
            IgviewError::ImageProxy(msg) => ApiError::new(StatusCode::BAD_GATEWAY, msg, "IMAGE_PROXY_ERROR"),
            other => {
                tracing::error!(error = %other, "Internal error");
                ApiError::internal("An internal error occurred")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use igview_core::{UpstreamBody, UpstreamContext};
    use serde_json::{json, Value};

    async fn body_json(err: ApiError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_upstream_maps_to_bad_gateway() {
        let err = UpstreamError::RateLimited {
            context: UpstreamContext::new("raw/ig/user/info/", vec![]).with_status(429),
        };
        let (status, body) = body_json(err.into()).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["code"], "UPSTREAM_RATE_LIMITED");
        assert!(body["message"].as_str().unwrap().contains("Rate limit"));
        assert!(body.get("details").is_none());
    }

    #[tokio::test]
    async fn test_upstream_details_exposed() {
        let err = UpstreamError::ServerError {
            status: 500,
            context: UpstreamContext::new("raw/ig/user/feed/", vec![])
                .with_body(UpstreamBody::Json(json!({"message": "boom"}))),
        };
        let (_, body) = body_json(err.into()).await;
        assert_eq!(body["details"], r#"{"message":"boom"}"#);
    }

    #[tokio::test]
    async fn test_app_errors() {
        let (status, body) = body_json(IgviewError::ValidationError("Username is required".into()).into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Username is required");

        let (status, _) = body_json(IgviewError::NotFound("Media not found".into()).into()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = body_json(IgviewError::InternalError("secret detail".into()).into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body["message"].as_str().unwrap().contains("secret"));
    }
}
