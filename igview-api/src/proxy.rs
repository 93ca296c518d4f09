//! Image proxy: allowlisted fetch-and-relay of Instagram CDN images.
//!
//! The browser cannot hotlink most CDN URLs (referrer and CORS checks), so the
//! front-end routes avatars and thumbnails through here.

use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::Response,
};
use tracing::{debug, warn};
use url::Url;

use igview_core::constants::{IMAGE_PROXY_ACCEPT, IMAGE_PROXY_ALLOWED_DOMAINS, IMAGE_PROXY_CACHE_CONTROL};

use crate::error::ApiError;

/// Returns true if `host` is an allowlisted domain or one of its subdomains.
pub(crate) fn is_allowed_host(host: &str) -> bool {
    let host = host.trim_end_matches('.').to_ascii_lowercase();
    IMAGE_PROXY_ALLOWED_DOMAINS
        .iter()
        .any(|domain| host == *domain || host.ends_with(&format!(".{}", domain)))
}

/// Validates a caller-supplied image URL.
pub(crate) fn validate_image_url(raw: Option<&str>) -> Result<Url, ApiError> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::bad_request("URL parameter is required"))?;

    if !raw.to_ascii_lowercase().starts_with("https://") {
        return Err(ApiError::bad_request("Only HTTPS URLs are allowed"));
    }

    let url = Url::parse(raw).map_err(|_| ApiError::bad_request("Invalid URL format"))?;
    match url.host_str() {
        Some(host) if is_allowed_host(host) => Ok(url),
        _ => Err(ApiError::bad_request(
            "URL hostname not in allowlist. Only Instagram CDN domains are allowed.",
        )),
    }
}

/// Redirects are followed only while they stay on allowlisted HTTPS hosts.
pub(crate) fn redirect_policy() -> reqwest::redirect::Policy {
    reqwest::redirect::Policy::custom(|attempt| {
        let url = attempt.url();
        let allowed = url.scheme() == "https" && url.host_str().map(is_allowed_host).unwrap_or(false);
        if attempt.previous().len() >= 5 || !allowed {
            attempt.stop()
        } else {
            attempt.follow()
        }
    })
}

/// Fetches the image and streams it back with a short public cache lifetime.
pub(crate) async fn relay(client: &reqwest::Client, url: Url) -> Result<Response, ApiError> {
    let upstream = client
        .get(url.clone())
        .header(header::ACCEPT, IMAGE_PROXY_ACCEPT)
        .send()
        .await
        .map_err(|e| {
            warn!(url = %url, error = %e.without_url(), "image fetch failed");
            ApiError::bad_gateway("Failed to fetch image from upstream")
        })?;

    let status = upstream.status();
    if !status.is_success() {
        warn!(url = %url, status = status.as_u16(), "image upstream returned error status");
        return Err(ApiError::bad_gateway(format!(
            "Upstream image server returned {}",
            status.as_u16()
        )));
    }

    let content_type = upstream
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .filter(|ct| ct.to_ascii_lowercase().starts_with("image/"))
        .ok_or_else(|| {
            warn!(url = %url, "image upstream returned a non-image content type");
            ApiError::bad_gateway("Upstream did not return an image")
        })?;

    let content_type = HeaderValue::from_str(&content_type)
        .map_err(|_| ApiError::bad_gateway("Upstream did not return an image"))?;
    let content_length = upstream.content_length();
    debug!(url = %url, ?content_length, "relaying image");

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CACHE_CONTROL, IMAGE_PROXY_CACHE_CONTROL);
    if let Some(len) = content_length {
        builder = builder.header(header::CONTENT_LENGTH, len);
    }

    builder
        .body(Body::from_stream(upstream.bytes_stream()))
        .map_err(|e| ApiError::internal(format!("failed to build image response: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use test_case::test_case;
    use wiremock::matchers::{headers as wm_headers, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test_case("instagram.com", true)]
    #[test_case("scontent-lax3-2.cdninstagram.com", true)]
    #[test_case("scontent.xx.fbcdn.net", true)]
    #[test_case("CDNINSTAGRAM.COM", true)]
    #[test_case("evilinstagram.com", false)]
    #[test_case("instagram.com.evil.net", false)]
    #[test_case("example.com", false)]
    fn test_allowed_hosts(host: &str, allowed: bool) {
        assert_eq!(is_allowed_host(host), allowed);
    }

    #[test_case(None, "required")]
    #[test_case(Some("   "), "required")]
    #[test_case(Some("http://scontent.cdninstagram.com/a.jpg"), "HTTPS")]
    #[test_case(Some("https://"), "Invalid URL")]
    #[test_case(Some("https://example.com/a.jpg"), "allowlist")]
    fn test_rejected_urls(raw: Option<&str>, message: &str) {
        let err = validate_image_url(raw).unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(format!("{:?}", err).contains(message));
    }

    async fn image_server(template: ResponseTemplate) -> (MockServer, Url) {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v/pic.png"))
            .and(wm_headers("accept", IMAGE_PROXY_ACCEPT.split(',').collect()))
            .respond_with(template)
            .mount(&server)
            .await;
        let url = Url::parse(&format!("{}/v/pic.png", server.uri())).unwrap();
        (server, url)
    }

    #[tokio::test]
    async fn test_relay_streams_image() {
        let png = vec![0x89, b'P', b'N', b'G', 0, 1, 2, 3];
        let (_server, url) = image_server(ResponseTemplate::new(200).set_body_raw(png.clone(), "image/png")).await;

        let response = relay(&reqwest::Client::new(), url).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers().clone();
        assert_eq!(headers.get(header::CONTENT_TYPE).unwrap(), "image/png");
        assert_eq!(headers.get(header::CACHE_CONTROL).unwrap(), "public, max-age=300");
        assert_eq!(headers.get(header::CONTENT_LENGTH).unwrap(), &png.len().to_string());

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(bytes.as_ref(), png.as_slice());
    }

    #[tokio::test]
    async fn test_relay_rejects_non_image() {
        let (_server, url) =
            image_server(ResponseTemplate::new(200).set_body_raw("<html></html>", "text/html")).await;

        let err = relay(&reqwest::Client::new(), url).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_relay_upstream_error_status() {
        let (_server, url) = image_server(ResponseTemplate::new(404)).await;

        let err = relay(&reqwest::Client::new(), url).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        assert!(format!("{:?}", err).contains("404"));
    }

    #[test]
    fn test_accepted_url() {
        let url = validate_image_url(Some("https://scontent.cdninstagram.com/v/t51/p.jpg?x=1")).unwrap();
        assert_eq!(url.host_str(), Some("scontent.cdninstagram.com"));
    }
}
