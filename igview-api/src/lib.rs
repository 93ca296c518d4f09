//! # igview API Server
//!
//! REST backend for the Instagram profile viewer front-end. Every data route
//! goes through the IMAI client, so responses are cached per operation and
//! upstream calls are paced by the shared request queue.
//!
//! ## Endpoints
//!
//! - `GET /health` - Liveness probe
//! - `GET /search?query=` - Search users
//! - `GET /profile/:username` - Profile summary
//! - `GET /profile/:username/{posts,reels,tagged,reposts}?after=` - Paginated feeds
//! - `GET /profile/:username/{stories,highlights}` - Stories and highlight tray
//! - `GET /highlights/:id/items` - Items of one highlight
//! - `GET /ig/hashtag-feed?hashtag=&type=&after=` - Hashtag feed
//! - `GET /media/:code` and `GET /media/:code/comments?after=` - Posts and comments
//! - `GET /proxy/image?url=` - Allowlisted CDN image relay
//!
//! ## Example
//!
//! ```rust,ignore
//! use igview_api::{ApiConfig, ApiServer};
//!
//! let config = ApiConfig::from_env()?;
//! let server = ApiServer::new(config)?;
//! server.run(([0, 0, 0, 0], 3000)).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod routes;
mod handlers;
mod state;
mod proxy;
mod error;
#[allow(missing_docs)]
pub mod dto;
pub mod normalize;

pub use routes::create_router;
pub use state::{AppState, ApiConfig};
pub use error::ApiError;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::{header, HeaderValue, Method};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use igview_core::constants::CACHE_SWEEP_INTERVAL_SECS;
use igview_core::Result;

/// API server for igview.
pub struct ApiServer {
    state: Arc<AppState>,
}

impl ApiServer {
    /// Creates a new API server with the given configuration.
    pub fn new(config: ApiConfig) -> Result<Self> {
        Ok(Self {
            state: Arc::new(AppState::new(config)?),
        })
    }

    /// Shared state (exposed for embedding and tests).
    pub fn state(&self) -> Arc<AppState> {
        self.state.clone()
    }

    /// Creates the router with all routes configured.
    pub fn router(&self) -> Router {
        let origins: Vec<HeaderValue> = self
            .state
            .config
            .cors_origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!(origin = %origin, "ignoring invalid CORS origin");
                    None
                }
            })
            .collect();

        let cors = CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([Method::GET, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION])
            .allow_credentials(true);

        create_router(self.state.clone())
            .layer(cors)
            .layer(TraceLayer::new_for_http())
    }

    /// Runs the server on the given address until Ctrl-C.
    pub async fn run(self, addr: impl Into<SocketAddr>) -> std::io::Result<()> {
        let addr = addr.into();
        let listener = tokio::net::TcpListener::bind(addr).await?;

        info!("igview API server listening on {}", addr);

        let janitor = tokio::spawn(sweep_caches(self.state.clone()));
        let result = axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await;
        janitor.abort();

        info!("igview API server stopped");
        result
    }
}

/// Periodically drops expired cache entries.
async fn sweep_caches(state: Arc<AppState>) {
    let mut ticker = tokio::time::interval(Duration::from_secs(CACHE_SWEEP_INTERVAL_SECS));
    // The first tick completes immediately.
    ticker.tick().await;
    loop {
        ticker.tick().await;
        let removed = state.client.sweep_caches();
        let stats = state.client.total_cache_stats();
        debug!(
            removed,
            entries = stats.total_entries,
            hits = stats.hits,
            misses = stats.misses,
            pending = state.client.pending_requests(),
            "cache sweep"
        );
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

/// Starts the API server with configuration from the environment.
pub async fn start_server(port: u16) -> Result<()> {
    let config = ApiConfig::from_env()?.with_port(port);
    let server = ApiServer::new(config)?;
    server.run(([0, 0, 0, 0], port)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use igview_upstream::ImaiConfig;
    use tower::ServiceExt;

    fn server() -> ApiServer {
        let imai = ImaiConfig::new("k", "https://imai.co/api/").unwrap();
        let config = ApiConfig::new(imai).with_cors_origins(vec!["http://localhost:4200".into()]);
        ApiServer::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_cors_allows_configured_origin() {
        let response = server()
            .router()
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header(header::ORIGIN, "http://localhost:4200")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "http://localhost:4200"
        );
        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(),
            "true"
        );
    }

    #[tokio::test]
    async fn test_cors_ignores_unknown_origin() {
        let response = server()
            .router()
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header(header::ORIGIN, "https://elsewhere.example")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert!(response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
    }
}
