//! API route configuration.

use std::sync::Arc;

use axum::{routing::get, Router};

use crate::handlers;
use crate::state::AppState;

/// Creates the API router with all routes configured.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Banner & health check
        .route("/", get(handlers::banner))
        .route("/health", get(handlers::health_check))

        // Users
        .route("/search", get(handlers::search))
        .route("/profile/:username", get(handlers::get_profile))
        .route("/profile/:username/highlights", get(handlers::get_highlights))
        .route("/profile/:username/stories", get(handlers::get_stories))
        .route("/highlights/:id/items", get(handlers::get_highlight_items))

        // Feeds
        .route("/profile/:username/posts", get(handlers::get_posts))
        .route("/profile/:username/reels", get(handlers::get_reels))
        .route("/profile/:username/tagged", get(handlers::get_tagged))
        .route("/profile/:username/reposts", get(handlers::get_reposts))
        .route("/ig/hashtag-feed", get(handlers::get_hashtag_feed))

        // Media
        .route("/media/:code", get(handlers::get_media))
        .route("/media/:code/comments", get(handlers::get_media_comments))

        // Image proxy
        .route("/proxy/image", get(handlers::proxy_image))

        .with_state(state)
}
