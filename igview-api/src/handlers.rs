//! API route handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::Response,
    Json,
};
use tracing::{debug, info};

use igview_upstream::HashtagFeedKind;

use crate::dto::*;
use crate::error::ApiError;
use crate::normalize;
use crate::proxy;
use crate::state::AppState;

type Result<T> = std::result::Result<T, ApiError>;

/// Trims a required path/query value, rejecting empty input.
fn required<'a>(value: Option<&'a str>, what: &str) -> Result<&'a str> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::bad_request(format!("{} is required", what)))
}

/// Normalizes an optional cursor: blank means first page.
fn cursor(after: &Option<String>) -> Option<&str> {
    after.as_deref().map(str::trim).filter(|c| !c.is_empty())
}

/// GET /
pub async fn banner() -> &'static str {
    "Instagram Profile Viewer API"
}

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// GET /search?query=
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<SearchResponseDto>> {
    let Some(query) = params.query.as_deref().map(str::trim).filter(|q| !q.is_empty()) else {
        return Ok(Json(SearchResponseDto::default()));
    };

    let response = state.client.search_users(query).await?;
    let dto = normalize::search_users(&response);
    debug!(query, hits = dto.users.len(), "search completed");
    Ok(Json(dto))
}

/// GET /profile/:username
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> Result<Json<ProfileDto>> {
    let username = required(Some(username.as_str()), "Username")?;
    let response = state.client.get_user_info(username).await?;
    normalize::profile(&response, username)
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("User '{}' not found", username)))
}

/// GET /profile/:username/highlights
pub async fn get_highlights(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> Result<Json<HighlightsDto>> {
    let username = required(Some(username.as_str()), "Username")?;
    let response = state.client.get_user_highlights(username).await?;
    let dto = normalize::highlights(&response);
    info!(username, count = dto.highlights.len(), "fetched highlights");
    Ok(Json(dto))
}

/// GET /profile/:username/stories
pub async fn get_stories(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> Result<Json<StoriesDto>> {
    let username = required(Some(username.as_str()), "Username")?;
    let response = state.client.get_user_stories(username).await?;
    Ok(Json(normalize::stories(&response, username)))
}

/// GET /highlights/:id/items
pub async fn get_highlight_items(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<StoriesDto>> {
    let id = required(Some(id.as_str()), "Highlight id")?;
    let response = state.client.get_highlight_items(id).await?;
    Ok(Json(normalize::highlight_items(&response, id)))
}

/// GET /profile/:username/posts?after=
pub async fn get_posts(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
    Query(page): Query<PageQuery>,
) -> Result<Json<PostsPageDto>> {
    let username = required(Some(username.as_str()), "Username")?;
    let response = state.client.get_user_feed(username, cursor(&page.after)).await?;
    Ok(Json(normalize::posts_page(&response)))
}

/// GET /profile/:username/reels?after=
pub async fn get_reels(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
    Query(page): Query<PageQuery>,
) -> Result<Json<PostsPageDto>> {
    let username = required(Some(username.as_str()), "Username")?;
    let response = state.client.get_user_reels(username, cursor(&page.after)).await?;
    Ok(Json(normalize::posts_page(&response)))
}

/// GET /profile/:username/tagged?after=
pub async fn get_tagged(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
    Query(page): Query<PageQuery>,
) -> Result<Json<PostsPageDto>> {
    let username = required(Some(username.as_str()), "Username")?;
    let response = state.client.get_user_tagged(username, cursor(&page.after)).await?;
    Ok(Json(normalize::posts_page(&response)))
}

/// GET /profile/:username/reposts?after=
pub async fn get_reposts(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
    Query(page): Query<PageQuery>,
) -> Result<Json<PostsPageDto>> {
    let username = required(Some(username.as_str()), "Username")?;
    let response = state.client.get_user_reposts(username, cursor(&page.after)).await?;
    Ok(Json(normalize::posts_page(&response)))
}

/// GET /ig/hashtag-feed?hashtag=&type=recent|top&after=
pub async fn get_hashtag_feed(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashtagFeedQuery>,
) -> Result<Json<HashtagFeedDto>> {
    let hashtag = required(params.hashtag.as_deref().map(|h| h.trim().trim_start_matches('#')), "Hashtag")?;
    let kind = HashtagFeedKind::from_param(params.kind.as_deref());
    let response = state
        .client
        .get_hashtag_feed(hashtag, kind, cursor(&params.after))
        .await?;
    Ok(Json(normalize::hashtag_feed(&response)))
}

/// GET /media/:code
pub async fn get_media(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> Result<Json<MediaDto>> {
    let code = required(Some(code.as_str()), "Media code")?;
    let response = match state.client.get_media_info(code).await {
        Ok(response) => response,
        Err(err) if err.is_not_found() => {
            return Err(ApiError::not_found(format!("Media '{}' not found", code)))
        }
        Err(err) => return Err(err.into()),
    };
    normalize::media(&response, code)
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Media '{}' not found", code)))
}

/// GET /media/:code/comments?after=
pub async fn get_media_comments(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
    Query(page): Query<PageQuery>,
) -> Result<Json<CommentsPageDto>> {
    let code = required(Some(code.as_str()), "Media code")?;
    let response = state.client.get_media_comments(code, cursor(&page.after)).await?;
    Ok(Json(normalize::comments(&response)))
}

/// GET /proxy/image?url=
pub async fn proxy_image(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ImageProxyQuery>,
) -> Result<Response> {
    let url = proxy::validate_image_url(params.url.as_deref())?;
    proxy::relay(&state.images, url).await
}
