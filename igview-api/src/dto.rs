//! DTOs for API responses.
//!
//! Field names follow what the front-end consumes: camelCase everywhere except
//! the hashtag feed, which mirrors Instagram's snake_case model.

use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════════════════════
// QUERY PARAMETERS
// ═══════════════════════════════════════════════════════════════════════════════

/// `?query=` for user search.
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    /// Search keyword
    pub query: Option<String>,
}

/// `?after=` for paginated endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    /// Opaque cursor returned by the previous page
    pub after: Option<String>,
}

/// Parameters of the hashtag feed.
#[derive(Debug, Default, Deserialize)]
pub struct HashtagFeedQuery {
    /// Hashtag, with or without a leading `#`
    pub hashtag: Option<String>,
    /// `recent` (default) or `top`
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Pagination cursor
    pub after: Option<String>,
}

/// `?url=` for the image proxy.
#[derive(Debug, Default, Deserialize)]
pub struct ImageProxyQuery {
    /// Absolute HTTPS image URL
    pub url: Option<String>,
}

// ═══════════════════════════════════════════════════════════════════════════════
// SEARCH & PROFILE
// ═══════════════════════════════════════════════════════════════════════════════

/// Response for user search.
#[derive(Debug, Default, Serialize)]
pub struct SearchResponseDto {
    /// Matching users
    pub users: Vec<SearchUserDto>,
}

/// One search hit.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchUserDto {
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_pic_url: Option<String>,
    pub is_verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub followers_count: Option<u64>,
}

/// Response for a profile lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDto {
    pub username: String,
    pub full_name: String,
    pub bio: String,
    /// HD picture when available
    pub profile_pic_url: String,
    /// Number of posts
    pub posts: u64,
    pub followers: u64,
    pub following: u64,
}

// ═══════════════════════════════════════════════════════════════════════════════
// FEEDS
// ═══════════════════════════════════════════════════════════════════════════════

/// One page of posts, reels, tagged posts or reposts.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostsPageDto {
    /// Always `"ok"`
    pub status: &'static str,
    pub items: Vec<PostItemDto>,
    /// Cursor of the next page; `null` on the last page
    pub end_cursor: Option<String>,
    pub more_available: bool,
}

/// Grid tile of a feed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostItemDto {
    /// Shortcode (falls back to the numeric pk)
    pub code: String,
    pub display_url: String,
    /// Instagram media type (1 image, 2 video, 8 carousel)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_type: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub like_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
}

// ═══════════════════════════════════════════════════════════════════════════════
// STORIES & HIGHLIGHTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Stories of a user, or the items of one highlight reel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoriesDto {
    /// Always `"ok"`
    pub status: &'static str,
    pub user: MiniUserDto,
    pub items: Vec<StoryItemDto>,
}

/// Username and avatar, as embedded in stories, media and comments.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MiniUserDto {
    pub username: String,
    pub profile_pic_url: String,
}

/// One story frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryItemDto {
    pub id: String,
    pub media_type: i64,
    pub image_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    /// Unix seconds
    pub taken_at: i64,
    /// Unix seconds
    pub expiring_at: i64,
}

/// Highlight tray of a user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HighlightsDto {
    pub highlights: Vec<HighlightDto>,
}

/// One highlight reel in the tray.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightDto {
    /// Reel id, usable with `/highlights/:id/items`
    pub id: String,
    pub title: String,
    pub cover_url: Option<String>,
    pub items_count: u64,
}

// ═══════════════════════════════════════════════════════════════════════════════
// MEDIA & COMMENTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Coarse media kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
    Carousel,
}

/// A single post.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaDto {
    pub code: String,
    pub caption_text: String,
    pub taken_at: i64,
    pub media_type: MediaKind,
    pub display_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    pub user: MiniUserDto,
    pub like_count: u64,
    pub comment_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carousel: Option<Vec<CarouselItemDto>>,
}

/// One slide of a carousel post.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CarouselItemDto {
    pub display_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    pub media_type: MediaKind,
}

/// One page of comments.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentsPageDto {
    pub comments: Vec<CommentDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_cursor: Option<String>,
    pub has_more: bool,
}

/// A comment.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentDto {
    pub id: String,
    pub text: String,
    /// Unix seconds
    pub created_at: i64,
    pub like_count: u64,
    pub user: MiniUserDto,
}

// ═══════════════════════════════════════════════════════════════════════════════
// HASHTAG FEED (snake_case)
// ═══════════════════════════════════════════════════════════════════════════════

/// One page of a hashtag feed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HashtagFeedDto {
    pub items: Vec<HashtagFeedItemDto>,
    pub more_available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_cursor: Option<String>,
}

/// One hashtag post.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HashtagFeedItemDto {
    pub pk: String,
    pub code: String,
    pub display_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_candidates_url: Option<String>,
    pub taken_at: i64,
    pub like_count: u64,
    pub comment_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub play_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    pub carousel_media_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carousel_media: Option<Vec<HashtagCarouselItemDto>>,
    pub user: HashtagFeedUserDto,
}

/// One slide of a hashtag carousel post.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HashtagCarouselItemDto {
    pub display_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_candidates_url: Option<String>,
}

/// Author of a hashtag post.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HashtagFeedUserDto {
    pub username: String,
    pub full_name: String,
    pub profile_pic_url: String,
    pub is_verified: bool,
}

// ═══════════════════════════════════════════════════════════════════════════════
// HEALTH
// ═══════════════════════════════════════════════════════════════════════════════

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always `"ok"`
    pub status: &'static str,
}
