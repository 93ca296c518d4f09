//! Upstream payload normalization.
//!
//! Each output field is read through an ordered fallback chain of JSON
//! pointers: the preferred field first, then its alternates. Empty strings and
//! nulls count as absent. The first present value wins; otherwise the caller
//! substitutes an explicit default.

use std::borrow::Cow;
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::Value;

use igview_core::{
    CommentsResponse, FeedResponse, HighlightItemsResponse, HighlightsResponse, MediaInfoResponse,
    SearchResponse, StoriesResponse, UserInfoResponse,
};

use crate::dto::*;

// ═══════════════════════════════════════════════════════════════════════════════
// FALLBACK CHAINS
// ═══════════════════════════════════════════════════════════════════════════════

const DISPLAY_URL: &[&str] = &["/display_url", "/image_versions2/candidates/0/url", "/thumbnail_url"];
const CANDIDATE_URL: &[&str] = &["/image_versions2/candidates/0/url"];
const VIDEO_URL: &[&str] = &["/video_url", "/video_versions/0/url"];
const MEDIA_CODE: &[&str] = &["/code", "/pk", "/id"];
const MEDIA_PK: &[&str] = &["/pk", "/id"];
const MEDIA_TYPE: &[&str] = &["/media_type"];
const LIKE_COUNT: &[&str] = &["/like_count"];
const COMMENT_COUNT: &[&str] = &["/comment_count"];
const TAKEN_AT: &[&str] = &["/taken_at"];

const USERNAME: &[&str] = &["/username"];
const FULL_NAME: &[&str] = &["/full_name"];
const PROFILE_PIC: &[&str] = &["/profile_pic_url"];
const PROFILE_PIC_HD: &[&str] = &["/profile_pic_url_hd", "/hd_profile_pic_url_info/url", "/profile_pic_url"];
const IS_VERIFIED: &[&str] = &["/is_verified"];
const FOLLOWERS: &[&str] = &["/follower_count", "/edge_followed_by/count"];
const FOLLOWING: &[&str] = &["/following_count", "/edge_follow/count"];
const MEDIA_COUNT: &[&str] = &["/media_count", "/edge_owner_to_timeline_media/count"];
const BIO: &[&str] = &["/biography"];

const HIGHLIGHT_COVER: &[&str] = &[
    "/cover_media/cropped_image_version/url",
    "/cover_media/full_image_version/url",
    "/cover_image_url",
    "/cover_url",
];
const HIGHLIGHT_COUNT: &[&str] = &["/media_count", "/items_count"];

const CAPTION: &[&str] = &["/caption/text", "/caption_text"];
const COMMENT_ID: &[&str] = &["/pk", "/id"];
const COMMENT_CREATED: &[&str] = &["/created_at", "/created_at_utc"];
const COMMENT_LIKES: &[&str] = &["/comment_like_count", "/like_count"];

/// First non-empty string (numbers are rendered as text, so numeric pks work).
pub(crate) fn first_str(value: &Value, chain: &[&str]) -> Option<String> {
    chain.iter().find_map(|ptr| match value.pointer(ptr)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// First non-negative integer; numeric strings are accepted.
pub(crate) fn first_u64(value: &Value, chain: &[&str]) -> Option<u64> {
    chain.iter().find_map(|ptr| match value.pointer(ptr)? {
        Value::Number(n) => n.as_u64().or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

/// First integer; numeric strings and floats are accepted.
pub(crate) fn first_i64(value: &Value, chain: &[&str]) -> Option<i64> {
    chain.iter().find_map(|ptr| match value.pointer(ptr)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

/// First boolean.
pub(crate) fn first_bool(value: &Value, chain: &[&str]) -> Option<bool> {
    chain.iter().find_map(|ptr| value.pointer(ptr)?.as_bool())
}

/// Returns the media object of a feed item: nested under `media` or the item itself.
fn media_of(item: &Value) -> &Value {
    match item.get("media") {
        Some(media @ Value::Object(_)) => media,
        _ => item,
    }
}

fn mini_user(user: Option<&Value>, fallback_username: &str) -> MiniUserDto {
    MiniUserDto {
        username: user
            .and_then(|u| first_str(u, USERNAME))
            .unwrap_or_else(|| fallback_username.to_string()),
        profile_pic_url: user.and_then(|u| first_str(u, PROFILE_PIC)).unwrap_or_default(),
    }
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

// ═══════════════════════════════════════════════════════════════════════════════
// SEARCH & PROFILE
// ═══════════════════════════════════════════════════════════════════════════════

/// Maps a search payload. Hits are read from `users`, `list`, `data.users`,
/// `data.list` (first array present); each hit may be a user or wrap one.
pub fn search_users(resp: &SearchResponse) -> SearchResponseDto {
    let data = resp.data.as_ref();
    let raw = resp
        .users
        .as_ref()
        .or(resp.list.as_ref())
        .or_else(|| data.and_then(|d| d.users.as_ref()))
        .or_else(|| data.and_then(|d| d.list.as_ref()));

    let users = raw
        .map(|items| items.iter().filter_map(search_hit).collect())
        .unwrap_or_default();
    SearchResponseDto { users }
}

fn search_hit(item: &Value) -> Option<SearchUserDto> {
    let user = if first_str(item, USERNAME).is_some() {
        item
    } else {
        item.get("user").filter(|u| first_str(u, USERNAME).is_some())?
    };
    Some(SearchUserDto {
        username: first_str(user, USERNAME)?,
        full_name: first_str(user, FULL_NAME),
        profile_pic_url: first_str(user, PROFILE_PIC),
        is_verified: first_bool(user, IS_VERIFIED).unwrap_or(false),
        followers_count: first_u64(user, FOLLOWERS).filter(|n| *n > 0),
    })
}

/// Resolves the profile object: `user` when it is an object, else the
/// top-level fields when they carry a username.
fn profile_user(resp: &UserInfoResponse) -> Option<Cow<'_, Value>> {
    if let Some(user) = resp.user.as_ref().filter(|u| u.is_object()) {
        return Some(Cow::Borrowed(user));
    }
    let inline = Value::Object(resp.extra.clone());
    first_str(&inline, USERNAME).map(|_| Cow::Owned(inline))
}

/// Maps a profile payload. Returns `None` when the envelope carries no user.
pub fn profile(resp: &UserInfoResponse, requested: &str) -> Option<ProfileDto> {
    let user = profile_user(resp)?;
    let user = user.as_ref();
    Some(ProfileDto {
        username: first_str(user, USERNAME).unwrap_or_else(|| requested.to_string()),
        full_name: first_str(user, FULL_NAME).unwrap_or_default(),
        bio: first_str(user, BIO).unwrap_or_default(),
        profile_pic_url: first_str(user, PROFILE_PIC_HD).unwrap_or_default(),
        posts: first_u64(user, MEDIA_COUNT).unwrap_or(0),
        followers: first_u64(user, FOLLOWERS).unwrap_or(0),
        following: first_u64(user, FOLLOWING).unwrap_or(0),
    })
}

// ═══════════════════════════════════════════════════════════════════════════════
// FEEDS
// ═══════════════════════════════════════════════════════════════════════════════

/// Maps a page of posts, reels, tagged posts or reposts.
pub fn posts_page(resp: &FeedResponse) -> PostsPageDto {
    let items = resp.items.iter().map(|item| post_item(media_of(item))).collect();
    PostsPageDto {
        status: "ok",
        items,
        end_cursor: feed_cursor(resp),
        more_available: resp.more_available.unwrap_or(false),
    }
}

fn post_item(media: &Value) -> PostItemDto {
    PostItemDto {
        code: first_str(media, MEDIA_CODE).unwrap_or_default(),
        display_url: first_str(media, DISPLAY_URL).unwrap_or_default(),
        media_type: first_i64(media, MEDIA_TYPE),
        like_count: first_u64(media, LIKE_COUNT),
        comment_count: first_u64(media, COMMENT_COUNT),
        video_url: first_str(media, VIDEO_URL),
    }
}

fn feed_cursor(resp: &FeedResponse) -> Option<String> {
    resp.end_cursor
        .clone()
        .or_else(|| resp.next_max_id.clone())
        .filter(|c| !c.is_empty())
}

/// Maps a page of a hashtag feed.
pub fn hashtag_feed(resp: &FeedResponse) -> HashtagFeedDto {
    let now = unix_now();
    HashtagFeedDto {
        items: resp.items.iter().map(|item| hashtag_item(media_of(item), now)).collect(),
        more_available: resp.more_available.unwrap_or(false),
        end_cursor: feed_cursor(resp),
    }
}

fn hashtag_item(media: &Value, now: i64) -> HashtagFeedItemDto {
    let user = media.get("user");
    let carousel: Option<Vec<HashtagCarouselItemDto>> = media
        .get("carousel_media")
        .and_then(Value::as_array)
        .map(|slides| {
            slides
                .iter()
                .map(|slide| HashtagCarouselItemDto {
                    display_url: first_str(slide, DISPLAY_URL).unwrap_or_default(),
                    video_url: first_str(slide, VIDEO_URL),
                    image_candidates_url: first_str(slide, CANDIDATE_URL),
                })
                .collect()
        });

    HashtagFeedItemDto {
        pk: first_str(media, MEDIA_PK).unwrap_or_default(),
        code: first_str(media, MEDIA_CODE).unwrap_or_default(),
        display_url: first_str(media, DISPLAY_URL).unwrap_or_default(),
        image_candidates_url: first_str(media, CANDIDATE_URL),
        taken_at: first_i64(media, TAKEN_AT).filter(|t| *t > 0).unwrap_or(now),
        like_count: first_u64(media, LIKE_COUNT).unwrap_or(0),
        comment_count: first_u64(media, COMMENT_COUNT).unwrap_or(0),
        view_count: first_u64(media, &["/view_count"]),
        play_count: first_u64(media, &["/play_count"]),
        video_url: first_str(media, VIDEO_URL),
        carousel_media_count: first_u64(media, &["/carousel_media_count"])
            .filter(|n| *n > 0)
            .or_else(|| carousel.as_ref().map(|c| c.len() as u64))
            .unwrap_or(0),
        carousel_media: carousel,
        user: HashtagFeedUserDto {
            username: user
                .and_then(|u| first_str(u, USERNAME))
                .unwrap_or_else(|| "unknown".to_string()),
            full_name: user.and_then(|u| first_str(u, FULL_NAME)).unwrap_or_default(),
            profile_pic_url: user.and_then(|u| first_str(u, PROFILE_PIC)).unwrap_or_default(),
            is_verified: user.and_then(|u| first_bool(u, IS_VERIFIED)).unwrap_or(false),
        },
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// STORIES & HIGHLIGHTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Maps a user's stories. A missing or null reel yields an empty item list.
pub fn stories(resp: &StoriesResponse, username: &str) -> StoriesDto {
    let reel = resp
        .reel
        .as_ref()
        .filter(|r| r.is_object())
        .or_else(|| resp.reels_media.first());
    reel_to_stories(reel, username)
}

/// Maps the items of a highlight reel.
///
/// The reel is looked up under `reels[<id>]`, then the first entry of `reels`,
/// then `reels_media[0]`; a bare `items` list is accepted as a last resort.
pub fn highlight_items(resp: &HighlightItemsResponse, highlight_id: &str) -> StoriesDto {
    let reel = resp
        .reels
        .as_ref()
        .and_then(|reels| reels.get(highlight_id).or_else(|| reels.values().next()))
        .filter(|r| r.is_object())
        .or_else(|| resp.reels_media.first());

    match reel {
        Some(reel) => reel_to_stories(Some(reel), ""),
        None => StoriesDto {
            status: "ok",
            user: mini_user(None, ""),
            items: resp.items.iter().map(story_item).collect(),
        },
    }
}

fn reel_to_stories(reel: Option<&Value>, fallback_username: &str) -> StoriesDto {
    let user = reel.and_then(|r| r.get("user"));
    let items = reel
        .and_then(|r| r.get("items"))
        .and_then(Value::as_array)
        .map(|items| items.iter().map(story_item).collect())
        .unwrap_or_default();
    StoriesDto {
        status: "ok",
        user: mini_user(user, fallback_username),
        items,
    }
}

fn story_item(item: &Value) -> StoryItemDto {
    StoryItemDto {
        id: first_str(item, &["/id", "/pk"]).unwrap_or_default(),
        media_type: first_i64(item, MEDIA_TYPE).unwrap_or(1),
        image_url: first_str(item, DISPLAY_URL).unwrap_or_default(),
        video_url: first_str(item, VIDEO_URL),
        taken_at: first_i64(item, TAKEN_AT).unwrap_or(0),
        expiring_at: first_i64(item, &["/expiring_at"]).unwrap_or(0),
    }
}

/// Maps a highlight tray (`tray[]`, or the flat `highlights[]` shape).
pub fn highlights(resp: &HighlightsResponse) -> HighlightsDto {
    let source = if resp.tray.is_empty() { &resp.highlights } else { &resp.tray };
    let highlights = source
        .iter()
        .filter_map(|h| {
            Some(HighlightDto {
                id: first_str(h, &["/id", "/pk"])?,
                title: first_str(h, &["/title"]).unwrap_or_default(),
                cover_url: first_str(h, HIGHLIGHT_COVER),
                items_count: first_u64(h, HIGHLIGHT_COUNT).unwrap_or(0),
            })
        })
        .collect();
    HighlightsDto { highlights }
}

// ═══════════════════════════════════════════════════════════════════════════════
// MEDIA & COMMENTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Maps a single post. Returns `None` when the envelope carries no item.
pub fn media(resp: &MediaInfoResponse, requested_code: &str) -> Option<MediaDto> {
    let item = resp
        .items
        .first()
        .or(resp.media.as_ref())
        .filter(|i| i.is_object())?;

    let carousel: Option<Vec<CarouselItemDto>> = item
        .get("carousel_media")
        .and_then(Value::as_array)
        .filter(|slides| !slides.is_empty())
        .map(|slides| {
            slides
                .iter()
                .map(|slide| CarouselItemDto {
                    display_url: first_str(slide, DISPLAY_URL).unwrap_or_default(),
                    video_url: first_str(slide, VIDEO_URL),
                    media_type: media_kind(slide),
                })
                .collect()
        });

    Some(MediaDto {
        code: first_str(item, &["/code"]).unwrap_or_else(|| requested_code.to_string()),
        caption_text: first_str(item, CAPTION).unwrap_or_default(),
        taken_at: first_i64(item, TAKEN_AT).unwrap_or(0),
        media_type: if carousel.is_some() { MediaKind::Carousel } else { media_kind(item) },
        display_url: first_str(item, DISPLAY_URL)
            .or_else(|| {
                carousel
                    .as_ref()
                    .and_then(|c| c.first())
                    .map(|s| s.display_url.clone())
            })
            .unwrap_or_default(),
        video_url: first_str(item, VIDEO_URL),
        user: mini_user(item.get("user"), ""),
        like_count: first_u64(item, LIKE_COUNT).unwrap_or(0),
        comment_count: first_u64(item, COMMENT_COUNT).unwrap_or(0),
        carousel,
    })
}

/// Instagram media type: 1 image, 2 video, 8 carousel.
fn media_kind(item: &Value) -> MediaKind {
    match first_i64(item, MEDIA_TYPE) {
        Some(2) => MediaKind::Video,
        Some(8) => MediaKind::Carousel,
        Some(_) => MediaKind::Image,
        None if first_str(item, VIDEO_URL).is_some() => MediaKind::Video,
        None => MediaKind::Image,
    }
}

/// Maps a page of comments.
pub fn comments(resp: &CommentsResponse) -> CommentsPageDto {
    let comments = resp
        .comments
        .iter()
        .map(|c| CommentDto {
            id: first_str(c, COMMENT_ID).unwrap_or_default(),
            text: first_str(c, &["/text"]).unwrap_or_default(),
            created_at: first_i64(c, COMMENT_CREATED).unwrap_or(0),
            like_count: first_u64(c, COMMENT_LIKES).unwrap_or(0),
            user: mini_user(c.get("user"), ""),
        })
        .collect();

    let end_cursor = [&resp.end_cursor, &resp.next_min_id, &resp.next_max_id]
        .into_iter()
        .find_map(|c| c.clone().filter(|c| !c.is_empty()));
    let has_more = resp
        .has_more
        .or(resp.has_more_comments)
        .or(resp.has_more_headload_comments)
        .unwrap_or(end_cursor.is_some());

    CommentsPageDto {
        comments,
        end_cursor,
        has_more,
    }
}
