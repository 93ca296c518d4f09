//! IMAI client.

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use url::Url;

use igview_cache::{CacheConfig, CacheStats, TtlCache};
use igview_core::constants::{API_KEY_HEADER, CURSOR_PARAM};
use igview_core::types::Envelope;
use igview_core::{
    CommentsResponse, FeedResponse, HighlightItemsResponse, HighlightsResponse, IgviewError,
    MediaInfoResponse, Operation, Result, SearchResponse, StoriesResponse, UpstreamContext,
    UpstreamError, UserInfoResponse,
};
use igview_queue::RequestQueue;

use crate::classify::{classify_response, sanitize_headers};
use crate::config::ImaiConfig;

type UpstreamResult<T> = std::result::Result<Arc<T>, UpstreamError>;

/// Hashtag feed flavour.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashtagFeedKind {
    /// Most recent posts
    #[default]
    Recent,
    /// Top posts
    Top,
}

impl HashtagFeedKind {
    /// Parses a route parameter; anything but `top` means recent.
    pub fn from_param(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(s) if s.eq_ignore_ascii_case("top") => HashtagFeedKind::Top,
            _ => HashtagFeedKind::Recent,
        }
    }

    /// Wire value of the `type` parameter.
    pub fn as_str(self) -> &'static str {
        match self {
            HashtagFeedKind::Recent => "recent",
            HashtagFeedKind::Top => "top",
        }
    }
}

impl fmt::Display for HashtagFeedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One typed cache per operation.
struct Caches {
    search_users: TtlCache<Arc<SearchResponse>>,
    user_info: TtlCache<Arc<UserInfoResponse>>,
    user_highlights: TtlCache<Arc<HighlightsResponse>>,
    user_feed: TtlCache<Arc<FeedResponse>>,
    user_reels: TtlCache<Arc<FeedResponse>>,
    user_tagged: TtlCache<Arc<FeedResponse>>,
    user_reposts: TtlCache<Arc<FeedResponse>>,
    hashtag_feed: TtlCache<Arc<FeedResponse>>,
    media_info: TtlCache<Arc<MediaInfoResponse>>,
    media_comments: TtlCache<Arc<CommentsResponse>>,
    user_stories: TtlCache<Arc<StoriesResponse>>,
    highlight_items: TtlCache<Arc<HighlightItemsResponse>>,
}

impl Caches {
    fn new(max_entries: usize) -> Self {
        fn cache<T: Clone>(op: Operation, max_entries: usize) -> TtlCache<T> {
            TtlCache::with_config(CacheConfig::new(op.ttl_class().ttl()).with_max_entries(max_entries))
        }
        Self {
            search_users: cache(Operation::SearchUsers, max_entries),
            user_info: cache(Operation::UserInfo, max_entries),
            user_highlights: cache(Operation::UserHighlights, max_entries),
            user_feed: cache(Operation::UserFeed, max_entries),
            user_reels: cache(Operation::UserReels, max_entries),
            user_tagged: cache(Operation::UserTagged, max_entries),
            user_reposts: cache(Operation::UserReposts, max_entries),
            hashtag_feed: cache(Operation::HashtagFeed, max_entries),
            media_info: cache(Operation::MediaInfo, max_entries),
            media_comments: cache(Operation::MediaComments, max_entries),
            user_stories: cache(Operation::UserStories, max_entries),
            highlight_items: cache(Operation::HighlightItems, max_entries),
        }
    }

    fn stats(&self, op: Operation) -> CacheStats {
        match op {
            Operation::SearchUsers => self.search_users.stats(),
            Operation::UserInfo => self.user_info.stats(),
            Operation::UserHighlights => self.user_highlights.stats(),
            Operation::UserFeed => self.user_feed.stats(),
            Operation::UserReels => self.user_reels.stats(),
            Operation::UserTagged => self.user_tagged.stats(),
            Operation::UserReposts => self.user_reposts.stats(),
            Operation::HashtagFeed => self.hashtag_feed.stats(),
            Operation::MediaInfo => self.media_info.stats(),
            Operation::MediaComments => self.media_comments.stats(),
            Operation::UserStories => self.user_stories.stats(),
            Operation::HighlightItems => self.highlight_items.stats(),
        }
    }

    fn cleanup_expired(&self) -> usize {
        self.search_users.cleanup_expired()
            + self.user_info.cleanup_expired()
            + self.user_highlights.cleanup_expired()
            + self.user_feed.cleanup_expired()
            + self.user_reels.cleanup_expired()
            + self.user_tagged.cleanup_expired()
            + self.user_reposts.cleanup_expired()
            + self.hashtag_feed.cleanup_expired()
            + self.media_info.cleanup_expired()
            + self.media_comments.cleanup_expired()
            + self.user_stories.cleanup_expired()
            + self.highlight_items.cleanup_expired()
    }

    fn clear(&self) {
        self.search_users.clear();
        self.user_info.clear();
        self.user_highlights.clear();
        self.user_feed.clear();
        self.user_reels.clear();
        self.user_tagged.clear();
        self.user_reposts.clear();
        self.hashtag_feed.clear();
        self.media_info.clear();
        self.media_comments.clear();
        self.user_stories.clear();
        self.highlight_items.clear();
    }
}

/// A prepared upstream call: operation, cache key and query parameters.
struct Call {
    op: Operation,
    key: String,
    params: Vec<(String, String)>,
}

impl Call {
    fn new(op: Operation, subject: &str) -> Self {
        Self {
            op,
            key: op.cache_key(subject, None),
            params: vec![(op.subject_param().to_string(), subject.trim().to_string())],
        }
    }

    fn param(mut self, name: &str, value: &str) -> Self {
        self.params.push((name.to_string(), value.to_string()));
        self
    }

    /// Adds the pagination cursor (if any) to both the params and the key.
    fn paged(mut self, subject_key: &str, after: Option<&str>) -> Self {
        let after = after.map(str::trim).filter(|c| !c.is_empty());
        self.key = self.op.cache_key(subject_key, after);
        if let Some(cursor) = after {
            self.params.push((CURSOR_PARAM.to_string(), cursor.to_string()));
        }
        self
    }
}

/// Authenticated, rate-limited, caching IMAI client.
///
/// Construct once per process and share it (it is cheap to wrap in `Arc`).
pub struct ImaiClient {
    config: ImaiConfig,
    http: reqwest::Client,
    queue: RequestQueue,
    caches: Caches,
}

impl ImaiClient {
    /// Creates a client from configuration.
    pub fn new(config: ImaiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| IgviewError::ConfigError(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            queue: RequestQueue::new(config.min_interval),
            caches: Caches::new(config.cache_max_entries),
            config,
            http,
        })
    }

    /// Returns the client configuration.
    pub fn config(&self) -> &ImaiConfig {
        &self.config
    }

    /// Number of upstream calls waiting for their dispatch slot.
    pub fn pending_requests(&self) -> usize {
        self.queue.pending()
    }

    /// Statistics of one operation's cache.
    pub fn cache_stats(&self, op: Operation) -> CacheStats {
        self.caches.stats(op)
    }

    /// Statistics summed over every operation cache.
    pub fn total_cache_stats(&self) -> CacheStats {
        Operation::ALL
            .into_iter()
            .map(|op| self.caches.stats(op))
            .fold(CacheStats::default(), |acc, s| acc + s)
    }

    /// Drops expired entries from every cache, returning how many were removed.
    pub fn sweep_caches(&self) -> usize {
        self.caches.cleanup_expired()
    }

    /// Empties every cache.
    pub fn clear_caches(&self) {
        self.caches.clear();
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // OPERATIONS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Searches users by keyword.
    #[instrument(skip(self))]
    pub async fn search_users(&self, keyword: &str) -> UpstreamResult<SearchResponse> {
        let call = Call::new(Operation::SearchUsers, keyword);
        self.fetch(call, &self.caches.search_users).await
    }

    /// Fetches a user's profile.
    #[instrument(skip(self))]
    pub async fn get_user_info(&self, username: &str) -> UpstreamResult<UserInfoResponse> {
        let call = Call::new(Operation::UserInfo, username);
        self.fetch(call, &self.caches.user_info).await
    }

    /// Fetches a user's highlight tray.
    #[instrument(skip(self))]
    pub async fn get_user_highlights(&self, username: &str) -> UpstreamResult<HighlightsResponse> {
        let call = Call::new(Operation::UserHighlights, username);
        self.fetch(call, &self.caches.user_highlights).await
    }

    /// Fetches a page of a user's posts.
    #[instrument(skip(self))]
    pub async fn get_user_feed(&self, username: &str, after: Option<&str>) -> UpstreamResult<FeedResponse> {
        let call = Call::new(Operation::UserFeed, username).paged(username, after);
        self.fetch(call, &self.caches.user_feed).await
    }

    /// Fetches a page of a user's reels.
    #[instrument(skip(self))]
    pub async fn get_user_reels(&self, username: &str, after: Option<&str>) -> UpstreamResult<FeedResponse> {
        let call = Call::new(Operation::UserReels, username).paged(username, after);
        self.fetch(call, &self.caches.user_reels).await
    }

    /// Fetches a page of posts the user is tagged in.
    #[instrument(skip(self))]
    pub async fn get_user_tagged(&self, username: &str, after: Option<&str>) -> UpstreamResult<FeedResponse> {
        let call = Call::new(Operation::UserTagged, username).paged(username, after);
        self.fetch(call, &self.caches.user_tagged).await
    }

    /// Fetches a page of posts the user reposted.
    #[instrument(skip(self))]
    pub async fn get_user_reposts(&self, username: &str, after: Option<&str>) -> UpstreamResult<FeedResponse> {
        let call = Call::new(Operation::UserReposts, username).paged(username, after);
        self.fetch(call, &self.caches.user_reposts).await
    }

    /// Fetches a page of a hashtag's recent or top posts.
    #[instrument(skip(self))]
    pub async fn get_hashtag_feed(
        &self,
        hashtag: &str,
        kind: HashtagFeedKind,
        after: Option<&str>,
    ) -> UpstreamResult<FeedResponse> {
        let subject_key = format!("{}:{}", hashtag.trim(), kind);
        let call = Call::new(Operation::HashtagFeed, hashtag)
            .param("type", kind.as_str())
            .paged(&subject_key, after);
        self.fetch(call, &self.caches.hashtag_feed).await
    }

    /// Fetches a single post by shortcode.
    #[instrument(skip(self))]
    pub async fn get_media_info(&self, code: &str) -> UpstreamResult<MediaInfoResponse> {
        let call = Call::new(Operation::MediaInfo, code);
        self.fetch(call, &self.caches.media_info).await
    }

    /// Fetches a page of comments on a post.
    #[instrument(skip(self))]
    pub async fn get_media_comments(&self, code: &str, after: Option<&str>) -> UpstreamResult<CommentsResponse> {
        let call = Call::new(Operation::MediaComments, code).paged(code, after);
        self.fetch(call, &self.caches.media_comments).await
    }

    /// Fetches a user's active stories.
    #[instrument(skip(self))]
    pub async fn get_user_stories(&self, username: &str) -> UpstreamResult<StoriesResponse> {
        let call = Call::new(Operation::UserStories, username);
        self.fetch(call, &self.caches.user_stories).await
    }

    /// Fetches the items of one highlight reel (e.g. `highlight:18029499352961095`).
    #[instrument(skip(self))]
    pub async fn get_highlight_items(&self, highlight_id: &str) -> UpstreamResult<HighlightItemsResponse> {
        let call = Call::new(Operation::HighlightItems, highlight_id);
        self.fetch(call, &self.caches.highlight_items).await
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // PIPELINE
    // ═══════════════════════════════════════════════════════════════════════════

    /// Cache lookup, paced dispatch, classification and cache write.
    async fn fetch<T>(&self, call: Call, cache: &TtlCache<Arc<T>>) -> UpstreamResult<T>
    where
        T: DeserializeOwned + Envelope + Send + Sync + 'static,
    {
        let Call { op, key, params } = call;

        if let Some(hit) = cache.get(&key) {
            debug!(op = %op, key = %key, "cache hit");
            return Ok(hit);
        }
        debug!(op = %op, key = %key, "cache miss, queueing upstream call");

        let context = UpstreamContext::new(op.path(), params.clone());
        let url = self
            .config
            .base_url
            .join(op.path())
            .map_err(|e| UpstreamError::network(format!("invalid upstream URL: {}", e), context.clone()))?;
        let http = self.http.clone();
        let api_key = self.config.api_key.clone();
        let require_status = self.config.envelope.require_status_field(op);

        let outcome = self
            .queue
            .enqueue(move || execute::<T>(http, url, api_key, params, require_status, context))
            .await;

        let payload = match outcome {
            Ok(result) => Arc::new(result?),
            Err(dropped) => {
                return Err(UpstreamError::network(
                    dropped,
                    UpstreamContext::new(op.path(), Vec::new()),
                ))
            }
        };

        if payload.is_ok() {
            cache.set(key, Arc::clone(&payload));
        } else {
            debug!(op = %op, "envelope has no status field; result not cached");
        }
        Ok(payload)
    }
}

/// Performs one upstream GET. Runs on the queue's dispatch task.
async fn execute<T: DeserializeOwned>(
    http: reqwest::Client,
    url: Url,
    api_key: String,
    params: Vec<(String, String)>,
    require_status: bool,
    context: UpstreamContext,
) -> std::result::Result<T, UpstreamError> {
    let response = http
        .get(url)
        .header(API_KEY_HEADER, api_key)
        .query(&params)
        .send()
        .await
        .map_err(|e| UpstreamError::network(e.without_url(), context.clone()))?;

    let status = response.status().as_u16();
    let context = context
        .with_status(status)
        .with_headers(sanitize_headers(response.headers()));

    let body = response
        .text()
        .await
        .map_err(|e| UpstreamError::network(e.without_url(), context.clone()))?;

    debug!(path = %context.path, status, bytes = body.len(), "upstream responded");
    classify_response(status, &body, require_status, context)
}
