//! Catalogue of upstream IMAI operations.
//!
//! Every operation knows its upstream path, its TTL class, and how to derive a
//! cache key from its arguments. The client keeps one cache per operation, so
//! keys only need to be unique within an operation; the operation name prefix
//! keeps them readable in logs.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{FIRST_PAGE_SENTINEL, LONG_TTL_SECS, SHORT_TTL_SECS};
use crate::error::IgviewError;

/// Freshness class of an operation's cached results.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TtlClass {
    /// Paginated and search-like data (30s).
    Short,
    /// Single-entity lookups (60s).
    Long,
}

impl TtlClass {
    /// Time-to-live for this class.
    pub fn ttl(self) -> Duration {
        match self {
            TtlClass::Short => Duration::from_secs(SHORT_TTL_SECS),
            TtlClass::Long => Duration::from_secs(LONG_TTL_SECS),
        }
    }
}

/// An upstream operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Search users by keyword.
    SearchUsers,
    /// Profile of a single user.
    UserInfo,
    /// Highlight tray of a user.
    UserHighlights,
    /// Posts of a user (paginated).
    UserFeed,
    /// Reels of a user (paginated).
    UserReels,
    /// Posts a user is tagged in (paginated).
    UserTagged,
    /// Posts a user reposted (paginated).
    UserReposts,
    /// Recent or top posts of a hashtag (paginated).
    HashtagFeed,
    /// A single post by shortcode.
    MediaInfo,
    /// Comments on a post (paginated).
    MediaComments,
    /// Active stories of a user.
    UserStories,
    /// Items of one highlight reel.
    HighlightItems,
}

impl Operation {
    /// All operations, in catalogue order.
    pub const ALL: [Operation; 12] = [
        Operation::SearchUsers,
        Operation::UserInfo,
        Operation::UserHighlights,
        Operation::UserFeed,
        Operation::UserReels,
        Operation::UserTagged,
        Operation::UserReposts,
        Operation::HashtagFeed,
        Operation::MediaInfo,
        Operation::MediaComments,
        Operation::UserStories,
        Operation::HighlightItems,
    ];

    /// Path of the operation, relative to the upstream base URL.
    pub fn path(self) -> &'static str {
        match self {
            Operation::SearchUsers => "raw/ig/search/users/",
            Operation::UserInfo => "raw/ig/user/info/",
            Operation::UserHighlights => "raw/ig/user/highlights/",
            Operation::UserFeed => "raw/ig/user/feed/",
            Operation::UserReels => "raw/ig/user/reels/",
            Operation::UserTagged => "raw/ig/usertags/feed/",
            Operation::UserReposts => "raw/ig/user/reposted_feed/",
            Operation::HashtagFeed => "raw/ig/hashtag/feed/",
            Operation::MediaInfo => "raw/ig/media/info/",
            Operation::MediaComments => "raw/ig/media/comments/",
            Operation::UserStories => "raw/ig/user/stories/",
            Operation::HighlightItems => "raw/ig/highlight/info/",
        }
    }

    /// Stable snake_case name, used in cache keys, logs and configuration.
    pub fn name(self) -> &'static str {
        match self {
            Operation::SearchUsers => "search_users",
            Operation::UserInfo => "user_info",
            Operation::UserHighlights => "user_highlights",
            Operation::UserFeed => "user_feed",
            Operation::UserReels => "user_reels",
            Operation::UserTagged => "user_tagged",
            Operation::UserReposts => "user_reposts",
            Operation::HashtagFeed => "hashtag_feed",
            Operation::MediaInfo => "media_info",
            Operation::MediaComments => "media_comments",
            Operation::UserStories => "user_stories",
            Operation::HighlightItems => "highlight_items",
        }
    }

    /// Query parameter carrying the operation's subject.
    pub fn subject_param(self) -> &'static str {
        match self {
            Operation::SearchUsers => "keyword",
            Operation::HashtagFeed => "hashtag",
            Operation::MediaInfo | Operation::MediaComments => "code",
            Operation::HighlightItems => "highlight_id",
            Operation::UserInfo
            | Operation::UserHighlights
            | Operation::UserFeed
            | Operation::UserReels
            | Operation::UserTagged
            | Operation::UserReposts
            | Operation::UserStories => "url",
        }
    }

    /// TTL class of the operation's results.
    pub fn ttl_class(self) -> TtlClass {
        match self {
            Operation::UserInfo
            | Operation::UserHighlights
            | Operation::MediaInfo
            | Operation::HighlightItems => TtlClass::Long,
            Operation::SearchUsers
            | Operation::UserFeed
            | Operation::UserReels
            | Operation::UserTagged
            | Operation::UserReposts
            | Operation::HashtagFeed
            | Operation::MediaComments
            | Operation::UserStories => TtlClass::Short,
        }
    }

    /// Returns true if the operation accepts a pagination cursor.
    pub fn is_paginated(self) -> bool {
        matches!(
            self,
            Operation::UserFeed
                | Operation::UserReels
                | Operation::UserTagged
                | Operation::UserReposts
                | Operation::HashtagFeed
                | Operation::MediaComments
        )
    }

    /// Derives the cache key for a subject and optional cursor.
    ///
    /// Paginated operations always carry a cursor segment (the sentinel for the
    /// first page), so distinct pages never share a key.
    pub fn cache_key(self, subject: &str, cursor: Option<&str>) -> String {
        let subject = subject.trim();
        if self.is_paginated() {
            let cursor = cursor
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .unwrap_or(FIRST_PAGE_SENTINEL);
            format!("{}:{}:{}", self.name(), subject, cursor)
        } else {
            format!("{}:{}", self.name(), subject)
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Operation {
    type Err = IgviewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Operation::ALL
            .into_iter()
            .find(|op| op.name() == wanted)
            .ok_or_else(|| IgviewError::ConfigError(format!("unknown upstream operation '{}'", s)))
    }
}
