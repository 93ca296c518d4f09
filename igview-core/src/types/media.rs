//! Media info and comment payloads.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::de::{bool_like, lenient, lenient_vec, string_like};

/// Response of `raw/ig/media/info/`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MediaInfoResponse {
    /// Envelope status
    #[serde(default, deserialize_with = "string_like")]
    pub status: Option<String>,
    /// Matching media (normally exactly one)
    #[serde(default, deserialize_with = "lenient_vec")]
    pub items: Vec<Value>,
    /// Single-object variant
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub media: Option<Value>,
}

/// Response of `raw/ig/media/comments/`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CommentsResponse {
    /// Envelope status
    #[serde(default, deserialize_with = "string_like")]
    pub status: Option<String>,
    /// Comment objects
    #[serde(default, deserialize_with = "lenient_vec")]
    pub comments: Vec<Value>,
    /// Cursor of the next page
    #[serde(default, deserialize_with = "string_like", skip_serializing_if = "Option::is_none")]
    pub end_cursor: Option<String>,
    /// Instagram-style cursor for older comments
    #[serde(default, deserialize_with = "string_like", skip_serializing_if = "Option::is_none")]
    pub next_min_id: Option<String>,
    /// Instagram-style cursor for newer comments
    #[serde(default, deserialize_with = "string_like", skip_serializing_if = "Option::is_none")]
    pub next_max_id: Option<String>,
    /// Whether another page exists
    #[serde(default, deserialize_with = "bool_like", skip_serializing_if = "Option::is_none")]
    pub has_more: Option<bool>,
    /// Instagram-style variant of `has_more`
    #[serde(default, deserialize_with = "bool_like", skip_serializing_if = "Option::is_none")]
    pub has_more_comments: Option<bool>,
    /// Instagram-style variant of `has_more` for head-loaded pages
    #[serde(default, deserialize_with = "bool_like", skip_serializing_if = "Option::is_none")]
    pub has_more_headload_comments: Option<bool>,
}
