//! Paginated feed payloads (user posts, reels, tagged, reposts, hashtags).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::de::{bool_like, lenient_vec, string_like};

/// Response of every cursor-paginated feed operation.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FeedResponse {
    /// Envelope status
    #[serde(default, deserialize_with = "string_like")]
    pub status: Option<String>,
    /// Feed items (raw; reels nest the post under `media`)
    #[serde(default, deserialize_with = "lenient_vec")]
    pub items: Vec<Value>,
    /// Cursor of the next page
    #[serde(default, deserialize_with = "string_like")]
    pub end_cursor: Option<String>,
    /// Legacy cursor field
    #[serde(default, deserialize_with = "string_like", skip_serializing_if = "Option::is_none")]
    pub next_max_id: Option<String>,
    /// Whether another page exists
    #[serde(default, deserialize_with = "bool_like")]
    pub more_available: Option<bool>,
}
