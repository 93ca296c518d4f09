//! Story, highlight tray and highlight reel payloads.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::de::{lenient, lenient_vec, string_like};

/// Response of `raw/ig/user/stories/`.
///
/// `reel` is `null` when the user has no active stories; that is a success.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StoriesResponse {
    /// Envelope status
    #[serde(default, deserialize_with = "string_like")]
    pub status: Option<String>,
    /// Active reel, if any
    #[serde(default, deserialize_with = "lenient")]
    pub reel: Option<Value>,
    /// Multi-reel variant
    #[serde(default, deserialize_with = "lenient_vec", skip_serializing_if = "Vec::is_empty")]
    pub reels_media: Vec<Value>,
}

/// Response of `raw/ig/user/highlights/`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct HighlightsResponse {
    /// Envelope status
    #[serde(default, deserialize_with = "string_like")]
    pub status: Option<String>,
    /// Instagram-style highlight tray
    #[serde(default, deserialize_with = "lenient_vec")]
    pub tray: Vec<Value>,
    /// Flattened variant
    #[serde(default, deserialize_with = "lenient_vec", skip_serializing_if = "Vec::is_empty")]
    pub highlights: Vec<Value>,
}

/// Response of `raw/ig/highlight/info/`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct HighlightItemsResponse {
    /// Envelope status
    #[serde(default, deserialize_with = "string_like")]
    pub status: Option<String>,
    /// Reels keyed by highlight id
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub reels: Option<Map<String, Value>>,
    /// List variant of `reels`
    #[serde(default, deserialize_with = "lenient_vec", skip_serializing_if = "Vec::is_empty")]
    pub reels_media: Vec<Value>,
    /// Flattened variant
    #[serde(default, deserialize_with = "lenient_vec", skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Envelope;
    use serde_json::json;

    #[test]
    fn test_null_reel_is_success() {
        let resp: StoriesResponse =
            serde_json::from_value(json!({ "status": "ok", "reel": null })).unwrap();
        assert!(resp.is_ok());
        assert!(resp.reel.is_none());
        assert!(resp.reels_media.is_empty());
    }

    #[test]
    fn test_highlight_reels_map() {
        let resp: HighlightItemsResponse = serde_json::from_value(json!({
            "status": "ok",
            "reels": { "highlight:1": { "items": [{ "id": "s1" }] } }
        }))
        .unwrap();
        assert!(resp.reels.unwrap().contains_key("highlight:1"));
    }

    #[test]
    fn test_missing_status_is_not_ok() {
        let resp: HighlightsResponse = serde_json::from_value(json!({ "tray": [] })).unwrap();
        assert!(resp.status().is_none());
        assert!(!resp.is_ok());
    }
}
