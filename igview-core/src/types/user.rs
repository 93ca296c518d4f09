//! User search and profile payloads.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::de::{bool_like, lenient, string_like};

/// Response of `raw/ig/search/users/`.
///
/// The user list has been observed under `users`, `list`, `data.users` and
/// `data.list`; each is kept so the route layer can pick in a fixed order.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Envelope status
    #[serde(default, deserialize_with = "string_like")]
    pub status: Option<String>,
    /// Flat user objects
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub users: Option<Vec<Value>>,
    /// Wrapped user objects (`{ "user": { ... } }`)
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub list: Option<Vec<Value>>,
    /// Nested variant of the two lists above
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub data: Option<SearchData>,
    /// Whether more results exist
    #[serde(default, deserialize_with = "bool_like", skip_serializing_if = "Option::is_none")]
    pub has_more: Option<bool>,
}

/// Nested `data` object of a search response.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SearchData {
    /// Flat user objects
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub users: Option<Vec<Value>>,
    /// Wrapped user objects
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub list: Option<Vec<Value>>,
}

/// Response of `raw/ig/user/info/`.
///
/// The profile is normally under `user`, but some responses inline it at the
/// top level; those fields are collected in `extra`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct UserInfoResponse {
    /// Envelope status
    #[serde(default, deserialize_with = "string_like")]
    pub status: Option<String>,
    /// Profile object
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub user: Option<Value>,
    /// Every other top-level field
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Envelope;
    use serde_json::json;

    #[test]
    fn test_search_shapes_decode() {
        let resp: SearchResponse = serde_json::from_value(json!({
            "status": "ok",
            "data": { "list": [{ "user": { "username": "a" } }] }
        }))
        .unwrap();
        assert!(resp.is_ok());
        assert!(resp.users.is_none());
        assert_eq!(resp.data.unwrap().list.unwrap().len(), 1);
    }

    #[test]
    fn test_search_non_array_users_ignored() {
        let resp: SearchResponse =
            serde_json::from_value(json!({ "status": "ok", "users": "nope" })).unwrap();
        assert!(resp.users.is_none());
    }

    #[test]
    fn test_user_info_inline_profile() {
        let resp: UserInfoResponse = serde_json::from_value(json!({
            "status": "ok",
            "username": "inline",
            "follower_count": 3
        }))
        .unwrap();
        assert!(resp.user.is_none());
        assert_eq!(resp.extra.get("username"), Some(&json!("inline")));
    }
}
