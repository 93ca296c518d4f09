//! Lenient deserializers for upstream payloads.
//!
//! IMAI mirrors Instagram's private API, whose field types drift between
//! endpoints and over time. These helpers decode a field optimistically and
//! fall back to an explicit default instead of failing the whole payload.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Decodes `T` if the value has the right shape, otherwise `None`.
pub fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

/// Decodes an array of raw JSON values; anything else becomes an empty list.
pub fn lenient_vec<'de, D>(deserializer: D) -> Result<Vec<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => Ok(items),
        _ => Ok(Vec::new()),
    }
}

/// Decodes a string, accepting numbers and booleans as their textual form.
pub fn string_like<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

/// Decodes a boolean, accepting `0`/`1` and `"true"`/`"false"`.
pub fn bool_like<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Bool(b)) => Some(b),
        Some(Value::Number(n)) => n.as_i64().map(|n| n != 0),
        Some(Value::String(s)) => match s.as_str() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "string_like")]
        cursor: Option<String>,
        #[serde(default, deserialize_with = "bool_like")]
        more: Option<bool>,
        #[serde(default, deserialize_with = "lenient_vec")]
        items: Vec<Value>,
        #[serde(default, deserialize_with = "lenient")]
        count: Option<u64>,
    }

    #[test]
    fn test_missing_fields_default() {
        let p: Probe = serde_json::from_value(json!({})).unwrap();
        assert!(p.cursor.is_none());
        assert!(p.more.is_none());
        assert!(p.items.is_empty());
        assert!(p.count.is_none());
    }

    #[test]
    fn test_wrong_shapes_fall_back() {
        let p: Probe = serde_json::from_value(json!({
            "cursor": 12345,
            "more": 1,
            "items": null,
            "count": "many"
        }))
        .unwrap();
        assert_eq!(p.cursor.as_deref(), Some("12345"));
        assert_eq!(p.more, Some(true));
        assert!(p.items.is_empty());
        assert!(p.count.is_none());
    }

    #[test]
    fn test_well_formed_values_pass_through() {
        let p: Probe = serde_json::from_value(json!({
            "cursor": "QVFE",
            "more": false,
            "items": [{"code": "a"}],
            "count": 7
        }))
        .unwrap();
        assert_eq!(p.cursor.as_deref(), Some("QVFE"));
        assert_eq!(p.more, Some(false));
        assert_eq!(p.items.len(), 1);
        assert_eq!(p.count, Some(7));
    }
}
