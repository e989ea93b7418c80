//! Navigation into nested JSON values along configurable paths.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
/// One step of a [`JsonPath`].
pub enum PathSegment {
    /// Array index, negative values count from the end (`-1` is the last item).
    Index(isize),
    /// Object key.
    Key(String),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Index(index) => write!(formatter, "{index}"),
            PathSegment::Key(key) => write!(formatter, "{key}"),
        }
    }
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_owned())
    }
}

impl From<isize> for PathSegment {
    fn from(index: isize) -> Self {
        PathSegment::Index(index)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
/// Ordered keys and indices leading to a nested value.
pub struct JsonPath(pub Vec<PathSegment>);

impl JsonPath {
    /// Build a path from object keys only.
    #[must_use]
    pub fn keys(keys: &[&str]) -> Self {
        Self(keys.iter().map(|key| PathSegment::from(*key)).collect())
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .0
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(".");
        write!(formatter, "[{joined}]")
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
/// Reasons a [`dig`] can fail.
pub enum LookupError {
    /// A key was applied to something that is not an object.
    #[error("value before '{segment}' is not an object (path {path})")]
    NotAnObject {
        /// Failing segment.
        segment: String,
        /// Full path being followed.
        path: String,
    },
    /// An index was applied to something that is not an array.
    #[error("value before index {segment} is not an array (path {path})")]
    NotAnArray {
        /// Failing segment.
        segment: String,
        /// Full path being followed.
        path: String,
    },
    /// The key or index is absent, or it holds `null`.
    #[error("missing key/index '{segment}' (path {path})")]
    Missing {
        /// Failing segment.
        segment: String,
        /// Full path being followed.
        path: String,
    },
}

/// Follow `path` inside `value`.
///
/// A `null` reached at any step counts as missing.
///
/// # Errors
///
/// Returns a [`LookupError`] naming the first segment that cannot be followed.
pub fn dig<'value>(value: &'value Value, path: &JsonPath) -> Result<&'value Value, LookupError> {
    let mut current = value;
    for segment in &path.0 {
        let next = match segment {
            PathSegment::Key(key) => {
                let Value::Object(map) = current else {
                    return Err(LookupError::NotAnObject {
                        segment: key.clone(),
                        path: path.to_string(),
                    });
                };
                map.get(key)
            }
            PathSegment::Index(index) => {
                let Value::Array(items) = current else {
                    return Err(LookupError::NotAnArray {
                        segment: index.to_string(),
                        path: path.to_string(),
                    });
                };
                resolve_index(*index, items.len()).and_then(|position| items.get(position))
            }
        };
        current = match next {
            Some(found) if !found.is_null() => found,
            _ => {
                return Err(LookupError::Missing {
                    segment: segment.to_string(),
                    path: path.to_string(),
                });
            }
        };
    }
    Ok(current)
}

fn resolve_index(index: isize, len: usize) -> Option<usize> {
    if index < 0 {
        len.checked_sub(index.unsigned_abs())
    } else {
        usize::try_from(index).ok()
    }
}

/// Read `value` as a non-empty identifier, accepting strings and numbers.
///
/// Strings are returned as they are; whitespace only decides emptiness.
#[must_use]
pub fn as_identifier(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => (!text.trim().is_empty()).then(|| text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

/// Loose truthiness of a JSON value: `null`, `false`, `0`, `""`, `[]` and `{}` are false.
#[must_use]
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|float| float != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn digs_through_keys_and_indices() {
        let body = json!({"features": [{"properties": {"id": "addr-1"}}]});
        let path = JsonPath(vec![
            "features".into(),
            PathSegment::Index(0),
            "properties".into(),
            "id".into(),
        ]);

        let found = dig(&body, &path).expect("path exists");

        assert_eq!(found, &json!("addr-1"), "should reach the nested id");
    }

    #[test]
    fn missing_key_is_reported_with_segment() {
        let body = json!({"items": []});
        let err = dig(&body, &JsonPath::keys(&["features"])).expect_err("key is absent");

        assert_eq!(
            err,
            LookupError::Missing {
                segment: "features".to_owned(),
                path: "[features]".to_owned(),
            },
            "missing key should name the segment"
        );
    }

    #[test]
    fn null_counts_as_missing() {
        let body = json!({"items": null});
        let err = dig(&body, &JsonPath::keys(&["items"])).expect_err("null is missing");

        assert!(matches!(err, LookupError::Missing { .. }), "got {err:?}");
    }

    #[test]
    fn key_on_non_object_fails() {
        let body = json!({"items": ["a", "b"]});
        let err = dig(&body, &JsonPath::keys(&["items", "first"])).expect_err("array has no keys");

        assert!(matches!(err, LookupError::NotAnObject { .. }), "got {err:?}");
    }

    #[test]
    fn index_out_of_bounds_fails() {
        let body = json!({"items": ["a"]});
        let path = JsonPath(vec!["items".into(), PathSegment::Index(3)]);

        let err = dig(&body, &path).expect_err("index 3 is out of bounds");

        assert!(matches!(err, LookupError::Missing { .. }), "got {err:?}");
    }

    #[test]
    fn negative_indices_count_from_the_end() {
        let body = json!({"items": ["a", "b", "c"]});

        let last = JsonPath(vec!["items".into(), PathSegment::Index(-1)]);
        assert_eq!(dig(&body, &last).expect("last item"), &json!("c"), "-1 is the last item");

        let first = JsonPath(vec!["items".into(), PathSegment::Index(-3)]);
        assert_eq!(dig(&body, &first).expect("first item"), &json!("a"), "-len is the first item");

        let beyond = JsonPath(vec!["items".into(), PathSegment::Index(-4)]);
        let err = dig(&body, &beyond).expect_err("before the first item");
        assert_eq!(
            err,
            LookupError::Missing {
                segment: "-4".to_owned(),
                path: "[items.-4]".to_owned(),
            },
            "out of range from the end"
        );
    }

    #[test]
    fn empty_path_returns_root() {
        let body = json!([1, 2]);
        assert_eq!(
            dig(&body, &JsonPath::default()).expect("root"),
            &body,
            "empty path is the identity"
        );
    }

    #[test]
    fn paths_deserialize_from_mixed_arrays() {
        let path: JsonPath = serde_json::from_value(json!(["data", 0, "events"])).expect("valid");

        assert_eq!(
            path,
            JsonPath(vec!["data".into(), PathSegment::Index(0), "events".into()]),
            "integers become indices, strings become keys"
        );

        let from_end: JsonPath = serde_json::from_value(json!(["items", -1])).expect("valid");
        assert_eq!(
            from_end,
            JsonPath(vec!["items".into(), PathSegment::Index(-1)]),
            "negative integers are accepted"
        );
    }

    #[test]
    fn identifiers_accept_numbers_and_reject_blank_strings() {
        assert_eq!(as_identifier(&json!(59080)), Some("59080".to_owned()), "number");
        assert_eq!(
            as_identifier(&json!(" 59080 ")),
            Some(" 59080 ".to_owned()),
            "passed through untouched"
        );
        assert_eq!(as_identifier(&json!("")), None, "empty");
        assert_eq!(as_identifier(&json!("  ")), None, "blank");
        assert_eq!(as_identifier(&json!(true)), None, "bool");
    }
}
