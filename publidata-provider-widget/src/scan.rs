//! Schema-less search for dated events inside a hydration payload.
//!
//! The widget's embedded state is undocumented and changes between versions,
//! so events are recognized by shape: any object with an ISO-looking `date`
//! string counts, wherever it sits in the tree. Unrelated dated objects are
//! picked up as well.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

/// Fields tried, in order, for an event's label.
pub const LABEL_FIELDS: &[&str] = &["label", "name", "type", "wasteType"];

/// Label of an event that has none of [`LABEL_FIELDS`].
pub const FALLBACK_LABEL: &str = "Collecte";

const DATE_FIELD: &str = "date";

static ISO_DATE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}").expect("valid date regex"));

/// Recognize a single object as an event, returning its raw date and label.
#[must_use]
pub fn recognize_event(node: &Map<String, Value>) -> Option<(&str, &str)> {
    let date = node.get(DATE_FIELD)?.as_str()?;
    if !ISO_DATE_PREFIX.is_match(date) {
        return None;
    }

    let label = LABEL_FIELDS
        .iter()
        .find_map(|field| {
            node.get(*field)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|label| !label.is_empty())
        })
        .unwrap_or(FALLBACK_LABEL);

    Some((date, label))
}

/// Walk the whole payload and collect every recognized `(date, label)` pair.
///
/// Uses an explicit stack, so emission order is not meaningful. Children of a
/// recognized object are still visited.
#[must_use]
pub fn scan_events(payload: &Value) -> Vec<(String, String)> {
    let mut found = Vec::new();
    let mut stack = vec![payload];

    while let Some(node) = stack.pop() {
        match node {
            Value::Object(map) => {
                if let Some((date, label)) = recognize_event(map) {
                    found.push((date.to_owned(), label.to_owned()));
                }
                stack.extend(map.values());
            }
            Value::Array(items) => stack.extend(items),
            _ => {}
        }
    }

    found
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn object(value: &Value) -> &Map<String, Value> {
        value.as_object().expect("test fixture is an object")
    }

    #[test]
    fn recognizes_label_fields_in_order() {
        let node = json!({"date": "2024-03-15", "name": "Bio", "type": "organic"});
        assert_eq!(
            recognize_event(object(&node)),
            Some(("2024-03-15", "Bio")),
            "name comes before type"
        );

        let timed = json!({"date": "2024-03-15T07:00:00Z", "wasteType": "Verre"});
        assert_eq!(
            recognize_event(object(&timed)),
            Some(("2024-03-15T07:00:00Z", "Verre")),
            "datetime prefix matches"
        );
    }

    #[test]
    fn falls_back_to_default_label() {
        let node = json!({"date": "2024-03-15", "label": "", "type": 3});
        assert_eq!(
            recognize_event(object(&node)),
            Some(("2024-03-15", FALLBACK_LABEL)),
            "blank and non-text labels are skipped"
        );
    }

    #[test]
    fn rejects_non_dates() {
        for node in [
            json!({"date": "not-a-date", "label": "Verre"}),
            json!({"date": "15/03/2024", "label": "Verre"}),
            json!({"date": 20_240_315, "label": "Verre"}),
            json!({"label": "Verre"}),
        ] {
            assert_eq!(recognize_event(object(&node)), None, "{node} is not an event");
        }
    }

    #[test]
    fn finds_events_at_any_depth() {
        let payload = json!({
            "props": {
                "pageProps": {
                    "calendar": [
                        {"date": "2024-03-15", "label": "Verre"},
                        {"days": [{"slot": {"date": "2024-03-15", "type": "Verre"}}]}
                    ]
                }
            },
            "buildId": "abc"
        });

        let mut found = scan_events(&payload);
        found.sort();

        assert_eq!(
            found,
            vec![
                ("2024-03-15".to_owned(), "Verre".to_owned()),
                ("2024-03-15".to_owned(), "Verre".to_owned()),
            ],
            "both nodes are emitted"
        );
    }

    #[test]
    fn nested_events_inside_events_are_emitted() {
        let payload = json!([
            {"date": "2024-03-15", "label": "Parent", "children": [
                {"date": "2024-03-22", "label": "Child"}
            ]}
        ]);

        let mut found = scan_events(&payload);
        found.sort();

        assert_eq!(
            found,
            vec![
                ("2024-03-15".to_owned(), "Parent".to_owned()),
                ("2024-03-22".to_owned(), "Child".to_owned()),
            ],
            "recognition does not stop the walk"
        );
    }

    #[test]
    fn scalars_yield_nothing() {
        assert!(scan_events(&json!("2024-03-15")).is_empty(), "bare string");
        assert!(scan_events(&json!(null)).is_empty(), "null");
    }
}
