use super::HISTORY_SEPARATOR;
use crate::prelude::*;
use crate::tracking::TrackingResult;
use itertools::Itertools;
use serde_json::{Map, Value};

// Known aliases of the fields in the order of preference
const STATUS_KEYS: &[&str] = &["status", "current_status", "message"];
const LOCATION_KEYS: &[&str] = &["location", "current_location"];
const TIMESTAMP_KEYS: &[&str] = &["datetime", "time"];
const HISTORY_KEYS: &[&str] = &["history", "events"];

pub(super) fn normalize(body: &[u8]) -> Option<TrackingResult> {
    let object = match serde_json::from_slice(body) {
        Ok(Value::Object(object)) => object,
        Ok(value) => {
            debug!(json_type = json_type(&value), "JSON response is not an object");
            return None;
        }
        Err(err) => {
            warn!(err = tracing_err(&err), "Failed to decode JSON response");
            return None;
        }
    };

    let result = TrackingResult {
        status: first_text(&object, STATUS_KEYS),
        location: first_text(&object, LOCATION_KEYS),
        timestamp: first_text(&object, TIMESTAMP_KEYS),
        history: first_history(&object),
    };

    // Location and timestamp alone don't make a JSON response a tracking result
    if result.status.is_none() && result.history.is_empty() {
        return None;
    }

    result.into_present()
}

fn first_text(object: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| object.get(*key))
        .find_map(scalar_text)
}

fn first_history(object: &Map<String, Value>) -> Vec<String> {
    HISTORY_KEYS
        .iter()
        .filter_map(|key| object.get(*key)?.as_array())
        .map(|events| events.iter().filter_map(event_text).collect::<Vec<_>>())
        .find(|events| !events.is_empty())
        .unwrap_or_default()
}

/// Events may be either plain strings or objects with arbitrary fields.
/// Objects are flattened into a single line the same way as table rows.
fn event_text(event: &Value) -> Option<String> {
    let Value::Object(fields) = event else {
        return scalar_text(event);
    };

    let line = fields.values().filter_map(scalar_text).join(HISTORY_SEPARATOR);

    (!line.is_empty()).then_some(line)
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(string) if !string.trim().is_empty() => Some(string.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use expect_test::{expect, Expect};

    #[track_caller]
    fn assert_normalize(json: &str, expected: Expect) {
        expected.assert_debug_eq(&normalize(json.as_bytes()));
    }

    #[test]
    fn aliases() {
        assert_normalize(
            r#"{"current_status":"Booked","events":["Booked at origin"]}"#,
            expect![[r#"
                Some(
                    TrackingResult {
                        status: Some(
                            "Booked",
                        ),
                        location: None,
                        timestamp: None,
                        history: [
                            "Booked at origin",
                        ],
                    },
                )
            "#]],
        );
    }

    #[test]
    fn first_non_empty_alias_wins() {
        assert_normalize(
            r#"{
                "status": "",
                "message": "In Transit",
                "current_status": "Out for Delivery",
                "location": null,
                "current_location": "Delhi NSH",
                "time": 1760692500,
                "history": [],
                "events": [
                    {"date": "17-10-2026", "office": "Delhi NSH", "event": "Item Bagged"},
                    {"note": null},
                    "Item Booked",
                    42,
                    ["nested"]
                ]
            }"#,
            expect![[r#"
                Some(
                    TrackingResult {
                        status: Some(
                            "Out for Delivery",
                        ),
                        location: Some(
                            "Delhi NSH",
                        ),
                        timestamp: Some(
                            "1760692500",
                        ),
                        history: [
                            "17-10-2026 • Delhi NSH • Item Bagged",
                            "Item Booked",
                            "42",
                        ],
                    },
                )
            "#]],
        );
    }

    #[test]
    fn weak_signals_only() {
        let json = r#"{"location": "Mumbai", "datetime": "2026-10-17"}"#;
        assert!(normalize(json.as_bytes()).is_none());
    }

    #[test]
    fn not_an_object() {
        assert!(normalize(br#"["Delivered"]"#).is_none());
        assert!(normalize(br#""Delivered""#).is_none());
    }

    #[test]
    fn malformed() {
        assert!(normalize(b"<html>oops</html>").is_none());
        assert!(normalize(b"").is_none());
    }
}
