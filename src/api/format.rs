//! Output formatting for stored documents.
//!
//! Stored documents carry extended-JSON wrappers (`{"$oid": ..}`, `{"$date": ..}`).
//! Before anything leaves the API those wrappers are collapsed to plain strings.

use serde_json::{Map, Value};

use crate::database::Document;

/// Replace every `{"$oid": "..."}` and `{"$date": ...}` wrapper with its plain string form,
/// recursively through nested objects and arrays.
pub fn stringify_identifiers(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            if let Some(plain) = unwrap_extended(&map) {
                return plain;
            }
            Value::Object(
                map.into_iter()
                    .map(|(k, v)| (k, stringify_identifiers(v)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(stringify_identifiers).collect()),
        other => other,
    }
}

fn unwrap_extended(map: &Map<String, Value>) -> Option<Value> {
    if map.len() != 1 {
        return None;
    }
    match map.iter().next() {
        Some((key, Value::String(oid))) if key == "$oid" => Some(Value::String(oid.clone())),
        Some((key, Value::String(date))) if key == "$date" => Some(Value::String(date.clone())),
        // canonical form: {"$date": {"$numberLong": "..."}}
        Some((key, Value::Object(inner))) if key == "$date" => inner
            .get("$numberLong")
            .and_then(Value::as_str)
            .and_then(|ms| ms.parse::<i64>().ok())
            .and_then(chrono::DateTime::from_timestamp_millis)
            .map(|dt| Value::String(dt.to_rfc3339_opts(chrono::SecondsFormat::Millis, true))),
        _ => None,
    }
}

/// Gateway output: identifiers stringified, keys otherwise untouched
pub fn normalize_document(doc: Document) -> Document {
    match stringify_identifiers(Value::Object(doc)) {
        Value::Object(map) => map,
        _ => Document::new(),
    }
}

pub fn normalize_documents(docs: Vec<Document>) -> Vec<Value> {
    docs.into_iter()
        .map(|doc| Value::Object(normalize_document(doc)))
        .collect()
}

/// Resource output: normalized, with `_id` exposed as `id` first
pub fn to_resource(doc: Document) -> Value {
    let mut normalized = normalize_document(doc);
    let mut out = Map::new();
    if let Some(id) = normalized.remove("_id") {
        out.insert("id".to_string(), id);
    }
    out.extend(normalized);
    Value::Object(out)
}

/// Current time as a stored timestamp value
pub fn timestamp_now() -> Value {
    date_value(chrono::Utc::now())
}

pub fn date_value(at: chrono::DateTime<chrono::Utc>) -> Value {
    serde_json::json!({ "$date": at.to_rfc3339_opts(chrono::SecondsFormat::Millis, true) })
}

/// Wrap a plain identifier string for use in a filter
pub fn object_id_filter(id: &str) -> Value {
    serde_json::json!({ "$oid": id })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(v: Value) -> Document {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn stringifies_nested_identifiers() {
        let out = normalize_document(doc(json!({
            "_id": { "$oid": "65a000000000000000000001" },
            "createdAt": { "$date": "2025-01-01T00:00:00Z" },
            "refs": [{ "$oid": "65a000000000000000000002" }],
            "meta": { "owner": { "$oid": "65a000000000000000000003" } }
        })));
        assert_eq!(out["_id"], json!("65a000000000000000000001"));
        assert_eq!(out["createdAt"], json!("2025-01-01T00:00:00Z"));
        assert_eq!(out["refs"], json!(["65a000000000000000000002"]));
        assert_eq!(out["meta"]["owner"], json!("65a000000000000000000003"));
    }

    #[test]
    fn canonical_dates_become_rfc3339() {
        let out = stringify_identifiers(json!({ "$date": { "$numberLong": "0" } }));
        assert_eq!(out, json!("1970-01-01T00:00:00.000Z"));
    }

    #[test]
    fn operator_like_objects_with_more_keys_are_kept() {
        let value = json!({ "$oid": "x", "other": 1 });
        assert_eq!(stringify_identifiers(value.clone()), value);
    }

    #[test]
    fn resources_expose_id() {
        let out = to_resource(doc(json!({ "title": "t", "_id": { "$oid": "abc" } })));
        assert_eq!(out, json!({ "id": "abc", "title": "t" }));
        assert!(out.get("_id").is_none());
    }
}
