use serde_json::{Map, Value};

use super::error::FilterError;
use super::path::{get_path, remove_path, set_path};
use super::value::is_truthy;

const ID_FIELD: &str = "_id";

/// Apply a field projection. Inclusion and exclusion cannot be mixed, except that
/// `_id` may always be excluded; `_id` is kept unless explicitly excluded.
pub fn apply_projection(
    doc: Map<String, Value>,
    projection: Option<&Map<String, Value>>,
) -> Result<Map<String, Value>, FilterError> {
    let projection = match projection {
        Some(p) if !p.is_empty() => p,
        _ => return Ok(doc),
    };

    let include_id = projection.get(ID_FIELD).map(is_truthy).unwrap_or(true);
    let fields: Vec<(&String, bool)> = projection
        .iter()
        .filter(|(k, _)| k.as_str() != ID_FIELD)
        .map(|(k, v)| (k, is_truthy(v)))
        .collect();

    let inclusive = fields.iter().any(|(_, keep)| *keep);
    if inclusive && fields.iter().any(|(_, keep)| !*keep) {
        return Err(FilterError::InvalidProjection(
            "cannot mix inclusion and exclusion".to_string(),
        ));
    }

    if inclusive {
        let mut out = Map::new();
        if include_id {
            if let Some(id) = doc.get(ID_FIELD) {
                out.insert(ID_FIELD.to_string(), id.clone());
            }
        }
        for (field, _) in fields {
            if let Some(value) = get_path(&doc, field) {
                set_path(&mut out, field, value.clone());
            }
        }
        Ok(out)
    } else {
        let mut out = doc;
        for (field, _) in fields {
            remove_path(&mut out, field);
        }
        if !include_id {
            out.remove(ID_FIELD);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc() -> Map<String, Value> {
        json!({ "_id": "1", "title": "t", "day": 3, "meta": { "a": 1, "b": 2 } })
            .as_object()
            .cloned()
            .unwrap()
    }

    fn proj(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn inclusion_keeps_id() {
        let out = apply_projection(doc(), Some(&proj(json!({ "title": 1, "meta.b": true })))).unwrap();
        assert_eq!(Value::Object(out), json!({ "_id": "1", "title": "t", "meta": { "b": 2 } }));
    }

    #[test]
    fn inclusion_without_id() {
        let out = apply_projection(doc(), Some(&proj(json!({ "_id": 0, "day": 1 })))).unwrap();
        assert_eq!(Value::Object(out), json!({ "day": 3 }));
    }

    #[test]
    fn exclusion_drops_fields() {
        let out = apply_projection(doc(), Some(&proj(json!({ "meta": 0, "_id": false })))).unwrap();
        assert_eq!(Value::Object(out), json!({ "title": "t", "day": 3 }));
    }

    #[test]
    fn mixed_projection_rejected() {
        assert!(apply_projection(doc(), Some(&proj(json!({ "title": 1, "day": 0 })))).is_err());
    }

    #[test]
    fn empty_projection_is_identity() {
        assert_eq!(apply_projection(doc(), Some(&Map::new())).unwrap(), doc());
        assert_eq!(apply_projection(doc(), None).unwrap(), doc());
    }
}
