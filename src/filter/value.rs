//! Ordering and equality over JSON values, treating extended-JSON wrappers
//! (`{"$oid": ..}`, `{"$date": ..}`) as their own scalar types.

use serde_json::{Map, Value};
use std::cmp::Ordering;

fn wrapped<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    if map.len() == 1 {
        map.get(key)
    } else {
        None
    }
}

pub fn as_object_id(value: &Value) -> Option<&str> {
    match value {
        Value::Object(map) => wrapped(map, "$oid").and_then(Value::as_str),
        _ => None,
    }
}

pub fn as_date(value: &Value) -> Option<&Value> {
    match value {
        Value::Object(map) => wrapped(map, "$date"),
        _ => None,
    }
}

/// Cross-type sort rank, loosely following the document store's ordering
fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Number(_) => 1,
        Value::String(_) => 2,
        Value::Object(_) if as_object_id(value).is_some() => 5,
        Value::Object(_) if as_date(value).is_some() => 7,
        Value::Object(_) => 3,
        Value::Array(_) => 4,
        Value::Bool(_) => 6,
    }
}

/// Total order used for sorting
pub fn compare(a: &Value, b: &Value) -> Ordering {
    let rank = type_rank(a).cmp(&type_rank(b));
    if rank != Ordering::Equal {
        return rank;
    }

    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Array(x), Value::Array(y)) => {
            for (l, r) in x.iter().zip(y.iter()) {
                let ord = compare(l, r);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            x.len().cmp(&y.len())
        }
        (Value::Object(_), Value::Object(_)) if as_object_id(a).is_some() => {
            as_object_id(a).cmp(&as_object_id(b))
        }
        (Value::Object(_), Value::Object(_)) if as_date(a).is_some() => match (as_date(a), as_date(b)) {
            (Some(x), Some(y)) => compare(x, y),
            _ => Ordering::Equal,
        },
        (Value::Object(x), Value::Object(y)) => {
            for ((lk, lv), (rk, rv)) in x.iter().zip(y.iter()) {
                let ord = lk.cmp(rk).then_with(|| compare(lv, rv));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            x.len().cmp(&y.len())
        }
        _ => Ordering::Equal,
    }
}

/// Ordering for range operators; values of different types do not compare
pub fn comparable(a: &Value, b: &Value) -> Option<Ordering> {
    if type_rank(a) == type_rank(b) {
        Some(compare(a, b))
    } else {
        None
    }
}

pub fn values_equal(a: &Value, b: &Value) -> bool {
    comparable(a, b) == Some(Ordering::Equal)
}

/// Truthiness as used in projection and `$exists` arguments
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn integers_equal_floats() {
        assert!(values_equal(&json!(5), &json!(5.0)));
        assert!(!values_equal(&json!(5), &json!("5")));
    }

    #[test]
    fn dates_compare_by_instant_string() {
        let early = json!({ "$date": "2025-01-01T00:00:00.000Z" });
        let late = json!({ "$date": "2025-06-01T00:00:00.000Z" });
        assert_eq!(compare(&early, &late), Ordering::Less);
        assert_eq!(comparable(&early, &json!("2025-06-01")), None);
    }

    #[test]
    fn null_sorts_first() {
        assert_eq!(compare(&Value::Null, &json!(0)), Ordering::Less);
        assert_eq!(compare(&json!(10), &json!("a")), Ordering::Less);
    }
}
