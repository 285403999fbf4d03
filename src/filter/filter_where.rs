use serde_json::{Map, Value};
use std::cmp::Ordering;

use super::error::FilterError;
use super::path::get_path;
use super::types::FilterOp;
use super::value::{as_date, as_object_id, comparable, is_truthy, values_equal};

/// Evaluates store-native filter documents against in-memory documents.
///
/// Supported: implicit equality, `$eq $ne $gt $gte $lt $lte $in $nin $all $size $exists $not`
/// on fields, and `$and $or $nor` at any level. Array fields match when the array itself
/// or any element satisfies the condition.
pub struct FilterWhere;

impl FilterWhere {
    pub fn matches(doc: &Map<String, Value>, filter: &Value) -> Result<bool, FilterError> {
        let conditions = match filter {
            Value::Null => return Ok(true),
            Value::Object(obj) => obj,
            _ => return Err(FilterError::InvalidFilter("filter must be an object".to_string())),
        };

        for (key, condition) in conditions {
            let matched = if key.starts_with('$') {
                Self::match_logical(doc, key, condition)?
            } else {
                Self::match_field(get_path(doc, key), condition)?
            };
            if !matched {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn match_logical(doc: &Map<String, Value>, op: &str, value: &Value) -> Result<bool, FilterError> {
        let op_kind = FilterOp::parse(op)
            .filter(FilterOp::is_logical)
            .ok_or_else(|| FilterError::UnsupportedOperator(op.to_string()))?;
        let clauses = value
            .as_array()
            .ok_or_else(|| FilterError::InvalidOperatorData(format!("{} requires array", op)))?;

        let mut results = Vec::with_capacity(clauses.len());
        for clause in clauses {
            results.push(Self::matches(doc, clause)?);
        }
        Ok(match op_kind {
            FilterOp::And => results.iter().all(|m| *m),
            FilterOp::Or => results.iter().any(|m| *m),
            _ => !results.iter().any(|m| *m),
        })
    }

    /// `{"$gt": 1, "$lt": 5}` style conditions, excluding extended-JSON literals
    fn is_operator_object(condition: &Value) -> bool {
        match condition {
            Value::Object(map) => {
                !map.is_empty()
                    && map.keys().all(|k| k.starts_with('$'))
                    && as_object_id(condition).is_none()
                    && as_date(condition).is_none()
            }
            _ => false,
        }
    }

    fn match_field(value: Option<&Value>, condition: &Value) -> Result<bool, FilterError> {
        let ops = match condition {
            Value::Object(ops) if Self::is_operator_object(condition) => ops,
            _ => return Ok(Self::equals(value, condition)),
        };
        for (op, arg) in ops {
            let op_kind = FilterOp::parse(op).ok_or_else(|| FilterError::UnsupportedOperator(op.clone()))?;
            let matched = match op_kind {
                FilterOp::Eq => Self::equals(value, arg),
                FilterOp::Ne => !Self::equals(value, arg),
                FilterOp::Gt => Self::range(value, arg, |o| o == Ordering::Greater),
                FilterOp::Gte => Self::range(value, arg, |o| o != Ordering::Less),
                FilterOp::Lt => Self::range(value, arg, |o| o == Ordering::Less),
                FilterOp::Lte => Self::range(value, arg, |o| o != Ordering::Greater),
                FilterOp::In => Self::list_arg(op, arg)?.iter().any(|candidate| Self::equals(value, candidate)),
                FilterOp::NIn => !Self::list_arg(op, arg)?.iter().any(|candidate| Self::equals(value, candidate)),
                FilterOp::All => {
                    let wanted = Self::list_arg(op, arg)?;
                    match value {
                        Some(Value::Array(items)) => wanted
                            .iter()
                            .all(|w| items.iter().any(|item| values_equal(item, w))),
                        _ => false,
                    }
                }
                FilterOp::Size => {
                    let size = arg
                        .as_u64()
                        .ok_or_else(|| FilterError::InvalidOperatorData("$size requires a non-negative integer".to_string()))?;
                    matches!(value, Some(Value::Array(items)) if items.len() as u64 == size)
                }
                FilterOp::Exists => value.is_some() == is_truthy(arg),
                FilterOp::Not => {
                    if !Self::is_operator_object(arg) {
                        return Err(FilterError::InvalidOperatorData("$not requires an operator object".to_string()));
                    }
                    !Self::match_field(value, arg)?
                }
                FilterOp::And | FilterOp::Or | FilterOp::NOr => {
                    return Err(FilterError::UnsupportedOperator(format!("{} is not a field operator", op)))
                }
            };
            if !matched {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn list_arg<'a>(op: &str, arg: &'a Value) -> Result<&'a Vec<Value>, FilterError> {
        arg.as_array()
            .ok_or_else(|| FilterError::InvalidOperatorData(format!("{} requires array", op)))
    }

    /// Equality with missing-as-null and array-element semantics
    fn equals(value: Option<&Value>, expected: &Value) -> bool {
        match value {
            None => expected.is_null(),
            Some(actual) => {
                if values_equal(actual, expected) {
                    return true;
                }
                match actual {
                    Value::Array(items) => items.iter().any(|item| values_equal(item, expected)),
                    _ => false,
                }
            }
        }
    }

    fn range(value: Option<&Value>, bound: &Value, accept: impl Fn(Ordering) -> bool) -> bool {
        let check = |v: &Value| comparable(v, bound).map(&accept).unwrap_or(false);
        match value {
            None => false,
            Some(Value::Array(items)) => items.iter().any(check),
            Some(v) => check(v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn video() -> Map<String, Value> {
        json!({
            "_id": { "$oid": "65a000000000000000000001" },
            "title": "Day 5 workout",
            "day": 5,
            "tags": ["fitness", "mindset"],
            "meta": { "views": 12 }
        })
        .as_object()
        .cloned()
        .unwrap()
    }

    fn check(filter: Value) -> bool {
        FilterWhere::matches(&video(), &filter).unwrap()
    }

    #[test]
    fn empty_filter_matches_everything() {
        assert!(check(json!({})));
        assert!(check(Value::Null));
    }

    #[test]
    fn equality_and_array_membership() {
        assert!(check(json!({ "day": 5 })));
        assert!(check(json!({ "tags": "mindset" })));
        assert!(!check(json!({ "tags": "travel" })));
        assert!(check(json!({ "meta.views": 12 })));
        assert!(check(json!({ "_id": { "$oid": "65a000000000000000000001" } })));
    }

    #[test]
    fn missing_field_equals_null() {
        assert!(check(json!({ "excerpt": null })));
        assert!(!check(json!({ "excerpt": { "$exists": true } })));
        assert!(check(json!({ "title": { "$exists": 1 } })));
    }

    #[test]
    fn range_operators() {
        assert!(check(json!({ "day": { "$gte": 5, "$lt": 6 } })));
        assert!(!check(json!({ "day": { "$gt": 5 } })));
        assert!(!check(json!({ "day": { "$gt": "4" } })));
    }

    #[test]
    fn set_operators() {
        assert!(check(json!({ "day": { "$in": [1, 5, 9] } })));
        assert!(check(json!({ "tags": { "$nin": ["travel"] } })));
        assert!(check(json!({ "tags": { "$all": ["mindset", "fitness"] } })));
        assert!(check(json!({ "tags": { "$size": 2 } })));
        assert!(check(json!({ "day": { "$ne": 4 } })));
        assert!(check(json!({ "day": { "$not": { "$gt": 10 } } })));
    }

    #[test]
    fn logical_operators() {
        assert!(check(json!({ "$or": [{ "day": 1 }, { "day": 5 }] })));
        assert!(!check(json!({ "$and": [{ "day": 5 }, { "title": "other" }] })));
        assert!(check(json!({ "$nor": [{ "day": 1 }, { "day": 2 }] })));
    }

    #[test]
    fn unknown_operator_is_error() {
        let err = FilterWhere::matches(&video(), &json!({ "title": { "$regex": "^Day" } })).unwrap_err();
        assert_eq!(err, FilterError::UnsupportedOperator("$regex".to_string()));
        assert!(FilterWhere::matches(&video(), &json!({ "$or": { "day": 5 } })).is_err());
    }
}
