use serde_json::{Map, Value};
use std::cmp::Ordering;

use super::error::FilterError;
use super::path::get_path;
use super::types::{SortDirection, SortField};
use super::value::compare;

pub struct FilterOrder;

impl FilterOrder {
    /// Parse an ordered sort specification. Accepted forms:
    /// - `{"day": -1, "title": 1}` (store-native, key order preserved)
    /// - `[["day", -1], ["title", "asc"]]` or `[{"day": -1}]`
    /// - `"day desc, title"`
    pub fn validate_and_parse(order: &Value) -> Result<Vec<SortField>, FilterError> {
        match order {
            Value::Null => Ok(vec![]),
            Value::String(s) => Ok(Self::parse_order_string(s)),
            Value::Object(obj) => obj
                .iter()
                .map(|(field, dir)| Self::field(field, dir))
                .collect(),
            Value::Array(items) => {
                let mut out = Vec::new();
                for item in items {
                    match item {
                        Value::Array(pair) if pair.len() == 2 => {
                            let field = pair[0]
                                .as_str()
                                .ok_or_else(|| FilterError::InvalidSort("field name must be a string".to_string()))?;
                            out.push(Self::field(field, &pair[1])?);
                        }
                        Value::String(s) => out.extend(Self::parse_order_string(s)),
                        Value::Object(_) => out.extend(Self::validate_and_parse(item)?),
                        other => return Err(FilterError::InvalidSort(format!("unsupported sort entry: {}", other))),
                    }
                }
                Ok(out)
            }
            other => Err(FilterError::InvalidSort(format!("unsupported sort value: {}", other))),
        }
    }

    fn field(field: &str, direction: &Value) -> Result<SortField, FilterError> {
        if field.is_empty() {
            return Err(FilterError::InvalidSort("field name cannot be empty".to_string()));
        }
        Ok(SortField {
            field: field.to_string(),
            direction: Self::direction(direction)?,
        })
    }

    fn direction(value: &Value) -> Result<SortDirection, FilterError> {
        match value {
            Value::Number(n) => match n.as_i64() {
                Some(1) => Ok(SortDirection::Asc),
                Some(-1) => Ok(SortDirection::Desc),
                _ => Err(FilterError::InvalidSort(format!("direction must be 1 or -1, got {}", n))),
            },
            Value::String(s) if s.eq_ignore_ascii_case("asc") => Ok(SortDirection::Asc),
            Value::String(s) if s.eq_ignore_ascii_case("desc") => Ok(SortDirection::Desc),
            other => Err(FilterError::InvalidSort(format!("invalid direction: {}", other))),
        }
    }

    fn parse_order_string(s: &str) -> Vec<SortField> {
        // split on commas, then each token into field and direction
        let mut out = Vec::new();
        for part in s.split(',') {
            let trimmed = part.trim();
            if trimmed.is_empty() {
                continue;
            }
            let mut it = trimmed.split_whitespace();
            if let Some(field) = it.next() {
                let dir = it.next().unwrap_or("asc");
                let direction = if dir.eq_ignore_ascii_case("desc") { SortDirection::Desc } else { SortDirection::Asc };
                out.push(SortField { field: field.to_string(), direction });
            }
        }
        out
    }

    /// Store-native sort document, preserving field order
    pub fn to_sort_document(fields: &[SortField]) -> Map<String, Value> {
        fields
            .iter()
            .map(|f| (f.field.clone(), Value::from(f.direction.as_i32())))
            .collect()
    }

    /// Stable in-place sort; pairs apply in listed order, missing fields sort as null
    pub fn sort_documents(docs: &mut [Map<String, Value>], fields: &[SortField]) {
        if fields.is_empty() {
            return;
        }
        docs.sort_by(|a, b| {
            for f in fields {
                let left = get_path(a, &f.field).unwrap_or(&Value::Null);
                let right = get_path(b, &f.field).unwrap_or(&Value::Null);
                let ord = match f.direction {
                    SortDirection::Asc => compare(left, right),
                    SortDirection::Desc => compare(right, left),
                };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            Ordering::Equal
        });
    }
}
