//! In-process document store with the same filter, sort, projection and update
//! semantics the gateway relies on. Used by the test suite and `JOURNAL_STORE=memory`.

use async_trait::async_trait;
use bson::oid::ObjectId;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::filter::path::{get_path, remove_path, set_path};
use crate::filter::projection::apply_projection;
use crate::filter::value::{as_object_id, values_equal};
use crate::filter::{FilterOrder, FilterWhere};

use super::store::{Document, DocumentStore, FindOptions, StoreError, UpdateOutcome};

#[derive(Clone, Default)]
pub struct MemoryStore {
    name: String,
    collections: Arc<RwLock<BTreeMap<String, Vec<Document>>>>,
}

impl MemoryStore {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            collections: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }

    fn matching<'a>(
        docs: &'a [Document],
        filter: &Document,
    ) -> Result<Vec<&'a Document>, StoreError> {
        let filter = Value::Object(filter.clone());
        let mut out = Vec::new();
        for doc in docs {
            if FilterWhere::matches(doc, &filter)? {
                out.push(doc);
            }
        }
        Ok(out)
    }

    fn apply_update(doc: &mut Document, update: &Document) -> Result<(), StoreError> {
        if update.is_empty() {
            return Err(StoreError::Command("Update document must not be empty".to_string()));
        }
        for (op, fields) in update {
            let fields = fields
                .as_object()
                .ok_or_else(|| StoreError::Command(format!("Modifier {} expects an object", op)))?;
            for (path, value) in fields {
                if path == "_id" {
                    return Err(StoreError::Command("Performing an update on the path '_id' would modify the immutable field '_id'".to_string()));
                }
                match op.as_str() {
                    "$set" => {
                        if !set_path(doc, path, value.clone()) {
                            return Err(StoreError::Command(format!("Cannot create field in path '{}'", path)));
                        }
                    }
                    "$unset" => {
                        remove_path(doc, path);
                    }
                    "$inc" => {
                        let delta = value
                            .as_f64()
                            .ok_or_else(|| StoreError::Command("Cannot increment with non-numeric argument".to_string()))?;
                        let next = match get_path(doc, path) {
                            None => value.clone(),
                            Some(Value::Number(n)) => match (n.as_i64(), value.as_i64()) {
                                (Some(a), Some(b)) => match a.checked_add(b) {
                                    Some(sum) => json!(sum),
                                    None => {
                                        return Err(StoreError::Command(format!(
                                            "Failed to apply $inc to field '{}': integer overflow",
                                            path
                                        )))
                                    }
                                },
                                _ => json!(n.as_f64().unwrap_or(0.0) + delta),
                            },
                            Some(_) => {
                                return Err(StoreError::Command(format!("Cannot apply $inc to non-numeric field '{}'", path)))
                            }
                        };
                        set_path(doc, path, next);
                    }
                    "$push" | "$addToSet" => {
                        let mut items = match get_path(doc, path) {
                            None => Vec::new(),
                            Some(Value::Array(items)) => items.clone(),
                            Some(_) => {
                                return Err(StoreError::Command(format!("The field '{}' must be an array", path)))
                            }
                        };
                        let present = items.iter().any(|item| values_equal(item, value));
                        if op == "$push" || !present {
                            items.push(value.clone());
                        }
                        set_path(doc, path, Value::Array(items));
                    }
                    other if other.starts_with('$') => {
                        return Err(StoreError::Command(format!("Unknown modifier: {}", other)))
                    }
                    _ => {
                        return Err(StoreError::Command("Update document requires atomic operators".to_string()))
                    }
                }
            }
        }
        Ok(())
    }

    fn run_stage(docs: Vec<Document>, stage: &Document) -> Result<Vec<Document>, StoreError> {
        let (name, arg) = match stage.iter().next() {
            Some(entry) if stage.len() == 1 => entry,
            _ => return Err(StoreError::Command("A pipeline stage specification object must contain exactly one field".to_string())),
        };

        match name.as_str() {
            "$match" => {
                let mut out = Vec::new();
                for doc in docs {
                    if FilterWhere::matches(&doc, arg)? {
                        out.push(doc);
                    }
                }
                Ok(out)
            }
            "$sort" => {
                let mut docs = docs;
                FilterOrder::sort_documents(&mut docs, &FilterOrder::validate_and_parse(arg)?);
                Ok(docs)
            }
            "$skip" => Ok(docs.into_iter().skip(Self::count_arg(name, arg)?).collect()),
            "$limit" => Ok(docs.into_iter().take(Self::count_arg(name, arg)?).collect()),
            "$project" => {
                let projection = arg
                    .as_object()
                    .ok_or_else(|| StoreError::Command("$project specification must be an object".to_string()))?;
                docs.into_iter()
                    .map(|doc| apply_projection(doc, Some(projection)).map_err(StoreError::from))
                    .collect()
            }
            "$count" => {
                let field = arg
                    .as_str()
                    .filter(|f| !f.is_empty())
                    .ok_or_else(|| StoreError::Command("$count requires a non-empty field name".to_string()))?;
                if docs.is_empty() {
                    return Ok(vec![]);
                }
                let mut out = Map::new();
                out.insert(field.to_string(), json!(docs.len()));
                Ok(vec![out])
            }
            "$unwind" => {
                let path = match arg {
                    Value::String(s) => s.as_str(),
                    Value::Object(o) => o.get("path").and_then(Value::as_str).unwrap_or_default(),
                    _ => "",
                };
                let field = path
                    .strip_prefix('$')
                    .ok_or_else(|| StoreError::Command("$unwind path must be prefixed with '$'".to_string()))?;
                let mut out = Vec::new();
                for doc in docs {
                    match get_path(&doc, field).cloned() {
                        Some(Value::Array(items)) => {
                            for item in items {
                                let mut copy = doc.clone();
                                set_path(&mut copy, field, item);
                                out.push(copy);
                            }
                        }
                        Some(Value::Null) | None => {}
                        Some(_) => out.push(doc),
                    }
                }
                Ok(out)
            }
            other => Err(StoreError::Command(format!("Unrecognized pipeline stage name: '{}'", other))),
        }
    }

    fn count_arg(name: &str, arg: &Value) -> Result<usize, StoreError> {
        arg.as_u64()
            .map(|n| n as usize)
            .ok_or_else(|| StoreError::Command(format!("{} requires a non-negative integer", name)))
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn database_name(&self) -> &str {
        &self.name
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn list_collections(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.collections.read().await.keys().cloned().collect())
    }

    async fn find(
        &self,
        collection: &str,
        filter: &Document,
        options: FindOptions,
    ) -> Result<Vec<Document>, StoreError> {
        let collections = self.collections.read().await;
        let docs = match collections.get(collection) {
            Some(docs) => docs,
            None => return Ok(vec![]),
        };

        let mut matched: Vec<Document> = Self::matching(docs, filter)?.into_iter().cloned().collect();
        FilterOrder::sort_documents(&mut matched, &options.sort);

        let limit = options.limit.map(|l| l as usize).unwrap_or(usize::MAX);
        matched
            .into_iter()
            .skip(options.skip as usize)
            .take(limit)
            .map(|doc| apply_projection(doc, options.projection.as_ref()).map_err(StoreError::from))
            .collect()
    }

    async fn count(&self, collection: &str, filter: &Document) -> Result<u64, StoreError> {
        let collections = self.collections.read().await;
        match collections.get(collection) {
            Some(docs) => Ok(Self::matching(docs, filter)?.len() as u64),
            None => Ok(0),
        }
    }

    async fn insert_one(&self, collection: &str, mut document: Document) -> Result<String, StoreError> {
        if !document.contains_key("_id") {
            document.insert("_id".to_string(), json!({ "$oid": ObjectId::new().to_hex() }));
        }
        let new_id = document["_id"].clone();
        let id = as_object_id(&new_id)
            .map(str::to_string)
            .or_else(|| new_id.as_str().map(str::to_string))
            .unwrap_or_else(|| new_id.to_string());

        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.to_string()).or_default();
        if docs.iter().any(|d| d.get("_id").is_some_and(|existing| values_equal(existing, &new_id))) {
            return Err(StoreError::Command(format!(
                "E11000 duplicate key error collection: {}.{} index: _id_",
                self.name, collection
            )));
        }
        docs.push(document);
        Ok(id)
    }

    async fn update_many(
        &self,
        collection: &str,
        filter: &Document,
        update: &Document,
    ) -> Result<UpdateOutcome, StoreError> {
        let mut collections = self.collections.write().await;
        let docs = match collections.get_mut(collection) {
            Some(docs) => docs,
            None => return Ok(UpdateOutcome::default()),
        };

        // Build every replacement before touching the collection so a failing
        // filter or modifier leaves it unchanged
        let filter = Value::Object(filter.clone());
        let mut outcome = UpdateOutcome::default();
        let mut replacements = Vec::new();
        for (index, doc) in docs.iter().enumerate() {
            if !FilterWhere::matches(doc, &filter)? {
                continue;
            }
            outcome.matched_count += 1;
            let mut updated = doc.clone();
            Self::apply_update(&mut updated, update)?;
            if updated != *doc {
                replacements.push((index, updated));
            }
        }

        outcome.modified_count = replacements.len() as u64;
        for (index, updated) in replacements {
            docs[index] = updated;
        }
        Ok(outcome)
    }

    async fn delete_many(&self, collection: &str, filter: &Document) -> Result<u64, StoreError> {
        let mut collections = self.collections.write().await;
        let docs = match collections.get_mut(collection) {
            Some(docs) => docs,
            None => return Ok(0),
        };

        let filter = Value::Object(filter.clone());
        let matched = docs
            .iter()
            .map(|doc| FilterWhere::matches(doc, &filter))
            .collect::<Result<Vec<bool>, _>>()?;

        let mut verdicts = matched.into_iter();
        let before = docs.len();
        docs.retain(|_| !verdicts.next().unwrap_or(false));
        Ok((before - docs.len()) as u64)
    }

    async fn aggregate(
        &self,
        collection: &str,
        pipeline: &[Document],
        cap: usize,
    ) -> Result<Vec<Document>, StoreError> {
        let mut docs = self
            .collections
            .read()
            .await
            .get(collection)
            .cloned()
            .unwrap_or_default();
        for stage in pipeline {
            docs = Self::run_stage(docs, stage)?;
        }
        docs.truncate(cap);
        Ok(docs)
    }

    async fn distinct(&self, collection: &str, field: &str, filter: &Document) -> Result<Vec<Value>, StoreError> {
        let collections = self.collections.read().await;
        let docs = match collections.get(collection) {
            Some(docs) => docs,
            None => return Ok(vec![]),
        };

        let mut values: Vec<Value> = Vec::new();
        for doc in Self::matching(docs, filter)? {
            let candidates = match get_path(doc, field) {
                Some(Value::Array(items)) => items.clone(),
                Some(value) => vec![value.clone()],
                None => continue,
            };
            for candidate in candidates {
                if !values.iter().any(|v| values_equal(v, &candidate)) {
                    values.push(candidate);
                }
            }
        }
        Ok(values)
    }
}
