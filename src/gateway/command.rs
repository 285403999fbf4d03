//! Request and result shapes for gateway operations

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::database::Document;

#[derive(Debug, Clone, Deserialize)]
pub struct QueryCommand {
    pub collection: String,
    #[serde(default)]
    pub filter: Document,
    #[serde(default)]
    pub projection: Option<Document>,
    /// Falls back to the configured default (100)
    #[serde(default)]
    pub limit: Option<u64>,
    #[serde(default)]
    pub skip: u64,
    /// `{"field": 1|-1, ...}`, `[["field", -1], ...]` or `"field desc, other"`
    #[serde(default)]
    pub sort: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CountCommand {
    pub collection: String,
    #[serde(default)]
    pub filter: Document,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InsertCommand {
    pub collection: String,
    pub document: Document,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateCommand {
    pub collection: String,
    #[serde(default)]
    pub filter: Document,
    pub update: Document,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeleteCommand {
    pub collection: String,
    #[serde(default)]
    pub filter: Document,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AggregateCommand {
    pub collection: String,
    pub pipeline: Vec<Document>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryResult {
    pub success: bool,
    pub collection: String,
    pub count: usize,
    pub documents: Vec<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CountResult {
    pub success: bool,
    pub collection: String,
    pub count: u64,
    pub filter: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InsertResult {
    pub success: bool,
    pub collection: String,
    pub inserted_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateResult {
    pub success: bool,
    pub collection: String,
    pub matched_count: u64,
    pub modified_count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteResult {
    pub success: bool,
    pub collection: String,
    pub deleted_count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AggregateResult {
    pub success: bool,
    pub collection: String,
    pub count: usize,
    pub results: Vec<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InfoResult {
    pub success: bool,
    pub database: String,
    pub collections: Vec<String>,
    pub connection_type: &'static str,
    pub user: String,
    pub permissions: Vec<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CollectionSummary {
    pub name: String,
    pub document_count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CollectionsResult {
    pub success: bool,
    pub database: String,
    pub collections: Vec<CollectionSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatsResult {
    pub success: bool,
    pub stats: DatabaseStats,
}

#[derive(Debug, Clone, Serialize)]
pub struct DatabaseStats {
    pub database: String,
    pub total_collections: usize,
    pub collections: Map<String, Value>,
}
