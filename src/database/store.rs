use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;
use thiserror::Error;

use crate::filter::{FilterError, SortField};

/// A stored document in relaxed extended-JSON form: identifiers appear as
/// `{"$oid": "..."}` and timestamps as `{"$date": "..."}`.
pub type Document = Map<String, Value>;

/// Process-wide handle to the store, shared by every request
pub type SharedStore = Arc<dyn DocumentStore>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database unavailable: {0}")]
    Connection(String),

    #[error("{0}")]
    Command(String),

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error(transparent)]
    Filter(#[from] FilterError),
}

#[derive(Debug, Clone, Default)]
pub struct FindOptions {
    pub projection: Option<Document>,
    pub sort: Vec<SortField>,
    pub skip: u64,
    pub limit: Option<u64>,
}

impl FindOptions {
    pub fn limited(limit: u64) -> Self {
        Self { limit: Some(limit), ..Default::default() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UpdateOutcome {
    pub matched_count: u64,
    pub modified_count: u64,
}

/// Minimal document-store surface the gateway and resources need.
/// Each call is a single round-trip; no multi-document atomicity is implied.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    fn database_name(&self) -> &str;

    async fn ping(&self) -> Result<(), StoreError>;

    async fn list_collections(&self) -> Result<Vec<String>, StoreError>;

    async fn find(
        &self,
        collection: &str,
        filter: &Document,
        options: FindOptions,
    ) -> Result<Vec<Document>, StoreError>;

    async fn find_one(&self, collection: &str, filter: &Document) -> Result<Option<Document>, StoreError> {
        Ok(self
            .find(collection, filter, FindOptions::limited(1))
            .await?
            .into_iter()
            .next())
    }

    async fn count(&self, collection: &str, filter: &Document) -> Result<u64, StoreError>;

    /// Persist a document and return its identifier as a plain string
    async fn insert_one(&self, collection: &str, document: Document) -> Result<String, StoreError>;

    async fn update_many(
        &self,
        collection: &str,
        filter: &Document,
        update: &Document,
    ) -> Result<UpdateOutcome, StoreError>;

    async fn delete_many(&self, collection: &str, filter: &Document) -> Result<u64, StoreError>;

    /// Run a pipeline verbatim, returning at most `cap` documents
    async fn aggregate(
        &self,
        collection: &str,
        pipeline: &[Document],
        cap: usize,
    ) -> Result<Vec<Document>, StoreError>;

    /// Unique values of a field across matching documents, array fields flattened
    async fn distinct(&self, collection: &str, field: &str, filter: &Document) -> Result<Vec<Value>, StoreError>;

    /// Release pooled connections on shutdown. Nothing to release by default.
    async fn close(&self) {}
}
