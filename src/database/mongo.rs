//! MongoDB-backed store. One pooled client is created at startup and shared by all requests.

use async_trait::async_trait;
use bson::{doc, Bson};
use futures::{StreamExt, TryStreamExt};
use mongodb::{error::ErrorKind, options::ClientOptions, Client, Database};
use serde_json::Value;
use std::time::Duration;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::filter::FilterOrder;

use super::store::{Document, DocumentStore, FindOptions, StoreError, UpdateOutcome};

#[derive(Clone)]
pub struct MongoStore {
    client: Client,
    database: Database,
    db_name: String,
}

impl From<mongodb::error::Error> for StoreError {
    fn from(err: mongodb::error::Error) -> Self {
        if matches!(*err.kind, ErrorKind::ServerSelection { .. }) {
            StoreError::Connection(err.to_string())
        } else {
            StoreError::Command(err.to_string())
        }
    }
}

impl MongoStore {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        info!("Connecting to MongoDB database '{}'", config.db_name);

        let mut options = ClientOptions::parse(&config.mongo_url)
            .await
            .map_err(|e| StoreError::Connection(format!("Invalid MongoDB URL: {}", e)))?;
        options.app_name = Some(config.app_name.clone());
        options.max_pool_size = Some(config.max_pool_size);
        // Fail fast instead of hanging on an unreachable server
        options.connect_timeout = Some(Duration::from_secs(config.connect_timeout_secs));
        options.server_selection_timeout = Some(Duration::from_secs(config.connect_timeout_secs));

        let client = Client::with_options(options)?;
        let database = client.database(&config.db_name);
        let store = Self {
            client,
            database,
            db_name: config.db_name.clone(),
        };
        store.ping().await?;

        info!("Connected to MongoDB database '{}'", config.db_name);
        Ok(store)
    }

    fn collection(&self, name: &str) -> mongodb::Collection<bson::Document> {
        self.database.collection::<bson::Document>(name)
    }
}

/// Extended JSON -> BSON, so `{"$oid": ..}` and `{"$date": ..}` become native types
pub(crate) fn to_bson(doc: &Document) -> Result<bson::Document, StoreError> {
    bson::Document::try_from(doc.clone()).map_err(|e| StoreError::InvalidDocument(e.to_string()))
}

pub(crate) fn from_bson(doc: bson::Document) -> Document {
    match Bson::Document(doc).into_relaxed_extjson() {
        Value::Object(map) => map,
        _ => Document::new(),
    }
}

fn id_to_string(id: Bson) -> String {
    match id {
        Bson::ObjectId(oid) => oid.to_hex(),
        Bson::String(s) => s,
        other => other.to_string(),
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    fn database_name(&self) -> &str {
        &self.db_name
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| StoreError::Connection(format!("MongoDB ping failed: {}", e)))?;
        Ok(())
    }

    async fn list_collections(&self) -> Result<Vec<String>, StoreError> {
        let mut names = self.database.list_collection_names().await?;
        names.sort();
        Ok(names)
    }

    async fn find(
        &self,
        collection: &str,
        filter: &Document,
        options: FindOptions,
    ) -> Result<Vec<Document>, StoreError> {
        let coll = self.collection(collection);
        let mut action = coll.find(to_bson(filter)?).skip(options.skip);
        if let Some(projection) = &options.projection {
            action = action.projection(to_bson(projection)?);
        }
        if !options.sort.is_empty() {
            action = action.sort(to_bson(&FilterOrder::to_sort_document(&options.sort))?);
        }
        if let Some(limit) = options.limit {
            action = action.limit(i64::try_from(limit).unwrap_or(i64::MAX));
        }

        let docs: Vec<bson::Document> = action.await?.try_collect().await?;
        Ok(docs.into_iter().map(from_bson).collect())
    }

    async fn count(&self, collection: &str, filter: &Document) -> Result<u64, StoreError> {
        Ok(self.collection(collection).count_documents(to_bson(filter)?).await?)
    }

    async fn insert_one(&self, collection: &str, document: Document) -> Result<String, StoreError> {
        let result = self.collection(collection).insert_one(to_bson(&document)?).await?;
        Ok(id_to_string(result.inserted_id))
    }

    async fn update_many(
        &self,
        collection: &str,
        filter: &Document,
        update: &Document,
    ) -> Result<UpdateOutcome, StoreError> {
        let result = self
            .collection(collection)
            .update_many(to_bson(filter)?, to_bson(update)?)
            .await?;
        Ok(UpdateOutcome {
            matched_count: result.matched_count,
            modified_count: result.modified_count,
        })
    }

    async fn delete_many(&self, collection: &str, filter: &Document) -> Result<u64, StoreError> {
        let result = self.collection(collection).delete_many(to_bson(filter)?).await?;
        Ok(result.deleted_count)
    }

    async fn aggregate(
        &self,
        collection: &str,
        pipeline: &[Document],
        cap: usize,
    ) -> Result<Vec<Document>, StoreError> {
        let stages = pipeline.iter().map(to_bson).collect::<Result<Vec<_>, _>>()?;
        let cursor = self.collection(collection).aggregate(stages).await?;
        let docs: Vec<bson::Document> = cursor.take(cap).try_collect().await?;
        Ok(docs.into_iter().map(from_bson).collect())
    }

    async fn distinct(&self, collection: &str, field: &str, filter: &Document) -> Result<Vec<Value>, StoreError> {
        let values = self.collection(collection).distinct(field, to_bson(filter)?).await?;
        Ok(values.into_iter().map(Bson::into_relaxed_extjson).collect())
    }

    async fn close(&self) {
        // Waits for outstanding cursors and sessions before closing the pool
        self.client.clone().shutdown().await;
        info!("Closed MongoDB client for '{}'", self.db_name);
    }
}
