//! Permissioned pass-through to the document store.
//!
//! Every operation authorizes the principal first, then performs a single store
//! round-trip. Collections are addressed by name only and never validated against
//! a schema. Output identifiers and dates are rendered as plain strings.

pub mod command;

use serde_json::{json, Map, Value};
use tracing::{debug, info};

use crate::api::format::{normalize_documents, timestamp_now};
use crate::auth::{AccessError, ApiKeyPrincipal};
use crate::config::GatewayConfig;
use crate::database::{Document, FindOptions, SharedStore, StoreError};
use crate::filter::FilterOrder;
use crate::types::GatewayOperation;

pub use command::*;

pub const CREATED_AT: &str = "createdAt";
pub const UPDATED_AT: &str = "updatedAt";

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error(transparent)]
    Access(#[from] AccessError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Clone)]
pub struct DatabaseGateway {
    store: SharedStore,
    config: GatewayConfig,
}

impl DatabaseGateway {
    pub fn new(store: SharedStore, config: GatewayConfig) -> Self {
        Self { store, config }
    }

    pub async fn query(
        &self,
        principal: &ApiKeyPrincipal,
        command: QueryCommand,
    ) -> Result<QueryResult, GatewayError> {
        principal.authorize(GatewayOperation::Query)?;

        let limit = command.limit.unwrap_or(self.config.default_query_limit);
        // The store treats a zero limit as "no limit"
        let documents = if limit == 0 {
            Vec::new()
        } else {
            let sort = match &command.sort {
                Some(spec) => FilterOrder::validate_and_parse(spec).map_err(StoreError::from)?,
                None => Vec::new(),
            };
            let options = FindOptions {
                projection: command.projection,
                sort,
                skip: command.skip,
                limit: Some(limit),
            };
            self.store.find(&command.collection, &command.filter, options).await?
        };

        debug!(
            "Gateway query on '{}' by '{}' returned {} documents",
            command.collection,
            principal.identity,
            documents.len()
        );
        Ok(QueryResult {
            success: true,
            collection: command.collection,
            count: documents.len(),
            documents: normalize_documents(documents),
        })
    }

    pub async fn count(
        &self,
        principal: &ApiKeyPrincipal,
        command: CountCommand,
    ) -> Result<CountResult, GatewayError> {
        principal.authorize(GatewayOperation::Count)?;

        let count = self.store.count(&command.collection, &command.filter).await?;
        Ok(CountResult {
            success: true,
            collection: command.collection,
            count,
            filter: command.filter,
        })
    }

    pub async fn insert(
        &self,
        principal: &ApiKeyPrincipal,
        command: InsertCommand,
    ) -> Result<InsertResult, GatewayError> {
        principal.authorize(GatewayOperation::Insert)?;

        let mut document = command.document;
        document.insert(CREATED_AT.to_string(), timestamp_now());
        let inserted_id = self.store.insert_one(&command.collection, document).await?;

        info!(
            "Gateway insert into '{}' by '{}': {}",
            command.collection, principal.identity, inserted_id
        );
        Ok(InsertResult {
            success: true,
            collection: command.collection,
            inserted_id,
        })
    }

    pub async fn update(
        &self,
        principal: &ApiKeyPrincipal,
        command: UpdateCommand,
    ) -> Result<UpdateResult, GatewayError> {
        principal.authorize(GatewayOperation::Update)?;

        let update = stamp_updated_at(command.update, timestamp_now())?;
        let outcome = self
            .store
            .update_many(&command.collection, &command.filter, &update)
            .await?;

        info!(
            "Gateway update on '{}' by '{}': matched {}, modified {}",
            command.collection, principal.identity, outcome.matched_count, outcome.modified_count
        );
        Ok(UpdateResult {
            success: true,
            collection: command.collection,
            matched_count: outcome.matched_count,
            modified_count: outcome.modified_count,
        })
    }

    /// Removes every matching document. An empty filter clears the collection.
    pub async fn delete(
        &self,
        principal: &ApiKeyPrincipal,
        command: DeleteCommand,
    ) -> Result<DeleteResult, GatewayError> {
        principal.authorize(GatewayOperation::Delete)?;

        let deleted_count = self.store.delete_many(&command.collection, &command.filter).await?;

        info!(
            "Gateway delete on '{}' by '{}': {} removed",
            command.collection, principal.identity, deleted_count
        );
        Ok(DeleteResult {
            success: true,
            collection: command.collection,
            deleted_count,
        })
    }

    /// Runs the pipeline as given; stages are not inspected
    pub async fn aggregate(
        &self,
        principal: &ApiKeyPrincipal,
        command: AggregateCommand,
    ) -> Result<AggregateResult, GatewayError> {
        principal.authorize(GatewayOperation::Aggregate)?;

        let results = self
            .store
            .aggregate(&command.collection, &command.pipeline, self.config.aggregate_result_cap)
            .await?;

        Ok(AggregateResult {
            success: true,
            collection: command.collection,
            count: results.len(),
            results: normalize_documents(results),
        })
    }

    /// Connection details for any authenticated principal; no permission tier applies
    pub async fn info(&self, principal: &ApiKeyPrincipal) -> Result<InfoResult, GatewayError> {
        let collections = self.store.list_collections().await?;
        Ok(InfoResult {
            success: true,
            database: self.store.database_name().to_string(),
            collections,
            connection_type: "Authenticated API Access",
            user: principal.identity.clone(),
            permissions: principal.permission_names(),
        })
    }

    pub async fn collections(&self, principal: &ApiKeyPrincipal) -> Result<CollectionsResult, GatewayError> {
        principal.authorize(GatewayOperation::ListCollections)?;

        let mut collections = Vec::new();
        for name in self.store.list_collections().await? {
            let document_count = self.store.count(&name, &Document::new()).await?;
            collections.push(CollectionSummary { name, document_count });
        }
        Ok(CollectionsResult {
            success: true,
            database: self.store.database_name().to_string(),
            collections,
        })
    }

    pub async fn stats(&self, principal: &ApiKeyPrincipal) -> Result<StatsResult, GatewayError> {
        principal.authorize(GatewayOperation::Stats)?;

        let names = self.store.list_collections().await?;
        let mut collections = Map::new();
        for name in &names {
            let document_count = self.store.count(name, &Document::new()).await?;
            collections.insert(name.clone(), json!({ "document_count": document_count }));
        }
        Ok(StatsResult {
            success: true,
            stats: DatabaseStats {
                database: self.store.database_name().to_string(),
                total_collections: names.len(),
                collections,
            },
        })
    }
}

/// Merge the updated timestamp into `$set`, adding the operator when absent
pub fn stamp_updated_at(mut update: Document, now: Value) -> Result<Document, StoreError> {
    match update.get_mut("$set") {
        Some(Value::Object(set)) => {
            set.insert(UPDATED_AT.to_string(), now);
        }
        Some(_) => return Err(StoreError::Command("Modifier $set's argument must be an object".to_string())),
        None => {
            let mut set = Map::new();
            set.insert(UPDATED_AT.to_string(), now);
            update.insert("$set".to_string(), Value::Object(set));
        }
    }
    Ok(update)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::database::{DocumentStore, MemoryStore};
    use crate::types::Permission;
    use std::sync::Arc;

    fn doc(v: Value) -> Document {
        v.as_object().cloned().unwrap()
    }

    fn principal(perms: &[Permission]) -> ApiKeyPrincipal {
        ApiKeyPrincipal {
            identity: "tester".to_string(),
            permissions: perms.iter().copied().collect(),
        }
    }

    fn admin() -> ApiKeyPrincipal {
        principal(&[Permission::Read, Permission::Write, Permission::Delete])
    }

    async fn gateway_with(n: usize) -> (DatabaseGateway, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new("journal_test"));
        for i in 0..n {
            store
                .insert_one("notes", doc(json!({ "n": i, "kind": if i % 2 == 0 { "even" } else { "odd" } })))
                .await
                .unwrap();
        }
        let gateway = DatabaseGateway::new(store.clone(), AppConfig::development().gateway);
        (gateway, store)
    }

    fn query(collection: &str) -> QueryCommand {
        serde_json::from_value(json!({ "collection": collection })).unwrap()
    }

    #[tokio::test]
    async fn query_respects_limit_and_sort() {
        let (gateway, _) = gateway_with(10).await;
        let mut command = query("notes");
        command.limit = Some(3);
        command.skip = 1;
        command.sort = Some(json!({ "n": -1 }));

        let result = gateway.query(&admin(), command).await.unwrap();
        assert_eq!(result.count, 3);
        let ns: Vec<i64> = result.documents.iter().map(|d| d["n"].as_i64().unwrap()).collect();
        assert_eq!(ns, vec![8, 7, 6]);
        assert!(result.documents[0]["_id"].is_string());
    }

    #[tokio::test]
    async fn query_defaults_to_configured_limit() {
        let (gateway, _) = gateway_with(120).await;
        let result = gateway.query(&admin(), query("notes")).await.unwrap();
        assert_eq!(result.count, 100);
    }

    #[tokio::test]
    async fn zero_limit_returns_nothing() {
        let (gateway, _) = gateway_with(5).await;
        let mut command = query("notes");
        command.limit = Some(0);
        assert_eq!(gateway.query(&admin(), command).await.unwrap().count, 0);
    }

    #[tokio::test]
    async fn any_collection_name_is_accepted() {
        let (gateway, _) = gateway_with(0).await;
        let result = gateway.query(&admin(), query("never_used_before")).await.unwrap();
        assert_eq!(result.count, 0);
    }

    #[tokio::test]
    async fn malformed_sort_is_a_store_error() {
        let (gateway, _) = gateway_with(1).await;
        let mut command = query("notes");
        command.sort = Some(json!({ "n": "sideways" }));
        assert!(matches!(
            gateway.query(&admin(), command).await,
            Err(GatewayError::Store(_))
        ));
    }

    #[tokio::test]
    async fn count_ignores_paging() {
        let (gateway, _) = gateway_with(7).await;
        let command: CountCommand =
            serde_json::from_value(json!({ "collection": "notes", "filter": { "kind": "even" }, "limit": 1, "skip": 3 }))
                .unwrap();
        assert_eq!(gateway.count(&admin(), command).await.unwrap().count, 4);
    }

    #[tokio::test]
    async fn insert_stamps_created_at_and_returns_id() {
        let (gateway, store) = gateway_with(0).await;
        let result = gateway
            .insert(
                &admin(),
                InsertCommand { collection: "notes".into(), document: doc(json!({ "title": "x" })) },
            )
            .await
            .unwrap();

        let stored = store
            .find_one("notes", &doc(json!({ "_id": { "$oid": result.inserted_id } })))
            .await
            .unwrap()
            .unwrap();
        assert!(stored[CREATED_AT]["$date"].is_string());
    }

    #[tokio::test]
    async fn update_always_stamps_updated_at() {
        let (gateway, store) = gateway_with(3).await;
        let result = gateway
            .update(
                &admin(),
                UpdateCommand {
                    collection: "notes".into(),
                    filter: doc(json!({ "kind": "even" })),
                    update: doc(json!({ "$inc": { "n": 0 } })),
                },
            )
            .await
            .unwrap();
        assert_eq!(result.matched_count, 2);
        assert_eq!(result.modified_count, 2);

        let stamped = store.count("notes", &doc(json!({ "updatedAt": { "$exists": true } }))).await.unwrap();
        assert_eq!(stamped, 2);
    }

    #[test]
    fn updated_at_merges_into_existing_set() {
        let now = json!({ "$date": "2025-01-01T00:00:00.000Z" });
        let merged = stamp_updated_at(doc(json!({ "$set": { "a": 1 } })), now.clone()).unwrap();
        assert_eq!(merged, doc(json!({ "$set": { "a": 1, "updatedAt": now } })));

        let added = stamp_updated_at(doc(json!({ "$unset": { "a": "" } })), now.clone()).unwrap();
        assert_eq!(added["$set"], json!({ "updatedAt": now }));

        assert!(stamp_updated_at(doc(json!({ "$set": 5 })), now).is_err());
    }

    #[tokio::test]
    async fn readonly_delete_is_denied_and_leaves_collection() {
        let (gateway, store) = gateway_with(4).await;
        let err = gateway
            .delete(
                &principal(&[Permission::Read]),
                DeleteCommand { collection: "notes".into(), filter: Document::new() },
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            GatewayError::Access(AccessError::PermissionDenied { required: Permission::Delete })
        ));
        assert_eq!(store.count("notes", &Document::new()).await.unwrap(), 4);
    }

    #[tokio::test]
    async fn empty_filter_delete_clears_collection() {
        let (gateway, store) = gateway_with(4).await;
        let result = gateway
            .delete(&admin(), DeleteCommand { collection: "notes".into(), filter: Document::new() })
            .await
            .unwrap();
        assert_eq!(result.deleted_count, 4);
        assert_eq!(store.count("notes", &Document::new()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn aggregate_is_capped() {
        let store = Arc::new(MemoryStore::new("journal_test"));
        for i in 0..5 {
            store.insert_one("notes", doc(json!({ "n": i }))).await.unwrap();
        }
        let mut config = AppConfig::development().gateway;
        config.aggregate_result_cap = 2;
        let gateway = DatabaseGateway::new(store, config);

        let result = gateway
            .aggregate(
                &principal(&[Permission::Read]),
                AggregateCommand { collection: "notes".into(), pipeline: vec![doc(json!({ "$sort": { "n": 1 } }))] },
            )
            .await
            .unwrap();
        assert_eq!(result.count, 2);
        assert_eq!(result.results[1]["n"], json!(1));
    }

    #[tokio::test]
    async fn info_needs_no_permission_but_stats_do() {
        let (gateway, _) = gateway_with(2).await;
        let nobody = principal(&[]);
        let info = gateway.info(&nobody).await.unwrap();
        assert_eq!(info.collections, vec!["notes".to_string()]);
        assert!(info.permissions.is_empty());
        assert!(gateway.stats(&nobody).await.is_err());

        let stats = gateway.stats(&admin()).await.unwrap();
        assert_eq!(stats.stats.total_collections, 1);
        assert_eq!(stats.stats.collections["notes"]["document_count"], json!(2));

        let collections = gateway.collections(&admin()).await.unwrap();
        assert_eq!(collections.collections[0].document_count, 2);
    }
}
