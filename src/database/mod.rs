pub mod memory;
pub mod mongo;
pub mod store;

pub use memory::MemoryStore;
pub use mongo::MongoStore;
pub use store::{Document, DocumentStore, FindOptions, SharedStore, StoreError, UpdateOutcome};

use std::sync::Arc;
use tracing::warn;

use crate::config::{DatabaseConfig, StoreBackend};

/// Open the configured store. Called once at startup; the handle is shared by every request.
pub async fn connect(config: &DatabaseConfig) -> Result<SharedStore, StoreError> {
    match config.backend {
        StoreBackend::Mongo => Ok(Arc::new(MongoStore::connect(config).await?)),
        StoreBackend::Memory => {
            warn!("Using in-memory store '{}'; data will not survive a restart", config.db_name);
            Ok(Arc::new(MemoryStore::new(config.db_name.clone())))
        }
    }
}
