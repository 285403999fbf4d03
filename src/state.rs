use std::sync::Arc;

use crate::auth::{ApiKeyRegistry, TokenService};
use crate::config::AppConfig;
use crate::database::SharedStore;
use crate::gateway::DatabaseGateway;
use crate::services::{AdminService, ContactService, VideoService};

/// Everything a request handler needs, built once from the configuration at startup
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: SharedStore,
    pub api_keys: Arc<ApiKeyRegistry>,
    pub gateway: DatabaseGateway,
    pub videos: VideoService,
    pub contacts: ContactService,
    pub admins: AdminService,
}

impl AppState {
    pub fn new(config: AppConfig, store: SharedStore) -> Self {
        let tokens = TokenService::from_config(&config.security);
        Self {
            api_keys: Arc::new(ApiKeyRegistry::from_config(&config.gateway)),
            gateway: DatabaseGateway::new(store.clone(), config.gateway.clone()),
            videos: VideoService::new(store.clone(), config.resources.clone()),
            contacts: ContactService::new(store.clone(), config.resources.clone()),
            admins: AdminService::new(store.clone(), tokens, config.security.allow_admin_create),
            config: Arc::new(config),
            store,
        }
    }
}
