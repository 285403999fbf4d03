use serde::{Deserialize, Serialize};
use std::env;

use crate::types::Permission;

/// JWT secret used when nothing is configured. Production refuses to run with it.
pub const DEV_JWT_SECRET: &str = "epic-journal-dev-secret-change-in-production";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub gateway: GatewayConfig,
    pub resources: ResourceConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub api_prefix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub backend: StoreBackend,
    pub mongo_url: String,
    pub db_name: String,
    pub max_pool_size: u32,
    pub connect_timeout_secs: u64,
    pub app_name: String,
}

/// Which document store the server runs against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Mongo,
    /// In-process store; contents are lost on exit
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub token_expiry_days: i64,
    pub cors_origins: Vec<String>,
    pub allow_admin_create: bool,
}

/// Static API-key principal as configured at startup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrincipalConfig {
    pub identity: String,
    pub passphrase: Option<String>,
    pub permissions: Vec<Permission>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub principals: Vec<PrincipalConfig>,
    pub default_query_limit: u64,
    pub aggregate_result_cap: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceConfig {
    pub videos_page_size: u64,
    pub contacts_list_cap: u64,
    pub excerpt_length: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("JWT_SECRET must be set in {0:?}")]
    DefaultJwtSecret(Environment),

    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

/// Session lifetimes beyond ten years are rejected at startup
pub const MAX_TOKEN_EXPIRY_DAYS: i64 = 3650;

pub const ADMIN_IDENTITY: &str = "journal_admin";
pub const READONLY_IDENTITY: &str = "journal_readonly";

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        let config = match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()?;

        config.validate()?;
        Ok(config)
    }

    fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        // Server overrides
        if let Ok(v) = env::var("HOST") {
            self.server.host = v;
        }
        if let Some(v) = env::var("JOURNAL_API_PORT").ok().or_else(|| env::var("PORT").ok()) {
            self.server.port = v
                .parse()
                .map_err(|_| ConfigError::InvalidValue { name: "PORT", value: v.clone() })?;
        }

        // Database overrides
        if let Ok(v) = env::var("JOURNAL_STORE") {
            self.database.backend = match v.trim().to_ascii_lowercase().as_str() {
                "mongo" | "mongodb" => StoreBackend::Mongo,
                "memory" => StoreBackend::Memory,
                _ => return Err(ConfigError::InvalidValue { name: "JOURNAL_STORE", value: v }),
            };
        }
        if let Ok(v) = env::var("MONGO_URL") {
            self.database.mongo_url = v;
        }
        if let Ok(v) = env::var("DB_NAME") {
            self.database.db_name = v;
        }
        if let Ok(v) = env::var("DATABASE_MAX_POOL_SIZE") {
            self.database.max_pool_size = v.parse().unwrap_or(self.database.max_pool_size);
        }
        if let Ok(v) = env::var("DATABASE_CONNECT_TIMEOUT_SECS") {
            self.database.connect_timeout_secs = v.parse().unwrap_or(self.database.connect_timeout_secs);
        }

        // Security overrides
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_TOKEN_EXPIRY_DAYS") {
            self.security.token_expiry_days = v
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue { name: "SECURITY_TOKEN_EXPIRY_DAYS", value: v.clone() })?;
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect();
        }
        if let Ok(v) = env::var("SECURITY_ALLOW_ADMIN_CREATE") {
            self.security.allow_admin_create = v.parse().unwrap_or(self.security.allow_admin_create);
        }

        // Gateway overrides
        for principal in &mut self.gateway.principals {
            let var = match principal.identity.as_str() {
                ADMIN_IDENTITY => "API_KEY_ADMIN_PASSPHRASE",
                READONLY_IDENTITY => "API_KEY_READONLY_PASSPHRASE",
                _ => continue,
            };
            if let Ok(v) = env::var(var) {
                principal.passphrase = Some(v);
            }
        }
        if let Ok(v) = env::var("GATEWAY_DEFAULT_QUERY_LIMIT") {
            self.gateway.default_query_limit = v.parse().unwrap_or(self.gateway.default_query_limit);
        }
        if let Ok(v) = env::var("GATEWAY_AGGREGATE_RESULT_CAP") {
            self.gateway.aggregate_result_cap = v.parse().unwrap_or(self.gateway.aggregate_result_cap);
        }

        Ok(self)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.environment != Environment::Development && self.security.jwt_secret == DEV_JWT_SECRET {
            return Err(ConfigError::DefaultJwtSecret(self.environment));
        }
        if !(1..=MAX_TOKEN_EXPIRY_DAYS).contains(&self.security.token_expiry_days) {
            return Err(ConfigError::InvalidValue {
                name: "SECURITY_TOKEN_EXPIRY_DAYS",
                value: self.security.token_expiry_days.to_string(),
            });
        }
        Ok(())
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig::default(),
            database: DatabaseConfig {
                backend: StoreBackend::Mongo,
                mongo_url: "mongodb://localhost:27017".to_string(),
                db_name: "epic_journal".to_string(),
                max_pool_size: 10,
                connect_timeout_secs: 3,
                app_name: "epic-journal-api".to_string(),
            },
            security: SecurityConfig {
                jwt_secret: DEV_JWT_SECRET.to_string(),
                token_expiry_days: 30,
                cors_origins: vec!["*".to_string()],
                allow_admin_create: true,
            },
            gateway: GatewayConfig {
                principals: default_principals(
                    Some("journal-admin-dev-passphrase"),
                    Some("journal-readonly-dev-passphrase"),
                ),
                default_query_limit: 100,
                aggregate_result_cap: 1000,
            },
            resources: ResourceConfig::default(),
        }
    }

    fn staging() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Staging;
        config.database.max_pool_size = 20;
        config.database.connect_timeout_secs = 5;
        config.gateway.principals = default_principals(None, None);
        config
    }

    fn production() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Production;
        config.database.max_pool_size = 50;
        config.database.connect_timeout_secs = 5;
        config.security.allow_admin_create = false;
        config.gateway.principals = default_principals(None, None);
        config
    }

    /// Full bind address for the HTTP listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8001,
            api_prefix: "/api".to_string(),
        }
    }
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            videos_page_size: 12,
            contacts_list_cap: 100,
            excerpt_length: 80,
        }
    }
}

fn default_principals(admin: Option<&str>, readonly: Option<&str>) -> Vec<PrincipalConfig> {
    vec![
        PrincipalConfig {
            identity: ADMIN_IDENTITY.to_string(),
            passphrase: admin.map(str::to_string),
            permissions: vec![Permission::Read, Permission::Write, Permission::Delete],
        },
        PrincipalConfig {
            identity: READONLY_IDENTITY.to_string(),
            passphrase: readonly.map(str::to_string),
            permissions: vec![Permission::Read],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert!(config.security.allow_admin_create);
        assert_eq!(config.security.token_expiry_days, 30);
        assert_eq!(config.gateway.default_query_limit, 100);
        assert_eq!(config.gateway.aggregate_result_cap, 1000);
        assert!(config.gateway.principals.iter().all(|p| p.passphrase.is_some()));
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert!(!config.security.allow_admin_create);
        assert!(config.gateway.principals.iter().all(|p| p.passphrase.is_none()));
        assert!(matches!(config.validate(), Err(ConfigError::DefaultJwtSecret(Environment::Production))));
    }

    #[test]
    fn token_expiry_must_stay_in_range() {
        let mut config = AppConfig::development();
        assert!(config.validate().is_ok());

        for days in [0, -1, MAX_TOKEN_EXPIRY_DAYS + 1, i64::MAX] {
            config.security.token_expiry_days = days;
            assert!(matches!(
                config.validate(),
                Err(ConfigError::InvalidValue { name: "SECURITY_TOKEN_EXPIRY_DAYS", .. })
            ));
        }

        config.security.token_expiry_days = MAX_TOKEN_EXPIRY_DAYS;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn readonly_principal_only_reads() {
        let config = AppConfig::development();
        let readonly = config
            .gateway
            .principals
            .iter()
            .find(|p| p.identity == READONLY_IDENTITY)
            .unwrap();
        assert_eq!(readonly.permissions, vec![Permission::Read]);
    }
}
