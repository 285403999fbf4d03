use sha2::{Digest, Sha256};
use std::collections::{BTreeSet, HashMap};
use tracing::{info, warn};

use crate::config::GatewayConfig;
use crate::types::{GatewayOperation, Permission};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccessError {
    #[error("Invalid API user")]
    UnauthorizedIdentity(String),

    #[error("Invalid API key")]
    InvalidCredential,

    #[error("Permission denied. Required: {required}")]
    PermissionDenied { required: Permission },
}

/// Authenticated gateway caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiKeyPrincipal {
    pub identity: String,
    pub permissions: BTreeSet<Permission>,
}

impl ApiKeyPrincipal {
    pub fn has(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }

    pub fn authorize(&self, operation: GatewayOperation) -> Result<(), AccessError> {
        let required = operation.required_permission();
        if self.has(required) {
            Ok(())
        } else {
            warn!(
                "API user '{}' denied {}: requires {}",
                self.identity,
                operation.name(),
                required
            );
            Err(AccessError::PermissionDenied { required })
        }
    }

    pub fn permission_names(&self) -> Vec<&'static str> {
        self.permissions.iter().map(Permission::as_str).collect()
    }
}

#[derive(Debug, Clone)]
struct RegisteredKey {
    digest: String,
    principal: ApiKeyPrincipal,
}

/// Static identity -> (key digest, permissions) table, built once at startup
#[derive(Debug, Clone, Default)]
pub struct ApiKeyRegistry {
    keys: HashMap<String, RegisteredKey>,
}

/// Hex SHA-256 of a passphrase. This is the value callers present as their API key.
pub fn digest_passphrase(passphrase: &str) -> String {
    hex::encode(Sha256::digest(passphrase.as_bytes()))
}

impl ApiKeyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &GatewayConfig) -> Self {
        let mut registry = Self::new();
        for principal in &config.principals {
            match principal.passphrase.as_deref() {
                Some(passphrase) if !passphrase.is_empty() => {
                    registry.register(&principal.identity, passphrase, principal.permissions.iter().copied());
                    info!("Registered API principal '{}'", principal.identity);
                }
                _ => warn!(
                    "No passphrase configured for API principal '{}', skipping",
                    principal.identity
                ),
            }
        }
        registry
    }

    pub fn register(
        &mut self,
        identity: &str,
        passphrase: &str,
        permissions: impl IntoIterator<Item = Permission>,
    ) {
        let principal = ApiKeyPrincipal {
            identity: identity.to_string(),
            permissions: permissions.into_iter().collect(),
        };
        self.keys.insert(
            identity.to_string(),
            RegisteredKey {
                digest: digest_passphrase(passphrase),
                principal,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Resolve an (identity, key) pair to its principal
    pub fn authenticate(&self, identity: &str, key: &str) -> Result<ApiKeyPrincipal, AccessError> {
        let entry = self.keys.get(identity).ok_or_else(|| {
            warn!("Rejected API request for unknown user '{}'", identity);
            AccessError::UnauthorizedIdentity(identity.to_string())
        })?;

        // Plain comparison; timing side-channels are an accepted risk here
        if entry.digest != key {
            warn!("Rejected API request for '{}': key mismatch", identity);
            return Err(AccessError::InvalidCredential);
        }
        Ok(entry.principal.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AppConfig, ADMIN_IDENTITY, READONLY_IDENTITY};

    fn registry() -> ApiKeyRegistry {
        let mut registry = ApiKeyRegistry::new();
        registry.register("full", "full-pass", [Permission::Read, Permission::Write, Permission::Delete]);
        registry.register("reader", "reader-pass", [Permission::Read]);
        registry
    }

    #[test]
    fn digest_is_hex_sha256() {
        assert_eq!(
            digest_passphrase("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn authenticates_with_digest() {
        let principal = registry().authenticate("reader", &digest_passphrase("reader-pass")).unwrap();
        assert_eq!(principal.identity, "reader");
        assert_eq!(principal.permission_names(), vec!["read"]);
    }

    #[test]
    fn passphrase_itself_is_not_the_key() {
        assert_eq!(
            registry().authenticate("reader", "reader-pass"),
            Err(AccessError::InvalidCredential)
        );
    }

    #[test]
    fn unknown_identity_fails_before_key_check() {
        assert_eq!(
            registry().authenticate("ghost", &digest_passphrase("reader-pass")),
            Err(AccessError::UnauthorizedIdentity("ghost".to_string()))
        );
    }

    #[test]
    fn readonly_cannot_delete() {
        let principal = registry().authenticate("reader", &digest_passphrase("reader-pass")).unwrap();
        assert!(principal.authorize(GatewayOperation::Query).is_ok());
        assert_eq!(
            principal.authorize(GatewayOperation::Delete),
            Err(AccessError::PermissionDenied { required: Permission::Delete })
        );
        assert_eq!(
            principal.authorize(GatewayOperation::Insert),
            Err(AccessError::PermissionDenied { required: Permission::Write })
        );
    }

    #[test]
    fn builds_default_principals_from_config() {
        let registry = ApiKeyRegistry::from_config(&AppConfig::development().gateway);
        assert_eq!(registry.len(), 2);
        let admin = registry
            .authenticate(ADMIN_IDENTITY, &digest_passphrase("journal-admin-dev-passphrase"))
            .unwrap();
        assert!(admin.has(Permission::Delete));
        let reader = registry
            .authenticate(READONLY_IDENTITY, &digest_passphrase("journal-readonly-dev-passphrase"))
            .unwrap();
        assert!(!reader.has(Permission::Write));
    }

    #[test]
    fn skips_principals_without_passphrase() {
        let mut config = AppConfig::development().gateway;
        config.principals[1].passphrase = None;
        let registry = ApiKeyRegistry::from_config(&config);
        assert_eq!(registry.len(), 1);
    }
}
