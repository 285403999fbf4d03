//! Admin credential store: login, token verification and account creation

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::api::format::timestamp_now;
use crate::auth::{hash_password, verify_password, TokenService};
use crate::database::{Document, SharedStore};

use super::ServiceError;

pub const ADMINS: &str = "admins";

const INVALID_LOGIN: &str = "Invalid username or password";

#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminUser {
    pub username: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
    pub user: AdminUser,
}

/// Usernames: 3-50 characters of letters, digits, `_` or `-`, starting with a letter or digit
pub fn validate_username_format(username: &str) -> Result<(), String> {
    if username.is_empty() {
        return Err("Username cannot be empty".to_string());
    }

    let length = username.chars().count();
    if length < 3 {
        return Err("Username must be at least 3 characters".to_string());
    }
    if length > 50 {
        return Err("Username must be at most 50 characters".to_string());
    }

    if !username.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-') {
        return Err("Username can only contain letters, numbers, underscore, and hyphen".to_string());
    }

    if !username.starts_with(char::is_alphanumeric) {
        return Err("Username must start with a letter or number".to_string());
    }

    Ok(())
}

#[derive(Clone)]
pub struct AdminService {
    store: SharedStore,
    tokens: TokenService,
    allow_create: bool,
}

impl AdminService {
    pub fn new(store: SharedStore, tokens: TokenService, allow_create: bool) -> Self {
        Self { store, tokens, allow_create }
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    pub async fn login(&self, credentials: Credentials) -> Result<LoginResponse, ServiceError> {
        let admin = self.find_admin(&credentials.username).await?;
        let hash = admin
            .as_ref()
            .and_then(|doc| doc.get("password"))
            .and_then(Value::as_str);

        let verified = match hash {
            Some(hash) => verify_password(&credentials.password, hash).unwrap_or_else(|e| {
                warn!("Stored password for admin '{}' is unreadable: {}", credentials.username, e);
                false
            }),
            None => false,
        };
        if !verified {
            warn!("Failed admin login for '{}'", credentials.username);
            return Err(ServiceError::Unauthorized(INVALID_LOGIN.to_string()));
        }

        let token = self.tokens.issue(&credentials.username)?;
        info!("Admin '{}' logged in", credentials.username);
        Ok(LoginResponse {
            success: true,
            token,
            user: AdminUser { username: credentials.username },
        })
    }

    /// Resolve a bearer token to its admin identity
    pub fn verify(&self, token: &str) -> Result<AdminUser, ServiceError> {
        let claims = self.tokens.validate(token)?;
        Ok(AdminUser { username: claims.sub })
    }

    pub async fn create(&self, credentials: Credentials) -> Result<Value, ServiceError> {
        if !self.allow_create {
            return Err(ServiceError::Forbidden("Admin creation is disabled".to_string()));
        }
        self.create_admin(credentials).await
    }

    /// Create an admin regardless of the HTTP gate; used by the operator CLI
    pub async fn create_admin(&self, credentials: Credentials) -> Result<Value, ServiceError> {
        validate_username_format(&credentials.username).map_err(ServiceError::Validation)?;
        if credentials.password.is_empty() {
            return Err(ServiceError::Validation("Password cannot be empty".to_string()));
        }

        if self.find_admin(&credentials.username).await?.is_some() {
            return Err(ServiceError::Conflict("Admin already exists".to_string()));
        }

        let mut document = Document::new();
        document.insert("username".to_string(), json!(credentials.username));
        document.insert("password".to_string(), json!(hash_password(&credentials.password)?));
        document.insert("createdAt".to_string(), timestamp_now());
        self.store.insert_one(ADMINS, document).await?;

        info!("Created admin '{}'", credentials.username);
        Ok(json!({ "success": true, "message": "Admin created successfully" }))
    }

    async fn find_admin(&self, username: &str) -> Result<Option<Document>, ServiceError> {
        let mut filter = Document::new();
        filter.insert("username".to_string(), json!(username));
        Ok(self.store.find_one(ADMINS, &filter).await?)
    }
}
