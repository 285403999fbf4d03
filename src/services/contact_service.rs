use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use crate::api::format::{timestamp_now, to_resource};
use crate::config::ResourceConfig;
use crate::database::{Document, FindOptions, SharedStore};
use crate::filter::SortField;

use super::ServiceError;

pub const CONTACTS: &str = "contacts";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactInput {
    pub name: String,
    pub email: String,
    pub area: String,
    pub message: String,
}

impl ContactInput {
    pub fn validate(&self) -> Result<(), ServiceError> {
        for (field, value) in [("name", &self.name), ("area", &self.area), ("message", &self.message)] {
            if value.trim().is_empty() {
                return Err(ServiceError::Validation(format!("{} cannot be empty", field)));
            }
        }
        validate_email_format(&self.email).map_err(ServiceError::Validation)
    }
}

/// Basic shape check: one `@`, non-empty local part, dotted domain
pub fn validate_email_format(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email cannot be empty".to_string());
    }

    let (local, domain) = email
        .split_once('@')
        .ok_or_else(|| "Invalid email format".to_string())?;
    if local.is_empty()
        || domain.contains('@')
        || email.chars().any(char::is_whitespace)
        || !domain.contains('.')
        || domain.starts_with('.')
        || domain.ends_with('.')
    {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

#[derive(Clone)]
pub struct ContactService {
    store: SharedStore,
    config: ResourceConfig,
}

impl ContactService {
    pub fn new(store: SharedStore, config: ResourceConfig) -> Self {
        Self { store, config }
    }

    /// Public submission. Status is always "new".
    pub async fn submit(&self, input: ContactInput) -> Result<Value, ServiceError> {
        input.validate()?;

        let mut document = match serde_json::to_value(&input) {
            Ok(Value::Object(map)) => map,
            _ => return Err(ServiceError::Validation("Invalid contact payload".to_string())),
        };
        document.insert("status".to_string(), json!("new"));
        document.insert("createdAt".to_string(), timestamp_now());

        let id = self.store.insert_one(CONTACTS, document).await?;
        info!("Received contact message {} ({})", id, input.area);
        Ok(json!({ "success": true, "message": "Message received successfully" }))
    }

    /// Newest first, capped
    pub async fn list(&self) -> Result<Vec<Value>, ServiceError> {
        let options = FindOptions {
            sort: vec![SortField::desc("createdAt")],
            limit: Some(self.config.contacts_list_cap),
            ..Default::default()
        };
        let contacts = self.store.find(CONTACTS, &Document::new(), options).await?;
        Ok(contacts.into_iter().map(to_resource).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{DocumentStore, MemoryStore};
    use std::sync::Arc;

    fn input(name: &str, email: &str) -> ContactInput {
        ContactInput {
            name: name.to_string(),
            email: email.to_string(),
            area: "coaching".to_string(),
            message: "hello".to_string(),
        }
    }

    #[test]
    fn email_validation() {
        assert!(validate_email_format("a@b.co").is_ok());
        assert!(validate_email_format("").is_err());
        assert!(validate_email_format("ab.co").is_err());
        assert!(validate_email_format("@b.co").is_err());
        assert!(validate_email_format("a@b").is_err());
        assert!(validate_email_format("a@@b.co").is_err());
        assert!(validate_email_format("a b@c.co").is_err());
    }

    #[tokio::test]
    async fn submit_stamps_status_and_created_at() {
        let store = Arc::new(MemoryStore::new("test"));
        let service = ContactService::new(store.clone(), ResourceConfig::default());
        let response = service.submit(input("Sam", "sam@example.com")).await.unwrap();
        assert_eq!(response["success"], json!(true));

        let stored = store.find_one(CONTACTS, &Document::new()).await.unwrap().unwrap();
        assert_eq!(stored["status"], json!("new"));
        assert!(stored["createdAt"]["$date"].is_string());
    }

    #[tokio::test]
    async fn submit_rejects_bad_input() {
        let service = ContactService::new(Arc::new(MemoryStore::new("test")), ResourceConfig::default());
        assert!(matches!(
            service.submit(input("Sam", "not-an-email")).await,
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            service.submit(input("  ", "sam@example.com")).await,
            Err(ServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn list_is_newest_first_and_capped() {
        let store = Arc::new(MemoryStore::new("test"));
        for (i, day) in ["2025-01-01", "2025-03-01", "2025-02-01"].iter().enumerate() {
            store
                .insert_one(
                    CONTACTS,
                    json!({ "name": format!("n{}", i), "createdAt": { "$date": format!("{}T00:00:00Z", day) } })
                        .as_object()
                        .cloned()
                        .unwrap(),
                )
                .await
                .unwrap();
        }
        let config = ResourceConfig { contacts_list_cap: 2, ..ResourceConfig::default() };
        let service = ContactService::new(store, config);

        let contacts = service.list().await.unwrap();
        assert_eq!(contacts.len(), 2);
        assert_eq!(contacts[0]["name"], json!("n1"));
        assert_eq!(contacts[1]["name"], json!("n2"));
        assert_eq!(contacts[0]["createdAt"], json!("2025-03-01T00:00:00Z"));
    }
}
