use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::info;

use crate::api::format::{object_id_filter, timestamp_now, to_resource};
use crate::config::ResourceConfig;
use crate::database::{Document, FindOptions, SharedStore};
use crate::filter::SortField;

use super::ServiceError;

pub const VIDEOS: &str = "videos";
pub const ALL_TAGS: &str = "All";

/// Client-editable video fields. `excerpt` and timestamps are always computed here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoInput {
    pub title: String,
    pub youtube_id: String,
    pub embed_url: String,
    pub day: i64,
    pub date: String,
    pub reflection: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub tag: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u64,
    pub total_pages: u64,
    pub total_videos: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Pagination {
    pub fn new(page: u64, limit: u64, total: u64) -> Self {
        let total_pages = total.div_ceil(limit);
        Self {
            current_page: page,
            total_pages,
            total_videos: total,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VideoPage {
    pub videos: Vec<Value>,
    pub pagination: Pagination,
}

/// First `max_chars` characters of the reflection, with "..." only when something was cut
pub fn excerpt(reflection: &str, max_chars: usize) -> String {
    match reflection.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &reflection[..cut]),
        None => reflection.to_string(),
    }
}

#[derive(Clone)]
pub struct VideoService {
    store: SharedStore,
    config: ResourceConfig,
}

impl VideoService {
    pub fn new(store: SharedStore, config: ResourceConfig) -> Self {
        Self { store, config }
    }

    pub async fn list(&self, query: VideoListQuery) -> Result<VideoPage, ServiceError> {
        let page = query.page.unwrap_or(1);
        let limit = query.limit.unwrap_or(self.config.videos_page_size);
        if page == 0 || limit == 0 {
            return Err(ServiceError::Validation("page and limit must be at least 1".to_string()));
        }

        let mut filter = Document::new();
        if let Some(tag) = query.tag.filter(|t| !t.is_empty() && t != ALL_TAGS) {
            filter.insert("tags".to_string(), Value::String(tag));
        }

        let total = self.store.count(VIDEOS, &filter).await?;
        let options = FindOptions {
            projection: None,
            sort: vec![SortField::desc("day")],
            skip: (page - 1).saturating_mul(limit),
            limit: Some(limit),
        };
        let videos = self.store.find(VIDEOS, &filter, options).await?;

        Ok(VideoPage {
            videos: videos.into_iter().map(to_resource).collect(),
            pagination: Pagination::new(page, limit, total),
        })
    }

    pub async fn get(&self, id: &str) -> Result<Value, ServiceError> {
        let filter = id_filter(id)?;
        self.store
            .find_one(VIDEOS, &filter)
            .await?
            .map(to_resource)
            .ok_or_else(not_found)
    }

    pub async fn create(&self, input: VideoInput) -> Result<Value, ServiceError> {
        let mut document = self.stored_fields(&input)?;
        let now = timestamp_now();
        document.insert("createdAt".to_string(), now.clone());
        document.insert("updatedAt".to_string(), now);

        let id = self.store.insert_one(VIDEOS, document).await?;
        info!("Created video '{}' ({})", input.title, id);
        self.get(&id).await
    }

    pub async fn update(&self, id: &str, input: VideoInput) -> Result<Value, ServiceError> {
        let filter = id_filter(id)?;
        let mut fields = self.stored_fields(&input)?;
        fields.insert("updatedAt".to_string(), timestamp_now());

        let mut update = Document::new();
        update.insert("$set".to_string(), Value::Object(fields));
        let outcome = self.store.update_many(VIDEOS, &filter, &update).await?;
        if outcome.matched_count == 0 {
            return Err(not_found());
        }

        info!("Updated video {}", id);
        self.get(id).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        let filter = id_filter(id)?;
        if self.store.delete_many(VIDEOS, &filter).await? == 0 {
            return Err(not_found());
        }
        info!("Deleted video {}", id);
        Ok(())
    }

    /// "All" followed by every distinct tag in sorted order
    pub async fn tags(&self) -> Result<Vec<String>, ServiceError> {
        let mut tags: Vec<String> = self
            .store
            .distinct(VIDEOS, "tags", &Document::new())
            .await?
            .into_iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .filter(|t| t != ALL_TAGS)
            .collect();
        tags.sort();
        tags.dedup();
        tags.insert(0, ALL_TAGS.to_string());
        Ok(tags)
    }

    fn stored_fields(&self, input: &VideoInput) -> Result<Map<String, Value>, ServiceError> {
        let mut fields = match serde_json::to_value(input) {
            Ok(Value::Object(map)) => map,
            _ => return Err(ServiceError::Validation("Invalid video payload".to_string())),
        };
        fields.insert(
            "excerpt".to_string(),
            json!(excerpt(&input.reflection, self.config.excerpt_length)),
        );
        Ok(fields)
    }
}

fn not_found() -> ServiceError {
    ServiceError::NotFound("Video not found".to_string())
}

/// Malformed identifiers cannot match anything, so they are reported as missing
fn id_filter(id: &str) -> Result<Document, ServiceError> {
    let oid = ObjectId::parse_str(id).map_err(|_| not_found())?;
    let mut filter = Document::new();
    filter.insert("_id".to_string(), object_id_filter(&oid.to_hex()));
    Ok(filter)
}
