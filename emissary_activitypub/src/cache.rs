//! Cache of dereferenced documents.
//!
//! Documents are stored by ID with last-writer-wins semantics.
//! Concurrent handlers may put, load and delete the same entry.
//! Entries expire after `ttl` and the number of entries is capped.
use std::sync::Arc;

use chrono::{Duration, Utc};
use serde_json::{Value as JsonValue};

use emissary_config::Instance;
use emissary_models::{
    database::{DatabaseClient, DatabaseError},
    objects::queries::{
        delete_expired_objects,
        delete_object,
        get_object,
        save_object,
    },
};

use crate::{
    document::Document,
    errors::HandlerError,
    fetch::{is_same_origin, Fetcher},
};

pub enum ReloadResult {
    /// Document still exists and was updated
    Refreshed(Document),
    /// Document is gone and was removed from cache
    Purged,
}

const DEFAULT_TTL: u32 = 3600 * 24;
const DEFAULT_CAPACITY: usize = 10_000;

#[derive(Clone)]
pub struct ActivityCache {
    db_client: DatabaseClient,
    fetcher: Arc<dyn Fetcher>,
    ttl: Duration,
    capacity: usize,
}

impl ActivityCache {
    pub fn new(db_client: DatabaseClient, fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            db_client,
            fetcher,
            ttl: Duration::seconds(DEFAULT_TTL.into()),
            capacity: DEFAULT_CAPACITY,
        }
    }

    pub fn with_limits(mut self, ttl_secs: u32, capacity: usize) -> Self {
        self.ttl = Duration::seconds(ttl_secs.into());
        self.capacity = capacity;
        self
    }

    pub fn for_instance(
        instance: &Instance,
        db_client: DatabaseClient,
        fetcher: Arc<dyn Fetcher>,
    ) -> Self {
        Self::new(db_client, fetcher)
            .with_limits(instance.object_cache_ttl, instance.object_cache_size)
    }

    /// Returns cached document without making network requests.
    /// Expired documents are removed.
    pub async fn get(&self, object_id: &str) -> Result<Option<Document>, HandlerError> {
        let object = match get_object(&self.db_client, object_id).await {
            Ok(object) => object,
            Err(DatabaseError::NotFound(_)) => return Ok(None),
            Err(other_error) => return Err(other_error.into()),
        };
        if object.updated_at + self.ttl <= Utc::now() {
            self.delete(object_id).await?;
            return Ok(None);
        };
        Ok(Some(Document::new(object.object_data)))
    }

    /// Loads document from cache, fetching it if not cached
    pub async fn load(&self, object_id: &str) -> Result<Document, HandlerError> {
        if let Some(document) = self.get(object_id).await? {
            return Ok(document);
        };
        let object_json = self.fetcher.fetch_object(object_id).await?;
        self.put(object_id, &object_json).await?;
        Ok(Document::new(object_json))
    }

    /// Returns embedded document as is, loads referenced document
    pub async fn load_document(&self, document: &Document) -> Result<Document, HandlerError> {
        if document.is_empty() {
            return Err(HandlerError::ValidationError("document is missing".to_string()));
        };
        if !document.is_reference() && document.document_type().is_some() {
            return Ok(document.clone());
        };
        let object_id = document.id()
            .ok_or(HandlerError::ValidationError("document without ID".to_string()))?;
        self.load(&object_id).await
    }

    /// Like `load_document`, but an embedded document is trusted only if
    /// it has the same origin as the sender. Otherwise it is loaded
    /// from its origin.
    pub async fn load_document_from(
        &self,
        document: &Document,
        sender_id: &str,
    ) -> Result<Document, HandlerError> {
        if document.is_reference() || document.document_type().is_none() {
            return self.load_document(document).await;
        };
        let Some(object_id) = document.id() else {
            return Ok(document.clone());
        };
        let is_trusted = is_same_origin(&object_id, sender_id)
            .map_err(|_| HandlerError::ValidationError("invalid object ID".to_string()))?;
        if is_trusted {
            return Ok(document.clone());
        };
        log::warn!("embedded object {object_id} is not owned by {sender_id}");
        self.load(&object_id).await
    }

    /// Bypasses cache and fetches document again
    pub async fn force_reload(&self, object_id: &str) -> Result<ReloadResult, HandlerError> {
        match self.fetcher.fetch_object(object_id).await {
            Ok(object_json) => {
                self.put(object_id, &object_json).await?;
                Ok(ReloadResult::Refreshed(Document::new(object_json)))
            },
            Err(error) if error.is_not_found() => {
                self.delete(object_id).await?;
                Ok(ReloadResult::Purged)
            },
            Err(other_error) => Err(other_error.into()),
        }
    }

    pub async fn put(&self, object_id: &str, object_json: &JsonValue) -> Result<(), HandlerError> {
        save_object(
            &self.db_client,
            object_id,
            object_json,
            self.capacity,
        ).await?;
        Ok(())
    }

    /// Returns `false` if document was not cached
    pub async fn delete(&self, object_id: &str) -> Result<bool, HandlerError> {
        let deleted = delete_object(&self.db_client, object_id).await?;
        Ok(deleted)
    }

    /// Removes expired documents, returns the number of removed documents
    pub async fn prune(&self) -> Result<usize, HandlerError> {
        let deleted = delete_expired_objects(
            &self.db_client,
            Utc::now() - self.ttl,
        ).await?;
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use emissary_models::database::test_utils::create_test_database;
    use crate::test_utils::MockFetcher;
    use super::*;

    #[tokio::test]
    async fn test_load_caches_document() {
        let db_client = create_test_database();
        let object_id = "https://remote.example/objects/1";
        let fetcher = MockFetcher::default()
            .with_object(json!({"id": object_id, "type": "Note"}));
        let fetcher = Arc::new(fetcher);
        let cache = ActivityCache::new(db_client, fetcher.clone());
        let document = cache.load(object_id).await.unwrap();
        assert_eq!(document.document_type(), Some("Note"));
        cache.load(object_id).await.unwrap();
        // Second load doesn't make a request
        assert_eq!(fetcher.request_count(), 1);
    }

    #[tokio::test]
    async fn test_load_document_embedded() {
        let db_client = create_test_database();
        let cache = ActivityCache::new(db_client, Arc::new(MockFetcher::default()));
        let document = Document::new(json!({
            "id": "https://remote.example/objects/1",
            "type": "Note",
        }));
        let loaded = cache.load_document(&document).await.unwrap();
        assert_eq!(loaded, document);
    }

    #[tokio::test]
    async fn test_load_document_from_other_origin() {
        let db_client = create_test_database();
        let object_id = "https://victim.example/users/carol";
        let fetcher = MockFetcher::default()
            .with_object(json!({
                "id": object_id,
                "type": "Person",
                "inbox": "https://victim.example/users/carol/inbox",
            }));
        let cache = ActivityCache::new(db_client, Arc::new(fetcher));
        let document = Document::new(json!({
            "id": object_id,
            "type": "Person",
            "inbox": "https://evil.example/steal",
        }));

        let loaded = cache.load_document_from(
            &document,
            "https://evil.example/users/mallory",
        ).await.unwrap();
        assert_eq!(loaded.inbox(), Some("https://victim.example/users/carol/inbox"));

        let loaded = cache.load_document_from(
            &document,
            "https://victim.example/users/dave",
        ).await.unwrap();
        assert_eq!(loaded.inbox(), Some("https://evil.example/steal"));
    }

    #[tokio::test]
    async fn test_expired_document_is_reloaded() {
        let db_client = create_test_database();
        let object_id = "https://remote.example/objects/1";
        let fetcher = MockFetcher::default()
            .with_object(json!({"id": object_id, "content": "fresh"}));
        let fetcher = Arc::new(fetcher);
        let cache = ActivityCache::new(db_client, fetcher.clone())
            .with_limits(0, 10);
        cache.put(object_id, &json!({"id": object_id, "content": "stale"})).await.unwrap();
        assert_eq!(cache.get(object_id).await.unwrap().is_none(), true);

        let document = cache.load(object_id).await.unwrap();
        assert_eq!(document.content(), Some("fresh"));
        assert_eq!(fetcher.request_count(), 1);
        cache.prune().await.unwrap();
        assert_eq!(cache.get(object_id).await.unwrap().is_none(), true);
    }

    #[tokio::test]
    async fn test_cache_capacity() {
        let db_client = create_test_database();
        let cache = ActivityCache::new(db_client, Arc::new(MockFetcher::default()))
            .with_limits(3600, 1);
        cache.put("https://remote.example/objects/1", &json!({})).await.unwrap();
        cache.put("https://remote.example/objects/2", &json!({})).await.unwrap();
        let first = cache.get("https://remote.example/objects/1").await.unwrap();
        assert_eq!(first.is_none(), true);
        let second = cache.get("https://remote.example/objects/2").await.unwrap();
        assert_eq!(second.is_some(), true);
    }

    #[tokio::test]
    async fn test_force_reload_purged() {
        let db_client = create_test_database();
        let object_id = "https://remote.example/objects/1";
        let fetcher = MockFetcher::default().with_gone(object_id);
        let cache = ActivityCache::new(db_client, Arc::new(fetcher));
        cache.put(object_id, &json!({"id": object_id})).await.unwrap();
        let result = cache.force_reload(object_id).await.unwrap();
        assert!(matches!(result, ReloadResult::Purged));
        assert_eq!(cache.get(object_id).await.unwrap().is_none(), true);
    }

    #[tokio::test]
    async fn test_force_reload_refreshed() {
        let db_client = create_test_database();
        let object_id = "https://remote.example/objects/1";
        let fetcher = MockFetcher::default()
            .with_object(json!({"id": object_id, "content": "new"}));
        let cache = ActivityCache::new(db_client, Arc::new(fetcher));
        cache.put(object_id, &json!({"id": object_id, "content": "old"})).await.unwrap();
        let result = cache.force_reload(object_id).await.unwrap();
        assert!(matches!(result, ReloadResult::Refreshed(_)));
        let document = cache.get(object_id).await.unwrap().unwrap();
        assert_eq!(document.content(), Some("new"));
    }
}
