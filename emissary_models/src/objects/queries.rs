use chrono::{DateTime, Utc};
use serde_json::{Value as JsonValue};

use crate::database::{DatabaseClient, DatabaseError};

use super::types::CachedObject;

/// Stores document. Last write wins.
/// When the table grows beyond `capacity`, least recently updated
/// documents are evicted.
pub async fn save_object(
    db_client: &DatabaseClient,
    object_id: &str,
    object_data: &JsonValue,
    capacity: usize,
) -> Result<(), DatabaseError> {
    let mut tables = db_client.write().await;
    tables.objects.insert(object_id.to_string(), CachedObject {
        object_id: object_id.to_string(),
        object_data: object_data.clone(),
        updated_at: Utc::now(),
    });
    while tables.objects.len() > capacity {
        let maybe_oldest = tables.objects.values()
            .filter(|object| object.object_id != object_id)
            .min_by_key(|object| object.updated_at)
            .map(|object| object.object_id.clone());
        let Some(oldest_id) = maybe_oldest else { break };
        tables.objects.remove(&oldest_id);
    };
    Ok(())
}

pub async fn get_object(
    db_client: &DatabaseClient,
    object_id: &str,
) -> Result<CachedObject, DatabaseError> {
    let tables = db_client.read().await;
    tables.objects.get(object_id)
        .cloned()
        .ok_or(DatabaseError::NotFound("object"))
}

/// Returns `false` if object was not cached
pub async fn delete_object(
    db_client: &DatabaseClient,
    object_id: &str,
) -> Result<bool, DatabaseError> {
    let mut tables = db_client.write().await;
    let deleted = tables.objects.remove(object_id).is_some();
    Ok(deleted)
}

/// Removes documents not updated since the given time
pub async fn delete_expired_objects(
    db_client: &DatabaseClient,
    updated_before: DateTime<Utc>,
) -> Result<usize, DatabaseError> {
    let mut tables = db_client.write().await;
    let count_before = tables.objects.len();
    tables.objects.retain(|_, object| object.updated_at >= updated_before);
    Ok(count_before - tables.objects.len())
}
