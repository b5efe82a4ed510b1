use chrono::{DateTime, Utc};
use serde_json::{Value as JsonValue};
use uuid::Uuid;

use crate::actors::types::Parent;

#[derive(Clone, Debug)]
pub struct OutboxMessage {
    pub id: Uuid,
    pub parent: Parent,
    pub activity_type: String,
    pub object_url: String,
    pub activity: JsonValue,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
}

pub struct OutboxMessageData {
    // Pre-generated ID, activity ID is derived from it
    pub id: Uuid,
    pub parent: Parent,
    pub activity_type: String,
    pub object_url: String,
    pub activity: JsonValue,
    pub is_public: bool,
    pub published: DateTime<Utc>,
}
