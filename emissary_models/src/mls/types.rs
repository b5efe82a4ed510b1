use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Key package published by a local user
#[derive(Clone, Debug)]
pub struct KeyPackage {
    pub id: Uuid,
    pub user_id: Uuid,
    pub object_url: String,
    // Base64-encoded MLS key package
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Encrypted group message received by a local user.
/// Only the payload and its sender are retained.
#[derive(Clone, Debug)]
pub struct MlsMessage {
    pub id: Uuid,
    pub user_id: Uuid,
    pub actor_url: String,
    pub message_type: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}
