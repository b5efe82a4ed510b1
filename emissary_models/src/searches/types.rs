use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Saved search exposed as a followable actor
#[derive(Clone, Debug)]
pub struct SearchQuery {
    pub id: Uuid,
    pub token: String,
    pub query: String,
    pub created_at: DateTime<Utc>,
}
