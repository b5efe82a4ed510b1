use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Content stream published by a local user as a separate actor
#[derive(Clone, Debug)]
pub struct Stream {
    pub id: Uuid,
    pub token: String,
    pub owner_id: Uuid,
    pub name: String,
    pub summary: Option<String>,
    pub created_at: DateTime<Utc>,
}

pub struct StreamCreateData {
    pub token: String,
    pub owner_id: Uuid,
    pub name: String,
    pub summary: Option<String>,
}
