use chrono::{DateTime, Utc};
use uuid::Uuid;

/// How a message reached the inbox
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum OriginType {
    Primary,
    Announce,
    Like,
    Dislike,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Origin {
    pub origin_type: OriginType,
    // Actor that delivered the message
    pub url: String,
    pub label: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MessageState {
    Unread,
    Muted,
}

#[derive(Clone, Debug)]
pub struct Message {
    pub id: Uuid,
    pub user_id: Uuid,
    pub following_id: Uuid,
    pub origin: Origin,
    pub object_url: String,
    pub object_type: String,
    pub state: MessageState,
    pub labels: Vec<String>,
    pub created_at: DateTime<Utc>,
}

pub struct MessageData {
    pub user_id: Uuid,
    pub following_id: Uuid,
    pub origin: Origin,
    pub object_url: String,
    pub object_type: String,
    pub state: MessageState,
    pub labels: Vec<String>,
}
