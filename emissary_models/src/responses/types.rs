use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub enum ResponseType {
    Like,
    Dislike,
    Announce,
}

impl ResponseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Like => "Like",
            Self::Dislike => "Dislike",
            Self::Announce => "Announce",
        }
    }
}

/// Reaction of an actor (local or remote) to an object
#[derive(Clone, Debug)]
pub struct Response {
    pub id: Uuid,
    pub activity_id: String,
    pub actor_url: String,
    pub response_type: ResponseType,
    pub object_url: String,
    pub content: Option<String>,
    pub created_at: DateTime<Utc>,
}

pub struct ResponseData {
    pub activity_id: String,
    pub actor_url: String,
    pub response_type: ResponseType,
    pub object_url: String,
    pub content: Option<String>,
}
