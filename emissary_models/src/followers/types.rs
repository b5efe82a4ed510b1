use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::actors::types::{Parent, RemoteActor};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FollowerMethod {
    ActivityPub,
    WebSub,
}

#[derive(Clone, Debug)]
pub struct Follower {
    pub id: Uuid,
    pub parent: Parent,
    pub actor: RemoteActor,
    pub method: FollowerMethod,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Follower {
    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }
}

pub struct FollowerData {
    pub parent: Parent,
    pub actor: RemoteActor,
    pub method: FollowerMethod,
}
