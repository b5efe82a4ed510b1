use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::rules::types::RuleAction;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FollowingMethod {
    Poll,
    RssCloud,
    WebSub,
    ActivityPub,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FollowingStatus {
    New,
    Loading,
    Success,
    Failure,
}

/// Remote actor followed by a local user
#[derive(Clone, Debug)]
pub struct Following {
    pub id: Uuid,
    pub user_id: Uuid,
    pub profile_url: String,
    pub name: Option<String>,
    pub icon_url: Option<String>,
    pub inbox_url: Option<String>,
    // How to treat rules published by this source
    pub rule_action: RuleAction,
    pub method: FollowingMethod,
    pub status: FollowingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct FollowingData {
    pub user_id: Uuid,
    pub profile_url: String,
    pub name: Option<String>,
    pub inbox_url: Option<String>,
    pub rule_action: RuleAction,
    pub method: FollowingMethod,
}
