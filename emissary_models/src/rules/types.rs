use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub enum RuleType {
    Actor,
    Domain,
    Content,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub enum RuleAction {
    /// Rules of this kind are not applied
    #[default]
    Ignore,
    Label,
    Mute,
    Block,
}

#[derive(Clone, Debug)]
pub struct Rule {
    pub id: Uuid,
    // Domain-wide rule if not set
    pub user_id: Option<Uuid>,
    // Rule received from a followed account
    pub following_id: Option<Uuid>,
    pub rule_type: RuleType,
    pub trigger: String,
    pub action: RuleAction,
    pub label: Option<String>,
    pub origin_url: Option<String>,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
}

pub struct RuleData {
    pub user_id: Option<Uuid>,
    pub following_id: Option<Uuid>,
    pub rule_type: RuleType,
    pub trigger: String,
    pub action: RuleAction,
    pub label: Option<String>,
    pub origin_url: Option<String>,
    pub is_public: bool,
}

impl RuleData {
    pub fn block(rule_type: RuleType, trigger: &str) -> Self {
        Self {
            user_id: None,
            following_id: None,
            rule_type,
            trigger: trigger.to_string(),
            action: RuleAction::Block,
            label: None,
            origin_url: None,
            is_public: false,
        }
    }
}
