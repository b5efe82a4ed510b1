use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of local actor that owns a record
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum ParentType {
    User,
    Stream,
    SearchDomain,
    SearchQuery,
}

/// Reference to a local actor
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct Parent {
    pub parent_type: ParentType,
    pub parent_id: Uuid,
}

impl Parent {
    pub fn user(user_id: Uuid) -> Self {
        Self { parent_type: ParentType::User, parent_id: user_id }
    }

    pub fn stream(stream_id: Uuid) -> Self {
        Self { parent_type: ParentType::Stream, parent_id: stream_id }
    }

    /// There is only one search domain actor per instance
    pub fn search_domain() -> Self {
        Self { parent_type: ParentType::SearchDomain, parent_id: Uuid::nil() }
    }

    pub fn search_query(search_query_id: Uuid) -> Self {
        Self { parent_type: ParentType::SearchQuery, parent_id: search_query_id }
    }
}

/// Remote actor data captured when a relationship is established
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct RemoteActor {
    pub profile_url: String,
    pub name: Option<String>,
    pub inbox_url: String,
    pub shared_inbox_url: Option<String>,
    pub icon_url: Option<String>,
}

impl RemoteActor {
    /// Shared inbox is preferred for delivery
    pub fn delivery_inbox(&self) -> &str {
        self.shared_inbox_url.as_deref().unwrap_or(&self.inbox_url)
    }
}
