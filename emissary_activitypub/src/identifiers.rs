use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::{
    document::Document,
    errors::HandlerError,
};

const FALLBACK_ID_PREFIX: &str = "urn:sha256:";

pub fn local_user_actor_id(instance_url: &str, username: &str) -> String {
    format!("{}/users/{}", instance_url, username)
}

pub fn local_stream_actor_id(instance_url: &str, token: &str) -> String {
    format!("{}/streams/{}", instance_url, token)
}

pub fn local_search_domain_actor_id(instance_url: &str) -> String {
    format!("{}/search", instance_url)
}

pub fn local_search_query_actor_id(instance_url: &str, token: &str) -> String {
    format!("{}/searches/{}", instance_url, token)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LocalActorCollection {
    Inbox,
    Outbox,
    Followers,
    Following,
    Liked,
    Disliked,
    Blocked,
    KeyPackages,
}

impl LocalActorCollection {
    const ALL: [Self; 8] = [
        Self::Inbox,
        Self::Outbox,
        Self::Followers,
        Self::Following,
        Self::Liked,
        Self::Disliked,
        Self::Blocked,
        Self::KeyPackages,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Inbox => "inbox",
            Self::Outbox => "outbox",
            Self::Followers => "followers",
            Self::Following => "following",
            Self::Liked => "liked",
            Self::Disliked => "disliked",
            Self::Blocked => "blocked",
            Self::KeyPackages => "keyPackages",
        }
    }

    /// Parses last segment of a collection URL
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|collection| collection.name() == name)
    }

    pub fn of(&self, actor_id: &str) -> String {
        format!("{}/{}", actor_id, self.name())
    }
}

/// ID of a collection item
pub fn local_object_id(collection_id: &str, item_id: Uuid) -> String {
    format!("{}/{}", collection_id, item_id)
}

/// Follow activity ID contains ID of the following record,
/// it is used to correlate Accept(Follow)
pub fn local_follow_activity_id(actor_id: &str, following_id: Uuid) -> String {
    local_object_id(&LocalActorCollection::Following.of(actor_id), following_id)
}

/// Extracts item ID from a local collection item URL
pub fn parse_local_object_id(collection_id: &str, object_id: &str) -> Option<Uuid> {
    object_id.strip_prefix(collection_id)
        .and_then(|value| value.strip_prefix('/'))
        .and_then(|value| Uuid::parse_str(value).ok())
}

pub fn parse_local_follow_activity_id(
    actor_id: &str,
    activity_id: &str,
) -> Result<Uuid, HandlerError> {
    let following_collection_id = LocalActorCollection::Following.of(actor_id);
    let following_id = parse_local_object_id(&following_collection_id, activity_id)
        .ok_or(HandlerError::ValidationError("unexpected follow activity ID".to_string()))?;
    Ok(following_id)
}

/// Accept(Follow) ID is derived from the follower record,
/// so repeated Follow requests are accepted with the same activity
pub fn local_accept_activity_id(actor_id: &str, follower_id: Uuid) -> String {
    format!(
        "{}/accept",
        local_object_id(&LocalActorCollection::Followers.of(actor_id), follower_id),
    )
}

/// Deterministic identifier for activities that don't have one
pub fn fallback_activity_id(
    actor_id: &str,
    activity_type: &str,
    object_id: &str,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(actor_id.as_bytes());
    hasher.update(b"\n");
    hasher.update(activity_type.as_bytes());
    hasher.update(b"\n");
    hasher.update(object_id.as_bytes());
    let digest = hasher.finalize();
    format!("{}{}", FALLBACK_ID_PREFIX, hex::encode(digest))
}

/// Returns activity ID, or fallback ID if activity doesn't have one
pub fn activity_id_or_fallback(activity: &Document) -> Result<String, HandlerError> {
    if let Some(activity_id) = activity.id() {
        return Ok(activity_id);
    };
    let actor_id = activity.actor().id()
        .ok_or(HandlerError::ValidationError("actor is missing".to_string()))?;
    let activity_type = activity.document_type()
        .ok_or(HandlerError::ValidationError("type is missing".to_string()))?;
    let object_id = activity.object().id().unwrap_or_default();
    Ok(fallback_activity_id(&actor_id, activity_type, &object_id))
}

pub fn is_local_url(instance_url: &str, url: &str) -> bool {
    url == instance_url || url.starts_with(&format!("{instance_url}/"))
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use super::*;

    const INSTANCE_URL: &str = "https://social.example";

    #[test]
    fn test_local_actor_collection_from_name() {
        assert_eq!(
            LocalActorCollection::from_name("keyPackages"),
            Some(LocalActorCollection::KeyPackages),
        );
        assert_eq!(LocalActorCollection::from_name("featured"), None);
    }

    #[test]
    fn test_local_actor_ids() {
        let actor_id = local_user_actor_id(INSTANCE_URL, "alice");
        assert_eq!(actor_id, "https://social.example/users/alice");
        assert_eq!(
            LocalActorCollection::KeyPackages.of(&actor_id),
            "https://social.example/users/alice/keyPackages",
        );
        assert_eq!(
            local_stream_actor_id(INSTANCE_URL, "news"),
            "https://social.example/streams/news",
        );
        assert_eq!(
            local_search_domain_actor_id(INSTANCE_URL),
            "https://social.example/search",
        );
        assert_eq!(
            local_search_query_actor_id(INSTANCE_URL, "rust"),
            "https://social.example/searches/rust",
        );
    }

    #[test]
    fn test_parse_local_follow_activity_id() {
        let actor_id = local_user_actor_id(INSTANCE_URL, "alice");
        let following_id = Uuid::new_v4();
        let activity_id = local_follow_activity_id(&actor_id, following_id);
        let parsed = parse_local_follow_activity_id(&actor_id, &activity_id).unwrap();
        assert_eq!(parsed, following_id);

        let other_actor_id = local_user_actor_id(INSTANCE_URL, "bob");
        let result = parse_local_follow_activity_id(&other_actor_id, &activity_id);
        assert!(result.is_err());
    }

    #[test]
    fn test_fallback_activity_id() {
        let actor_id = "https://remote.example/users/bob";
        let object_id = "https://social.example/objects/1";
        let id_1 = fallback_activity_id(actor_id, "Like", object_id);
        let id_2 = fallback_activity_id(actor_id, "Like", object_id);
        assert_eq!(id_1, id_2);
        assert_eq!(id_1.starts_with("urn:sha256:"), true);
        assert_eq!(id_1.len(), "urn:sha256:".len() + 64);

        let id_3 = fallback_activity_id(actor_id, "Like", "https://social.example/objects/2");
        assert_ne!(id_1, id_3);
        let id_4 = fallback_activity_id("https://remote.example/users/carol", "Like", object_id);
        assert_ne!(id_1, id_4);
    }

    #[test]
    fn test_activity_id_or_fallback() {
        let activity = Document::new(json!({
            "type": "Like",
            "actor": "https://remote.example/users/bob",
            "object": "https://social.example/objects/1",
        }));
        let activity_id = activity_id_or_fallback(&activity).unwrap();
        assert_eq!(activity_id, fallback_activity_id(
            "https://remote.example/users/bob",
            "Like",
            "https://social.example/objects/1",
        ));

        let activity = activity.with_property("id", json!("https://remote.example/likes/1"));
        let activity_id = activity_id_or_fallback(&activity).unwrap();
        assert_eq!(activity_id, "https://remote.example/likes/1");
    }

    #[test]
    fn test_is_local_url() {
        assert_eq!(is_local_url(INSTANCE_URL, "https://social.example/users/alice"), true);
        assert_eq!(is_local_url(INSTANCE_URL, "https://social.example.org/users/alice"), false);
    }
}
