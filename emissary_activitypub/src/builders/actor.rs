use serde::Serialize;

use crate::{
    actors::LocalActor,
    contexts::{build_default_context, Context},
    identifiers::LocalActorCollection,
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ActorImage {
    #[serde(rename = "type")]
    object_type: String,
    url: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    #[serde(rename = "@context")]
    _context: Context,

    pub id: String,

    #[serde(rename = "type")]
    object_type: String,

    name: String,
    preferred_username: String,

    inbox: String,
    outbox: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    followers: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    following: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    liked: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    disliked: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    blocked: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    key_packages: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    icon: Option<ActorImage>,

    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<String>,

    manually_approves_followers: bool,
}

pub fn build_local_actor(local_actor: &LocalActor) -> Actor {
    let optional_collection = |collection| {
        local_actor.has_collection(collection)
            .then(|| local_actor.collection(collection))
    };
    let icon = local_actor.icon_url.as_ref().map(|url| ActorImage {
        object_type: "Image".to_string(),
        url: url.clone(),
    });
    Actor {
        _context: build_default_context(),
        id: local_actor.id.clone(),
        object_type: local_actor.actor_type.to_string(),
        name: local_actor.name.clone(),
        preferred_username: local_actor.username.clone(),
        inbox: local_actor.inbox(),
        outbox: local_actor.outbox(),
        followers: optional_collection(LocalActorCollection::Followers),
        following: optional_collection(LocalActorCollection::Following),
        liked: optional_collection(LocalActorCollection::Liked),
        disliked: optional_collection(LocalActorCollection::Disliked),
        blocked: optional_collection(LocalActorCollection::Blocked),
        key_packages: optional_collection(LocalActorCollection::KeyPackages),
        icon: icon,
        summary: local_actor.summary.clone(),
        manually_approves_followers: false,
    }
}
