use emissary_config::Instance;
use emissary_models::{
    actors::types::Parent,
    searches::types::SearchQuery,
    streams::types::Stream,
    users::types::User,
};

use crate::{
    identifiers::{
        local_search_domain_actor_id,
        local_search_query_actor_id,
        local_stream_actor_id,
        local_user_actor_id,
        LocalActorCollection,
    },
    vocabulary::{APPLICATION, PERSON, SERVICE},
};

/// Local actor that sends and receives activities
#[derive(Clone, Debug)]
pub struct LocalActor {
    pub id: String,
    pub parent: Parent,
    pub actor_type: &'static str,
    pub username: String,
    pub name: String,
    pub summary: Option<String>,
    pub icon_url: Option<String>,
    pub collections: Vec<LocalActorCollection>,
}

impl LocalActor {
    pub fn for_user(instance_url: &str, user: &User) -> Self {
        Self {
            id: local_user_actor_id(instance_url, &user.username),
            parent: Parent::user(user.id),
            actor_type: PERSON,
            username: user.username.clone(),
            name: user.name().to_string(),
            summary: user.summary.clone(),
            icon_url: user.icon_url.clone(),
            collections: vec![
                LocalActorCollection::Inbox,
                LocalActorCollection::Outbox,
                LocalActorCollection::Followers,
                LocalActorCollection::Following,
                LocalActorCollection::Liked,
                LocalActorCollection::Disliked,
                LocalActorCollection::Blocked,
                LocalActorCollection::KeyPackages,
            ],
        }
    }

    pub fn for_stream(instance_url: &str, stream: &Stream) -> Self {
        Self {
            id: local_stream_actor_id(instance_url, &stream.token),
            parent: Parent::stream(stream.id),
            actor_type: SERVICE,
            username: stream.token.clone(),
            name: stream.name.clone(),
            summary: stream.summary.clone(),
            icon_url: None,
            collections: vec![
                LocalActorCollection::Inbox,
                LocalActorCollection::Outbox,
                LocalActorCollection::Followers,
            ],
        }
    }

    pub fn for_search_domain(instance: &Instance) -> Self {
        Self {
            id: local_search_domain_actor_id(&instance.url()),
            parent: Parent::search_domain(),
            actor_type: APPLICATION,
            username: instance.hostname(),
            name: instance.search_domain_name.clone(),
            summary: None,
            icon_url: None,
            collections: vec![
                LocalActorCollection::Inbox,
                LocalActorCollection::Outbox,
                LocalActorCollection::Followers,
            ],
        }
    }

    pub fn for_search_query(instance_url: &str, search_query: &SearchQuery) -> Self {
        Self {
            id: local_search_query_actor_id(instance_url, &search_query.token),
            parent: Parent::search_query(search_query.id),
            actor_type: SERVICE,
            username: search_query.token.clone(),
            name: search_query.query.clone(),
            summary: None,
            icon_url: None,
            collections: vec![
                LocalActorCollection::Inbox,
                LocalActorCollection::Outbox,
                LocalActorCollection::Followers,
            ],
        }
    }

    pub fn has_collection(&self, collection: LocalActorCollection) -> bool {
        self.collections.contains(&collection)
    }

    pub fn collection(&self, collection: LocalActorCollection) -> String {
        collection.of(&self.id)
    }

    pub fn inbox(&self) -> String {
        self.collection(LocalActorCollection::Inbox)
    }

    pub fn outbox(&self) -> String {
        self.collection(LocalActorCollection::Outbox)
    }

    pub fn followers(&self) -> String {
        self.collection(LocalActorCollection::Followers)
    }
}
