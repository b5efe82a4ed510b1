//! Handler contexts, one per federation scope.
//!
//! A context is a plain data holder created by the HTTP entrypoint
//! after the target actor has been loaded. Handlers receive it by
//! reference and never perform lookups of the target actor themselves.
use uuid::Uuid;

use emissary_models::{
    searches::types::SearchQuery,
    streams::types::Stream,
    users::types::User,
};

use crate::{
    actors::LocalActor,
    errors::HandlerError,
    factory::Factory,
};

pub trait ActorContext {
    fn factory(&self) -> &Factory;

    /// Local actor that is the target (inbox) or the author (outbox)
    fn activitypub_actor(&self) -> Result<LocalActor, HandlerError>;

    /// Owner of moderation rules, or `None` for domain-wide rules
    fn rule_scope(&self) -> Option<Uuid>;
}

/// User inbox
#[derive(Clone)]
pub struct UserContext {
    pub factory: Factory,
    pub user: User,
}

impl ActorContext for UserContext {
    fn factory(&self) -> &Factory {
        &self.factory
    }

    fn activitypub_actor(&self) -> Result<LocalActor, HandlerError> {
        Ok(LocalActor::for_user(&self.factory.instance_url(), &self.user))
    }

    fn rule_scope(&self) -> Option<Uuid> {
        Some(self.user.id)
    }
}

/// User outbox. User is authenticated.
#[derive(Clone)]
pub struct OutboxContext {
    pub factory: Factory,
    pub user: User,
}

impl ActorContext for OutboxContext {
    fn factory(&self) -> &Factory {
        &self.factory
    }

    fn activitypub_actor(&self) -> Result<LocalActor, HandlerError> {
        Ok(LocalActor::for_user(&self.factory.instance_url(), &self.user))
    }

    fn rule_scope(&self) -> Option<Uuid> {
        Some(self.user.id)
    }
}

#[derive(Clone)]
pub struct StreamContext {
    pub factory: Factory,
    pub stream: Stream,
}

impl ActorContext for StreamContext {
    fn factory(&self) -> &Factory {
        &self.factory
    }

    fn activitypub_actor(&self) -> Result<LocalActor, HandlerError> {
        Ok(LocalActor::for_stream(&self.factory.instance_url(), &self.stream))
    }

    /// Rules of the stream owner apply
    fn rule_scope(&self) -> Option<Uuid> {
        Some(self.stream.owner_id)
    }
}

#[derive(Clone)]
pub struct SearchDomainContext {
    pub factory: Factory,
}

impl ActorContext for SearchDomainContext {
    fn factory(&self) -> &Factory {
        &self.factory
    }

    fn activitypub_actor(&self) -> Result<LocalActor, HandlerError> {
        let instance = self.factory.instance();
        if !instance.search_domain_enabled {
            return Err(HandlerError::NotFound("search domain is disabled".to_string()));
        };
        Ok(LocalActor::for_search_domain(instance))
    }

    fn rule_scope(&self) -> Option<Uuid> {
        None
    }
}

#[derive(Clone)]
pub struct SearchQueryContext {
    pub factory: Factory,
    pub search_query: SearchQuery,
}

impl ActorContext for SearchQueryContext {
    fn factory(&self) -> &Factory {
        &self.factory
    }

    fn activitypub_actor(&self) -> Result<LocalActor, HandlerError> {
        Ok(LocalActor::for_search_query(
            &self.factory.instance_url(),
            &self.search_query,
        ))
    }

    fn rule_scope(&self) -> Option<Uuid> {
        None
    }
}
