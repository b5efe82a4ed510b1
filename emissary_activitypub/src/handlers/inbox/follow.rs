use emissary_models::{
    actors::types::RemoteActor,
    database::DatabaseError,
    followers::queries::{
        create_or_update_follower,
        delete_follower,
        get_follower,
    },
    followers::types::{FollowerData, FollowerMethod},
};

use crate::{
    builders::accept_follow::build_accept_follow,
    deliverer::{send_activity_to, Recipient},
    document::Document,
    errors::HandlerError,
    router::{Descriptor, HandlerResult, Outcome},
    scopes::ActorContext,
    vocabulary::FOLLOW,
};

pub(super) fn remote_actor_from_document(
    actor_id: &str,
    actor: &Document,
) -> Result<RemoteActor, HandlerError> {
    let inbox_url = actor.inbox()
        .ok_or(HandlerError::ValidationError("actor has no inbox".to_string()))?;
    let remote_actor = RemoteActor {
        profile_url: actor_id.to_string(),
        name: actor.name().map(|name| name.to_string()),
        inbox_url: inbox_url.to_string(),
        shared_inbox_url: actor.shared_inbox().map(|inbox| inbox.to_string()),
        icon_url: actor.icon_url(),
    };
    Ok(remote_actor)
}

pub async fn handle_follow<C: ActorContext>(
    context: &C,
    activity: Document,
) -> HandlerResult {
    let factory = context.factory();
    let local_actor = context.activitypub_actor()?;
    let object_id = activity.object().id()
        .ok_or(HandlerError::ValidationError("follow object is missing".to_string()))?;
    if object_id != local_actor.id {
        // Delivered to the wrong inbox
        return Err(HandlerError::Internal(format!(
            "follow object {} doesn't match {}",
            object_id,
            local_actor.id,
        )));
    };
    let filter = factory.rule_filter(context.rule_scope(), true).await?;
    if filter.disallow(&activity) {
        return Err(HandlerError::Forbidden("follower is blocked".to_string()));
    };
    let actor_id = activity.actor().id()
        .ok_or(HandlerError::ValidationError("actor is missing".to_string()))?;
    let actor = factory.activity_cache()
        .load_document(&activity.actor()).await?;
    let remote_actor = remote_actor_from_document(&actor_id, &actor)?;
    let (follower, is_new) = create_or_update_follower(
        factory.db_client(),
        FollowerData {
            parent: local_actor.parent,
            actor: remote_actor,
            method: FollowerMethod::ActivityPub,
        },
    ).await?;
    if !is_new {
        log::info!("follower already exists: {}", actor_id);
    };
    // Accept is sent even if follower already exists
    let accept = build_accept_follow(
        &local_actor,
        follower.id,
        &actor_id,
        activity.value(),
    );
    let recipient = Recipient::new(&actor_id, follower.actor.delivery_inbox());
    send_activity_to(factory, &local_actor, accept, vec![recipient]).await?;
    Ok(Outcome::Processed(Descriptor::object("Actor")))
}

/// Handles both Undo(Follow) and Delete(Follow)
pub async fn handle_undo_follow<C: ActorContext>(
    context: &C,
    activity: Document,
) -> HandlerResult {
    let db_client = context.factory().db_client();
    let local_actor = context.activitypub_actor()?;
    let actor_id = activity.actor().id()
        .ok_or(HandlerError::ValidationError("actor is missing".to_string()))?;
    let follower = match get_follower(
        db_client,
        &local_actor.parent,
        &actor_id,
    ).await {
        Ok(follower) => follower,
        // Already removed
        Err(DatabaseError::NotFound(_)) => return Ok(Outcome::Ignored("follower not found")),
        Err(other_error) => return Err(other_error.into()),
    };
    delete_follower(db_client, follower.id).await?;
    Ok(Outcome::Processed(Descriptor::object(FOLLOW)))
}
