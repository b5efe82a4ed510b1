use emissary_models::{
    database::DatabaseError,
    outbox::queries::get_outbox_message,
};

use crate::{
    document::Document,
    errors::HandlerError,
    handlers::objects::response_type_for,
    identifiers::{parse_local_object_id, LocalActorCollection},
    router::{HandlerResult, Outcome},
    scopes::{ActorContext, OutboxContext},
};

use super::{
    block::handle_undo_block,
    follow::handle_undo_follow,
    response::handle_undo_response,
};

/// Undo of an activity referenced by its local ID
pub async fn handle_undo(
    context: &OutboxContext,
    activity: Document,
) -> HandlerResult {
    let local_actor = context.activitypub_actor()?;
    let object_id = activity.object().id()
        .ok_or(HandlerError::ValidationError("object is missing".to_string()))?;
    let following_collection_id = local_actor.collection(LocalActorCollection::Following);
    if parse_local_object_id(&following_collection_id, &object_id).is_some() {
        return handle_undo_follow(context, activity).await;
    };
    let blocked_collection_id = local_actor.collection(LocalActorCollection::Blocked);
    if parse_local_object_id(&blocked_collection_id, &object_id).is_some() {
        return handle_undo_block(context, activity).await;
    };
    let Some(message_id) = parse_local_object_id(&local_actor.outbox(), &object_id) else {
        return Ok(Outcome::Ignored("undone activity is not local"));
    };
    let message = match get_outbox_message(
        context.factory().db_client(),
        &local_actor.parent,
        message_id,
    ).await {
        Ok(message) => message,
        Err(DatabaseError::NotFound(_)) => return Ok(Outcome::Ignored("activity not found")),
        Err(other_error) => return Err(other_error.into()),
    };
    if response_type_for(&message.activity_type).is_none() {
        return Ok(Outcome::Ignored("undone activity is not supported"));
    };
    handle_undo_response(context, activity).await
}
