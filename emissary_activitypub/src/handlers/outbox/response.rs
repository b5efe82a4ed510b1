//! Like, Dislike and Announce sent by a local user
use emissary_models::{
    database::DatabaseError,
    outbox::queries::delete_outbox_message,
    responses::queries::{
        create_response,
        delete_response,
        find_response,
        get_response_by_activity_id,
    },
    responses::types::ResponseData,
};

use crate::{
    builders::undo::build_undo,
    deliverer::send_activity,
    document::Document,
    errors::HandlerError,
    handlers::objects::response_type_for,
    identifiers::parse_local_object_id,
    router::{Descriptor, HandlerResult, Outcome},
    scopes::{ActorContext, OutboxContext},
};

use super::{prepare_activity, save_to_outbox};

pub async fn handle_response(
    context: &OutboxContext,
    activity: Document,
) -> HandlerResult {
    let factory = context.factory();
    let db_client = factory.db_client();
    let local_actor = context.activitypub_actor()?;
    let response_type = activity.document_type()
        .and_then(response_type_for)
        .ok_or(HandlerError::ValidationError("unexpected activity type".to_string()))?;
    let object_url = activity.object().id()
        .ok_or(HandlerError::ValidationError("object is missing".to_string()))?;
    match find_response(db_client, &local_actor.id, response_type, &object_url).await {
        Ok(_) => return Ok(Outcome::Ignored("response already exists")),
        Err(DatabaseError::NotFound(_)) => (),
        Err(other_error) => return Err(other_error.into()),
    };
    let (message_id, activity_id, activity) = prepare_activity(&local_actor, &activity);
    create_response(db_client, ResponseData {
        activity_id: activity_id.clone(),
        actor_url: local_actor.id.clone(),
        response_type,
        object_url,
        content: activity.content().map(|content| content.to_string()),
    }).await?;
    save_to_outbox(factory, &local_actor, message_id, &activity).await?;
    send_activity(factory, &local_actor, activity.value()).await?;
    Ok(Outcome::Created {
        descriptor: Descriptor::object(response_type.as_str()),
        location: activity_id,
    })
}

/// Undo(Like|Dislike|Announce). Response is referenced by activity ID.
pub async fn handle_undo_response(
    context: &OutboxContext,
    activity: Document,
) -> HandlerResult {
    let factory = context.factory();
    let db_client = factory.db_client();
    let local_actor = context.activitypub_actor()?;
    let response_id = activity.object().id()
        .ok_or(HandlerError::ValidationError("object is missing".to_string()))?;
    let message_id = parse_local_object_id(&local_actor.outbox(), &response_id)
        .ok_or(HandlerError::ValidationError("unexpected activity ID".to_string()))?;
    let message = match delete_outbox_message(
        db_client,
        &local_actor.parent,
        message_id,
    ).await {
        Ok(message) => message,
        Err(DatabaseError::NotFound(_)) => return Ok(Outcome::Ignored("response not found")),
        Err(other_error) => return Err(other_error.into()),
    };
    match get_response_by_activity_id(db_client, &response_id).await {
        Ok(response) => delete_response(db_client, response.id).await?,
        Err(DatabaseError::NotFound(_)) => (),
        Err(other_error) => return Err(other_error.into()),
    };
    let original = Document::new(message.activity);
    let undo = build_undo(
        &local_actor.id,
        &response_id,
        original.value().clone(),
        original.recipients(),
    );
    send_activity(factory, &local_actor, undo).await?;
    Ok(Outcome::Processed(Descriptor::object(message.activity_type)))
}
