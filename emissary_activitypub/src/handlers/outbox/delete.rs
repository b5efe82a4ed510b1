use serde_json::json;

use emissary_models::outbox::queries::delete_outbox_messages_by_object_url;

use crate::{
    deliverer::send_activity,
    document::Document,
    errors::HandlerError,
    router::{Descriptor, HandlerResult, Outcome},
    scopes::ActorContext,
};

use super::prepare_activity;

/// Removes published object from the outbox and notifies its audience
pub async fn handle_delete<C: ActorContext>(
    context: &C,
    activity: Document,
) -> HandlerResult {
    let factory = context.factory();
    let local_actor = context.activitypub_actor()?;
    let object_url = activity.object().id()
        .ok_or(HandlerError::ValidationError("object is missing".to_string()))?;
    let deleted = delete_outbox_messages_by_object_url(
        factory.db_client(),
        &local_actor.parent,
        &object_url,
    ).await?;
    let Some(original) = deleted.first() else {
        return Err(HandlerError::NotFound("object not found".to_string()));
    };
    let mut activity = activity;
    if activity.recipients().is_empty() {
        // Same audience as the original activity
        let recipients = Document::new(original.activity.clone()).recipients();
        activity = activity.with_property("to", json!(recipients));
    };
    let (_, _, activity) = prepare_activity(&local_actor, &activity);
    send_activity(factory, &local_actor, activity.value()).await?;
    log::info!("deleted {} outbox messages", deleted.len());
    Ok(Outcome::Processed(Descriptor::object("Object")))
}
