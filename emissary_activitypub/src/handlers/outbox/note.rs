use serde_json::json;

use crate::{
    deliverer::send_activity,
    document::Document,
    errors::HandlerError,
    router::{Descriptor, HandlerResult, Outcome},
    scopes::{ActorContext, OutboxContext},
    vocabulary::NOTE,
};

use super::{prepare_activity, save_to_outbox};

/// Create(Note). Only direct and followers-only notes are supported.
pub async fn handle_create_note(
    context: &OutboxContext,
    activity: Document,
) -> HandlerResult {
    let factory = context.factory();
    let local_actor = context.activitypub_actor()?;
    if activity.is_public() || activity.object().is_public() {
        return Err(HandlerError::NotImplemented("public notes are not supported".to_string()));
    };
    let object = activity.object()
        .with_property("attributedTo", json!(local_actor.id));
    let activity = activity.with_property("object", object.into_value());
    let (message_id, activity_id, activity) = prepare_activity(&local_actor, &activity);
    save_to_outbox(factory, &local_actor, message_id, &activity).await?;
    send_activity(factory, &local_actor, activity.value()).await?;
    Ok(Outcome::Created {
        descriptor: Descriptor::object(NOTE),
        location: activity_id,
    })
}
