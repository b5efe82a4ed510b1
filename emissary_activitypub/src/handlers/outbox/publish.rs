use serde_json::json;

use crate::{
    constants::AP_PUBLIC,
    deliverer::send_activity,
    document::Document,
    router::{Descriptor, HandlerResult, Outcome},
    scopes::ActorContext,
};

use super::{prepare_activity, save_to_outbox};

/// Create, Update or Announce originated by a stream or a search actor.
/// Activities without audience are public and delivered to followers.
pub async fn handle_publish<C: ActorContext>(
    context: &C,
    activity: Document,
) -> HandlerResult {
    let factory = context.factory();
    let local_actor = context.activitypub_actor()?;
    let mut activity = activity;
    if activity.recipients().is_empty() {
        activity = activity
            .with_property("to", json!([AP_PUBLIC]))
            .with_property("cc", json!([local_actor.followers()]));
    };
    let (message_id, activity_id, activity) = prepare_activity(&local_actor, &activity);
    let message = save_to_outbox(factory, &local_actor, message_id, &activity).await?;
    send_activity(factory, &local_actor, activity.value()).await?;
    Ok(Outcome::Created {
        descriptor: Descriptor::object(message.activity_type),
        location: activity_id,
    })
}
