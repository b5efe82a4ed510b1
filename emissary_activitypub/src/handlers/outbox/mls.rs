//! Key packages and MLS messages
use uuid::Uuid;

use emissary_models::mls::queries::{create_key_package, delete_key_package_by_url};

use crate::{
    deliverer::send_activity,
    document::Document,
    errors::HandlerError,
    handlers::objects::validate_mls_object,
    identifiers::{local_object_id, parse_local_object_id, LocalActorCollection},
    router::{Descriptor, HandlerResult, Outcome},
    scopes::{ActorContext, OutboxContext},
    vocabulary::KEY_PACKAGE,
};

use super::prepare_activity;

/// Create(KeyPackage). Key package is published, not delivered.
pub async fn handle_create_key_package(
    context: &OutboxContext,
    activity: Document,
) -> HandlerResult {
    let local_actor = context.activitypub_actor()?;
    let (_, content) = validate_mls_object(&activity.object(), &local_actor.id)?;
    let key_package_id = Uuid::new_v4();
    let object_url = local_object_id(
        &local_actor.collection(LocalActorCollection::KeyPackages),
        key_package_id,
    );
    create_key_package(
        context.factory().db_client(),
        key_package_id,
        context.user.id,
        &object_url,
        &content,
    ).await?;
    Ok(Outcome::Created {
        descriptor: Descriptor::object(KEY_PACKAGE),
        location: object_url,
    })
}

pub async fn handle_delete_key_package(
    context: &OutboxContext,
    activity: Document,
) -> HandlerResult {
    let local_actor = context.activitypub_actor()?;
    let object_url = activity.object().id()
        .ok_or(HandlerError::ValidationError("object is missing".to_string()))?;
    let collection_id = local_actor.collection(LocalActorCollection::KeyPackages);
    if parse_local_object_id(&collection_id, &object_url).is_none() {
        return Err(HandlerError::Forbidden("key package belongs to another actor".to_string()));
    };
    delete_key_package_by_url(
        context.factory().db_client(),
        context.user.id,
        &object_url,
    ).await?;
    Ok(Outcome::Processed(Descriptor::object(KEY_PACKAGE)))
}

/// Create(PrivateMessage|PublicMessage|Welcome)
pub async fn handle_send_mls_message(
    context: &OutboxContext,
    activity: Document,
) -> HandlerResult {
    let factory = context.factory();
    let local_actor = context.activitypub_actor()?;
    let (message_type, _) = validate_mls_object(&activity.object(), &local_actor.id)?;
    if activity.recipients().is_empty() {
        return Err(HandlerError::ValidationError("message has no recipients".to_string()));
    };
    let (_, _, activity) = prepare_activity(&local_actor, &activity);
    send_activity(factory, &local_actor, activity.value()).await?;
    Ok(Outcome::Queued(Descriptor::object(message_type)))
}
