//! Outbox routers. Activities are submitted by local actors.
use chrono::Utc;
use futures::future::FutureExt;
use serde_json::json;
use uuid::Uuid;

use emissary_models::{
    outbox::queries::create_outbox_message,
    outbox::types::{OutboxMessage, OutboxMessageData},
};

use crate::{
    actors::LocalActor,
    document::Document,
    errors::HandlerError,
    factory::Factory,
    identifiers::local_object_id,
    router::{ActivityKind, ObjectKind, Router},
    scopes::{
        ActorContext,
        OutboxContext,
        SearchDomainContext,
        SearchQueryContext,
        StreamContext,
    },
};

mod block;
mod delete;
mod follow;
mod mls;
mod note;
mod publish;
mod response;
mod undo;

use block::{handle_block, handle_undo_block};
use delete::handle_delete;
use follow::{handle_follow, handle_undo_follow};
use mls::{
    handle_create_key_package,
    handle_delete_key_package,
    handle_send_mls_message,
};
use note::handle_create_note;
use publish::handle_publish;
use response::{handle_response, handle_undo_response};
use undo::handle_undo;

/// Assigns ID, actor and publication date to a submitted activity.
/// Embedded object without ID is identified relative to the activity.
fn prepare_activity(
    local_actor: &LocalActor,
    activity: &Document,
) -> (Uuid, String, Document) {
    let message_id = Uuid::new_v4();
    let activity_id = local_object_id(&local_actor.outbox(), message_id);
    let mut activity = activity
        .with_property("id", json!(activity_id))
        .with_property("actor", json!(local_actor.id))
        .with_property("published", json!(Utc::now()));
    let object = activity.object();
    if !object.is_empty() && !object.is_reference() && object.id().is_none() {
        let object = object.with_property("id", json!(format!("{activity_id}/object")));
        activity = activity.with_property("object", object.into_value());
    };
    (message_id, activity_id, activity)
}

/// Records activity in the outbox of a local actor
async fn save_to_outbox(
    factory: &Factory,
    local_actor: &LocalActor,
    message_id: Uuid,
    activity: &Document,
) -> Result<OutboxMessage, HandlerError> {
    let activity_type = activity.document_type()
        .ok_or(HandlerError::ValidationError("type is missing".to_string()))?;
    let object_url = activity.object().id()
        .ok_or(HandlerError::ValidationError("object is missing".to_string()))?;
    let message = create_outbox_message(factory.db_client(), OutboxMessageData {
        id: message_id,
        parent: local_actor.parent,
        activity_type: activity_type.to_string(),
        object_url: object_url,
        activity: activity.value().clone(),
        is_public: activity.is_public(),
        published: activity.published().unwrap_or(Utc::now()),
    }).await?;
    Ok(message)
}

pub fn build_user_outbox_router() -> Router<OutboxContext> {
    let mut router = Router::new();
    router.add(ActivityKind::Create, ObjectKind::Note, "create_note",
        |context, activity| handle_create_note(context, activity).boxed_local());
    router.add(ActivityKind::Create, ObjectKind::KeyPackage, "create_key_package",
        |context, activity| handle_create_key_package(context, activity).boxed_local());
    for object_kind in [
        ObjectKind::PrivateMessage,
        ObjectKind::PublicMessage,
        ObjectKind::Welcome,
    ] {
        router.add(ActivityKind::Create, object_kind, "mls_message",
            |context, activity| handle_send_mls_message(context, activity).boxed_local());
    };
    router.add(ActivityKind::Delete, ObjectKind::KeyPackage, "delete_key_package",
        |context, activity| handle_delete_key_package(context, activity).boxed_local());
    router.add(ActivityKind::Delete, ObjectKind::Any, "delete",
        |context, activity| handle_delete(context, activity).boxed_local());
    router.add(ActivityKind::Follow, ObjectKind::Any, "follow",
        |context, activity| handle_follow(context, activity).boxed_local());
    router.add(ActivityKind::Undo, ObjectKind::Follow, "undo_follow",
        |context, activity| handle_undo_follow(context, activity).boxed_local());
    for activity_kind in [ActivityKind::Like, ActivityKind::Dislike, ActivityKind::Announce] {
        router.add(activity_kind, ObjectKind::Any, "response",
            |context, activity| handle_response(context, activity).boxed_local());
    };
    for object_kind in [ObjectKind::Like, ObjectKind::Dislike, ObjectKind::Announce] {
        router.add(ActivityKind::Undo, object_kind, "undo_response",
            |context, activity| handle_undo_response(context, activity).boxed_local());
    };
    router.add(ActivityKind::Block, ObjectKind::Any, "block",
        |context, activity| handle_block(context, activity).boxed_local());
    router.add(ActivityKind::Undo, ObjectKind::Block, "undo_block",
        |context, activity| handle_undo_block(context, activity).boxed_local());
    router.add(ActivityKind::Undo, ObjectKind::Any, "undo",
        |context, activity| handle_undo(context, activity).boxed_local());
    router
}

/// Handlers for actors that only publish content
fn add_publishing_handlers<C: ActorContext + 'static>(router: &mut Router<C>) -> () {
    for activity_kind in [ActivityKind::Create, ActivityKind::Update, ActivityKind::Announce] {
        router.add(activity_kind, ObjectKind::Any, "publish",
            |context, activity| handle_publish(context, activity).boxed_local());
    };
    router.add(ActivityKind::Delete, ObjectKind::Any, "delete",
        |context, activity| handle_delete(context, activity).boxed_local());
}

pub fn build_stream_outbox_router() -> Router<StreamContext> {
    let mut router = Router::new();
    add_publishing_handlers(&mut router);
    router
}

pub fn build_search_domain_outbox_router() -> Router<SearchDomainContext> {
    let mut router = Router::new();
    add_publishing_handlers(&mut router);
    router
}

pub fn build_search_query_outbox_router() -> Router<SearchQueryContext> {
    let mut router = Router::new();
    add_publishing_handlers(&mut router);
    router
}
