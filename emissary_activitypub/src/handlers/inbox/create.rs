use emissary_models::{
    database::DatabaseError,
    following::queries::get_following_by_profile_url,
    messages::queries::create_or_update_message,
    messages::types::{MessageData, MessageState, Origin, OriginType},
};

use crate::{
    document::Document,
    errors::HandlerError,
    filter::FilterResult,
    router::{Descriptor, HandlerResult, Outcome},
    scopes::{ActorContext, UserContext},
    vocabulary::{EVENT, PLACE, PROFILE, RELATIONSHIP, TOMBSTONE},
};

const IGNORED_OBJECT_TYPES: [&str; 5] = [
    EVENT,
    PLACE,
    PROFILE,
    RELATIONSHIP,
    TOMBSTONE,
];

/// Handles Create and Update
pub async fn handle_create(
    context: &UserContext,
    activity: Document,
) -> HandlerResult {
    let factory = context.factory();
    let db_client = factory.db_client();
    let activity_cache = factory.activity_cache();
    let actor_id = activity.actor().id()
        .ok_or(HandlerError::ValidationError("actor is missing".to_string()))?;
    // Embedded copies of foreign objects are not trusted
    let object = activity_cache
        .load_document_from(&activity.object(), &actor_id).await?;
    let object_type = object.document_type()
        .ok_or(HandlerError::ValidationError("object type is missing".to_string()))?
        .to_string();
    if IGNORED_OBJECT_TYPES.contains(&object_type.as_str()) {
        return Ok(Outcome::Ignored("object type is not supported"));
    };
    let object_id = object.id()
        .ok_or(HandlerError::ValidationError("object ID is missing".to_string()))?;
    let following = match get_following_by_profile_url(
        db_client,
        context.user.id,
        &actor_id,
    ).await {
        Ok(following) => following,
        Err(DatabaseError::NotFound(_)) => return Ok(Outcome::Ignored("sender is not followed")),
        Err(other_error) => return Err(other_error.into()),
    };
    // Rules are evaluated against the loaded object
    let activity = activity.with_property("object", object.value().clone());
    let filter = factory.rule_filter(context.rule_scope(), false).await?;
    let (state, labels) = match filter.check(&activity) {
        FilterResult::Allow => (MessageState::Unread, vec![]),
        FilterResult::Label(label) => (MessageState::Unread, vec![label]),
        FilterResult::Mute => (MessageState::Muted, vec![]),
        FilterResult::Block => {
            return Err(HandlerError::Forbidden("message is blocked".to_string()));
        },
    };
    activity_cache.put(&object_id, object.value()).await?;
    let (_, is_new) = create_or_update_message(db_client, MessageData {
        user_id: context.user.id,
        following_id: following.id,
        origin: Origin {
            origin_type: OriginType::Primary,
            url: actor_id,
            label: following.name,
        },
        object_url: object_id,
        object_type: object_type.clone(),
        state,
        labels,
    }).await?;
    if !is_new {
        log::debug!("message updated");
    };
    Ok(Outcome::Processed(Descriptor::object(object_type)))
}
