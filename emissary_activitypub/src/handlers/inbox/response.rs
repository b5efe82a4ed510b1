//! Like, Dislike and Announce
use serde_json::json;

use emissary_models::{
    database::DatabaseError,
    following::queries::get_following_by_profile_url,
    messages::queries::create_or_update_message,
    messages::types::{MessageData, MessageState, Origin, OriginType},
    responses::queries::{
        create_response,
        delete_response,
        get_response_by_activity_id,
    },
    responses::types::ResponseData,
};

use crate::{
    document::Document,
    errors::HandlerError,
    fetch::is_same_origin,
    handlers::objects::response_type_for,
    identifiers::{activity_id_or_fallback, is_local_url},
    router::{Descriptor, HandlerResult, Outcome},
    scopes::{ActorContext, StreamContext, UserContext},
    vocabulary::{ANNOUNCE, DISLIKE, LIKE},
};

fn origin_type_for(activity_type: &str) -> OriginType {
    match activity_type {
        ANNOUNCE => OriginType::Announce,
        LIKE => OriginType::Like,
        DISLIKE => OriginType::Dislike,
        _ => OriginType::Primary,
    }
}

/// Caches response activity under its ID or fallback ID.
/// Activity ID must have the same origin as the actor.
async fn cache_response<C: ActorContext>(
    context: &C,
    activity: &Document,
) -> Result<String, HandlerError> {
    if let Some(activity_id) = activity.id() {
        let actor_id = activity.actor().id()
            .ok_or(HandlerError::ValidationError("actor is missing".to_string()))?;
        let is_owner = is_same_origin(&activity_id, &actor_id)
            .map_err(|_| HandlerError::ValidationError("invalid activity ID".to_string()))?;
        if !is_owner {
            return Err(HandlerError::ValidationError(
                "activity ID doesn't match actor".to_string(),
            ));
        };
    };
    let activity_id = activity_id_or_fallback(activity)?;
    let activity = activity.with_property("id", json!(activity_id));
    context.factory().activity_cache()
        .put(&activity_id, activity.value()).await?;
    Ok(activity_id)
}

pub async fn handle_user_response(
    context: &UserContext,
    activity: Document,
) -> HandlerResult {
    let factory = context.factory();
    let db_client = factory.db_client();
    let activity_type = activity.document_type()
        .ok_or(HandlerError::ValidationError("type is missing".to_string()))?
        .to_string();
    let actor_id = activity.actor().id()
        .ok_or(HandlerError::ValidationError("actor is missing".to_string()))?;
    cache_response(context, &activity).await?;
    let activity_cache = factory.activity_cache();
    let object = activity_cache
        .load_document_from(&activity.object(), &actor_id).await?;
    let object_id = object.id()
        .ok_or(HandlerError::ValidationError("object ID is missing".to_string()))?;
    if !object.is_reference() {
        activity_cache.put(&object_id, object.value()).await?;
    };
    let object_type = object.document_type().unwrap_or("Object").to_string();
    let following = match get_following_by_profile_url(
        db_client,
        context.user.id,
        &actor_id,
    ).await {
        Ok(following) => following,
        Err(DatabaseError::NotFound(_)) => return Ok(Outcome::Ignored("sender is not followed")),
        Err(other_error) => return Err(other_error.into()),
    };
    create_or_update_message(db_client, MessageData {
        user_id: context.user.id,
        following_id: following.id,
        origin: Origin {
            origin_type: origin_type_for(&activity_type),
            url: actor_id,
            label: following.name,
        },
        object_url: object_id,
        object_type: object_type.clone(),
        state: MessageState::Unread,
        labels: vec![],
    }).await?;
    Ok(Outcome::Processed(Descriptor::object(object_type)))
}

pub async fn handle_stream_response(
    context: &StreamContext,
    activity: Document,
) -> HandlerResult {
    let factory = context.factory();
    let activity_type = activity.document_type()
        .ok_or(HandlerError::ValidationError("type is missing".to_string()))?;
    let response_type = response_type_for(activity_type)
        .ok_or(HandlerError::ValidationError("unexpected activity type".to_string()))?;
    let actor_id = activity.actor().id()
        .ok_or(HandlerError::ValidationError("actor is missing".to_string()))?;
    let object_id = activity.object().id()
        .ok_or(HandlerError::ValidationError("object is missing".to_string()))?;
    let filter = factory.rule_filter(context.rule_scope(), true).await?;
    if filter.disallow(&activity) {
        return Err(HandlerError::Forbidden("actor is blocked".to_string()));
    };
    let activity_id = cache_response(context, &activity).await?;
    if !is_local_url(&factory.instance_url(), &object_id) {
        factory.activity_cache().load(&object_id).await?;
    };
    let (_, is_new) = create_response(factory.db_client(), ResponseData {
        activity_id,
        actor_url: actor_id,
        response_type,
        object_url: object_id,
        content: activity.content().map(|content| content.to_string()),
    }).await?;
    if !is_new {
        return Ok(Outcome::Ignored("response already exists"));
    };
    Ok(Outcome::Processed(Descriptor::object(response_type.as_str())))
}

/// Handles Undo and Delete of Like, Dislike and Announce
pub async fn handle_undo_response<C: ActorContext>(
    context: &C,
    activity: Document,
) -> HandlerResult {
    let factory = context.factory();
    let activity_cache = factory.activity_cache();
    let original = activity_cache.load_document(&activity.object()).await?;
    let actor_id = activity.actor().id()
        .ok_or(HandlerError::ValidationError("actor is missing".to_string()))?;
    if original.actor().id().as_ref() != Some(&actor_id) {
        return Err(HandlerError::Unauthorized("only author can undo response".to_string()));
    };
    let original_id = activity_id_or_fallback(&original)?;
    activity_cache.delete(&original_id).await?;
    match get_response_by_activity_id(factory.db_client(), &original_id).await {
        Ok(response) => delete_response(factory.db_client(), response.id).await?,
        Err(DatabaseError::NotFound(_)) => (),
        Err(other_error) => return Err(other_error.into()),
    };
    let original_type = original.document_type().unwrap_or("Object").to_string();
    Ok(Outcome::Processed(Descriptor::object(original_type)))
}

#[cfg(test)]
mod tests {
    use emissary_models::{
        database::test_utils::create_test_database,
        following::test_utils::create_test_following,
        messages::queries::get_message_by_object_url,
        responses::queries::get_response_count,
        responses::types::ResponseType,
        rules::types::RuleAction,
        streams::test_utils::create_test_stream,
        users::test_utils::create_test_user,
    };
    use crate::{
        errors::ErrorKind,
        identifiers::fallback_activity_id,
        test_utils::{test_factory, MockFetcher},
    };
    use super::*;

    const REMOTE_ACTOR_ID: &str = "https://remote.example/users/bob";

    #[test]
    fn test_origin_type_for() {
        assert_eq!(origin_type_for("Announce"), OriginType::Announce);
        assert_eq!(origin_type_for("Dislike"), OriginType::Dislike);
        assert_eq!(origin_type_for("Create"), OriginType::Primary);
    }

    #[tokio::test]
    async fn test_user_response_announce() {
        let db_client = &create_test_database();
        let user = create_test_user(db_client, "alice").await;
        create_test_following(
            db_client,
            user.id,
            REMOTE_ACTOR_ID,
            RuleAction::Ignore,
        ).await;
        let object_id = "https://other.example/objects/1";
        let fetcher = MockFetcher::default()
            .with_object(json!({
                "id": object_id,
                "type": "Note",
                "content": "shared",
            }));
        let factory = test_factory(db_client, fetcher);
        let context = UserContext { factory: factory.clone(), user: user.clone() };
        let activity = Document::new(json!({
            "type": "Announce",
            "actor": REMOTE_ACTOR_ID,
            "object": object_id,
        }));

        handle_user_response(&context, activity).await.unwrap();
        let message = get_message_by_object_url(db_client, user.id, object_id)
            .await.unwrap();
        assert_eq!(message.origin.origin_type, OriginType::Announce);
        assert_eq!(message.origin.url, REMOTE_ACTOR_ID);
        // Activity without ID is cached under fallback ID
        let fallback_id = fallback_activity_id(REMOTE_ACTOR_ID, "Announce", object_id);
        let cached = factory.activity_cache().get(&fallback_id).await.unwrap();
        assert_eq!(cached.unwrap().id(), Some(fallback_id));
    }

    #[tokio::test]
    async fn test_user_response_not_followed() {
        let db_client = &create_test_database();
        let user = create_test_user(db_client, "alice").await;
        let object_id = "https://remote.example/objects/1";
        let factory = test_factory(db_client, MockFetcher::default());
        let context = UserContext { factory: factory.clone(), user: user.clone() };
        let activity = Document::new(json!({
            "id": "https://remote.example/likes/1",
            "type": "Like",
            "actor": REMOTE_ACTOR_ID,
            "object": {"id": object_id, "type": "Note", "content": "liked"},
        }));

        let outcome = handle_user_response(&context, activity).await.unwrap();
        assert!(matches!(outcome, Outcome::Ignored("sender is not followed")));
        assert!(get_message_by_object_url(db_client, user.id, object_id).await.is_err());
        // Response is cached before correlation
        let cached = factory.activity_cache()
            .get("https://remote.example/likes/1").await.unwrap();
        assert_eq!(cached.is_some(), true);
    }

    #[tokio::test]
    async fn test_user_response_foreign_ids() {
        let db_client = &create_test_database();
        let user = create_test_user(db_client, "alice").await;
        create_test_following(
            db_client,
            user.id,
            REMOTE_ACTOR_ID,
            RuleAction::Ignore,
        ).await;
        let victim_id = "https://victim.example/users/carol";
        let fetcher = MockFetcher::default()
            .with_object(json!({
                "id": victim_id,
                "type": "Person",
                "inbox": "https://victim.example/users/carol/inbox",
            }));
        let factory = test_factory(db_client, fetcher);
        let context = UserContext { factory: factory.clone(), user };

        // Response activity claims an ID on another server
        let activity = Document::new(json!({
            "id": "https://victim.example/likes/1",
            "type": "Like",
            "actor": REMOTE_ACTOR_ID,
            "object": "https://remote.example/objects/1",
        }));
        let error = handle_user_response(&context, activity).await.err().unwrap();
        assert_eq!(error.kind(), ErrorKind::BadRequest);
        let cached = factory.activity_cache()
            .get("https://victim.example/likes/1").await.unwrap();
        assert_eq!(cached.is_none(), true);

        // Embedded object claims an ID on another server
        let activity = Document::new(json!({
            "type": "Announce",
            "actor": REMOTE_ACTOR_ID,
            "object": {
                "id": victim_id,
                "type": "Person",
                "inbox": "https://evil.example/steal",
            },
        }));
        handle_user_response(&context, activity).await.unwrap();
        let cached = factory.activity_cache().get(victim_id).await.unwrap().unwrap();
        assert_eq!(cached.inbox(), Some("https://victim.example/users/carol/inbox"));
    }

    #[tokio::test]
    async fn test_stream_response_deduplication() {
        let db_client = &create_test_database();
        let user = create_test_user(db_client, "alice").await;
        let stream = create_test_stream(db_client, user.id, "news").await;
        let factory = test_factory(db_client, MockFetcher::default());
        let context = StreamContext { factory, stream };
        let object_id = "https://local.example/streams/news/outbox/1";
        let activity = Document::new(json!({
            "type": "Like",
            "actor": REMOTE_ACTOR_ID,
            "object": object_id,
        }));

        let outcome = handle_stream_response(&context, activity.clone()).await.unwrap();
        assert!(matches!(outcome, Outcome::Processed(_)));
        let outcome = handle_stream_response(&context, activity).await.unwrap();
        assert!(matches!(outcome, Outcome::Ignored(_)));
        let count = get_response_count(db_client, object_id, ResponseType::Like)
            .await.unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_undo_response() {
        let db_client = &create_test_database();
        let user = create_test_user(db_client, "alice").await;
        let stream = create_test_stream(db_client, user.id, "news").await;
        let factory = test_factory(db_client, MockFetcher::default());
        let context = StreamContext { factory: factory.clone(), stream };
        let object_id = "https://local.example/streams/news/outbox/1";
        let like = json!({
            "id": "https://remote.example/likes/1",
            "type": "Like",
            "actor": REMOTE_ACTOR_ID,
            "object": object_id,
        });
        handle_stream_response(&context, Document::new(like.clone())).await.unwrap();

        // Another actor
        let undo = Document::new(json!({
            "type": "Undo",
            "actor": "https://remote.example/users/mallory",
            "object": "https://remote.example/likes/1",
        }));
        let error = handle_undo_response(&context, undo).await.err().unwrap();
        assert_eq!(error.kind(), ErrorKind::Unauthorized);
        let count = get_response_count(db_client, object_id, ResponseType::Like)
            .await.unwrap();
        assert_eq!(count, 1);

        let undo = Document::new(json!({
            "type": "Undo",
            "actor": REMOTE_ACTOR_ID,
            "object": like,
        }));
        handle_undo_response(&context, undo).await.unwrap();
        let count = get_response_count(db_client, object_id, ResponseType::Like)
            .await.unwrap();
        assert_eq!(count, 0);
        let cached = factory.activity_cache()
            .get("https://remote.example/likes/1").await.unwrap();
        assert_eq!(cached.is_none(), true);
    }
}
