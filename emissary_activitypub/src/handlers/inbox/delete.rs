use emissary_models::{
    database::DatabaseError,
    followers::queries::{delete_follower, get_follower},
};

use crate::{
    cache::ReloadResult,
    document::Document,
    errors::HandlerError,
    router::{Descriptor, HandlerResult, Outcome},
    scopes::ActorContext,
    vocabulary::{ANNOUNCE, DISLIKE, FOLLOW, LIKE, PERSON},
};

use super::{
    follow::handle_undo_follow,
    response::handle_undo_response,
};

/// Delete(Person): actor can only delete itself
pub async fn handle_delete_actor<C: ActorContext>(
    context: &C,
    activity: Document,
) -> HandlerResult {
    let factory = context.factory();
    let actor_id = activity.actor().id()
        .ok_or(HandlerError::ValidationError("actor is missing".to_string()))?;
    let object_id = activity.object().id()
        .ok_or(HandlerError::ValidationError("object is missing".to_string()))?;
    if actor_id != object_id {
        return Err(HandlerError::Forbidden("actor can only delete itself".to_string()));
    };
    factory.activity_cache().delete(&actor_id).await?;
    let local_actor = context.activitypub_actor()?;
    match get_follower(factory.db_client(), &local_actor.parent, &actor_id).await {
        Ok(follower) => delete_follower(factory.db_client(), follower.id).await?,
        Err(DatabaseError::NotFound(_)) => (),
        Err(other_error) => return Err(other_error.into()),
    };
    Ok(Outcome::Processed(Descriptor::object(PERSON)))
}

/// Delete of an object identified by reference
pub async fn handle_delete<C: ActorContext>(
    context: &C,
    activity: Document,
) -> HandlerResult {
    let activity_cache = context.factory().activity_cache();
    let actor_id = activity.actor().id()
        .ok_or(HandlerError::ValidationError("actor is missing".to_string()))?;
    let object_id = activity.object().id()
        .ok_or(HandlerError::ValidationError("object is missing".to_string()))?;
    if object_id == actor_id {
        return handle_delete_actor(context, activity).await;
    };
    // Cached activities are undone
    if let Some(cached) = activity_cache.get(&object_id).await? {
        match cached.document_type() {
            Some(PERSON) => return handle_delete_actor(context, activity).await,
            Some(FOLLOW) => return handle_undo_follow(context, activity).await,
            Some(LIKE | DISLIKE | ANNOUNCE) => {
                return handle_undo_response(context, activity).await;
            },
            _ => (),
        };
    };
    match activity_cache.force_reload(&object_id).await? {
        ReloadResult::Refreshed(_) => {
            log::info!("object still exists: {}", object_id);
            Ok(Outcome::Processed(Descriptor::object("Object")))
        },
        ReloadResult::Purged => {
            Ok(Outcome::Processed(Descriptor::object("Object")))
        },
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use emissary_models::{
        database::test_utils::create_test_database,
        users::test_utils::create_test_user,
    };
    use crate::{
        errors::ErrorKind,
        scopes::UserContext,
        test_utils::{test_factory, MockFetcher},
    };
    use super::*;

    const REMOTE_ACTOR_ID: &str = "https://remote.example/users/bob";

    #[tokio::test]
    async fn test_delete_actor() {
        let db_client = &create_test_database();
        let user = create_test_user(db_client, "alice").await;
        let factory = test_factory(db_client, MockFetcher::default());
        let activity_cache = factory.activity_cache();
        activity_cache.put(REMOTE_ACTOR_ID, &json!({
            "id": REMOTE_ACTOR_ID,
            "type": "Person",
        })).await.unwrap();
        let context = UserContext { factory, user };

        let activity = Document::new(json!({
            "type": "Delete",
            "actor": "https://remote.example/users/mallory",
            "object": {"id": REMOTE_ACTOR_ID, "type": "Person"},
        }));
        let error = handle_delete_actor(&context, activity).await.err().unwrap();
        assert_eq!(error.kind(), ErrorKind::Forbidden);
        assert_eq!(activity_cache.get(REMOTE_ACTOR_ID).await.unwrap().is_some(), true);

        let activity = Document::new(json!({
            "type": "Delete",
            "actor": REMOTE_ACTOR_ID,
            "object": {"id": REMOTE_ACTOR_ID, "type": "Person"},
        }));
        handle_delete_actor(&context, activity).await.unwrap();
        assert_eq!(activity_cache.get(REMOTE_ACTOR_ID).await.unwrap().is_none(), true);
    }

    #[tokio::test]
    async fn test_delete_object_gone() {
        let db_client = &create_test_database();
        let user = create_test_user(db_client, "alice").await;
        let object_id = "https://remote.example/objects/1";
        let fetcher = MockFetcher::default().with_gone(object_id);
        let factory = test_factory(db_client, fetcher);
        let activity_cache = factory.activity_cache();
        activity_cache.put(object_id, &json!({
            "id": object_id,
            "type": "Note",
        })).await.unwrap();
        let context = UserContext { factory, user };

        let activity = Document::new(json!({
            "type": "Delete",
            "actor": REMOTE_ACTOR_ID,
            "object": object_id,
        }));
        handle_delete(&context, activity).await.unwrap();
        assert_eq!(activity_cache.get(object_id).await.unwrap().is_none(), true);
    }

    #[tokio::test]
    async fn test_delete_object_refreshed() {
        let db_client = &create_test_database();
        let user = create_test_user(db_client, "alice").await;
        let object_id = "https://remote.example/objects/1";
        let fetcher = MockFetcher::default().with_object(json!({
            "id": object_id,
            "type": "Note",
            "content": "edited",
        }));
        let factory = test_factory(db_client, fetcher);
        let activity_cache = factory.activity_cache();
        activity_cache.put(object_id, &json!({
            "id": object_id,
            "type": "Note",
            "content": "original",
        })).await.unwrap();
        let context = UserContext { factory, user };

        let activity = Document::new(json!({
            "type": "Delete",
            "actor": REMOTE_ACTOR_ID,
            "object": object_id,
        }));
        handle_delete(&context, activity).await.unwrap();
        let cached = activity_cache.get(object_id).await.unwrap().unwrap();
        assert_eq!(cached.content(), Some("edited"));
    }
}
