use emissary_models::{
    database::DatabaseError,
    following::queries::{
        create_following,
        delete_following,
        get_following_by_id,
        get_following_by_profile_url,
        set_following_status,
    },
    following::types::{
        Following,
        FollowingData,
        FollowingMethod,
        FollowingStatus,
    },
    rules::types::RuleAction,
};

use crate::{
    builders::follow::build_follow,
    builders::undo::build_undo,
    deliverer::{send_activity_to, Recipient},
    document::Document,
    errors::HandlerError,
    identifiers::{is_local_url, parse_local_follow_activity_id},
    router::{Descriptor, HandlerResult, Outcome},
    scopes::{ActorContext, OutboxContext},
    vocabulary::FOLLOW,
};

/// Follow(Actor). Following stays pending until Accept is received.
pub async fn handle_follow(
    context: &OutboxContext,
    activity: Document,
) -> HandlerResult {
    let factory = context.factory();
    let db_client = factory.db_client();
    let local_actor = context.activitypub_actor()?;
    let target_id = activity.object().id()
        .ok_or(HandlerError::ValidationError("object is missing".to_string()))?;
    if is_local_url(&factory.instance_url(), &target_id) {
        return Err(HandlerError::ValidationError("local actors can't be followed".to_string()));
    };
    let target = factory.activity_cache().load(&target_id).await?;
    let inbox = target.inbox()
        .ok_or(HandlerError::ValidationError("actor has no inbox".to_string()))?
        .to_string();
    let following_data = FollowingData {
        user_id: context.user.id,
        profile_url: target_id.clone(),
        name: target.name().map(|name| name.to_string()),
        inbox_url: Some(inbox.clone()),
        rule_action: RuleAction::Ignore,
        method: FollowingMethod::Poll,
    };
    let following = match create_following(db_client, following_data).await {
        Ok(following) => following,
        Err(DatabaseError::AlreadyExists(_)) => {
            return Err(HandlerError::ValidationError("already following".to_string()));
        },
        Err(other_error) => return Err(other_error.into()),
    };
    set_following_status(db_client, following.id, FollowingStatus::Loading).await?;
    let follow = build_follow(&local_actor.id, following.id, &target_id);
    let follow_id = follow.id.clone();
    send_activity_to(
        factory,
        &local_actor,
        follow,
        vec![Recipient::new(&target_id, &inbox)],
    ).await?;
    Ok(Outcome::Created {
        descriptor: Descriptor::object("Actor"),
        location: follow_id,
    })
}

async fn find_following(
    context: &OutboxContext,
    follow: &Document,
) -> Result<Following, HandlerError> {
    let db_client = context.factory().db_client();
    if let Some(target_id) = follow.object().id() {
        let following = get_following_by_profile_url(
            db_client,
            context.user.id,
            &target_id,
        ).await?;
        return Ok(following);
    };
    let follow_id = follow.id()
        .ok_or(HandlerError::ValidationError("object is missing".to_string()))?;
    let local_actor = context.activitypub_actor()?;
    let following_id = parse_local_follow_activity_id(&local_actor.id, &follow_id)?;
    let following = get_following_by_id(db_client, following_id).await?;
    if following.user_id != context.user.id {
        return Err(HandlerError::Forbidden("following belongs to another user".to_string()));
    };
    Ok(following)
}

/// Undo(Follow). Follow can be embedded or referenced by its ID.
pub async fn handle_undo_follow(
    context: &OutboxContext,
    activity: Document,
) -> HandlerResult {
    let factory = context.factory();
    let local_actor = context.activitypub_actor()?;
    let following = match find_following(context, &activity.object()).await {
        Ok(following) => following,
        Err(HandlerError::DatabaseError(DatabaseError::NotFound(_))) => {
            return Ok(Outcome::Ignored("following not found"));
        },
        Err(other_error) => return Err(other_error),
    };
    delete_following(factory.db_client(), following.id).await?;
    let inbox = match following.inbox_url {
        Some(inbox) => inbox,
        None => {
            let target = factory.activity_cache().load(&following.profile_url).await?;
            target.inbox()
                .ok_or(HandlerError::ValidationError("actor has no inbox".to_string()))?
                .to_string()
        },
    };
    let follow = build_follow(&local_actor.id, following.id, &following.profile_url);
    let undo = build_undo(
        &local_actor.id,
        &follow.id,
        serde_json::to_value(&follow)?,
        vec![following.profile_url.clone()],
    );
    send_activity_to(
        factory,
        &local_actor,
        undo,
        vec![Recipient::new(&following.profile_url, &inbox)],
    ).await?;
    Ok(Outcome::Processed(Descriptor::object(FOLLOW)))
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
        test_utils::{take_queued_activities, test_factory, MockFetcher},
    };
    use super::*;

    const LOCAL_ACTOR_ID: &str = "https://local.example/users/alice";
    const REMOTE_ACTOR_ID: &str = "https://remote.example/users/bob";

    fn remote_actor_fetcher() -> MockFetcher {
        MockFetcher::default()
            .with_object(json!({
                "id": REMOTE_ACTOR_ID,
                "type": "Person",
                "name": "Bob",
                "inbox": "https://remote.example/users/bob/inbox",
            }))
    }

    #[tokio::test]
    async fn test_follow_and_undo_by_reference() {
        let db_client = &create_test_database();
        let user = create_test_user(db_client, "alice").await;
        let factory = test_factory(db_client, remote_actor_fetcher());
        let context = OutboxContext { factory, user: user.clone() };
        let follow = Document::new(json!({
            "type": "Follow",
            "actor": LOCAL_ACTOR_ID,
            "object": REMOTE_ACTOR_ID,
        }));
        let outcome = handle_follow(&context, follow.clone()).await.unwrap();
        let Outcome::Created { location, .. } = outcome else {
            panic!("unexpected outcome");
        };
        let following = get_following_by_profile_url(db_client, user.id, REMOTE_ACTOR_ID)
            .await.unwrap();
        assert_eq!(following.status, FollowingStatus::Loading);
        assert_eq!(following.name.as_deref(), Some("Bob"));
        assert_eq!(location, format!("{LOCAL_ACTOR_ID}/following/{}", following.id));
        let queued = take_queued_activities(db_client).await;
        assert_eq!(queued.len(), 1);
        assert_eq!(queued[0].activity()["id"], location);

        let error = handle_follow(&context, follow).await.err().unwrap();
        assert_eq!(error.kind(), ErrorKind::BadRequest);

        let undo = Document::new(json!({
            "type": "Undo",
            "actor": LOCAL_ACTOR_ID,
            "object": location,
        }));
        let outcome = handle_undo_follow(&context, undo.clone()).await.unwrap();
        assert!(matches!(outcome, Outcome::Processed(_)));
        let queued = take_queued_activities(db_client).await;
        assert_eq!(queued.len(), 1);
        assert_eq!(queued[0].activity()["type"], "Undo");
        assert_eq!(queued[0].activity()["object"]["id"], location);

        let outcome = handle_undo_follow(&context, undo).await.unwrap();
        assert!(matches!(outcome, Outcome::Ignored("following not found")));
    }

    #[tokio::test]
    async fn test_follow_local_actor() {
        let db_client = &create_test_database();
        let user = create_test_user(db_client, "alice").await;
        let factory = test_factory(db_client, MockFetcher::default());
        let context = OutboxContext { factory, user };
        let follow = Document::new(json!({
            "type": "Follow",
            "actor": LOCAL_ACTOR_ID,
            "object": "https://local.example/users/bob",
        }));
        let error = handle_follow(&context, follow).await.err().unwrap();
        assert_eq!(error.kind(), ErrorKind::BadRequest);
    }
}
