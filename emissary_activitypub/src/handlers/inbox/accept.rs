use emissary_models::{
    following::queries::{get_following_by_id, set_following_accepted},
};

use crate::{
    document::Document,
    errors::HandlerError,
    identifiers::parse_local_follow_activity_id,
    router::{Descriptor, HandlerResult, Outcome},
    scopes::{ActorContext, UserContext},
    vocabulary::FOLLOW,
};

pub async fn handle_accept_follow(
    context: &UserContext,
    activity: Document,
) -> HandlerResult {
    let factory = context.factory();
    let local_actor = context.activitypub_actor()?;
    let follow_activity_id = activity.object().id()
        .ok_or(HandlerError::ValidationError("accept object is missing".to_string()))?;
    let following_id = parse_local_follow_activity_id(
        &local_actor.id,
        &follow_activity_id,
    )?;
    let following = get_following_by_id(factory.db_client(), following_id).await?;
    if following.user_id != context.user.id {
        return Err(HandlerError::Forbidden("following belongs to another user".to_string()));
    };
    let actor_id = activity.actor().id()
        .ok_or(HandlerError::ValidationError("actor is missing".to_string()))?;
    if actor_id != following.profile_url {
        return Err(HandlerError::Forbidden("actor is not the followed actor".to_string()));
    };
    let actor = factory.activity_cache()
        .load_document(&activity.actor()).await?;
    set_following_accepted(
        factory.db_client(),
        following.id,
        actor.name().map(|name| name.to_string()),
        actor.icon_url(),
        actor.inbox().map(|inbox| inbox.to_string()),
    ).await?;
    Ok(Outcome::Processed(Descriptor::object(FOLLOW)))
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use emissary_models::{
        database::test_utils::create_test_database,
        following::test_utils::create_test_following,
        following::types::{FollowingMethod, FollowingStatus},
        following::queries::set_following_status,
        rules::types::RuleAction,
        users::test_utils::create_test_user,
    };
    use crate::{
        errors::ErrorKind,
        identifiers::local_follow_activity_id,
        test_utils::{test_factory, MockFetcher},
    };
    use super::*;

    const REMOTE_ACTOR_ID: &str = "https://remote.example/users/bob";

    #[tokio::test]
    async fn test_accept_follow() {
        let db_client = &create_test_database();
        let user = create_test_user(db_client, "alice").await;
        let following = create_test_following(
            db_client,
            user.id,
            REMOTE_ACTOR_ID,
            RuleAction::Ignore,
        ).await;
        set_following_status(db_client, following.id, FollowingStatus::Loading)
            .await.unwrap();
        let fetcher = MockFetcher::default()
            .with_object(json!({
                "id": REMOTE_ACTOR_ID,
                "type": "Person",
                "name": "Bob",
                "inbox": "https://remote.example/users/bob/inbox",
            }));
        let factory = test_factory(db_client, fetcher);
        let context = UserContext { factory, user: user.clone() };
        let local_actor = context.activitypub_actor().unwrap();
        let accept = Document::new(json!({
            "type": "Accept",
            "actor": REMOTE_ACTOR_ID,
            "object": local_follow_activity_id(&local_actor.id, following.id),
        }));

        handle_accept_follow(&context, accept).await.unwrap();
        let following = get_following_by_id(db_client, following.id).await.unwrap();
        assert_eq!(following.status, FollowingStatus::Success);
        assert_eq!(following.method, FollowingMethod::ActivityPub);
        assert_eq!(following.name.as_deref(), Some("Bob"));
    }

    #[tokio::test]
    async fn test_accept_follow_spoofed() {
        let db_client = &create_test_database();
        let user = create_test_user(db_client, "alice").await;
        let following = create_test_following(
            db_client,
            user.id,
            REMOTE_ACTOR_ID,
            RuleAction::Ignore,
        ).await;
        set_following_status(db_client, following.id, FollowingStatus::Loading)
            .await.unwrap();
        let factory = test_factory(db_client, MockFetcher::default());
        let context = UserContext { factory, user: user.clone() };
        let local_actor = context.activitypub_actor().unwrap();
        let accept = Document::new(json!({
            "type": "Accept",
            "actor": "https://evil.example/users/mallory",
            "object": {
                "type": "Follow",
                "id": local_follow_activity_id(&local_actor.id, following.id),
            },
        }));

        let error = handle_accept_follow(&context, accept).await.err().unwrap();
        assert_eq!(error.kind(), ErrorKind::Forbidden);
        let following = get_following_by_id(db_client, following.id).await.unwrap();
        assert_eq!(following.status, FollowingStatus::Loading);
        assert_eq!(following.name, None);
    }

    #[tokio::test]
    async fn test_accept_follow_unknown_id() {
        let db_client = &create_test_database();
        let user = create_test_user(db_client, "alice").await;
        let factory = test_factory(db_client, MockFetcher::default());
        let context = UserContext { factory, user };
        let accept = Document::new(json!({
            "type": "Accept",
            "actor": REMOTE_ACTOR_ID,
            "object": "https://remote.example/activities/1",
        }));
        let error = handle_accept_follow(&context, accept).await.err().unwrap();
        assert_eq!(error.kind(), ErrorKind::BadRequest);
    }
}
