//! Collections exposed by local actors.
//!
//! Pages are selected by `publishDate` cursor (creation time of the last
//! item on the previous page, Unix milliseconds). Only public data is
//! returned: the outbox lists public activities, the `blocked`
//! collection lists public rules.
use serde_json::{json, Value as JsonValue};
use uuid::Uuid;

use emissary_models::{
    actors::types::ParentType,
    database::utils::datetime_to_cursor,
    followers::queries::{get_follower_count, get_followers_page},
    following::queries::{get_following_by_id, get_followings_page},
    mls::queries::{get_key_package, get_key_packages_page},
    outbox::queries::{get_outbox_message, get_outbox_page},
    responses::queries::get_responses_page,
    responses::types::ResponseType,
    rules::queries::{get_public_rule_by_id, get_public_rules_page},
};

use crate::{
    actors::LocalActor,
    builders::{
        block::build_block,
        collection::{OrderedCollection, OrderedCollectionPage},
        follow::build_follow,
        key_package::build_key_package,
    },
    errors::HandlerError,
    factory::Factory,
    identifiers::LocalActorCollection,
};

fn collection_not_found() -> HandlerError {
    HandlerError::NotFound("collection not found".to_string())
}

fn owner_user_id(local_actor: &LocalActor) -> Result<Uuid, HandlerError> {
    if local_actor.parent.parent_type != ParentType::User {
        return Err(collection_not_found());
    };
    Ok(local_actor.parent.parent_id)
}

fn check_collection(
    local_actor: &LocalActor,
    collection: LocalActorCollection,
) -> Result<(), HandlerError> {
    if collection == LocalActorCollection::Inbox ||
        !local_actor.has_collection(collection)
    {
        return Err(collection_not_found());
    };
    Ok(())
}

/// Collection stub pointing at the first page
pub async fn get_collection(
    factory: &Factory,
    local_actor: &LocalActor,
    collection: LocalActorCollection,
) -> Result<OrderedCollection, HandlerError> {
    check_collection(local_actor, collection)?;
    let total_items = match collection {
        LocalActorCollection::Followers => {
            let count = get_follower_count(
                factory.db_client(),
                &local_actor.parent,
            ).await?;
            Some(count)
        },
        _ => None,
    };
    let collection_id = local_actor.collection(collection);
    Ok(OrderedCollection::new(collection_id, total_items))
}

pub async fn get_collection_page(
    factory: &Factory,
    local_actor: &LocalActor,
    collection: LocalActorCollection,
    cursor: i64,
) -> Result<OrderedCollectionPage, HandlerError> {
    check_collection(local_actor, collection)?;
    let db_client = factory.db_client();
    let page_size = factory.instance().collection_page_size;
    let collection_id = local_actor.collection(collection);
    let items: Vec<(i64, JsonValue)> = match collection {
        LocalActorCollection::Outbox => {
            get_outbox_page(db_client, &local_actor.parent, cursor, page_size)
                .await?
                .into_iter()
                .map(|message| {
                    (datetime_to_cursor(&message.created_at), message.activity)
                })
                .collect()
        },
        LocalActorCollection::Followers => {
            get_followers_page(db_client, &local_actor.parent, cursor, page_size)
                .await?
                .into_iter()
                .map(|follower| {
                    (
                        datetime_to_cursor(&follower.created_at),
                        json!(follower.actor.profile_url),
                    )
                })
                .collect()
        },
        LocalActorCollection::Following => {
            let user_id = owner_user_id(local_actor)?;
            get_followings_page(db_client, user_id, cursor, page_size)
                .await?
                .into_iter()
                .map(|following| {
                    (
                        datetime_to_cursor(&following.created_at),
                        json!(following.profile_url),
                    )
                })
                .collect()
        },
        LocalActorCollection::Liked | LocalActorCollection::Disliked => {
            let response_type = if collection == LocalActorCollection::Liked {
                ResponseType::Like
            } else {
                ResponseType::Dislike
            };
            get_responses_page(
                db_client,
                &local_actor.id,
                response_type,
                cursor,
                page_size,
            ).await?
                .into_iter()
                .map(|response| {
                    (
                        datetime_to_cursor(&response.created_at),
                        json!(response.object_url),
                    )
                })
                .collect()
        },
        LocalActorCollection::Blocked => {
            let user_id = owner_user_id(local_actor)?;
            let mut items = vec![];
            for rule in get_public_rules_page(db_client, user_id, cursor, page_size).await? {
                let activity = build_block(
                    &local_actor.id,
                    &collection_id,
                    &rule,
                    vec![local_actor.followers()],
                );
                items.push((
                    datetime_to_cursor(&rule.created_at),
                    serde_json::to_value(activity)?,
                ));
            };
            items
        },
        LocalActorCollection::KeyPackages => {
            let user_id = owner_user_id(local_actor)?;
            let mut items = vec![];
            for key_package in get_key_packages_page(db_client, user_id, cursor, page_size).await? {
                let object = build_key_package(&local_actor.id, &key_package);
                items.push((
                    datetime_to_cursor(&key_package.created_at),
                    serde_json::to_value(object)?,
                ));
            };
            items
        },
        LocalActorCollection::Inbox => return Err(collection_not_found()),
    };
    Ok(OrderedCollectionPage::new(collection_id, cursor, items, page_size))
}

/// Returns JSON-LD representation of a collection item.
/// Items that are not public are reported as missing.
pub async fn get_collection_item(
    factory: &Factory,
    local_actor: &LocalActor,
    collection: LocalActorCollection,
    item_id: Uuid,
) -> Result<JsonValue, HandlerError> {
    check_collection(local_actor, collection)?;
    let db_client = factory.db_client();
    let object_not_found = || HandlerError::NotFound("object not found".to_string());
    let item = match collection {
        LocalActorCollection::Outbox => {
            let message = get_outbox_message(
                db_client,
                &local_actor.parent,
                item_id,
            ).await?;
            if !message.is_public {
                return Err(object_not_found());
            };
            message.activity
        },
        LocalActorCollection::Following => {
            let user_id = owner_user_id(local_actor)?;
            let following = get_following_by_id(db_client, item_id).await?;
            if following.user_id != user_id {
                return Err(object_not_found());
            };
            let activity = build_follow(
                &local_actor.id,
                following.id,
                &following.profile_url,
            );
            serde_json::to_value(activity)?
        },
        LocalActorCollection::Blocked => {
            let user_id = owner_user_id(local_actor)?;
            let rule = get_public_rule_by_id(db_client, user_id, item_id).await?;
            let activity = build_block(
                &local_actor.id,
                &local_actor.collection(collection),
                &rule,
                vec![local_actor.followers()],
            );
            serde_json::to_value(activity)?
        },
        LocalActorCollection::KeyPackages => {
            let user_id = owner_user_id(local_actor)?;
            let key_package = get_key_package(db_client, user_id, item_id).await?;
            serde_json::to_value(build_key_package(&local_actor.id, &key_package))?
        },
        _ => return Err(object_not_found()),
    };
    Ok(item)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use emissary_models::{
        database::test_utils::create_test_database,
        outbox::queries::create_outbox_message,
        outbox::types::OutboxMessageData,
        rules::queries::create_rule,
        rules::types::{RuleAction, RuleData, RuleType},
        streams::test_utils::create_test_stream,
        users::test_utils::create_test_user,
    };
    use crate::{
        errors::ErrorKind,
        identifiers::local_object_id,
        test_utils::{test_factory, MockFetcher},
    };
    use super::*;

    async fn create_message_at(
        factory: &Factory,
        local_actor: &LocalActor,
        timestamp: i64,
        is_public: bool,
    ) -> Uuid {
        let message_id = Uuid::new_v4();
        let activity_id = local_object_id(&local_actor.outbox(), message_id);
        let message_data = OutboxMessageData {
            id: message_id,
            parent: local_actor.parent,
            activity_type: "Create".to_string(),
            object_url: format!("{activity_id}/object"),
            activity: json!({"id": activity_id, "type": "Create"}),
            is_public,
            published: Utc.timestamp_millis_opt(timestamp).unwrap(),
        };
        create_outbox_message(factory.db_client(), message_data).await.unwrap();
        message_id
    }

    #[tokio::test]
    async fn test_get_collection() {
        let db_client = &create_test_database();
        let factory = test_factory(db_client, MockFetcher::default());
        let user = create_test_user(db_client, "alice").await;
        let local_actor = LocalActor::for_user(&factory.instance_url(), &user);
        let collection = get_collection(
            &factory,
            &local_actor,
            LocalActorCollection::Followers,
        ).await.unwrap();
        let value = serde_json::to_value(collection).unwrap();
        assert_eq!(value["id"], "https://local.example/users/alice/followers");
        assert_eq!(value["totalItems"], 0);

        let error = get_collection(
            &factory,
            &local_actor,
            LocalActorCollection::Inbox,
        ).await.err().unwrap();
        assert_eq!(error.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_get_collection_not_exposed() {
        let db_client = &create_test_database();
        let factory = test_factory(db_client, MockFetcher::default());
        let user = create_test_user(db_client, "alice").await;
        let stream = create_test_stream(db_client, user.id, "news").await;
        let local_actor = LocalActor::for_stream(&factory.instance_url(), &stream);
        let error = get_collection_page(
            &factory,
            &local_actor,
            LocalActorCollection::Liked,
            i64::MAX,
        ).await.err().unwrap();
        assert_eq!(error.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_get_outbox_pages() {
        let db_client = &create_test_database();
        let factory = test_factory(db_client, MockFetcher::default());
        let user = create_test_user(db_client, "alice").await;
        let local_actor = LocalActor::for_user(&factory.instance_url(), &user);
        // Default page size is 60
        for timestamp in 1..=61 {
            create_message_at(&factory, &local_actor, timestamp * 10, true).await;
        };
        create_message_at(&factory, &local_actor, 1000, false).await;

        let page = get_collection_page(
            &factory,
            &local_actor,
            LocalActorCollection::Outbox,
            i64::MAX,
        ).await.unwrap();
        let value = serde_json::to_value(page).unwrap();
        assert_eq!(value["orderedItems"].as_array().unwrap().len(), 60);
        assert_eq!(
            value["next"],
            "https://local.example/users/alice/outbox?publishDate=20",
        );

        let page = get_collection_page(
            &factory,
            &local_actor,
            LocalActorCollection::Outbox,
            20,
        ).await.unwrap();
        let value = serde_json::to_value(page).unwrap();
        assert_eq!(value["orderedItems"].as_array().unwrap().len(), 1);
        assert_eq!(value.get("next"), None);
    }

    #[tokio::test]
    async fn test_get_outbox_item() {
        let db_client = &create_test_database();
        let factory = test_factory(db_client, MockFetcher::default());
        let user = create_test_user(db_client, "alice").await;
        let local_actor = LocalActor::for_user(&factory.instance_url(), &user);
        let public_id = create_message_at(&factory, &local_actor, 100, true).await;
        let direct_id = create_message_at(&factory, &local_actor, 200, false).await;

        let item = get_collection_item(
            &factory,
            &local_actor,
            LocalActorCollection::Outbox,
            public_id,
        ).await.unwrap();
        assert_eq!(item["type"], "Create");

        let error = get_collection_item(
            &factory,
            &local_actor,
            LocalActorCollection::Outbox,
            direct_id,
        ).await.err().unwrap();
        assert_eq!(error.kind(), ErrorKind::NotFound);

        let error = get_collection_item(
            &factory,
            &local_actor,
            LocalActorCollection::Outbox,
            Uuid::new_v4(),
        ).await.err().unwrap();
        assert_eq!(error.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_get_blocked_collection() {
        let db_client = &create_test_database();
        let factory = test_factory(db_client, MockFetcher::default());
        let user = create_test_user(db_client, "alice").await;
        let local_actor = LocalActor::for_user(&factory.instance_url(), &user);
        let (rule, _) = create_rule(db_client, RuleData {
            user_id: Some(user.id),
            following_id: None,
            rule_type: RuleType::Domain,
            trigger: "spam.example".to_string(),
            action: RuleAction::Block,
            label: None,
            origin_url: None,
            is_public: true,
        }).await.unwrap();
        // Private rule
        create_rule(db_client, RuleData {
            user_id: Some(user.id),
            ..RuleData::block(RuleType::Actor, "https://remote.example/users/1")
        }).await.unwrap();

        let page = get_collection_page(
            &factory,
            &local_actor,
            LocalActorCollection::Blocked,
            i64::MAX,
        ).await.unwrap();
        let value = serde_json::to_value(page).unwrap();
        let items = value["orderedItems"].as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["type"], "Block");
        assert_eq!(items[0]["object"]["id"], "https://spam.example");

        let item = get_collection_item(
            &factory,
            &local_actor,
            LocalActorCollection::Blocked,
            rule.id,
        ).await.unwrap();
        assert_eq!(item["id"], items[0]["id"]);
    }
}
