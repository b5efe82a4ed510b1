use emissary_models::mls::queries::create_mls_message;

use crate::{
    document::Document,
    errors::HandlerError,
    handlers::objects::validate_mls_object,
    router::{Descriptor, HandlerResult, Outcome},
    scopes::{ActorContext, UserContext},
};

/// Create(PrivateMessage|PublicMessage|Welcome|GroupInfo)
pub async fn handle_mls_message(
    context: &UserContext,
    activity: Document,
) -> HandlerResult {
    let actor_id = activity.actor().id()
        .ok_or(HandlerError::ValidationError("actor is missing".to_string()))?;
    let object = context.factory().activity_cache()
        .load_document(&activity.object()).await?;
    let (message_type, content) = validate_mls_object(&object, &actor_id)?;
    // Only the payload and the sender are stored
    create_mls_message(
        context.factory().db_client(),
        context.user.id,
        &actor_id,
        &message_type,
        &content,
    ).await?;
    Ok(Outcome::Processed(Descriptor::object(message_type)))
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use emissary_models::{
        database::test_utils::create_test_database,
        mls::queries::get_mls_messages,
        users::test_utils::create_test_user,
    };
    use crate::{
        errors::ErrorKind,
        test_utils::{test_factory, MockFetcher},
    };
    use super::*;

    const REMOTE_ACTOR_ID: &str = "https://remote.example/users/bob";

    fn mls_activity(attributed_to: &str, encoding: &str) -> Document {
        Document::new(json!({
            "type": "Create",
            "actor": REMOTE_ACTOR_ID,
            "object": {
                "id": "https://remote.example/messages/1",
                "type": "PrivateMessage",
                "attributedTo": attributed_to,
                "mediaType": "message/mls",
                "encoding": encoding,
                "content": "bWxzIHBheWxvYWQ=",
            },
        }))
    }

    #[tokio::test]
    async fn test_handle_mls_message() {
        let db_client = &create_test_database();
        let user = create_test_user(db_client, "alice").await;
        let factory = test_factory(db_client, MockFetcher::default());
        let context = UserContext { factory, user: user.clone() };

        handle_mls_message(&context, mls_activity(REMOTE_ACTOR_ID, "base64"))
            .await.unwrap();
        let messages = get_mls_messages(db_client, user.id).await.unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].message_type, "PrivateMessage");
        assert_eq!(messages[0].actor_url, REMOTE_ACTOR_ID);
        assert_eq!(messages[0].content, "bWxzIHBheWxvYWQ=");
    }

    #[tokio::test]
    async fn test_handle_mls_message_invalid() {
        let db_client = &create_test_database();
        let user = create_test_user(db_client, "alice").await;
        let factory = test_factory(db_client, MockFetcher::default());
        let context = UserContext { factory, user: user.clone() };

        let activity = mls_activity("https://remote.example/users/mallory", "base64");
        let error = handle_mls_message(&context, activity).await.err().unwrap();
        assert_eq!(error.kind(), ErrorKind::Forbidden);

        let activity = mls_activity(REMOTE_ACTOR_ID, "hex");
        let error = handle_mls_message(&context, activity).await.err().unwrap();
        assert_eq!(error.kind(), ErrorKind::BadRequest);

        let messages = get_mls_messages(db_client, user.id).await.unwrap();
        assert_eq!(messages.is_empty(), true);
    }
}
