use uuid::Uuid;

use crate::database::DatabaseClient;
use crate::rules::types::RuleAction;

use super::{
    queries::create_following,
    types::{Following, FollowingData, FollowingMethod},
};

pub async fn create_test_following(
    db_client: &DatabaseClient,
    user_id: Uuid,
    profile_url: &str,
    rule_action: RuleAction,
) -> Following {
    let following_data = FollowingData {
        user_id,
        profile_url: profile_url.to_string(),
        name: None,
        inbox_url: Some(format!("{profile_url}/inbox")),
        rule_action,
        method: FollowingMethod::ActivityPub,
    };
    create_following(db_client, following_data).await.unwrap()
}
