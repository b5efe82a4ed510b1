use crate::database::DatabaseClient;

use super::{
    queries::create_user,
    types::{User, UserCreateData},
};

pub async fn create_test_user(db_client: &DatabaseClient, username: &str) -> User {
    let user_data = UserCreateData {
        username: username.to_string(),
        access_token: format!("{username}-test-token"),
        ..Default::default()
    };
    create_user(db_client, user_data).await.unwrap()
}
