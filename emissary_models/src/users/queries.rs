use chrono::Utc;
use uuid::Uuid;

use crate::database::{DatabaseClient, DatabaseError};

use super::types::{User, UserCreateData};

pub async fn create_user(
    db_client: &DatabaseClient,
    user_data: UserCreateData,
) -> Result<User, DatabaseError> {
    let mut tables = db_client.write().await;
    if tables.users.iter().any(|user| user.username == user_data.username) {
        return Err(DatabaseError::AlreadyExists("user"));
    };
    let user = User {
        id: Uuid::new_v4(),
        username: user_data.username,
        display_name: user_data.display_name,
        summary: user_data.summary,
        icon_url: user_data.icon_url,
        access_token: user_data.access_token,
        created_at: Utc::now(),
    };
    tables.users.push(user.clone());
    Ok(user)
}

/// Updates profile fields of existing user
pub async fn update_user(
    db_client: &DatabaseClient,
    user_id: Uuid,
    user_data: UserCreateData,
) -> Result<User, DatabaseError> {
    let mut tables = db_client.write().await;
    let user = tables.users.iter_mut()
        .find(|user| user.id == user_id)
        .ok_or(DatabaseError::NotFound("user"))?;
    user.display_name = user_data.display_name;
    user.summary = user_data.summary;
    user.icon_url = user_data.icon_url;
    user.access_token = user_data.access_token;
    Ok(user.clone())
}

pub async fn get_user_by_id(
    db_client: &DatabaseClient,
    user_id: Uuid,
) -> Result<User, DatabaseError> {
    let tables = db_client.read().await;
    tables.users.iter()
        .find(|user| user.id == user_id)
        .cloned()
        .ok_or(DatabaseError::NotFound("user"))
}

pub async fn get_user_by_name(
    db_client: &DatabaseClient,
    username: &str,
) -> Result<User, DatabaseError> {
    let tables = db_client.read().await;
    tables.users.iter()
        .find(|user| user.username == username)
        .cloned()
        .ok_or(DatabaseError::NotFound("user"))
}

pub async fn get_users(
    db_client: &DatabaseClient,
) -> Result<Vec<User>, DatabaseError> {
    let tables = db_client.read().await;
    Ok(tables.users.clone())
}

#[cfg(test)]
mod tests {
    use crate::database::test_utils::create_test_database;
    use super::*;

    #[tokio::test]
    async fn test_create_user() {
        let db_client = &create_test_database();
        let user_data = UserCreateData {
            username: "alice".to_string(),
            access_token: "secret".to_string(),
            ..Default::default()
        };
        let user = create_user(db_client, user_data).await.unwrap();
        assert_eq!(user.username, "alice");
        assert_eq!(user.name(), "alice");

        let user = get_user_by_name(db_client, "alice").await.unwrap();
        assert_eq!(user.access_token, "secret");
    }

    #[tokio::test]
    async fn test_create_user_duplicate_username() {
        let db_client = &create_test_database();
        let user_data = UserCreateData {
            username: "alice".to_string(),
            ..Default::default()
        };
        create_user(db_client, user_data).await.unwrap();
        let user_data = UserCreateData {
            username: "alice".to_string(),
            ..Default::default()
        };
        let error = create_user(db_client, user_data).await.err().unwrap();
        assert!(matches!(error, DatabaseError::AlreadyExists("user")));
    }
}
