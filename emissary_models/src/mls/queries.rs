use chrono::Utc;
use uuid::Uuid;

use crate::database::{
    utils::{datetime_to_cursor, paginate},
    DatabaseClient,
    DatabaseError,
};

use super::types::{KeyPackage, MlsMessage};

pub async fn create_key_package(
    db_client: &DatabaseClient,
    key_package_id: Uuid,
    user_id: Uuid,
    object_url: &str,
    content: &str,
) -> Result<KeyPackage, DatabaseError> {
    let mut tables = db_client.write().await;
    if tables.key_packages.iter().any(|package| package.object_url == object_url) {
        return Err(DatabaseError::AlreadyExists("key package"));
    };
    let key_package = KeyPackage {
        id: key_package_id,
        user_id,
        object_url: object_url.to_string(),
        content: content.to_string(),
        created_at: Utc::now(),
    };
    tables.key_packages.push(key_package.clone());
    Ok(key_package)
}

pub async fn get_key_package(
    db_client: &DatabaseClient,
    user_id: Uuid,
    key_package_id: Uuid,
) -> Result<KeyPackage, DatabaseError> {
    let tables = db_client.read().await;
    tables.key_packages.iter()
        .find(|package| package.user_id == user_id && package.id == key_package_id)
        .cloned()
        .ok_or(DatabaseError::NotFound("key package"))
}

pub async fn delete_key_package_by_url(
    db_client: &DatabaseClient,
    user_id: Uuid,
    object_url: &str,
) -> Result<(), DatabaseError> {
    let mut tables = db_client.write().await;
    let index = tables.key_packages.iter()
        .position(|package| {
            package.user_id == user_id && package.object_url == object_url
        })
        .ok_or(DatabaseError::NotFound("key package"))?;
    tables.key_packages.remove(index);
    Ok(())
}

pub async fn get_key_packages_page(
    db_client: &DatabaseClient,
    user_id: Uuid,
    before: i64,
    limit: u16,
) -> Result<Vec<KeyPackage>, DatabaseError> {
    let tables = db_client.read().await;
    let packages = tables.key_packages.iter()
        .filter(|package| package.user_id == user_id)
        .cloned();
    let page = paginate(
        packages,
        |package| datetime_to_cursor(&package.created_at),
        before,
        limit,
    );
    Ok(page)
}

pub async fn create_mls_message(
    db_client: &DatabaseClient,
    user_id: Uuid,
    actor_url: &str,
    message_type: &str,
    content: &str,
) -> Result<MlsMessage, DatabaseError> {
    let mut tables = db_client.write().await;
    let message = MlsMessage {
        id: Uuid::new_v4(),
        user_id,
        actor_url: actor_url.to_string(),
        message_type: message_type.to_string(),
        content: content.to_string(),
        created_at: Utc::now(),
    };
    tables.mls_messages.push(message.clone());
    Ok(message)
}

pub async fn get_mls_messages(
    db_client: &DatabaseClient,
    user_id: Uuid,
) -> Result<Vec<MlsMessage>, DatabaseError> {
    let tables = db_client.read().await;
    let messages = tables.mls_messages.iter()
        .filter(|message| message.user_id == user_id)
        .cloned()
        .collect();
    Ok(messages)
}
