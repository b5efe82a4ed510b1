use uuid::Uuid;

use crate::actors::types::Parent;
use crate::database::{
    utils::{datetime_to_cursor, paginate},
    DatabaseClient,
    DatabaseError,
};

use super::types::{OutboxMessage, OutboxMessageData};

pub async fn create_outbox_message(
    db_client: &DatabaseClient,
    message_data: OutboxMessageData,
) -> Result<OutboxMessage, DatabaseError> {
    let mut tables = db_client.write().await;
    if tables.outbox.iter().any(|message| message.id == message_data.id) {
        return Err(DatabaseError::AlreadyExists("outbox message"));
    };
    let message = OutboxMessage {
        id: message_data.id,
        parent: message_data.parent,
        activity_type: message_data.activity_type,
        object_url: message_data.object_url,
        activity: message_data.activity,
        is_public: message_data.is_public,
        created_at: message_data.published,
    };
    tables.outbox.push(message.clone());
    Ok(message)
}

pub async fn get_outbox_message(
    db_client: &DatabaseClient,
    parent: &Parent,
    message_id: Uuid,
) -> Result<OutboxMessage, DatabaseError> {
    let tables = db_client.read().await;
    tables.outbox.iter()
        .find(|message| message.parent == *parent && message.id == message_id)
        .cloned()
        .ok_or(DatabaseError::NotFound("outbox message"))
}

/// Returns page of public outbox messages, newest first
pub async fn get_outbox_page(
    db_client: &DatabaseClient,
    parent: &Parent,
    before: i64,
    limit: u16,
) -> Result<Vec<OutboxMessage>, DatabaseError> {
    let tables = db_client.read().await;
    let messages = tables.outbox.iter()
        .filter(|message| message.parent == *parent && message.is_public)
        .cloned();
    let page = paginate(
        messages,
        |message| datetime_to_cursor(&message.created_at),
        before,
        limit,
    );
    Ok(page)
}

/// Removes all outbox messages about the given object.
/// Returns deleted messages.
pub async fn delete_outbox_messages_by_object_url(
    db_client: &DatabaseClient,
    parent: &Parent,
    object_url: &str,
) -> Result<Vec<OutboxMessage>, DatabaseError> {
    let mut tables = db_client.write().await;
    let (deleted, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut tables.outbox)
        .into_iter()
        .partition(|message| {
            message.parent == *parent && message.object_url == object_url
        });
    tables.outbox = kept;
    Ok(deleted)
}

pub async fn delete_outbox_message(
    db_client: &DatabaseClient,
    parent: &Parent,
    message_id: Uuid,
) -> Result<OutboxMessage, DatabaseError> {
    let mut tables = db_client.write().await;
    let index = tables.outbox.iter()
        .position(|message| message.parent == *parent && message.id == message_id)
        .ok_or(DatabaseError::NotFound("outbox message"))?;
    Ok(tables.outbox.remove(index))
}
