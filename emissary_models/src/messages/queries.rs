use chrono::Utc;
use uuid::Uuid;

use crate::database::{DatabaseClient, DatabaseError};

use super::types::{Message, MessageData};

/// Saves inbox message. Messages are unique per (user, object URL);
/// a repeated delivery updates origin and labels of the existing message.
/// Returns `true` if a new message was added.
pub async fn create_or_update_message(
    db_client: &DatabaseClient,
    message_data: MessageData,
) -> Result<(Message, bool), DatabaseError> {
    let mut tables = db_client.write().await;
    let maybe_message = tables.messages.iter_mut()
        .find(|message| {
            message.user_id == message_data.user_id &&
                message.object_url == message_data.object_url
        });
    if let Some(message) = maybe_message {
        message.origin = message_data.origin;
        message.object_type = message_data.object_type;
        for label in message_data.labels {
            if !message.labels.contains(&label) {
                message.labels.push(label);
            };
        };
        return Ok((message.clone(), false));
    };
    let message = Message {
        id: Uuid::new_v4(),
        user_id: message_data.user_id,
        following_id: message_data.following_id,
        origin: message_data.origin,
        object_url: message_data.object_url,
        object_type: message_data.object_type,
        state: message_data.state,
        labels: message_data.labels,
        created_at: Utc::now(),
    };
    tables.messages.push(message.clone());
    Ok((message, true))
}

pub async fn get_message_by_object_url(
    db_client: &DatabaseClient,
    user_id: Uuid,
    object_url: &str,
) -> Result<Message, DatabaseError> {
    let tables = db_client.read().await;
    tables.messages.iter()
        .find(|message| message.user_id == user_id && message.object_url == object_url)
        .cloned()
        .ok_or(DatabaseError::NotFound("message"))
}

pub async fn get_messages(
    db_client: &DatabaseClient,
    user_id: Uuid,
) -> Result<Vec<Message>, DatabaseError> {
    let tables = db_client.read().await;
    let mut messages: Vec<_> = tables.messages.iter()
        .filter(|message| message.user_id == user_id)
        .cloned()
        .collect();
    messages.sort_by_key(|message| std::cmp::Reverse(message.created_at));
    Ok(messages)
}
