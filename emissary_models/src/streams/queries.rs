use chrono::Utc;
use uuid::Uuid;

use crate::database::{DatabaseClient, DatabaseError};

use super::types::{Stream, StreamCreateData};

pub async fn create_stream(
    db_client: &DatabaseClient,
    stream_data: StreamCreateData,
) -> Result<Stream, DatabaseError> {
    let mut tables = db_client.write().await;
    if !tables.users.iter().any(|user| user.id == stream_data.owner_id) {
        return Err(DatabaseError::NotFound("user"));
    };
    if tables.streams.iter().any(|stream| stream.token == stream_data.token) {
        return Err(DatabaseError::AlreadyExists("stream"));
    };
    let stream = Stream {
        id: Uuid::new_v4(),
        token: stream_data.token,
        owner_id: stream_data.owner_id,
        name: stream_data.name,
        summary: stream_data.summary,
        created_at: Utc::now(),
    };
    tables.streams.push(stream.clone());
    Ok(stream)
}

pub async fn get_stream_by_id(
    db_client: &DatabaseClient,
    stream_id: Uuid,
) -> Result<Stream, DatabaseError> {
    let tables = db_client.read().await;
    tables.streams.iter()
        .find(|stream| stream.id == stream_id)
        .cloned()
        .ok_or(DatabaseError::NotFound("stream"))
}

pub async fn get_stream_by_token(
    db_client: &DatabaseClient,
    token: &str,
) -> Result<Stream, DatabaseError> {
    let tables = db_client.read().await;
    tables.streams.iter()
        .find(|stream| stream.token == token)
        .cloned()
        .ok_or(DatabaseError::NotFound("stream"))
}

pub async fn get_streams_by_owner(
    db_client: &DatabaseClient,
    owner_id: Uuid,
) -> Result<Vec<Stream>, DatabaseError> {
    let tables = db_client.read().await;
    let streams = tables.streams.iter()
        .filter(|stream| stream.owner_id == owner_id)
        .cloned()
        .collect();
    Ok(streams)
}
