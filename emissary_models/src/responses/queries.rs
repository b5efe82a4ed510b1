use chrono::Utc;
use uuid::Uuid;

use crate::database::{
    utils::{datetime_to_cursor, paginate},
    DatabaseClient,
    DatabaseError,
};

use super::types::{Response, ResponseData, ResponseType};

/// Saves response. Responses are unique by activity ID.
/// Returns `true` if a new response was added.
pub async fn create_response(
    db_client: &DatabaseClient,
    response_data: ResponseData,
) -> Result<(Response, bool), DatabaseError> {
    let mut tables = db_client.write().await;
    if let Some(response) = tables.responses.get(&response_data.activity_id) {
        return Ok((response.clone(), false));
    };
    let response = Response {
        id: Uuid::new_v4(),
        activity_id: response_data.activity_id,
        actor_url: response_data.actor_url,
        response_type: response_data.response_type,
        object_url: response_data.object_url,
        content: response_data.content,
        created_at: Utc::now(),
    };
    tables.responses.insert(response.activity_id.clone(), response.clone());
    Ok((response, true))
}

pub async fn get_response_by_activity_id(
    db_client: &DatabaseClient,
    activity_id: &str,
) -> Result<Response, DatabaseError> {
    let tables = db_client.read().await;
    tables.responses.get(activity_id)
        .cloned()
        .ok_or(DatabaseError::NotFound("response"))
}

pub async fn find_response(
    db_client: &DatabaseClient,
    actor_url: &str,
    response_type: ResponseType,
    object_url: &str,
) -> Result<Response, DatabaseError> {
    let tables = db_client.read().await;
    tables.responses.values()
        .find(|response| {
            response.actor_url == actor_url &&
                response.response_type == response_type &&
                response.object_url == object_url
        })
        .cloned()
        .ok_or(DatabaseError::NotFound("response"))
}

pub async fn delete_response(
    db_client: &DatabaseClient,
    response_id: Uuid,
) -> Result<(), DatabaseError> {
    let mut tables = db_client.write().await;
    let activity_id = tables.responses.values()
        .find(|response| response.id == response_id)
        .map(|response| response.activity_id.clone())
        .ok_or(DatabaseError::NotFound("response"))?;
    tables.responses.remove(&activity_id);
    Ok(())
}

pub async fn get_response_count(
    db_client: &DatabaseClient,
    object_url: &str,
    response_type: ResponseType,
) -> Result<usize, DatabaseError> {
    let tables = db_client.read().await;
    let count = tables.responses.values()
        .filter(|response| {
            response.object_url == object_url &&
                response.response_type == response_type
        })
        .count();
    Ok(count)
}

/// Responses made by actor (`liked` and `disliked` collections)
pub async fn get_responses_page(
    db_client: &DatabaseClient,
    actor_url: &str,
    response_type: ResponseType,
    before: i64,
    limit: u16,
) -> Result<Vec<Response>, DatabaseError> {
    let tables = db_client.read().await;
    let responses = tables.responses.values()
        .filter(|response| {
            response.actor_url == actor_url &&
                response.response_type == response_type
        })
        .cloned();
    let page = paginate(
        responses,
        |response| datetime_to_cursor(&response.created_at),
        before,
        limit,
    );
    Ok(page)
}
