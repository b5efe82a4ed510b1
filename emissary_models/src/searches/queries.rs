use chrono::Utc;
use uuid::Uuid;

use crate::database::{DatabaseClient, DatabaseError};

use super::types::SearchQuery;

pub async fn create_search_query(
    db_client: &DatabaseClient,
    token: &str,
    query: &str,
) -> Result<SearchQuery, DatabaseError> {
    let mut tables = db_client.write().await;
    if tables.search_queries.iter().any(|search| search.token == token) {
        return Err(DatabaseError::AlreadyExists("search query"));
    };
    let search_query = SearchQuery {
        id: Uuid::new_v4(),
        token: token.to_string(),
        query: query.to_string(),
        created_at: Utc::now(),
    };
    tables.search_queries.push(search_query.clone());
    Ok(search_query)
}

pub async fn get_search_query_by_token(
    db_client: &DatabaseClient,
    token: &str,
) -> Result<SearchQuery, DatabaseError> {
    let tables = db_client.read().await;
    tables.search_queries.iter()
        .find(|search| search.token == token)
        .cloned()
        .ok_or(DatabaseError::NotFound("search query"))
}
