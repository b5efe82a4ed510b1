use uuid::Uuid;

use crate::database::DatabaseClient;

use super::{
    queries::create_stream,
    types::{Stream, StreamCreateData},
};

pub async fn create_test_stream(
    db_client: &DatabaseClient,
    owner_id: Uuid,
    token: &str,
) -> Stream {
    let stream_data = StreamCreateData {
        token: token.to_string(),
        owner_id,
        name: token.to_uppercase(),
        summary: None,
    };
    create_stream(db_client, stream_data).await.unwrap()
}
