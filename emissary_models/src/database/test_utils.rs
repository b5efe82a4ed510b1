use super::DatabaseClient;

/// Creates new empty database. Each test gets its own instance.
pub fn create_test_database() -> DatabaseClient {
    DatabaseClient::new()
}
