use chrono::{DateTime, Utc};
use serde_json::{Value as JsonValue};

/// Copy of a remote document, keyed by its canonical ID
#[derive(Clone, Debug)]
pub struct CachedObject {
    pub object_id: String,
    pub object_data: JsonValue,
    pub updated_at: DateTime<Utc>,
}
