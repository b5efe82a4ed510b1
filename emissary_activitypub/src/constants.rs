pub const AP_CONTEXT: &str = "https://www.w3.org/ns/activitystreams";
pub const AP_MEDIA_TYPE: &str = r#"application/ld+json; profile="https://www.w3.org/ns/activitystreams""#;
pub const AS_MEDIA_TYPE: &str = "application/activity+json";
pub const AP_PUBLIC: &str = "https://www.w3.org/ns/activitystreams#Public";

pub const MLS_MEDIA_TYPE: &str = "message/mls";
pub const MLS_ENCODING: &str = "base64";

/// Cursor that points to the beginning of a collection
pub const FIRST_PAGE_CURSOR: i64 = i64::MAX;
