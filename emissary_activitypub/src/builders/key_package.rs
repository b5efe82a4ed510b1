use chrono::{DateTime, Utc};
use serde::Serialize;

use emissary_models::mls::types::KeyPackage;

use crate::{
    constants::{MLS_ENCODING, MLS_MEDIA_TYPE},
    contexts::{build_default_context, Context},
    vocabulary::KEY_PACKAGE,
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyPackageObject {
    #[serde(rename = "@context")]
    _context: Context,

    id: String,

    #[serde(rename = "type")]
    object_type: String,

    attributed_to: String,
    media_type: String,
    encoding: String,
    content: String,
    published: DateTime<Utc>,
}

pub fn build_key_package(
    actor_id: &str,
    key_package: &KeyPackage,
) -> KeyPackageObject {
    KeyPackageObject {
        _context: build_default_context(),
        id: key_package.object_url.clone(),
        object_type: KEY_PACKAGE.to_string(),
        attributed_to: actor_id.to_string(),
        media_type: MLS_MEDIA_TYPE.to_string(),
        encoding: MLS_ENCODING.to_string(),
        content: key_package.content.clone(),
        published: key_package.created_at,
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;
    use crate::{
        document::Document,
        handlers::objects::validate_mls_object,
    };
    use super::*;

    #[test]
    fn test_build_key_package() {
        let actor_id = "https://social.example/users/alice";
        let key_package = KeyPackage {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            object_url: "https://social.example/users/alice/keyPackages/1".to_string(),
            content: "AAEC".to_string(),
            created_at: Utc::now(),
        };
        let object = build_key_package(actor_id, &key_package);
        let value = serde_json::to_value(object).unwrap();
        assert_eq!(value["type"], "KeyPackage");
        assert_eq!(value["mediaType"], "message/mls");
        // Published package passes the checks applied to incoming ones
        let (object_type, content) =
            validate_mls_object(&Document::new(value), actor_id).unwrap();
        assert_eq!(object_type, "KeyPackage");
        assert_eq!(content, "AAEC");
    }
}
