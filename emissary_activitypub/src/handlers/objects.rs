//! Object checks shared by inbox and outbox handlers
use url::Url;

use emissary_models::{
    responses::types::ResponseType,
    rules::types::RuleType,
};

use crate::{
    constants::{MLS_ENCODING, MLS_MEDIA_TYPE},
    document::Document,
    errors::HandlerError,
    vocabulary::{ANNOUNCE, APPLICATION, DISLIKE, LIKE, NOTE, ORGANIZATION, SERVICE},
};

pub(crate) fn response_type_for(activity_type: &str) -> Option<ResponseType> {
    let response_type = match activity_type {
        ANNOUNCE => ResponseType::Announce,
        LIKE => ResponseType::Like,
        DISLIKE => ResponseType::Dislike,
        _ => return None,
    };
    Some(response_type)
}

/// Checks attribution and encoding of an MLS object.
/// Returns message type and payload.
pub(crate) fn validate_mls_object(
    object: &Document,
    actor_id: &str,
) -> Result<(String, String), HandlerError> {
    let message_type = object.document_type()
        .ok_or(HandlerError::ValidationError("object type is missing".to_string()))?;
    if object.attributed_to().id().as_deref() != Some(actor_id) {
        return Err(HandlerError::Forbidden("object is not attributed to actor".to_string()));
    };
    if object.media_type() != Some(MLS_MEDIA_TYPE) {
        return Err(HandlerError::ValidationError("unexpected media type".to_string()));
    };
    if object.encoding() != Some(MLS_ENCODING) {
        return Err(HandlerError::ValidationError("unexpected encoding".to_string()));
    };
    let content = object.content()
        .ok_or(HandlerError::ValidationError("content is missing".to_string()))?;
    Ok((message_type.to_string(), content.to_string()))
}

/// Derives rule type and trigger from the object of a Block activity
pub(crate) fn rule_from_blocked_object(
    object: &Document,
) -> Result<(RuleType, String), HandlerError> {
    match object.document_type() {
        Some(APPLICATION | SERVICE | ORGANIZATION) => {
            let url = object.url().or(object.id())
                .ok_or(HandlerError::ValidationError("blocked domain has no URL".to_string()))?;
            let hostname = Url::parse(&url).ok()
                .and_then(|url| url.host_str().map(|host| host.to_string()))
                .ok_or(HandlerError::ValidationError("invalid blocked domain URL".to_string()))?;
            Ok((RuleType::Domain, hostname))
        },
        Some(NOTE) => {
            let content = object.content()
                .ok_or(HandlerError::ValidationError("blocked note has no content".to_string()))?;
            Ok((RuleType::Content, content.to_string()))
        },
        _ => {
            let actor_id = object.id()
                .ok_or(HandlerError::ValidationError("block object is missing".to_string()))?;
            Ok((RuleType::Actor, actor_id))
        },
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use crate::errors::ErrorKind;
    use super::*;

    #[test]
    fn test_validate_mls_object() {
        let actor_id = "https://remote.example/users/bob";
        let object = Document::new(json!({
            "type": "KeyPackage",
            "attributedTo": actor_id,
            "mediaType": "message/mls",
            "encoding": "base64",
            "content": "a2V5",
        }));
        let (message_type, content) = validate_mls_object(&object, actor_id).unwrap();
        assert_eq!(message_type, "KeyPackage");
        assert_eq!(content, "a2V5");

        let object = object.with_property("mediaType", json!("text/plain"));
        let error = validate_mls_object(&object, actor_id).err().unwrap();
        assert_eq!(error.kind(), ErrorKind::BadRequest);
    }

    #[test]
    fn test_rule_from_blocked_object() {
        let object = Document::new(json!("https://spam.example/users/1"));
        let (rule_type, trigger) = rule_from_blocked_object(&object).unwrap();
        assert_eq!(rule_type, RuleType::Actor);
        assert_eq!(trigger, "https://spam.example/users/1");

        let object = Document::new(json!({
            "id": "https://spam.example/actor",
            "type": "Application",
        }));
        let (rule_type, trigger) = rule_from_blocked_object(&object).unwrap();
        assert_eq!(rule_type, RuleType::Domain);
        assert_eq!(trigger, "spam.example");

        let object = Document::new(json!({
            "id": "https://remote.example/notes/1",
            "type": "Note",
            "content": "crypto",
        }));
        let (rule_type, trigger) = rule_from_blocked_object(&object).unwrap();
        assert_eq!(rule_type, RuleType::Content);
        assert_eq!(trigger, "crypto");

        let result = rule_from_blocked_object(&Document::new(json!(null)));
        assert!(result.is_err());
    }
}
