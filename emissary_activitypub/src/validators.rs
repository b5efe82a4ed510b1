//! Checks performed on incoming activities before dispatch
use crate::{
    document::Document,
    errors::HandlerError,
    fetch::is_same_origin,
    router::ActivityValidator,
};

/// Rejects documents without `type` or `actor`
pub struct RequiredFieldsValidator;

impl ActivityValidator for RequiredFieldsValidator {
    fn validate(&self, activity: &Document) -> Result<(), HandlerError> {
        if activity.document_type().is_none() {
            return Err(HandlerError::ValidationError("type property is missing".to_string()));
        };
        if activity.actor().id().is_none() {
            return Err(HandlerError::ValidationError("actor property is missing".to_string()));
        };
        Ok(())
    }
}

/// Activity actor must be the authenticated local actor
pub struct ActorMatchValidator {
    pub actor_id: String,
}

impl ActivityValidator for ActorMatchValidator {
    fn validate(&self, activity: &Document) -> Result<(), HandlerError> {
        let actor_id = activity.actor().id()
            .ok_or(HandlerError::ValidationError("actor property is missing".to_string()))?;
        if actor_id != self.actor_id {
            return Err(HandlerError::Forbidden("actor doesn't match authenticated user".to_string()));
        };
        Ok(())
    }
}

/// Binds the request signer to the activity actor.
/// `signer_id` is the owner of the key that produced a valid HTTP signature.
pub struct SignatureKeyValidator {
    pub signer_id: Option<String>,
    pub required: bool,
}

impl ActivityValidator for SignatureKeyValidator {
    fn validate(&self, activity: &Document) -> Result<(), HandlerError> {
        let Some(ref key_owner_id) = self.signer_id else {
            if self.required {
                return Err(HandlerError::Unauthorized("missing signature".to_string()));
            };
            return Ok(());
        };
        let actor_id = activity.actor().id()
            .ok_or(HandlerError::ValidationError("actor property is missing".to_string()))?;
        if *key_owner_id == actor_id {
            return Ok(());
        };
        let is_valid = is_same_origin(key_owner_id, &actor_id)
            .map_err(|_| HandlerError::ValidationError("invalid key ID".to_string()))?;
        if !is_valid {
            return Err(HandlerError::Forbidden("key ID doesn't belong to actor".to_string()));
        };
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use crate::errors::ErrorKind;
    use super::*;

    const ACTOR_ID: &str = "https://remote.example/users/bob";

    fn create_activity() -> Document {
        Document::new(json!({
            "type": "Follow",
            "actor": ACTOR_ID,
            "object": "https://social.example/users/alice",
        }))
    }

    #[test]
    fn test_required_fields_validator() {
        let activity = create_activity();
        assert!(RequiredFieldsValidator.validate(&activity).is_ok());
        let activity = Document::new(json!({"type": "Follow"}));
        let error = RequiredFieldsValidator.validate(&activity).err().unwrap();
        assert_eq!(error.kind(), ErrorKind::BadRequest);
    }

    #[test]
    fn test_actor_match_validator() {
        let validator = ActorMatchValidator { actor_id: ACTOR_ID.to_string() };
        assert!(validator.validate(&create_activity()).is_ok());
        let validator = ActorMatchValidator {
            actor_id: "https://social.example/users/alice".to_string(),
        };
        let error = validator.validate(&create_activity()).err().unwrap();
        assert_eq!(error.kind(), ErrorKind::Forbidden);
    }

    #[test]
    fn test_signature_key_validator() {
        let validator = SignatureKeyValidator {
            signer_id: Some(ACTOR_ID.to_string()),
            required: true,
        };
        assert!(validator.validate(&create_activity()).is_ok());

        let validator = SignatureKeyValidator {
            signer_id: Some("https://remote.example/actor".to_string()),
            required: true,
        };
        assert!(validator.validate(&create_activity()).is_ok());

        let validator = SignatureKeyValidator {
            signer_id: Some("https://other.example/users/bob".to_string()),
            required: true,
        };
        let error = validator.validate(&create_activity()).err().unwrap();
        assert_eq!(error.kind(), ErrorKind::Forbidden);
    }

    #[test]
    fn test_signature_key_validator_missing_signature() {
        let validator = SignatureKeyValidator { signer_id: None, required: true };
        let error = validator.validate(&create_activity()).err().unwrap();
        assert_eq!(error.kind(), ErrorKind::Unauthorized);
        let validator = SignatureKeyValidator { signer_id: None, required: false };
        assert!(validator.validate(&create_activity()).is_ok());
    }
}
