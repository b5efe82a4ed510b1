//! Authentication of incoming requests
use rsa::RsaPublicKey;

use crate::{
    cache::{ActivityCache, ReloadResult},
    document::Document,
    errors::HandlerError,
    http_signatures::{
        deserialize_rsa_public_key,
        parse_http_signature,
        verify_http_signature,
        ContentDigest,
        HttpSignatureVerificationError as HttpSignatureError,
        InvalidPublicKey,
        SignedRequest,
    },
};

#[derive(thiserror::Error, Debug)]
pub enum AuthenticationError {
    #[error(transparent)]
    HttpSignatureError(#[from] HttpSignatureError),

    #[error("no HTTP signature")]
    NoHttpSignature,

    #[error("invalid key ID")]
    InvalidKeyId,

    #[error("{0}")]
    ActorError(&'static str),

    #[error("can't retrieve key: {0}")]
    KeyRetrievalError(#[from] HandlerError),

    #[error("invalid RSA public key")]
    InvalidRsaPublicKey(#[from] InvalidPublicKey),
}

fn get_signer_key(
    signer: &Document,
    key_id: &str,
) -> Result<RsaPublicKey, AuthenticationError> {
    let public_keys = match &signer.value()["publicKey"] {
        serde_json::Value::Array(keys) => keys.iter().collect(),
        serde_json::Value::Object(_) => vec![&signer.value()["publicKey"]],
        _ => vec![],
    };
    let public_key = public_keys.iter()
        .find(|public_key| public_key["id"].as_str() == Some(key_id))
        .or(public_keys.first())
        .ok_or(AuthenticationError::ActorError("key not found"))?;
    let public_key_pem = public_key["publicKeyPem"].as_str()
        .ok_or(AuthenticationError::ActorError("key not found"))?;
    let public_key = deserialize_rsa_public_key(public_key_pem)?;
    Ok(public_key)
}

/// Verifies HTTP signature and returns ID of the signer.
/// The signer document is refreshed once if verification fails,
/// in case the key was rotated.
pub async fn verify_signed_request(
    activity_cache: &ActivityCache,
    request: &SignedRequest,
    request_body: &[u8],
) -> Result<String, AuthenticationError> {
    let signature_data = match parse_http_signature(request) {
        Ok(signature_data) => signature_data,
        Err(HttpSignatureError::NoSignature) => {
            return Err(AuthenticationError::NoHttpSignature);
        },
        Err(other_error) => return Err(other_error.into()),
    };
    let signer_id = signature_data.key_owner_id().to_string();
    if url::Url::parse(&signer_id).is_err() {
        return Err(AuthenticationError::InvalidKeyId);
    };
    let content_digest = Some(ContentDigest::new(request_body));
    let signer = activity_cache.load(&signer_id).await?;
    let signer_key = get_signer_key(&signer, &signature_data.key_id)?;
    match verify_http_signature(&signature_data, &signer_key, content_digest) {
        Ok(()) => (),
        Err(HttpSignatureError::InvalidSignature) => {
            log::info!("refreshing signer {signer_id}");
            let ReloadResult::Refreshed(signer) =
                activity_cache.force_reload(&signer_id).await?
            else {
                return Err(AuthenticationError::ActorError("signer is gone"));
            };
            let signer_key = get_signer_key(&signer, &signature_data.key_id)?;
            verify_http_signature(&signature_data, &signer_key, content_digest)?;
        },
        Err(other_error) => return Err(other_error.into()),
    };
    Ok(signer_id)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use serde_json::json;
    use emissary_models::database::test_utils::create_test_database;
    use crate::{
        http_signatures::{
            create_digest_header,
            signing::{
                create_http_signature,
                generate_weak_rsa_key,
                rsa_public_key_pem,
                weak_rsa_key_from_seed,
            },
        },
        test_utils::MockFetcher,
    };
    use super::*;

    const SIGNER_ID: &str = "https://remote.example/users/bob";
    const INBOX_URL: &str = "https://local.example/users/alice/inbox";

    fn signer_json(public_key_pem: &str) -> serde_json::Value {
        json!({
            "id": SIGNER_ID,
            "type": "Person",
            "inbox": format!("{SIGNER_ID}/inbox"),
            "publicKey": {
                "id": format!("{SIGNER_ID}#main-key"),
                "owner": SIGNER_ID,
                "publicKeyPem": public_key_pem,
            },
        })
    }

    fn sign(body: &[u8]) -> SignedRequest {
        let secret_key = generate_weak_rsa_key();
        let key_id = format!("{SIGNER_ID}#main-key");
        let headers = create_http_signature(INBOX_URL, body, &secret_key, &key_id);
        SignedRequest::new("POST", "/users/alice/inbox")
            .with_header("host", &headers.host)
            .with_header("date", &headers.date)
            .with_header("digest", &headers.digest)
            .with_header("signature", &headers.signature)
    }

    #[tokio::test]
    async fn test_verify_signed_request() {
        let db_client = create_test_database();
        let public_key_pem = rsa_public_key_pem(&generate_weak_rsa_key());
        let fetcher = MockFetcher::default()
            .with_object(signer_json(&public_key_pem));
        let cache = ActivityCache::new(db_client, Arc::new(fetcher));
        let body = br#"{"type":"Follow"}"#;
        let request = sign(body);

        let signer_id = verify_signed_request(&cache, &request, body).await.unwrap();
        assert_eq!(signer_id, SIGNER_ID);

        let error = verify_signed_request(&cache, &request, b"{}").await.err().unwrap();
        assert!(matches!(
            error,
            AuthenticationError::HttpSignatureError(HttpSignatureError::DigestMismatch),
        ));
    }

    #[tokio::test]
    async fn test_verify_signed_request_key_rotated() {
        let db_client = create_test_database();
        let public_key_pem = rsa_public_key_pem(&generate_weak_rsa_key());
        let fetcher = Arc::new(MockFetcher::default()
            .with_object(signer_json(&public_key_pem)));
        let cache = ActivityCache::new(db_client, fetcher.clone());
        // Cached copy has an old key
        let stale_key_pem = rsa_public_key_pem(&weak_rsa_key_from_seed(1));
        cache.put(SIGNER_ID, &signer_json(&stale_key_pem)).await.unwrap();
        let body = br#"{"type":"Follow"}"#;

        let signer_id = verify_signed_request(&cache, &sign(body), body).await.unwrap();
        assert_eq!(signer_id, SIGNER_ID);
        assert_eq!(fetcher.request_count(), 1);
    }

    #[tokio::test]
    async fn test_verify_request_without_signature() {
        let db_client = create_test_database();
        let cache = ActivityCache::new(db_client, Arc::new(MockFetcher::default()));
        let digest = create_digest_header(&ContentDigest::new(b"{}"));
        let request = SignedRequest::new("POST", "/users/alice/inbox")
            .with_header("digest", &digest);
        let error = verify_signed_request(&cache, &request, b"{}").await.err().unwrap();
        assert!(matches!(error, AuthenticationError::NoHttpSignature));
    }

    #[tokio::test]
    async fn test_verify_forged_signature() {
        let db_client = create_test_database();
        let public_key_pem = rsa_public_key_pem(&generate_weak_rsa_key());
        let fetcher = Arc::new(MockFetcher::default()
            .with_object(signer_json(&public_key_pem)));
        let cache = ActivityCache::new(db_client, fetcher.clone());
        let body = br#"{"type":"Follow"}"#;
        let request = sign(body).with_header("signature", &format!(
            r#"keyId="{SIGNER_ID}#main-key",headers="(request-target) host date digest",signature="Zm9yZ2Vk""#,
        ));
        let error = verify_signed_request(&cache, &request, body).await.err().unwrap();
        assert!(matches!(
            error,
            AuthenticationError::HttpSignatureError(HttpSignatureError::InvalidSignature),
        ));
        // Signer was refreshed once before rejection
        assert_eq!(fetcher.request_count(), 2);
    }
}
