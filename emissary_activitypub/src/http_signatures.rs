//! HTTP signatures (draft-cavage-http-signatures) and content digests
use std::collections::HashMap;
use std::sync::OnceLock;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::{DateTime, Duration, TimeZone, Utc};
use regex::Regex;
use rsa::{
    pkcs1::DecodeRsaPublicKey,
    pkcs1v15::{Signature, VerifyingKey},
    pkcs8::DecodePublicKey,
    signature::Verifier,
    RsaPublicKey,
};
use sha2::{Digest, Sha256};

const SIGNATURE_PARAMETER_RE: &str = r#"^(?P<key>[a-zA-Z]+)=(?P<value>.+)$"#;
// https://www.rfc-editor.org/rfc/rfc3230
const DIGEST_RE: &str = r"^(?P<algorithm>[\w-]+)=(?P<digest>[^,]+)(,|$)";

const SIGNATURE_EXPIRES_IN: i64 = 12; // 12 hours

fn signature_parameter_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(SIGNATURE_PARAMETER_RE).expect("regexp should be valid")
    })
}

fn digest_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(DIGEST_RE).expect("regexp should be valid"))
}

#[derive(thiserror::Error, Debug)]
pub enum HttpSignatureVerificationError {
    #[error("HTTP method not supported")]
    MethodNotSupported,

    #[error("missing signature header")]
    NoSignature,

    #[error("{0}")]
    HeaderError(&'static str),

    #[error("{0}")]
    ParseError(&'static str),

    #[error("invalid encoding")]
    InvalidEncoding(#[from] base64::DecodeError),

    #[error("signature has expired")]
    Expired,

    #[error("digest mismatch")]
    DigestMismatch,

    #[error("invalid signature")]
    InvalidSignature,
}

type VerificationError = HttpSignatureVerificationError;

/// Request line and headers of an incoming request.
/// Header names are stored in lowercase.
pub struct SignedRequest {
    pub method: String,
    pub path: String,
    headers: HashMap<String, String>,
}

impl SignedRequest {
    pub fn new(method: &str, path: &str) -> Self {
        Self {
            method: method.to_lowercase(),
            path: path.to_string(),
            headers: HashMap::new(),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_lowercase(), value.to_string());
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(|value| value.as_str())
    }

    pub fn is_signed(&self) -> bool {
        self.headers.contains_key("signature")
    }
}

/// SHA-256 digest of a request body
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContentDigest([u8; 32]);

impl ContentDigest {
    pub fn new(request_body: &[u8]) -> Self {
        Self(Sha256::digest(request_body).into())
    }
}

pub fn create_digest_header(digest: &ContentDigest) -> String {
    format!("SHA-256={}", BASE64.encode(digest.0))
}

fn parse_digest_header(
    header_value: &str,
) -> Result<ContentDigest, &'static str> {
    let caps = digest_re().captures(header_value)
        .ok_or("invalid digest header value")?;
    // Algorithm names are case-insensitive
    let algorithm = caps["algorithm"].to_uppercase();
    if algorithm != "SHA-256" {
        return Err("unexpected digest algorithm");
    };
    let digest = BASE64.decode(&caps["digest"])
        .map_err(|_| "invalid digest encoding")?
        .try_into()
        .map_err(|_| "invalid digest length")?;
    Ok(ContentDigest(digest))
}

fn remove_quotes(value: &str) -> String {
    value
        .strip_prefix('"')
        .and_then(|val| val.strip_suffix('"'))
        .unwrap_or(value)
        .to_string()
}

pub struct HttpSignatureData {
    pub key_id: String,
    pub message: String, // reconstructed message
    pub signature: String, // base64-encoded signature
    pub expires_at: DateTime<Utc>,
    pub content_digest: Option<ContentDigest>,
}

impl HttpSignatureData {
    /// Key ID without fragment
    pub fn key_owner_id(&self) -> &str {
        self.key_id.split('#').next().unwrap_or(&self.key_id)
    }
}

pub fn parse_http_signature(
    request: &SignedRequest,
) -> Result<HttpSignatureData, VerificationError> {
    let maybe_digest = match request.method.as_str() {
        "get" => None,
        "post" => {
            let digest_header = request.header("digest")
                .ok_or(VerificationError::HeaderError("missing 'digest' header"))?;
            let digest = parse_digest_header(digest_header)
                .map_err(VerificationError::HeaderError)?;
            Some(digest)
        },
        _ => return Err(VerificationError::MethodNotSupported),
    };

    let signature_header = request.header("signature")
        .ok_or(VerificationError::NoSignature)?;
    let mut signature_parameters = HashMap::new();
    for item in signature_header.split(',') {
        let caps = signature_parameter_re().captures(item.trim())
            .ok_or(VerificationError::HeaderError("invalid signature header"))?;
        let key = caps["key"].to_string();
        let value = remove_quotes(&caps["value"]);
        signature_parameters.insert(key, value);
    };

    let key_id = signature_parameters.get("keyId")
        .ok_or(VerificationError::ParseError("keyId parameter is missing"))?
        .to_owned();
    url::Url::parse(&key_id)
        .map_err(|_| VerificationError::ParseError("invalid key ID"))?;
    let headers_parameter = signature_parameters.get("headers")
        .ok_or(VerificationError::ParseError("headers parameter is missing"))?
        .to_owned();
    let signature = signature_parameters.get("signature")
        .ok_or(VerificationError::ParseError("signature is missing"))?
        .to_owned();
    let created_at = if let Some(created_at) = signature_parameters.get("created") {
        let created_at_timestamp = created_at.parse()
            .map_err(|_| VerificationError::ParseError("invalid timestamp"))?;
        Utc.timestamp_opt(created_at_timestamp, 0).single()
            .ok_or(VerificationError::ParseError("invalid timestamp"))?
    } else {
        let date_str = request.header("date")
            .ok_or(VerificationError::HeaderError("missing date"))?;
        let date = DateTime::parse_from_rfc2822(date_str)
            .map_err(|_| VerificationError::HeaderError("invalid date"))?;
        date.with_timezone(&Utc)
    };
    let expires_at = created_at + Duration::hours(SIGNATURE_EXPIRES_IN);

    let mut message_parts = vec![];
    for header in headers_parameter.split(' ') {
        let message_part = if header == "(request-target)" {
            format!("(request-target): {} {}", request.method, request.path)
        } else if header == "(created)" {
            let created = signature_parameters.get("created")
                .ok_or(VerificationError::ParseError("created parameter is missing"))?;
            format!("(created): {created}")
        } else {
            let header_value = request.header(&header.to_lowercase())
                .ok_or(VerificationError::HeaderError("missing header"))?;
            format!("{header}: {header_value}")
        };
        message_parts.push(message_part);
    };
    let message = message_parts.join("\n");

    let signature_data = HttpSignatureData {
        key_id,
        message,
        signature,
        expires_at,
        content_digest: maybe_digest,
    };
    Ok(signature_data)
}

pub fn verify_http_signature(
    signature_data: &HttpSignatureData,
    signer_key: &RsaPublicKey,
    content_digest: Option<ContentDigest>,
) -> Result<(), VerificationError> {
    if signature_data.expires_at < Utc::now() {
        return Err(VerificationError::Expired);
    };
    if signature_data.content_digest != content_digest {
        return Err(VerificationError::DigestMismatch);
    };
    let signature = BASE64.decode(&signature_data.signature)?;
    let signature = Signature::try_from(signature.as_slice())
        .map_err(|_| VerificationError::InvalidSignature)?;
    VerifyingKey::<Sha256>::new(signer_key.clone())
        .verify(signature_data.message.as_bytes(), &signature)
        .map_err(|_| VerificationError::InvalidSignature)
}

#[derive(thiserror::Error, Debug)]
#[error("invalid public key")]
pub struct InvalidPublicKey;

/// Accepts PKCS#1 and SPKI (PKCS#8) PEM encodings
pub fn deserialize_rsa_public_key(
    public_key_pem: &str,
) -> Result<RsaPublicKey, InvalidPublicKey> {
    let public_key_pem = public_key_pem.trim();
    if public_key_pem.contains("BEGIN RSA PUBLIC KEY") {
        return RsaPublicKey::from_pkcs1_pem(public_key_pem)
            .map_err(|_| InvalidPublicKey);
    };
    RsaPublicKey::from_public_key_pem(public_key_pem)
        .map_err(|_| InvalidPublicKey)
}

#[cfg(any(test, feature = "test-utils"))]
pub mod signing {
    use chrono::Utc;
    use rsa::{
        pkcs1v15::SigningKey,
        pkcs8::{EncodePublicKey, LineEnding},
        signature::{SignatureEncoding, Signer},
        RsaPrivateKey,
    };
    use sha2::Sha256;

    use super::{create_digest_header, ContentDigest, BASE64, Engine};

    // https://www.rfc-editor.org/rfc/rfc9110#http.date
    const HTTP_SIGNATURE_DATE_FORMAT: &str = "%a, %d %b %Y %T GMT";

    pub fn weak_rsa_key_from_seed(seed: u64) -> RsaPrivateKey {
        use rand::SeedableRng;
        let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
        RsaPrivateKey::new(&mut rng, 512).expect("key should be generated")
    }

    pub fn generate_weak_rsa_key() -> RsaPrivateKey {
        weak_rsa_key_from_seed(0)
    }

    pub fn rsa_public_key_pem(secret_key: &RsaPrivateKey) -> String {
        secret_key.to_public_key()
            .to_public_key_pem(LineEnding::LF)
            .expect("public key should be serializable")
    }

    pub struct HttpSignatureHeaders {
        pub host: String,
        pub date: String,
        pub digest: String,
        pub signature: String,
    }

    /// Signs a POST request
    pub fn create_http_signature(
        request_url: &str,
        request_body: &[u8],
        secret_key: &RsaPrivateKey,
        key_id: &str,
    ) -> HttpSignatureHeaders {
        let request_url = url::Url::parse(request_url).expect("URL should be valid");
        let request_target = format!("post {}", request_url.path());
        let host = request_url.host_str().expect("URL should have host").to_string();
        let date = Utc::now().format(HTTP_SIGNATURE_DATE_FORMAT).to_string();
        let digest = create_digest_header(&ContentDigest::new(request_body));
        let message = format!(
            "(request-target): {request_target}\nhost: {host}\ndate: {date}\ndigest: {digest}",
        );
        let signing_key = SigningKey::<Sha256>::new(secret_key.clone());
        let signature = signing_key.sign(message.as_bytes()).to_vec();
        let signature_header = format!(
            r#"keyId="{}",algorithm="rsa-sha256",headers="(request-target) host date digest",signature="{}""#,
            key_id,
            BASE64.encode(signature),
        );
        HttpSignatureHeaders { host, date, digest, signature: signature_header }
    }
}

#[cfg(test)]
mod tests {
    use super::signing::*;
    use super::*;

    const KEY_ID: &str = "https://remote.example/users/bob#main-key";
    const INBOX_URL: &str = "https://local.example/users/alice/inbox";

    fn signed_request(body: &[u8]) -> SignedRequest {
        let secret_key = generate_weak_rsa_key();
        let headers = create_http_signature(INBOX_URL, body, &secret_key, KEY_ID);
        SignedRequest::new("POST", "/users/alice/inbox")
            .with_header("Host", &headers.host)
            .with_header("Date", &headers.date)
            .with_header("Digest", &headers.digest)
            .with_header("Signature", &headers.signature)
    }

    #[test]
    fn test_parse_signature_get() {
        let request = SignedRequest::new("GET", "/user/123/inbox")
            .with_header("host", "example.com")
            .with_header("date", "20 Oct 2022 20:00:00 GMT")
            .with_header("signature", concat!(
                r#"keyId="https://myserver.org/actor#main-key","#,
                r#"algorithm=hs2019,"#,
                r#"headers="(request-target) host date","#,
                r#"signature="test""#,
            ));
        let signature_data = parse_http_signature(&request).unwrap();
        assert_eq!(signature_data.key_id, "https://myserver.org/actor#main-key");
        assert_eq!(signature_data.key_owner_id(), "https://myserver.org/actor");
        assert_eq!(
            signature_data.message,
            "(request-target): get /user/123/inbox\nhost: example.com\ndate: 20 Oct 2022 20:00:00 GMT",
        );
        assert_eq!(signature_data.signature, "test");
        assert_eq!(signature_data.content_digest, None);
    }

    #[test]
    fn test_parse_signature_post_without_digest() {
        let request = SignedRequest::new("POST", "/users/alice/inbox")
            .with_header("signature", r#"keyId="https://remote.example/actor#main-key""#);
        let error = parse_http_signature(&request).err().unwrap();
        assert!(matches!(error, VerificationError::HeaderError(_)));
    }

    #[test]
    fn test_create_and_verify_signature() {
        let body = br#"{"type":"Follow"}"#;
        let request = signed_request(body);
        let signature_data = parse_http_signature(&request).unwrap();
        assert_eq!(signature_data.key_owner_id(), "https://remote.example/users/bob");

        let public_key = generate_weak_rsa_key().to_public_key();
        let result = verify_http_signature(
            &signature_data,
            &public_key,
            Some(ContentDigest::new(body)),
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_verify_signature_body_changed() {
        let request = signed_request(br#"{"type":"Follow"}"#);
        let signature_data = parse_http_signature(&request).unwrap();
        let public_key = generate_weak_rsa_key().to_public_key();
        let error = verify_http_signature(
            &signature_data,
            &public_key,
            Some(ContentDigest::new(br#"{"type":"Block"}"#)),
        ).err().unwrap();
        assert!(matches!(error, VerificationError::DigestMismatch));
    }

    #[test]
    fn test_verify_forged_signature() {
        let request = signed_request(b"{}")
            .with_header("Signature", &format!(
                r#"keyId="{KEY_ID}",headers="(request-target) host date digest",signature="Zm9yZ2Vk""#,
            ));
        let signature_data = parse_http_signature(&request).unwrap();
        let public_key = generate_weak_rsa_key().to_public_key();
        let error = verify_http_signature(
            &signature_data,
            &public_key,
            Some(ContentDigest::new(b"{}")),
        ).err().unwrap();
        assert!(matches!(error, VerificationError::InvalidSignature));
    }

    #[test]
    fn test_parse_digest_header_multiple_digests() {
        let digest = ContentDigest::new(b"test*123");
        let header_value = format!("sha-256={},unixsum=30637", BASE64.encode(digest.0));
        let parsed = parse_digest_header(&header_value).unwrap();
        assert_eq!(parsed, digest);
    }

    #[test]
    fn test_deserialize_rsa_public_key() {
        let secret_key = generate_weak_rsa_key();
        let public_key_pem = rsa_public_key_pem(&secret_key);
        let public_key = deserialize_rsa_public_key(&public_key_pem).unwrap();
        assert_eq!(public_key, secret_key.to_public_key());
        assert!(deserialize_rsa_public_key("invalid").is_err());
    }
}
