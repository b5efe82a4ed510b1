use actix_web::{
    body::MessageBody,
    dev::ServiceResponse,
    http::{
        header as http_header,
        header::HeaderMap,
    },
    middleware::DefaultHeaders,
    HttpRequest,
    HttpResponse,
};
use log::Level;
use serde::Serialize;

use emissary_activitypub::{
    constants::AS_MEDIA_TYPE,
    http_signatures::SignedRequest,
};

use crate::errors::HttpError;

const JSON_MEDIA_TYPE: &str = "application/json";

pub fn create_default_headers_middleware() -> DefaultHeaders {
    DefaultHeaders::new()
        .add((http_header::CONTENT_SECURITY_POLICY, "default-src 'none'"))
        .add((http_header::X_CONTENT_TYPE_OPTIONS, "nosniff"))
}

pub fn log_response_error<B: MessageBody>(
    level: Level,
    response: &ServiceResponse<B>,
) -> () {
    let error_message = if let Some(error) = response.response().error() {
        // Actix error
        error.to_string()
    } else {
        response.response()
            .status().canonical_reason()
            .unwrap_or("unknown error")
            .to_owned()
    };
    log::log!(
        level,
        "{} {} : {}",
        response.request().method(),
        response.request().path(),
        error_message,
    );
}

/// Chooses response media type according to `Accept` header.
/// Returns `None` if client accepts neither ActivityPub nor JSON.
pub fn negotiate_media_type(headers: &HeaderMap) -> Option<&'static str> {
    let Some(accept) = headers.get(http_header::ACCEPT) else {
        return Some(AS_MEDIA_TYPE);
    };
    let accept = accept.to_str().ok()?;
    let mut fallback = None;
    for media_range in accept.split(',') {
        // Parameters (including JSON-LD profile) are not compared
        let media_type = media_range.split(';').next()
            .unwrap_or_default()
            .trim()
            .to_lowercase();
        match media_type.as_str() {
            "application/activity+json" | "application/ld+json" => {
                return Some(AS_MEDIA_TYPE);
            },
            JSON_MEDIA_TYPE => {
                fallback = fallback.or(Some(JSON_MEDIA_TYPE));
            },
            "*/*" | "application/*" => {
                fallback = fallback.or(Some(AS_MEDIA_TYPE));
            },
            _ => (),
        };
    };
    fallback
}

/// Serializes ActivityStreams document with negotiated content type
pub fn activitypub_response(
    headers: &HeaderMap,
    document: impl Serialize,
) -> Result<HttpResponse, HttpError> {
    let media_type = negotiate_media_type(headers)
        .ok_or(HttpError::NotAcceptable)?;
    let response = HttpResponse::Ok()
        .content_type(media_type)
        .json(document);
    Ok(response)
}

/// Compares secrets in constant time
pub fn tokens_match(provided: &str, expected: &str) -> bool {
    let provided = provided.as_bytes();
    let expected = expected.as_bytes();
    if provided.len() != expected.len() {
        return false;
    };
    provided.iter()
        .zip(expected)
        .fold(0, |diff, (a, b)| diff | (a ^ b)) == 0
}

pub fn to_signed_request(request: &HttpRequest) -> SignedRequest {
    request.headers().iter()
        .filter_map(|(name, value)| {
            value.to_str().ok().map(|value| (name.as_str(), value))
        })
        .fold(
            SignedRequest::new(request.method().as_str(), request.uri().path()),
            |signed_request, (name, value)| signed_request.with_header(name, value),
        )
}
