use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use reqwest::{header, Client, Response, StatusCode};
use serde_json::{Value as JsonValue};
use url::Url;

use emissary_config::Instance;

use crate::constants::AP_MEDIA_TYPE;

#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("inavlid URL")]
    UrlError,

    #[error(transparent)]
    RequestError(#[from] reqwest::Error),

    #[error("access denied: {0}")]
    Forbidden(String),

    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("resource is gone: {0}")]
    Gone(String),

    #[error("json parse error: {0}")]
    JsonParseError(#[from] serde_json::Error),

    #[error("object without ID at {0}")]
    NoObjectId(String),

    #[error("unexpected object ID at {0}")]
    UnexpectedObjectId(String),

    #[error("response size exceeds limit: {0}")]
    ResponseTooLarge(String),
}

impl FetchError {
    /// Returns `true` if the document no longer exists
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::Gone(_))
    }
}

/// Dereferences ActivityPub documents
pub trait Fetcher: Send + Sync {
    fn fetch_object<'a>(
        &'a self,
        object_id: &'a str,
    ) -> BoxFuture<'a, Result<JsonValue, FetchError>>;
}

pub fn is_same_origin(url_1: &str, url_2: &str) -> Result<bool, FetchError> {
    let url_1 = Url::parse(url_1).map_err(|_| FetchError::UrlError)?;
    let url_2 = Url::parse(url_2).map_err(|_| FetchError::UrlError)?;
    Ok(url_1.origin() == url_2.origin())
}

/// Checks that fetched object was served by its origin
pub fn verify_fetched_object(
    object_id: &str,
    object_json: &JsonValue,
) -> Result<(), FetchError> {
    let fetched_id = object_json["id"].as_str()
        .ok_or(FetchError::NoObjectId(object_id.to_string()))?;
    if !is_same_origin(fetched_id, object_id)? {
        return Err(FetchError::UnexpectedObjectId(object_id.to_string()));
    };
    Ok(())
}

fn fetcher_error_for_status(error: reqwest::Error) -> FetchError {
    match (error.url(), error.status()) {
        (Some(url), Some(StatusCode::FORBIDDEN)) => {
            FetchError::Forbidden(url.to_string())
        },
        (Some(url), Some(StatusCode::NOT_FOUND)) => {
            FetchError::NotFound(url.to_string())
        },
        (Some(url), Some(StatusCode::GONE)) => {
            FetchError::Gone(url.to_string())
        },
        _ => error.into(),
    }
}

/// Reads response body, returns `None` if it is larger than `limit`
pub async fn limited_response(
    response: &mut Response,
    limit: usize,
) -> Result<Option<Vec<u8>>, reqwest::Error> {
    if response.content_length().is_some_and(|length| length > limit as u64) {
        return Ok(None);
    };
    let mut bytes = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        if bytes.len() + chunk.len() > limit {
            return Ok(None);
        };
        bytes.extend_from_slice(&chunk);
    };
    Ok(Some(bytes))
}

pub struct HttpFetcher {
    client: Client,
    response_size_limit: usize,
}

impl HttpFetcher {
    pub fn new(instance: &Instance) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(instance.fetcher_timeout))
            .user_agent(instance.agent())
            .build()?;
        Ok(Self {
            client,
            response_size_limit: instance.fetcher_response_size_limit,
        })
    }

    async fn fetch(&self, object_id: &str) -> Result<JsonValue, FetchError> {
        Url::parse(object_id).map_err(|_| FetchError::UrlError)?;
        let mut response = self.client.get(object_id)
            .header(header::ACCEPT, AP_MEDIA_TYPE)
            .send().await?
            .error_for_status()
            .map_err(fetcher_error_for_status)?;
        let data = limited_response(&mut response, self.response_size_limit)
            .await?
            .ok_or(FetchError::ResponseTooLarge(object_id.to_string()))?;
        let object_json: JsonValue = serde_json::from_slice(&data)?;
        verify_fetched_object(object_id, &object_json)?;
        Ok(object_json)
    }
}

impl Fetcher for HttpFetcher {
    fn fetch_object<'a>(
        &'a self,
        object_id: &'a str,
    ) -> BoxFuture<'a, Result<JsonValue, FetchError>> {
        log::info!("fetching object {object_id}");
        self.fetch(object_id).boxed()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use super::*;

    #[test]
    fn test_verify_fetched_object() {
        let object_id = "https://remote.example/objects/1";
        let object_json = json!({"id": object_id});
        assert!(verify_fetched_object(object_id, &object_json).is_ok());

        let object_json = json!({"type": "Note"});
        let error = verify_fetched_object(object_id, &object_json).err().unwrap();
        assert!(matches!(error, FetchError::NoObjectId(_)));

        let object_json = json!({"id": "https://other.example/objects/1"});
        let error = verify_fetched_object(object_id, &object_json).err().unwrap();
        assert!(matches!(error, FetchError::UnexpectedObjectId(_)));
    }

    #[tokio::test]
    async fn test_limited_response() {
        let body = r#"{"id":"https://remote.example/objects/1"}"#;
        let mut response = Response::from(http::Response::new(body));
        let data = limited_response(&mut response, 1000).await.unwrap();
        assert_eq!(data.unwrap(), body.as_bytes());

        let mut response = Response::from(http::Response::new(body));
        let data = limited_response(&mut response, 10).await.unwrap();
        assert_eq!(data, None);
    }
}
