use serde_json::{Error as JsonError};
use thiserror::Error;

use emissary_models::database::DatabaseError;

use crate::{
    deserialization::DeserializationError,
    fetch::FetchError,
};

/// Error classification used by the HTTP layer
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ErrorKind {
    BadRequest,
    Forbidden,
    Unauthorized,
    NotFound,
    Internal,
    NotImplemented,
}

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("{0}")]
    ValidationError(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    NotImplemented(String),

    #[error("{0}")]
    Internal(String),

    #[error(transparent)]
    FetchError(#[from] FetchError),

    #[error(transparent)]
    DatabaseError(#[from] DatabaseError),

    #[error("{handler}: {source}")]
    Handler {
        handler: &'static str,
        source: Box<HandlerError>,
    },
}

impl HandlerError {
    /// Wraps error with the name of the handler where it occurred.
    /// Classification is preserved.
    pub fn within(self, handler: &'static str) -> Self {
        Self::Handler { handler, source: Box::new(self) }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ValidationError(_) => ErrorKind::BadRequest,
            Self::Forbidden(_) => ErrorKind::Forbidden,
            Self::Unauthorized(_) => ErrorKind::Unauthorized,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::NotImplemented(_) => ErrorKind::NotImplemented,
            Self::Internal(_) => ErrorKind::Internal,
            // Transport errors can be retried by the sender
            Self::FetchError(FetchError::RequestError(_)) => ErrorKind::Internal,
            Self::FetchError(_) => ErrorKind::BadRequest,
            Self::DatabaseError(DatabaseError::NotFound(_)) => ErrorKind::NotFound,
            Self::DatabaseError(_) => ErrorKind::Internal,
            Self::Handler { source, .. } => source.kind(),
        }
    }
}

impl From<JsonError> for HandlerError {
    fn from(error: JsonError) -> Self {
        Self::ValidationError(format!("deserialization error: {error}"))
    }
}

impl From<DeserializationError> for HandlerError {
    fn from(error: DeserializationError) -> Self {
        Self::ValidationError(error.to_string())
    }
}
