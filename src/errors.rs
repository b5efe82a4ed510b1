use actix_web::{
    error::ResponseError,
    http::StatusCode,
    HttpResponse,
    HttpResponseBuilder,
};
use serde_json::json;
use thiserror::Error;

use emissary_activitypub::errors::{ErrorKind, HandlerError};
use emissary_models::database::DatabaseError;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("database error: {0}")]
    DatabaseError(#[source] DatabaseError),

    #[error("{0}")]
    ValidationError(String),

    #[error("{0}")]
    AuthError(String),

    #[error("{0}")]
    PermissionError(String),

    #[error("{0}")]
    NotFoundError(String),

    #[error("{0}")]
    NotSupported(String),

    #[error("not acceptable")]
    NotAcceptable,

    #[error("internal error: {0}")]
    InternalError(String),
}

impl HttpError {
    fn error_message(&self) -> String {
        match self {
            // Don't expose internal error details
            HttpError::DatabaseError(_) => "database error".to_owned(),
            HttpError::InternalError(_) => "internal error".to_owned(),
            other_error => other_error.to_string(),
        }
    }
}

impl From<DatabaseError> for HttpError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound(name) => {
                HttpError::NotFoundError(format!("{} not found", name))
            },
            DatabaseError::AlreadyExists(name) => HttpError::ValidationError(
                format!("{} already exists", name),
            ),
            _ => HttpError::DatabaseError(err),
        }
    }
}

impl From<HandlerError> for HttpError {
    fn from(error: HandlerError) -> Self {
        let message = error.to_string();
        match error.kind() {
            ErrorKind::BadRequest => Self::ValidationError(message),
            ErrorKind::Unauthorized => Self::AuthError(message),
            ErrorKind::Forbidden => Self::PermissionError(message),
            ErrorKind::NotFound => Self::NotFoundError(message),
            ErrorKind::NotImplemented => Self::NotSupported(message),
            ErrorKind::Internal => Self::InternalError(message),
        }
    }
}

impl ResponseError for HttpError {
    fn error_response(&self) -> HttpResponse {
        let error_data = json!({"error": self.error_message()});
        HttpResponseBuilder::new(self.status_code()).json(error_data)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            HttpError::ValidationError(_) => StatusCode::BAD_REQUEST,
            HttpError::AuthError(_) => StatusCode::UNAUTHORIZED,
            HttpError::PermissionError(_) => StatusCode::FORBIDDEN,
            HttpError::NotFoundError(_) => StatusCode::NOT_FOUND,
            HttpError::NotSupported(_) => StatusCode::NOT_IMPLEMENTED,
            HttpError::NotAcceptable => StatusCode::NOT_ACCEPTABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use actix_web::body::MessageBody;
    use super::*;

    #[test]
    fn test_error_message() {
        let db_error = DatabaseError::type_error();
        let error = HttpError::from(db_error);
        assert_eq!(error.to_string(), "database error: database type error");
        assert_eq!(error.error_message(), "database error");
    }

    #[test]
    fn test_handler_error_status() {
        let error = HttpError::from(
            HandlerError::Forbidden("actor mismatch".to_string())
                .within("accept_follow"),
        );
        assert_eq!(error.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(error.error_message(), "accept_follow: actor mismatch");

        let error = HttpError::from(HandlerError::NotImplemented(
            "public notes are not supported".to_string(),
        ));
        assert_eq!(error.status_code(), StatusCode::NOT_IMPLEMENTED);

        let error = HttpError::from(HandlerError::DatabaseError(DatabaseError::NotFound("user")));
        assert_eq!(error.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_internal_error_hidden() {
        let error = HttpError::from(HandlerError::Internal("lock poisoned".to_string()));
        let response = error.error_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = response.into_body().try_into_bytes().unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["error"], "internal error");
    }
}
