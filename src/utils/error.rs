use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CustomError {
    #[error("Validation Error: {0}")]
    ValidationError(String),

    #[error("Unauthenticated: {0}")]
    AuthenticationError(String),

    #[error("Not Found: {0}")]
    NotFoundError(String),

    #[error("Creation Failed: {0}")]
    CreationError(String),

    #[error("Storage Error: {0}")]
    StorageError(String),
}

impl ResponseError for CustomError {
    fn status_code(&self) -> StatusCode {
        match *self {
            CustomError::ValidationError(..) => StatusCode::BAD_REQUEST,
            CustomError::AuthenticationError(..) => StatusCode::UNAUTHORIZED,
            CustomError::NotFoundError(..) => StatusCode::NOT_FOUND,
            CustomError::CreationError(..) => StatusCode::INTERNAL_SERVER_ERROR,
            CustomError::StorageError(..) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error_message = json!({
            "success": false,
            "message": self.to_string(),
            "httpStatusCode": self.status_code().as_u16(),
            "error": match *self {
                CustomError::ValidationError(..) => "VALIDATION_ERROR",
                CustomError::AuthenticationError(..) => "UNAUTHENTICATED_ERROR",
                CustomError::NotFoundError(..) => "NOT_FOUND_ERROR",
                CustomError::CreationError(..) => "CREATION_ERROR",
                CustomError::StorageError(..) => "STORAGE_ERROR",
            },
            "service": std::env::var("SERVICE_NAME").unwrap_or_else(|_| "Unknown".to_string()),
        });

        HttpResponse::build(self.status_code()).json(error_message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_match_taxonomy() {
        assert_eq!(
            CustomError::ValidationError("bad".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            CustomError::AuthenticationError("no identity".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            CustomError::NotFoundError("missing".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            CustomError::CreationError("upload".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            CustomError::StorageError("driver".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn display_includes_cause() {
        let err = CustomError::CreationError("blob upload failed".into());
        assert!(err.to_string().contains("blob upload failed"));
    }
}
