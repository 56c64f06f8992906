use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::error;

use super::error_payload::ErrorPayload;

pub const BAD_REQUEST_TEMPLATE: &str = "misc/400.html";
pub const NOT_FOUND_TEMPLATE: &str = "misc/404.html";
pub const SERVER_ERROR_TEMPLATE: &str = "misc/500.html";

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("An error occurred while accessing the database")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Internal server error")]
    InternalServerError(),

    #[error("An error occurred while accessing the cache")]
    RedisError(#[from] redis::RedisError),

    #[error("An error occurred while accessing the media storage")]
    IoError(#[from] std::io::Error),

    #[error("An error occurred while reading the form")]
    MultipartError(#[from] MultipartError),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl AppError {
    pub fn code(&self) -> StatusCode {
        match self {
            AppError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InternalServerError() => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::RedisError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::IoError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            // 413 when the body limit cut the upload short, 400 otherwise.
            AppError::MultipartError(err) => err.status(),
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    fn error_type(&self) -> String {
        match self {
            AppError::DatabaseError(_) => "DATABASE_ERROR",
            AppError::InternalServerError() => "INTERNAL_SERVER_ERROR",
            AppError::RedisError(_) => "REDIS_ERROR",
            AppError::IoError(_) => "IO_ERROR",
            AppError::MultipartError(_) => "MULTIPART_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
        }
        .to_string()
    }

    pub fn template(&self) -> &'static str {
        let status = self.code();
        if status == StatusCode::NOT_FOUND {
            NOT_FOUND_TEMPLATE
        } else if status.is_client_error() {
            BAD_REQUEST_TEMPLATE
        } else {
            SERVER_ERROR_TEMPLATE
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.code();
        if status.is_server_error() {
            error!("Request failed: {:?}", self);
        }

        let error_response = ErrorPayload {
            template: self.template().to_string(),
            message: self.to_string(),
            code: status.as_u16(),
            r#type: self.error_type(),
            details: None,
        };

        // Kept on the response so outer middleware can enrich the document.
        let mut response = (status, Json(error_response.clone())).into_response();
        response.extensions_mut().insert(error_response);
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(AppError::NotFound("post".to_string()), StatusCode::NOT_FOUND, NOT_FOUND_TEMPLATE)]
    #[case(AppError::DatabaseError(sqlx::Error::PoolTimedOut), StatusCode::INTERNAL_SERVER_ERROR, SERVER_ERROR_TEMPLATE)]
    #[case(AppError::InternalServerError(), StatusCode::INTERNAL_SERVER_ERROR, SERVER_ERROR_TEMPLATE)]
    fn test_error_status_and_template(
        #[case] error: AppError,
        #[case] status: StatusCode,
        #[case] template: &str,
    ) {
        assert_eq!(error.code(), status);
        assert_eq!(error.template(), template);
    }

    #[test]
    fn test_response_carries_its_payload() {
        let response = AppError::NotFound("post".to_string()).into_response();
        let payload = response.extensions().get::<ErrorPayload>().unwrap();
        assert_eq!(payload.template, NOT_FOUND_TEMPLATE);
        assert!(payload.details.is_none());
    }
}
