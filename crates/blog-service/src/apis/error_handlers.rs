use std::any::Any;

use axum::{
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use tracing::{debug, error};

use crate::utils::errors::{
    app_error::{AppError, SERVER_ERROR_TEMPLATE},
    error_payload::ErrorPayload,
};

/// Fallback for unknown routes.
pub async fn page_not_found(uri: Uri) -> AppError {
    debug!("No route for {}", uri);
    AppError::NotFound(uri.path().to_string())
}

/// Turns a handler panic into the server error document.
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let details = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Unknown panic message".to_string()
    };
    error!("Handler panicked: {}", details);

    let status = StatusCode::INTERNAL_SERVER_ERROR;
    let payload = ErrorPayload {
        template: SERVER_ERROR_TEMPLATE.to_string(),
        message: "Internal server error".to_string(),
        code: status.as_u16(),
        r#type: "INTERNAL_SERVER_ERROR".to_string(),
        details: None,
    };

    (status, Json(payload)).into_response()
}
