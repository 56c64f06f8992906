use axum::{
    body::Body,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::utils::errors::error_payload::ErrorPayload;

/// Adds the requested path to every not-found document, whichever handler
/// produced it.
pub async fn attach_request_path(request: Request<Body>, next: Next) -> Response {
    let path = request.uri().path().to_string();
    let response = next.run(request).await;
    if response.status() != StatusCode::NOT_FOUND {
        return response;
    }

    match response.extensions().get::<ErrorPayload>() {
        Some(payload) => {
            let mut payload = payload.clone();
            payload.details = Some(json!({ "path": path }));
            (StatusCode::NOT_FOUND, Json(payload)).into_response()
        }
        None => response,
    }
}
