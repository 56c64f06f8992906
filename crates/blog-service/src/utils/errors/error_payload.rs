use serde::Serialize;
use utoipa::ToSchema;

/// The error view document
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorPayload {
    /// The template the error page renders with
    pub template: String,
    /// The error message
    pub message: String,
    /// The HTTP status code
    pub code: u16,
    /// The error type identifier
    pub r#type: String,
    /// Additional error details (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}
