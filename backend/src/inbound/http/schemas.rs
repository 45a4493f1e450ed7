//! OpenAPI mirrors of the domain error types.
//!
//! The domain crate does not derive `ToSchema`; these shapes stand in for
//! [`crate::domain::ErrorCode`] and [`crate::domain::Error`] in the document.

use utoipa::ToSchema;

/// Error category.
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The inventory store cannot answer right now.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// Unexpected failure; details are withheld.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// Error envelope.
#[derive(ToSchema)]
#[schema(as = crate::domain::Error, rename_all = "camelCase")]
#[expect(dead_code, reason = "fields exist only to shape the OpenAPI schema")]
pub struct ErrorSchema {
    #[schema(example = "service_unavailable")]
    code: ErrorCodeSchema,
    #[schema(example = "inventory store is unavailable")]
    message: String,
    /// Same value as the `trace-id` response header.
    #[schema(example = "6f1c1f52-4a43-4c8e-9e3a-3d6f5c0f4b11")]
    trace_id: Option<String>,
    details: Option<serde_json::Value>,
}
