use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{error, warn};
use utoipa::ToSchema;

/// Message returned to clients for every 5xx; the cause is only logged
pub const GENERIC_SERVER_MESSAGE: &str = "An unexpected error occurred";

/// Application error types that can be converted to HTTP responses
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    #[error("Access denied: {message}")]
    Forbidden { code: &'static str, message: String },

    #[error("Validation failed")]
    Validation { errors: BTreeMap<String, String> },

    #[error("{message}")]
    BadRequest { code: &'static str, message: String },

    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    #[error("{message}")]
    Conflict { code: &'static str, message: String },

    #[error("Request too large: {message}")]
    PayloadTooLarge { message: String },

    #[error("Unsupported media type: {content_type}")]
    UnsupportedMediaType { content_type: String },

    /// Database rejected the statement (constraint, type or syntax error)
    #[error("Database error {code}: {message}")]
    Database { code: String, message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Internal server error: {message}")]
    Internal { message: String },

    #[error("Service temporarily unavailable: {message}")]
    ServiceUnavailable { message: String },
}

impl AppError {
    /// Shorthand for a single-field validation failure
    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        let mut errors = BTreeMap::new();
        errors.insert(field.to_string(), message.into());
        AppError::Validation { errors }
    }

    /// True when the database rejected a duplicate unique key
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, AppError::Database { code, .. } if code == "DB_23505")
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Authentication { .. } => StatusCode::UNAUTHORIZED,
            AppError::Forbidden { .. } => StatusCode::FORBIDDEN,
            AppError::Validation { .. } | AppError::BadRequest { .. } | AppError::Database { .. } => {
                StatusCode::BAD_REQUEST
            }
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::UnsupportedMediaType { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            AppError::Storage { .. } | AppError::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Machine-readable error code placed in the response envelope
    pub fn code(&self) -> String {
        match self {
            AppError::Authentication { .. } => "UNAUTHORIZED".to_string(),
            AppError::Forbidden { code, .. }
            | AppError::BadRequest { code, .. }
            | AppError::Conflict { code, .. } => (*code).to_string(),
            AppError::Validation { .. } => "VALIDATION_ERROR".to_string(),
            AppError::NotFound { .. } => "NOT_FOUND".to_string(),
            AppError::PayloadTooLarge { .. } => "PAYLOAD_TOO_LARGE".to_string(),
            AppError::UnsupportedMediaType { .. } => "UNSUPPORTED_MEDIA_TYPE".to_string(),
            AppError::Database { code, .. } => code.clone(),
            AppError::Storage { .. } | AppError::Internal { .. } => "INTERNAL_ERROR".to_string(),
            AppError::ServiceUnavailable { .. } => "SERVICE_UNAVAILABLE".to_string(),
        }
    }

    /// Check if this error should be logged as an error (vs warning)
    pub fn should_log_as_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// Message safe to show to the client
    fn public_message(&self) -> String {
        if self.status_code().is_server_error() {
            return GENERIC_SERVER_MESSAGE.to_string();
        }
        match self {
            AppError::Authentication { message }
            | AppError::Forbidden { message, .. }
            | AppError::BadRequest { message, .. }
            | AppError::Conflict { message, .. }
            | AppError::PayloadTooLarge { message }
            | AppError::Database { message, .. } => message.clone(),
            AppError::Validation { .. } => "Request validation failed".to_string(),
            _ => self.to_string(),
        }
    }

    /// Get additional error details
    fn details(&self) -> Option<Value> {
        match self {
            AppError::Validation { errors } => Some(json!({ "fields": errors })),
            AppError::NotFound { resource } => Some(json!({ "resource": resource })),
            AppError::UnsupportedMediaType { content_type } => {
                Some(json!({ "contentType": content_type }))
            }
            _ => None,
        }
    }

    /// Build the response envelope; the trace id is filled in by the trace id middleware
    pub fn to_error_body(&self, trace_id: Option<&str>) -> ErrorBody {
        ErrorBody {
            error: ErrorDetail {
                code: self.code(),
                message: self.public_message(),
                details: self.details(),
                trace_id: trace_id.map(String::from),
            },
        }
    }
}

/// Standard error envelope: `{ "error": { code, message, details?, traceId } }`
#[derive(Serialize, Debug, Clone, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Serialize, Debug, Clone, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub details: Option<Value>,
    pub trace_id: Option<String>,
}

impl ErrorBody {
    /// Envelope for error responses produced outside of [`AppError`] (framework rejections)
    pub fn from_status(status: StatusCode, message: Option<String>) -> Self {
        let code = status
            .canonical_reason()
            .unwrap_or("ERROR")
            .to_uppercase()
            .replace([' ', '-'], "_");
        let message = message.filter(|m| !m.trim().is_empty()).unwrap_or_else(|| {
            if status.is_server_error() {
                GENERIC_SERVER_MESSAGE.to_string()
            } else {
                status.canonical_reason().unwrap_or("Request failed").to_string()
            }
        });
        Self { error: ErrorDetail { code, message, details: None, trace_id: None } }
    }

    #[must_use]
    pub fn with_trace_id(mut self, trace_id: &str) -> Self {
        self.error.trace_id = Some(trace_id.to_string());
        self
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = self.to_error_body(None);

        if self.should_log_as_error() {
            error!(code = %body.error.code, status = status.as_u16(), "Application error: {}", self);
        } else {
            warn!(code = %body.error.code, status = status.as_u16(), "Request rejected: {}", self);
        }

        let mut response = (status, Json(&body)).into_response();
        // Picked up by the trace id middleware to re-render the body with the trace id
        response.extensions_mut().insert(body);
        response
    }
}

/// Convert sqlx errors: statements the database rejected become 400 with a `DB_` code
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => {
                let code = db_err.code().map(|c| c.to_string());
                warn!(sqlstate = ?code, "Database rejected statement: {}", db_err.message());
                let message = match code.as_deref() {
                    Some("23505") => "A record with the same unique value already exists",
                    Some("23503") => "A referenced record does not exist",
                    Some("23514" | "23502") => "The record violates a data constraint",
                    _ => "The database rejected the request",
                };
                AppError::Database {
                    code: format!("DB_{}", code.unwrap_or_else(|| "ERROR".to_string())),
                    message: message.to_string(),
                }
            }
            sqlx::Error::RowNotFound => AppError::NotFound { resource: "record".to_string() },
            sqlx::Error::PoolTimedOut => {
                AppError::ServiceUnavailable { message: "database pool timed out".to_string() }
            }
            other => AppError::Internal { message: other.to_string() },
        }
    }
}

impl From<crate::domain::services::CapacityError> for AppError {
    fn from(err: crate::domain::services::CapacityError) -> Self {
        AppError::Conflict { code: "EVENT_FULL", message: err.to_string() }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::BadRequest { code: "INVALID_JSON", message: format!("Invalid JSON: {err}") }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use std::borrow::Cow;

    #[derive(Debug)]
    struct FakeDbError {
        code: Option<&'static str>,
    }

    impl std::fmt::Display for FakeDbError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("duplicate key value violates unique constraint \"users_email_key\"")
        }
    }

    impl std::error::Error for FakeDbError {}

    impl sqlx::error::DatabaseError for FakeDbError {
        fn message(&self) -> &str {
            "duplicate key value violates unique constraint \"users_email_key\""
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            self.code.map(Cow::Borrowed)
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> sqlx::error::ErrorKind {
            sqlx::error::ErrorKind::UniqueViolation
        }
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            AppError::Authentication { message: "test".to_string() }.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::Forbidden { code: "FORBIDDEN", message: "test".to_string() }.status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::Validation { errors: BTreeMap::new() }.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Conflict { code: "EVENT_FULL", message: "full".to_string() }.status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::Storage { message: "s3 down".to_string() }.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(AppError::Authentication { message: "x".to_string() }.code(), "UNAUTHORIZED");
        assert_eq!(AppError::NotFound { resource: "event".to_string() }.code(), "NOT_FOUND");
        assert_eq!(
            AppError::Forbidden { code: "TENANT_INACTIVE", message: "x".to_string() }.code(),
            "TENANT_INACTIVE"
        );
        assert_eq!(AppError::Internal { message: "x".to_string() }.code(), "INTERNAL_ERROR");
    }

    #[test]
    fn test_server_errors_hide_cause() {
        let body = AppError::Internal { message: "password=hunter2".to_string() }
            .to_error_body(Some("trace-1"));

        assert_eq!(body.error.message, GENERIC_SERVER_MESSAGE);
        assert_eq!(body.error.trace_id.as_deref(), Some("trace-1"));
    }

    #[test]
    fn test_validation_error_details() {
        let mut errors = BTreeMap::new();
        errors.insert("email".to_string(), "Email format is invalid".to_string());
        errors.insert("capacity".to_string(), "Must be at least 1".to_string());

        let body = AppError::Validation { errors }.to_error_body(None);
        let details = body.error.details.unwrap();

        assert_eq!(body.error.code, "VALIDATION_ERROR");
        assert_eq!(details["fields"]["email"], "Email format is invalid");
        assert_eq!(details["fields"]["capacity"], "Must be at least 1");
    }

    #[test]
    fn test_database_errors_map_to_prefixed_bad_request() {
        let err: AppError =
            sqlx::Error::Database(Box::new(FakeDbError { code: Some("23505") })).into();

        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), "DB_23505");
        assert!(err.is_unique_violation());
        assert!(!err.to_error_body(None).error.message.contains("users_email_key"));

        let err: AppError = sqlx::Error::Database(Box::new(FakeDbError { code: None })).into();
        assert_eq!(err.code(), "DB_ERROR");
    }

    #[test]
    fn test_other_sqlx_errors_fall_back_to_server_error() {
        let err: AppError = sqlx::Error::PoolClosed.into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code(), "INTERNAL_ERROR");
    }

    #[test]
    fn test_capacity_error_is_event_full_conflict() {
        let err: AppError = crate::domain::services::ensure_capacity(3, 3).unwrap_err().into();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(err.code(), "EVENT_FULL");
    }

    #[test]
    fn test_envelope_from_framework_status() {
        let body = ErrorBody::from_status(StatusCode::METHOD_NOT_ALLOWED, None);
        assert_eq!(body.error.code, "METHOD_NOT_ALLOWED");
        assert_eq!(body.error.message, "Method Not Allowed");

        let body = ErrorBody::from_status(StatusCode::BAD_GATEWAY, Some(String::new()));
        assert_eq!(body.error.message, GENERIC_SERVER_MESSAGE);
    }

    #[tokio::test]
    async fn test_into_response_writes_envelope_and_extension() {
        let response = AppError::NotFound { resource: "event".to_string() }.into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.extensions().get::<ErrorBody>().is_some());

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["error"]["code"], "NOT_FOUND");
        assert_eq!(json["error"]["details"]["resource"], "event");
        assert!(json["error"].get("traceId").is_some());
    }
}
