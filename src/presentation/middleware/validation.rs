use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    Json,
};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::application::dto::Validate;
use crate::presentation::middleware::error::AppError;

/// JSON body extractor that runs [`Validate`] before the handler sees the value
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(map_rejection)?;
        value.validate()?;
        Ok(Self(value))
    }
}

/// Translate axum's JSON rejections into the error envelope
fn map_rejection(rejection: JsonRejection) -> AppError {
    debug!(status = rejection.status().as_u16(), "Rejected JSON body: {}", rejection.body_text());

    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return AppError::PayloadTooLarge { message: "Request body is too large".to_string() };
    }

    match rejection {
        JsonRejection::MissingJsonContentType(_) => AppError::UnsupportedMediaType {
            content_type: "expected application/json".to_string(),
        },
        JsonRejection::JsonDataError(err) => {
            AppError::invalid_field("body", data_error_message(&err.body_text()))
        }
        JsonRejection::JsonSyntaxError(_) => AppError::BadRequest {
            code: "INVALID_JSON",
            message: "Request body is not valid JSON".to_string(),
        },
        other => AppError::BadRequest { code: "INVALID_BODY", message: other.body_text() },
    }
}

/// Strip axum's generic prefix, leaving serde's description of the problem
fn data_error_message(text: &str) -> String {
    text.strip_prefix("Failed to deserialize the JSON body into the target type: ")
        .unwrap_or(text)
        .to_string()
}
