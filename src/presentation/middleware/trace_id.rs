use axum::{
    extract::{FromRequestParts, Request},
    http::{header, request::Parts, HeaderName, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use std::convert::Infallible;
use tracing::Span;
use uuid::Uuid;

use crate::presentation::middleware::error::ErrorBody;

pub const TRACE_ID_HEADER: HeaderName = HeaderName::from_static("x-trace-id");

/// Longest inbound trace id that is echoed back instead of replaced
const MAX_TRACE_ID_LEN: usize = 128;

/// Per-request correlation id, echoed in `x-trace-id` and every error envelope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceId(pub String);

impl TraceId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Reuse a well-formed inbound id, otherwise mint a UUID v4
    fn from_header(value: Option<&HeaderValue>) -> Self {
        value
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| {
                !v.is_empty()
                    && v.len() <= MAX_TRACE_ID_LEN
                    && v.bytes().all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'))
            })
            .map_or_else(|| Self(Uuid::new_v4().to_string()), |v| Self(v.to_string()))
    }
}

impl<S: Send + Sync> FromRequestParts<S> for TraceId {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<TraceId>()
            .cloned()
            .unwrap_or_else(|| TraceId(Uuid::new_v4().to_string())))
    }
}

/// Assign a trace id and stamp it on the response and every error envelope
pub async fn trace_id_middleware(mut request: Request, next: Next) -> Response {
    let trace_id = TraceId::from_header(request.headers().get(&TRACE_ID_HEADER));
    Span::current().record("trace_id", trace_id.as_str());
    request.extensions_mut().insert(trace_id.clone());

    let response = next.run(request).await;
    let status = response.status();

    let mut response = if let Some(body) = response.extensions().get::<ErrorBody>().cloned() {
        // Re-render application errors with the trace id filled in
        let (mut parts, _) = response.into_parts();
        parts.headers.remove(header::CONTENT_LENGTH);
        parts.headers.remove(header::CONTENT_ENCODING);
        let rendered = Json(body.with_trace_id(trace_id.as_str())).into_response();
        let (rendered_parts, rendered_body) = rendered.into_parts();
        parts.headers.extend(rendered_parts.headers);
        Response::from_parts(parts, rendered_body)
    } else if status.is_client_error() || status.is_server_error() {
        // Framework rejections (bad JSON, unknown route, timeout) share the envelope
        let message = rejection_message(response).await;
        let body = ErrorBody::from_status(status, message).with_trace_id(trace_id.as_str());
        (status, Json(body)).into_response()
    } else {
        response
    };

    if let Ok(value) = HeaderValue::from_str(trace_id.as_str()) {
        response.headers_mut().insert(TRACE_ID_HEADER, value);
    }
    response
}

/// Plain-text body of a framework rejection, used as the envelope message on 4xx
async fn rejection_message(response: Response) -> Option<String> {
    if response.status().is_server_error() {
        return None;
    }
    let bytes = axum::body::to_bytes(response.into_body(), 4096).await.ok()?;
    let text = String::from_utf8(bytes.to_vec()).ok()?;
    if text.trim_start().starts_with('{') {
        return None;
    }
    Some(text)
}

/// Body used by the not-found fallback
pub async fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "The requested resource was not found").into_response()
}
