use axum::{
    extract::Request,
    http::{header, HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};

use crate::infrastructure::config::RuntimeMode;

/// Path prefix of the Swagger UI, which needs its own scripts and styles
const DOCS_PREFIX: &str = "/api/docs";

/// A JSON API serves no active content
const API_CSP: &str = "default-src 'none'; frame-ancestors 'none'; base-uri 'none'; form-action 'none'";

const DOCS_CSP: &str = "default-src 'self'; script-src 'self' 'unsafe-inline'; style-src 'self' 'unsafe-inline'; img-src 'self' data:; frame-ancestors 'none'";

const PERMISSIONS_POLICY: &str =
    "accelerometer=(), camera=(), geolocation=(), gyroscope=(), microphone=(), payment=(), usb=()";

/// Security headers configuration
#[derive(Debug, Clone)]
pub struct SecurityConfig {
    /// HSTS max age in seconds; `None` disables the header
    pub hsts_max_age: Option<u64>,
    pub hsts_include_subdomains: bool,
}

impl SecurityConfig {
    /// Local mode skips HSTS so plain-http development servers stay reachable
    pub fn for_mode(mode: RuntimeMode) -> Self {
        match mode {
            RuntimeMode::Local => Self { hsts_max_age: None, ..Self::default() },
            RuntimeMode::Production => Self::default(),
        }
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            hsts_max_age: Some(31_536_000), // 1 year
            hsts_include_subdomains: true,
        }
    }
}

/// Security headers middleware
pub fn security_headers_middleware(
    config: SecurityConfig,
) -> impl Fn(Request, Next) -> std::pin::Pin<Box<dyn std::future::Future<Output = Response> + Send>>
       + Clone {
    move |request: Request, next: Next| {
        let config = config.clone();
        Box::pin(async move {
            let is_docs = request.uri().path().starts_with(DOCS_PREFIX);
            let mut response = next.run(request).await;
            apply_security_headers(response.headers_mut(), &config, is_docs);
            response
        })
    }
}

/// Apply security headers to response headers
fn apply_security_headers(headers: &mut HeaderMap, config: &SecurityConfig, is_docs: bool) {
    if let Some(max_age) = config.hsts_max_age {
        let mut hsts_value = format!("max-age={max_age}");
        if config.hsts_include_subdomains {
            hsts_value.push_str("; includeSubDomains");
        }
        if let Ok(header_value) = HeaderValue::from_str(&hsts_value) {
            headers.insert(header::STRICT_TRANSPORT_SECURITY, header_value);
        }
    }

    let csp = if is_docs { DOCS_CSP } else { API_CSP };
    headers.insert(header::CONTENT_SECURITY_POLICY, HeaderValue::from_static(csp));
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(header::X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.insert(header::X_XSS_PROTECTION, HeaderValue::from_static("0"));
    headers.insert(header::REFERRER_POLICY, HeaderValue::from_static("no-referrer"));
    headers.insert("permissions-policy", HeaderValue::from_static(PERMISSIONS_POLICY));
    headers.insert("x-permitted-cross-domain-policies", HeaderValue::from_static("none"));
    headers.insert("cross-origin-opener-policy", HeaderValue::from_static("same-origin"));
    headers.insert("cross-origin-resource-policy", HeaderValue::from_static("same-site"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, routing::get, Router};
    use tower::ServiceExt;

    async fn handler() -> &'static str {
        "ok"
    }

    fn app(config: SecurityConfig) -> Router {
        Router::new()
            .route("/api/v1/events", get(handler))
            .route("/api/docs/index.html", get(handler))
            .layer(axum::middleware::from_fn(security_headers_middleware(config)))
    }

    async fn headers_for(config: SecurityConfig, uri: &str) -> HeaderMap {
        let response = app(config)
            .oneshot(axum::http::Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        response.headers().clone()
    }

    #[tokio::test]
    async fn test_production_headers() {
        let headers =
            headers_for(SecurityConfig::for_mode(RuntimeMode::Production), "/api/v1/events").await;

        assert_eq!(
            headers.get(header::STRICT_TRANSPORT_SECURITY).unwrap(),
            "max-age=31536000; includeSubDomains"
        );
        assert_eq!(headers.get(header::CONTENT_SECURITY_POLICY).unwrap(), API_CSP);
        assert_eq!(headers.get(header::X_FRAME_OPTIONS).unwrap(), "DENY");
        assert_eq!(headers.get(header::X_CONTENT_TYPE_OPTIONS).unwrap(), "nosniff");
        assert_eq!(headers.get(header::REFERRER_POLICY).unwrap(), "no-referrer");
        assert!(headers.get("permissions-policy").is_some());
        assert!(headers.get("cross-origin-opener-policy").is_some());
    }

    #[tokio::test]
    async fn test_local_mode_skips_hsts() {
        let headers =
            headers_for(SecurityConfig::for_mode(RuntimeMode::Local), "/api/v1/events").await;

        assert!(headers.get(header::STRICT_TRANSPORT_SECURITY).is_none());
        assert_eq!(headers.get(header::X_CONTENT_TYPE_OPTIONS).unwrap(), "nosniff");
    }

    #[tokio::test]
    async fn test_docs_get_relaxed_csp() {
        let headers = headers_for(SecurityConfig::default(), "/api/docs/index.html").await;

        assert_eq!(headers.get(header::CONTENT_SECURITY_POLICY).unwrap(), DOCS_CSP);
    }
}
