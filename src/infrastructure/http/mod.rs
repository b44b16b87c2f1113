use anyhow::Context;
use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method, Request},
    middleware::from_fn,
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{info, info_span, warn, Span};

use crate::infrastructure::{
    config::{AppConfig, RuntimeMode, ServerConfig},
    persistence::{Database, InMemoryStore},
    storage::S3ObjectStorage,
};
use crate::presentation::middleware::{
    security_headers_middleware, trace_id::not_found, trace_id::TRACE_ID_HEADER,
    tenant::TENANT_HEADER, trace_id_middleware, SecurityConfig,
};
use crate::presentation::{routes, AppState, Repositories};

/// Create the main application router
pub fn create_app(state: AppState) -> Router {
    let config = Arc::clone(&state.config);

    // Outermost first: the span opens before anything else sees the request
    let middleware_stack = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
        .layer(CompressionLayer::new())
        .layer(create_cors_layer(&config.server))
        .layer(from_fn(security_headers_middleware(SecurityConfig::for_mode(config.mode))))
        .layer(from_fn(trace_id_middleware))
        .layer(timeout_layer(config.server.request_timeout()))
        .layer(DefaultBodyLimit::max(config.server.max_body_bytes));

    routes::create_routes(state).fallback(not_found).layer(middleware_stack)
}

/// Request span; `trace_id` is filled in once the id is resolved
fn make_request_span(request: &Request<Body>) -> Span {
    info_span!(
        "http_request",
        method = %request.method(),
        uri = %request.uri(),
        trace_id = tracing::field::Empty,
    )
}

#[allow(deprecated)]
fn timeout_layer(timeout: Duration) -> TimeoutLayer {
    TimeoutLayer::new(timeout)
}

/// CORS from the configured origin list; `*` allows any origin
fn create_cors_layer(server: &ServerConfig) -> CorsLayer {
    let origins = if server.cors_origins.iter().any(|origin| origin == "*") {
        AllowOrigin::any()
    } else {
        let parsed: Vec<HeaderValue> = server
            .cors_origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!(origin = %origin, "Ignoring malformed CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(parsed)
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
            TENANT_HEADER,
            TRACE_ID_HEADER,
        ])
        .expose_headers([TRACE_ID_HEADER])
        .max_age(Duration::from_secs(3600))
}

/// Wire repositories and object storage from configuration
///
/// A configured database URL selects `PostgreSQL`; otherwise local mode falls back to
/// the in-memory store.
///
/// # Errors
/// Returns an error if the database is unreachable, migrations fail, or production
/// mode has no database configured
pub async fn build_state(config: AppConfig) -> anyhow::Result<AppState> {
    let repositories = if config.database.is_configured() {
        let database = Database::new(&config.database).await?;
        if config.database.run_migrations {
            database.migrate().await?;
        }
        Repositories::postgres(database.pool())
    } else {
        if config.mode == RuntimeMode::Production {
            anyhow::bail!("database.url is required in production mode");
        }
        warn!("No database configured; using the in-memory store, data is lost on restart");
        Repositories::in_memory(Arc::new(InMemoryStore::new()))
    };

    let storage = Arc::new(S3ObjectStorage::from_config(&config.storage).await);
    Ok(AppState::new(config, repositories, storage))
}

/// Start the HTTP server and serve until SIGINT or SIGTERM
///
/// # Errors
/// Returns an error if state cannot be built or the listener fails to bind
pub async fn start_server(config: AppConfig) -> anyhow::Result<()> {
    let addr = config.server.socket_addr().context("invalid server.host")?;
    let mode = config.mode;
    let state = build_state(config).await?;
    let app = create_app(state);

    info!(%addr, %mode, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received, draining connections");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{fixtures::test_config, TestContext};
    use axum::http::StatusCode;
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_health_through_full_stack() {
        let app = create_app(TestContext::new().state.clone());

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(TRACE_ID_HEADER));
        assert_eq!(response.headers()["x-content-type-options"], "nosniff");
    }

    #[tokio::test]
    async fn test_unknown_route_gets_error_envelope() {
        let app = create_app(TestContext::new().state.clone());

        let response = app
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let trace_id = response.headers()[TRACE_ID_HEADER].to_str().unwrap().to_string();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["code"], "NOT_FOUND");
        assert_eq!(body["error"]["traceId"], trace_id);
    }

    #[tokio::test]
    async fn test_oversized_body_is_rejected() {
        let ctx = TestContext::new();
        let limit = ctx.state.config.server.max_body_bytes;
        let app = create_app(ctx.state.clone());

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/auth/login")
                    .header("content-type", "application/json")
                    .body(Body::from(vec![b' '; limit + 1]))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_cors_preflight_allows_tenant_header() {
        let app = create_app(TestContext::new().state.clone());

        let response = app
            .oneshot(
                Request::builder()
                    .method("OPTIONS")
                    .uri("/api/v1/organizer/events")
                    .header("origin", "https://organizer.trails.ae")
                    .header("access-control-request-method", "GET")
                    .header("access-control-request-headers", "x-tenant-id")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
        let allowed = response.headers()["access-control-allow-headers"].to_str().unwrap();
        assert!(allowed.contains(TENANT_HEADER.as_str()), "{allowed}");
        assert!(allowed.contains(TRACE_ID_HEADER.as_str()), "{allowed}");
    }

    #[test]
    fn test_cors_layer_with_explicit_origins() {
        let mut server = test_config().server;
        server.cors_origins = vec!["https://trails.ae".to_string(), "bad\norigin".to_string()];

        // Malformed origins are skipped rather than failing startup
        drop(create_cors_layer(&server));
    }

    #[tokio::test]
    async fn test_build_state_falls_back_to_memory_in_local_mode() {
        let state = build_state(test_config()).await.unwrap();

        assert!(state.users.health_check().await.is_ok());
    }

    #[tokio::test]
    async fn test_build_state_requires_database_in_production() {
        let mut config = test_config();
        config.mode = RuntimeMode::Production;

        assert!(build_state(config).await.is_err());
    }
}
