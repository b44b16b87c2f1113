mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::test_app::TestApp;
use uae_trails_api::domain::value_objects::UserRole;

async fn owner_of_new_tenant(app: &TestApp) -> (String, String) {
    let admin_token = app.admin_token().await;
    app.seed_user("owner@fujairah.test", UserRole::Organizer).await;

    let tenant = app
        .request(Method::POST, "/api/v1/admin/tenants")
        .bearer(&admin_token)
        .json(&json!({
            "name": "Fujairah Divers",
            "slug": "fujairah-divers",
            "ownerEmail": "owner@fujairah.test",
            "status": "ACTIVE"
        }))
        .send()
        .await;
    tenant.assert_status(StatusCode::CREATED);

    (tenant.json()["id"].as_str().unwrap().to_string(), app.login("owner@fujairah.test").await)
}

#[tokio::test]
async fn test_presign_returns_tenant_scoped_key() {
    let app = TestApp::new();
    let (tenant_id, token) = owner_of_new_tenant(&app).await;

    let response = app
        .request(Method::POST, "/api/v1/media/presign")
        .bearer(&token)
        .tenant(&tenant_id)
        .json(&json!({
            "filename": "Snoopy Island (2).JPG",
            "contentType": "image/jpeg",
            "size": 204_800,
            "purpose": "event-gallery"
        }))
        .send()
        .await;

    response.assert_status(StatusCode::OK);
    let body = response.json();
    let key = body["key"].as_str().unwrap();
    assert!(key.starts_with(&format!("tenants/{tenant_id}/event-gallery/")), "{key}");
    assert!(key.ends_with("Snoopy-Island-2-.JPG"), "{key}");
    assert_eq!(body["method"], "PUT");
    assert_eq!(body["headers"]["content-type"], "image/jpeg");
    assert_eq!(body["publicUrl"], format!("https://cdn.trails.test/{key}"));
    assert!(body["uploadUrl"].as_str().unwrap().contains(key));
}

#[tokio::test]
async fn test_presign_rejects_disallowed_content_type() {
    let app = TestApp::new();
    let (tenant_id, token) = owner_of_new_tenant(&app).await;

    let response = app
        .request(Method::POST, "/api/v1/media/presign")
        .bearer(&token)
        .tenant(&tenant_id)
        .json(&json!({ "filename": "run.exe", "contentType": "application/x-msdownload", "size": 10 }))
        .send()
        .await;

    response.assert_status(StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(response.json()["error"]["details"]["contentType"], "application/x-msdownload");
}

#[tokio::test]
async fn test_presign_rejects_oversized_upload() {
    let app = TestApp::new();
    let (tenant_id, token) = owner_of_new_tenant(&app).await;

    let response = app
        .request(Method::POST, "/api/v1/media/presign")
        .bearer(&token)
        .tenant(&tenant_id)
        .json(&json!({ "filename": "huge.png", "contentType": "image/png", "size": 50_000_000 }))
        .send()
        .await;

    response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(response.error_code(), "PAYLOAD_TOO_LARGE");
}

#[tokio::test]
async fn test_presign_is_recorded_in_audit_log() {
    let app = TestApp::new();
    let (tenant_id, token) = owner_of_new_tenant(&app).await;

    let response = app
        .request(Method::POST, "/api/v1/media/presign")
        .bearer(&token)
        .tenant(&tenant_id)
        .header("x-trace-id", "presign-trace-1")
        .json(&json!({ "filename": "logo.png", "contentType": "image/png", "size": 1_024, "purpose": "tenant-logo" }))
        .send()
        .await;
    response.assert_status(StatusCode::OK);

    let admin_token = app.login("admin@trails.test").await;
    let audit = app.get(&format!("/api/v1/admin/audit-logs?tenantId={tenant_id}"), &admin_token).await;
    let entries = audit.json();
    let presign = entries
        .as_array()
        .unwrap()
        .iter()
        .find(|entry| entry["action"] == "media.presign")
        .expect("presign audit entry");
    assert_eq!(presign["traceId"], "presign-trace-1");
}

#[tokio::test]
async fn test_presign_requires_tenant_membership() {
    let app = TestApp::new();
    let (tenant_id, _) = owner_of_new_tenant(&app).await;
    app.seed_user("stranger@trails.test", UserRole::Participant).await;
    let token = app.login("stranger@trails.test").await;

    let response = app
        .request(Method::POST, "/api/v1/media/presign")
        .bearer(&token)
        .tenant(&tenant_id)
        .json(&json!({ "filename": "x.png", "contentType": "image/png", "size": 1 }))
        .send()
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
}
