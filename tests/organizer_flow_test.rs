mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::fixtures::new_event;
use common::test_app::TestApp;
use uae_trails_api::domain::value_objects::UserRole;

/// Admin creates a tenant owned by a freshly seeded organizer
async fn tenant_with_owner(app: &TestApp, admin_token: &str) -> (String, String) {
    app.seed_user("owner@hajar.test", UserRole::Organizer).await;

    let tenant = app
        .request(Method::POST, "/api/v1/admin/tenants")
        .bearer(admin_token)
        .json(&json!({
            "name": "Hajar Hikers",
            "slug": "hajar-hikers",
            "ownerEmail": "owner@hajar.test",
            "status": "ACTIVE"
        }))
        .send()
        .await;
    tenant.assert_status(StatusCode::CREATED);
    let tenant_id = tenant.json()["id"].as_str().unwrap().to_string();

    (tenant_id, app.login("owner@hajar.test").await)
}

#[tokio::test]
async fn test_event_lifecycle_from_draft_to_booking_decision() {
    let app = TestApp::new();
    let admin_token = app.admin_token().await;
    let (tenant_id, owner_token) = tenant_with_owner(&app, &admin_token).await;

    let created = app
        .request(Method::POST, "/api/v1/organizer/events")
        .bearer(&owner_token)
        .tenant(&tenant_id)
        .json(&new_event("Wadi Shawka Loop", 12, true))
        .send()
        .await;
    created.assert_status(StatusCode::CREATED);
    let event = created.json();
    assert_eq!(event["status"], "DRAFT");
    let event_id = event["id"].as_str().unwrap().to_string();

    // Drafts are invisible to the public
    app.request(Method::GET, &format!("/api/v1/events/{event_id}"))
        .send()
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let published = app
        .request(Method::POST, &format!("/api/v1/organizer/events/{event_id}/publish"))
        .bearer(&owner_token)
        .tenant(&tenant_id)
        .send()
        .await;
    published.assert_status(StatusCode::OK);
    assert_eq!(published.json()["status"], "PUBLISHED");

    let listing = app.request(Method::GET, "/api/v1/events").send().await;
    listing.assert_status(StatusCode::OK);
    assert!(listing.json().as_array().unwrap().iter().any(|e| e["id"] == event_id.as_str()));

    app.seed_user("hiker@trails.test", UserRole::Participant).await;
    let hiker_token = app.login("hiker@trails.test").await;
    let booking = app
        .request(Method::POST, &format!("/api/v1/events/{event_id}/bookings"))
        .bearer(&hiker_token)
        .json(&json!({ "note": "Vegetarian lunch please" }))
        .send()
        .await;
    booking.assert_status(StatusCode::CREATED);
    assert_eq!(booking.json()["status"], "PENDING");
    let booking_id = booking.json()["id"].as_str().unwrap().to_string();

    let queue = app
        .request(Method::GET, &format!("/api/v1/organizer/events/{event_id}/bookings"))
        .bearer(&owner_token)
        .tenant(&tenant_id)
        .send()
        .await;
    queue.assert_status(StatusCode::OK);
    assert_eq!(queue.json().as_array().unwrap().len(), 1);

    let approved = app
        .request(Method::POST, &format!("/api/v1/organizer/bookings/{booking_id}/approve"))
        .bearer(&owner_token)
        .tenant(&tenant_id)
        .send()
        .await;
    approved.assert_status(StatusCode::OK);
    assert_eq!(approved.json()["status"], "APPROVED");

    let mine = app.get("/api/v1/users/me/bookings", &hiker_token).await;
    mine.assert_status(StatusCode::OK);
    assert_eq!(mine.json()[0]["status"], "APPROVED");

    let audit = app.get(&format!("/api/v1/admin/audit-logs?tenantId={tenant_id}"), &admin_token).await;
    audit.assert_status(StatusCode::OK);
    let actions: Vec<String> = audit
        .json()
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["action"].as_str().unwrap().to_string())
        .collect();
    for expected in ["tenant.create", "event.create", "event.publish", "booking.approve"] {
        assert!(actions.iter().any(|a| a == expected), "missing {expected} in {actions:?}");
    }
}

#[tokio::test]
async fn test_staff_can_read_but_not_manage_events() {
    let app = TestApp::new();
    let admin_token = app.admin_token().await;
    let (tenant_id, owner_token) = tenant_with_owner(&app, &admin_token).await;

    let added = app
        .request(Method::POST, "/api/v1/organizer/members")
        .bearer(&owner_token)
        .tenant(&tenant_id)
        .json(&json!({
            "email": "guide@hajar.test",
            "role": "STAFF",
            "fullName": "Trail Guide",
            "password": "guide-password-1"
        }))
        .send()
        .await;
    added.assert_status(StatusCode::CREATED);
    assert_eq!(added.json()["role"], "STAFF");

    let staff_token = app.login_with("guide@hajar.test", "guide-password-1").await;

    app.request(Method::GET, "/api/v1/organizer/events")
        .bearer(&staff_token)
        .tenant(&tenant_id)
        .send()
        .await
        .assert_status(StatusCode::OK);

    let denied = app
        .request(Method::POST, "/api/v1/organizer/events")
        .bearer(&staff_token)
        .tenant(&tenant_id)
        .json(&new_event("Unauthorized Walk", 5, false))
        .send()
        .await;
    denied.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_manager_cannot_demote_the_owner() {
    let app = TestApp::new();
    let admin_token = app.admin_token().await;
    let (tenant_id, owner_token) = tenant_with_owner(&app, &admin_token).await;

    app.request(Method::POST, "/api/v1/organizer/members")
        .bearer(&owner_token)
        .tenant(&tenant_id)
        .json(&json!({
            "email": "manager@hajar.test",
            "role": "MANAGER",
            "fullName": "Ops Manager",
            "password": "manager-password-1"
        }))
        .send()
        .await
        .assert_status(StatusCode::CREATED);
    let manager_token = app.login_with("manager@hajar.test", "manager-password-1").await;

    let demoted = app
        .request(Method::POST, "/api/v1/organizer/members")
        .bearer(&manager_token)
        .tenant(&tenant_id)
        .json(&json!({ "email": "owner@hajar.test", "role": "STAFF" }))
        .send()
        .await;
    demoted.assert_status(StatusCode::FORBIDDEN);

    // The owner keeps full control of the tenant
    app.request(Method::POST, "/api/v1/organizer/events")
        .bearer(&owner_token)
        .tenant(&tenant_id)
        .json(&new_event("Jebel Jais Ridge", 8, false))
        .send()
        .await
        .assert_status(StatusCode::CREATED);

    let members = app
        .request(Method::GET, "/api/v1/organizer/members")
        .bearer(&owner_token)
        .tenant(&tenant_id)
        .send()
        .await;
    let roster = members.json();
    let owner = roster
        .as_array()
        .unwrap()
        .iter()
        .find(|member| member["email"] == "owner@hajar.test")
        .expect("owner on roster");
    assert_eq!(owner["role"], "OWNER");
}

#[tokio::test]
async fn test_owner_role_changes() {
    let app = TestApp::new();
    let admin_token = app.admin_token().await;
    let (tenant_id, owner_token) = tenant_with_owner(&app, &admin_token).await;
    let members_path = "/api/v1/organizer/members";

    let sole_owner = app
        .request(Method::POST, members_path)
        .bearer(&owner_token)
        .tenant(&tenant_id)
        .json(&json!({ "email": "owner@hajar.test", "role": "MANAGER" }))
        .send()
        .await;
    sole_owner.assert_status(StatusCode::CONFLICT);
    assert_eq!(sole_owner.error_code(), "LAST_OWNER");

    app.request(Method::POST, members_path)
        .bearer(&owner_token)
        .tenant(&tenant_id)
        .json(&json!({
            "email": "partner@hajar.test",
            "role": "OWNER",
            "fullName": "Second Owner",
            "password": "partner-password-1"
        }))
        .send()
        .await
        .assert_status(StatusCode::CREATED);

    // With a second owner in place, stepping down is allowed
    let stepped_down = app
        .request(Method::POST, members_path)
        .bearer(&owner_token)
        .tenant(&tenant_id)
        .json(&json!({ "email": "owner@hajar.test", "role": "MANAGER" }))
        .send()
        .await;
    stepped_down.assert_status(StatusCode::CREATED);
    assert_eq!(stepped_down.json()["role"], "MANAGER");
}

#[tokio::test]
async fn test_organizer_routes_require_tenant_header() {
    let app = TestApp::new();
    let admin_token = app.admin_token().await;
    let (_, owner_token) = tenant_with_owner(&app, &admin_token).await;

    let response = app.get("/api/v1/organizer/events", &owner_token).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "TENANT_REQUIRED");
}

#[tokio::test]
async fn test_outsider_cannot_enter_tenant() {
    let app = TestApp::new();
    let admin_token = app.admin_token().await;
    let (tenant_id, _) = tenant_with_owner(&app, &admin_token).await;
    app.seed_user("rival@other.test", UserRole::Organizer).await;
    let rival_token = app.login("rival@other.test").await;

    let response = app
        .request(Method::GET, "/api/v1/organizer/events")
        .bearer(&rival_token)
        .tenant(&tenant_id)
        .send()
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
    assert_eq!(response.error_code(), "TENANT_ACCESS_DENIED");
}

#[tokio::test]
async fn test_suspended_tenant_blocks_organizer_access() {
    let app = TestApp::new();
    let admin_token = app.admin_token().await;
    let (tenant_id, owner_token) = tenant_with_owner(&app, &admin_token).await;

    app.request(Method::PATCH, &format!("/api/v1/admin/tenants/{tenant_id}/status"))
        .bearer(&admin_token)
        .json(&json!({ "status": "SUSPENDED" }))
        .send()
        .await
        .assert_status(StatusCode::OK);

    let response = app
        .request(Method::GET, "/api/v1/organizer/events")
        .bearer(&owner_token)
        .tenant(&tenant_id)
        .send()
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
    assert_eq!(response.error_code(), "TENANT_INACTIVE");
}

#[tokio::test]
async fn test_duplicate_tenant_slug_is_rejected() {
    let app = TestApp::new();
    let admin_token = app.admin_token().await;
    tenant_with_owner(&app, &admin_token).await;

    let response = app
        .request(Method::POST, "/api/v1/admin/tenants")
        .bearer(&admin_token)
        .json(&json!({ "name": "Copycats", "slug": "hajar-hikers" }))
        .send()
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "DB_23505");
}
