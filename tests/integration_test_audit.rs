mod common;

use axum::http::StatusCode;
use chrono::Duration;
use common::TestApp;
use org_dashboard::domain::models::audit::actions;
use serde_json::json;

#[tokio::test]
async fn test_successful_authenticated_action_records_exactly_once() {
    let app = TestApp::new().await;
    let admin = app.register("admin@co.com", "Acme").await;

    let (status, body) = app.create_invite(&admin.token, "new@co.com", "MEMBER").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(app.wait_for_audit(actions::INVITE_SENT, 1).await, 1);

    let (user_id, org_id, ip, agent): (Option<String>, String, Option<String>, Option<String>) = sqlx::query_as(
        "SELECT user_id, organization_id, ip_address, user_agent FROM audit_logs WHERE action = ?"
    )
        .bind(actions::INVITE_SENT)
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(user_id.as_deref(), Some(admin.user_id.as_str()));
    assert_eq!(org_id, admin.organization_id);
    assert_eq!(ip, None);
    assert_eq!(agent.as_deref(), Some("integration-test"));

    let (status, logs) = app.request("GET", "/api/audit?action=INVITE_SENT", Some(&admin.token), None).await;
    assert_eq!(status, StatusCode::OK);
    let details = &logs["auditLogs"][0]["details"];
    assert_eq!(details["method"], "POST");
    assert_eq!(details["url"], "/api/invites");
    assert_eq!(details["body"]["email"], "new@co.com");
    assert_eq!(details["response"]["invite"]["id"], body["invite"]["id"]);

    app.settle().await;
    assert_eq!(app.audit_count(actions::INVITE_SENT).await, 1);
}

#[tokio::test]
async fn test_failed_or_unauthenticated_requests_are_not_recorded() {
    let app = TestApp::new().await;
    let admin = app.register("admin@co.com", "Acme").await;

    // 400
    let (status, _) = app.create_invite(&admin.token, "x@co.com", "OWNER").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // 401
    let (status, _) = app.request("POST", "/api/invites", None, Some(json!({ "email": "y@co.com" }))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // 403
    let (status, _) = app.request("POST", "/api/invites", Some("not-a-jwt"), Some(json!({ "email": "y@co.com" }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // 404
    let (status, _) = app.request("DELETE", "/api/invites/missing", Some(&admin.token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // 401 on a public audited route
    let (status, _) = app.request("POST", "/api/auth/login", None, Some(json!({
        "email": "admin@co.com", "password": "wrong-password"
    }))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    app.settle().await;
    assert_eq!(app.audit_count(actions::INVITE_SENT).await, 0);
    assert_eq!(app.audit_count(actions::INVITE_CANCELLED).await, 0);
    assert_eq!(app.audit_count(actions::USER_LOGIN).await, 0);
}

#[tokio::test]
async fn test_credentials_are_redacted_from_details() {
    let app = TestApp::new().await;
    let admin = app.register("admin@co.com", "Acme").await;
    assert_eq!(app.wait_for_audit(actions::USER_REGISTER, 1).await, 1);

    let (_, body) = app.request("GET", "/api/audit?action=user_register", Some(&admin.token), None).await;
    let details = &body["auditLogs"][0]["details"];
    assert_eq!(details["body"]["password"], "[REDACTED]");
    assert_eq!(details["body"]["email"], "admin@co.com");
    assert_eq!(details["response"]["token"], "[REDACTED]");
    assert_eq!(details["response"]["user"]["id"], admin.user_id.as_str());
}

#[tokio::test]
async fn test_cancel_audit_keeps_invite_snapshot() {
    let app = TestApp::new().await;
    let admin = app.register("admin@co.com", "Acme").await;

    let (_, body) = app.create_invite(&admin.token, "gone@co.com", "MANAGER").await;
    let invite_id = body["invite"]["id"].as_str().unwrap().to_string();

    let (status, _) = app.request("DELETE", &format!("/api/invites/{}", invite_id), Some(&admin.token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.wait_for_audit(actions::INVITE_CANCELLED, 1).await, 1);

    let (_, body) = app.request("GET", "/api/audit?action=invite_cancelled", Some(&admin.token), None).await;
    let snapshot = &body["auditLogs"][0]["details"]["response"]["invite"];
    assert_eq!(snapshot["id"], invite_id.as_str());
    assert_eq!(snapshot["email"], "gone@co.com");
    assert_eq!(snapshot["role"], "MANAGER");
}

#[tokio::test]
async fn test_listing_pagination_and_filters() {
    let app = TestApp::new().await;
    let admin = app.register("admin@co.com", "Acme").await;
    let manager = app.add_member(&admin, "manager@co.com", "MANAGER").await;

    for email in ["a@co.com", "b@co.com", "c@co.com"] {
        app.clock.advance(Duration::seconds(1));
        let (status, _) = app.create_invite(&admin.token, email, "MEMBER").await;
        assert_eq!(status, StatusCode::CREATED);
    }
    app.clock.advance(Duration::seconds(1));
    app.create_invite(&manager.token, "d@co.com", "MEMBER").await;

    // manager@co.com invite + 4 more
    assert_eq!(app.wait_for_audit(actions::INVITE_SENT, 5).await, 5);
    assert_eq!(app.wait_for_audit(actions::INVITE_ACCEPTED, 1).await, 1);

    let (status, body) = app.request("GET", "/api/audit?action=invite_sent&limit=2&page=2", Some(&admin.token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["auditLogs"].as_array().unwrap().len(), 2);
    assert_eq!(body["pagination"], json!({ "page": 2, "limit": 2, "total": 5, "pages": 3 }));

    // Substring, case-insensitive
    let (_, body) = app.request("GET", "/api/audit?action=Invite", Some(&admin.token), None).await;
    assert_eq!(body["pagination"]["total"], 6);

    let (_, body) = app.request("GET", &format!("/api/audit?action=INVITE_SENT&userId={}", manager.user_id), Some(&admin.token), None).await;
    assert_eq!(body["pagination"]["total"], 1);
    let log = &body["auditLogs"][0];
    assert_eq!(log["details"]["body"]["email"], "d@co.com");
    assert_eq!(log["user"]["email"], "manager@co.com");
    assert_eq!(log["user"]["id"], manager.user_id.as_str());

    // Newest first, default page size
    let (_, body) = app.request("GET", "/api/audit?action=INVITE_SENT", Some(&manager.token), None).await;
    assert_eq!(body["pagination"]["limit"], 50);
    assert_eq!(body["pagination"]["page"], 1);
    assert_eq!(body["auditLogs"][0]["details"]["body"]["email"], "d@co.com");
}

#[tokio::test]
async fn test_listing_is_scoped_and_role_gated() {
    let app = TestApp::new().await;
    let admin_a = app.register("admin@a.com", "Org A").await;
    let admin_b = app.register("admin@b.com", "Org B").await;
    let member = app.add_member(&admin_a, "member@a.com", "MEMBER").await;

    app.create_invite(&admin_a.token, "x@co.com", "MEMBER").await;
    app.wait_for_audit(actions::INVITE_SENT, 2).await;
    app.wait_for_audit(actions::USER_REGISTER, 2).await;

    let (status, body) = app.request("GET", "/api/audit", Some(&admin_b.token), None).await;
    assert_eq!(status, StatusCode::OK);
    let actions_seen: Vec<&str> = body["auditLogs"].as_array().unwrap()
        .iter()
        .map(|l| l["action"].as_str().unwrap())
        .collect();
    assert_eq!(actions_seen, vec![actions::USER_REGISTER]);

    let (status, body) = app.request("GET", "/api/audit", Some(&member.token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["current"], "MEMBER");
}

#[tokio::test]
async fn test_audit_write_failure_does_not_affect_response() {
    let app = TestApp::new().await;
    let admin = app.register("admin@co.com", "Acme").await;
    app.wait_for_audit(actions::USER_REGISTER, 1).await;

    sqlx::query("DROP TABLE audit_logs")
        .execute(&app.pool)
        .await
        .unwrap();

    let (status, body) = app.create_invite(&admin.token, "new@co.com", "MEMBER").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["invite"]["email"], "new@co.com");
}

#[tokio::test]
async fn test_listing_far_past_last_page_is_empty() {
    let app = TestApp::new().await;
    let admin = app.register("admin@co.com", "Acme").await;
    assert_eq!(app.wait_for_audit(actions::USER_REGISTER, 1).await, 1);

    let (status, body) = app.request("GET", "/api/audit?page=9223372036854775807&limit=100", Some(&admin.token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["auditLogs"].as_array().unwrap().is_empty());
    assert_eq!(body["pagination"]["page"], i64::MAX);
    assert_eq!(body["pagination"]["total"], 1);
}

#[tokio::test]
async fn test_action_filter_treats_wildcards_literally() {
    let app = TestApp::new().await;
    let admin = app.register("admin@co.com", "Acme").await;
    assert_eq!(app.wait_for_audit(actions::USER_REGISTER, 1).await, 1);

    // "_" would otherwise match the "R" in USER_REGISTER
    let (_, body) = app.request("GET", "/api/audit?action=USE_", Some(&admin.token), None).await;
    assert_eq!(body["pagination"]["total"], 0);

    let (_, body) = app.request("GET", "/api/audit?action=%25", Some(&admin.token), None).await;
    assert_eq!(body["pagination"]["total"], 0);

    let (_, body) = app.request("GET", "/api/audit?action=user_", Some(&admin.token), None).await;
    assert_eq!(body["pagination"]["total"], 1);
}
