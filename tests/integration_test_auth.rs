mod common;

use axum::http::StatusCode;
use common::TestApp;
use org_dashboard::domain::models::audit::actions;
use serde_json::json;

#[tokio::test]
async fn test_register_creates_admin_and_organization() {
    let app = TestApp::new().await;

    let (status, body) = app.request("POST", "/api/auth/register", None, Some(json!({
        "email": "Founder@Co.com",
        "password": "password123",
        "firstName": "Ada",
        "lastName": "Lovelace",
        "organizationName": "Acme"
    }))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Registration successful");
    assert_eq!(body["user"]["email"], "founder@co.com");
    assert_eq!(body["user"]["role"], "ADMIN");
    assert_eq!(body["organization"]["name"], "Acme");
    assert_eq!(body["user"]["organizationId"], body["organization"]["id"]);
    assert!(body["user"].get("passwordHash").is_none());
    assert!(!body["token"].as_str().unwrap().is_empty());

    assert_eq!(app.wait_for_audit(actions::USER_REGISTER, 1).await, 1);
}

#[tokio::test]
async fn test_register_rejects_duplicates_and_missing_fields() {
    let app = TestApp::new().await;
    app.register("admin@co.com", "Acme").await;

    let (status, body) = app.request("POST", "/api/auth/register", None, Some(json!({
        "email": "ADMIN@co.com",
        "password": "password123",
        "firstName": "Other",
        "lastName": "Person",
        "organizationName": "Elsewhere"
    }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "CONFLICT");
    assert_eq!(body["error"], "User already exists with this email");

    let (status, body) = app.request("POST", "/api/auth/register", None, Some(json!({
        "email": "x@co.com",
        "password": "password123"
    }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "All fields are required");

    let orgs: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM organizations")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(orgs, 1);
}

#[tokio::test]
async fn test_login_me_logout() {
    let app = TestApp::new().await;
    app.register("admin@co.com", "Acme").await;

    let (status, body) = app.request("POST", "/api/auth/login", None, Some(json!({
        "email": "admin@co.com", "password": "wrong-password"
    }))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid credentials");

    let (status, body) = app.request("POST", "/api/auth/login", None, Some(json!({
        "email": "nobody@co.com", "password": "password123"
    }))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid credentials");

    let (status, body) = app.request("POST", "/api/auth/login", None, Some(json!({ "email": "admin@co.com" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Email and password are required");

    let (status, body) = app.request("POST", "/api/auth/login", None, Some(json!({
        "email": "admin@co.com", "password": "password123"
    }))).await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap().to_string();
    assert_eq!(app.wait_for_audit(actions::USER_LOGIN, 1).await, 1);

    let (status, body) = app.request("GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], "admin@co.com");
    assert_eq!(body["organization"]["name"], "Acme");

    let (status, body) = app.request("POST", "/api/auth/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Logout successful");
    assert_eq!(app.wait_for_audit(actions::USER_LOGOUT, 1).await, 1);
}

#[tokio::test]
async fn test_credential_verifier_outcomes() {
    let app = TestApp::new().await;
    let admin = app.register("admin@co.com", "Acme").await;

    let (status, body) = app.request("GET", "/api/auth/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Access token required");

    let (status, body) = app.request("GET", "/api/auth/me", Some("garbage.token.value"), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Invalid or expired token");

    sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(&admin.user_id)
        .execute(&app.pool)
        .await
        .unwrap();

    let (status, body) = app.request("GET", "/api/auth/me", Some(&admin.token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid token - user not found");
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;
    let (status, body) = app.request("GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}
