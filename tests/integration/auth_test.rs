//! Integration tests for authentication flow.

mod helpers;

use http::StatusCode;
use serde_json::json;

use helpers::{ADMIN, STRONG_PASSWORD, TestApp};

#[tokio::test]
async fn test_login_success() {
    let app = TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({ "username": ADMIN, "password": STRONG_PASSWORD })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["success"], true);
    assert!(response.body["data"]["token"].as_str().is_some());
    assert_eq!(response.body["data"]["user"]["role"], "administrator");
    assert!(response.body["data"]["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_login_invalid_password() {
    let app = TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({ "username": ADMIN, "password": "wrongpassword" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"], "UNAUTHORIZED");
    assert_eq!(response.body["message"], "Invalid username or password");
}

#[tokio::test]
async fn test_login_nonexistent_user() {
    let app = TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({ "username": "nobody", "password": STRONG_PASSWORD })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_requires_fields() {
    let app = TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({ "username": "", "password": "" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_me_reports_role() {
    let app = TestApp::new().await;
    let token = app.create_user("vic", "viewer").await;

    let response = app.request("GET", "/api/auth/me", None, Some(&token)).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["username"], "vic");
    assert_eq!(response.body["data"]["role"], "viewer");
    assert_eq!(response.body["data"]["can_modify"], false);
}

#[tokio::test]
async fn test_missing_or_invalid_token() {
    let app = TestApp::new().await;

    let response = app.request("GET", "/api/documents", None, None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = app
        .request("GET", "/api/documents", None, Some("not-a-jwt"))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_of_deleted_account_is_rejected() {
    let app = TestApp::new().await;
    let token = app.create_user("temp", "editor").await;
    let admin = app.admin_token().await;

    let response = app
        .request("DELETE", "/api/users/temp", None, Some(&admin))
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app.request("GET", "/api/auth/me", None, Some(&token)).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_attempts_are_audited() {
    let app = TestApp::new().await;
    app.request(
        "POST",
        "/api/auth/login",
        Some(json!({ "username": "ghost", "password": "x" })),
        None,
    )
    .await;
    let admin = app.admin_token().await;

    let response = app.request("GET", "/api/audit", None, Some(&admin)).await;
    assert_eq!(response.status, StatusCode::OK);

    let entries = response.body["data"].as_array().unwrap();
    assert!(entries
        .iter()
        .any(|e| e["action"] == "LOGIN_FAILED" && e["actor"] == "unknown"));
    assert!(entries
        .iter()
        .any(|e| e["action"] == "LOGIN" && e["actor"] == ADMIN));
}

#[tokio::test]
async fn test_health_is_public() {
    let app = TestApp::new().await;

    let response = app.request("GET", "/api/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["status"], "ok");
    assert_eq!(response.body["data"]["backend"], "json");
}
