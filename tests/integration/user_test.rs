//! Integration tests for account management.

mod helpers;

use http::StatusCode;
use serde_json::json;

use helpers::{ADMIN, STRONG_PASSWORD, TestApp};

#[tokio::test]
async fn test_register_and_list_without_hashes() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;

    let response = app
        .request(
            "POST",
            "/api/users",
            Some(json!({ "username": "ana", "password": STRONG_PASSWORD, "role": "editor" })),
            Some(&admin),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["data"]["role"], "editor");

    let response = app.request("GET", "/api/users", None, Some(&admin)).await;
    assert_eq!(response.status, StatusCode::OK);
    let users = response.body["data"].as_array().unwrap();
    assert_eq!(users.len(), 2);
    assert!(users.iter().all(|u| u.get("password_hash").is_none()));
}

#[tokio::test]
async fn test_register_defaults_to_viewer_and_accepts_legacy_keys() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;

    let response = app
        .request(
            "POST",
            "/api/users",
            Some(json!({ "username": "bea", "password": STRONG_PASSWORD })),
            Some(&admin),
        )
        .await;
    assert_eq!(response.body["data"]["role"], "viewer");

    let response = app
        .request(
            "POST",
            "/api/users",
            Some(json!({ "usuario": "caio", "senha": STRONG_PASSWORD, "tipo": "Administrador" })),
            Some(&admin),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["data"]["role"], "administrator");
}

#[tokio::test]
async fn test_duplicate_username_is_conflict() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;

    let response = app
        .request(
            "POST",
            "/api/users",
            Some(json!({ "username": ADMIN, "password": STRONG_PASSWORD })),
            Some(&admin),
        )
        .await;

    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.body["error"], "CONFLICT");

    let response = app.request("GET", "/api/users", None, Some(&admin)).await;
    assert_eq!(response.body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_weak_password_is_rejected() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;

    let response = app
        .request(
            "POST",
            "/api/users",
            Some(json!({ "username": "dan", "password": "12345678" })),
            Some(&admin),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_viewer_cannot_manage_users() {
    let app = TestApp::new().await;
    let viewer = app.create_user("vic", "viewer").await;

    let response = app
        .request(
            "POST",
            "/api/users",
            Some(json!({ "username": "eve", "password": STRONG_PASSWORD })),
            Some(&viewer),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app
        .request("DELETE", "/api/users/admin", None, Some(&viewer))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app.request("GET", "/api/users", None, Some(&viewer)).await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_delete_rules() {
    let app = TestApp::new().await;
    app.create_user("fay", "viewer").await;
    let admin = app.admin_token().await;

    let response = app
        .request("DELETE", "/api/users/admin", None, Some(&admin))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app
        .request("DELETE", "/api/users/ghost", None, Some(&admin))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app
        .request("DELETE", "/api/users/fay", None, Some(&admin))
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app.request("GET", "/api/users", None, Some(&admin)).await;
    assert_eq!(response.body["data"].as_array().unwrap().len(), 1);
}
