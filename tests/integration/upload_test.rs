//! Integration tests for media uploads.

mod helpers;

use axum::body::Body;
use http::header::{AUTHORIZATION, CONTENT_TYPE, RANGE};
use http::{Request, StatusCode};

use helpers::{TestApp, multipart_body};

#[tokio::test]
async fn test_duplicate_names_keep_both_files() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;

    let first = app.upload(&token, "report.pdf", b"%PDF-first").await;
    assert_eq!(first.status, StatusCode::CREATED);
    assert_eq!(first.body["data"]["filename"], "report.pdf");

    let second = app.upload(&token, "report.pdf", b"%PDF-second").await;
    assert_eq!(second.status, StatusCode::CREATED);
    let second_name = second.body["data"]["filename"].as_str().unwrap().to_string();
    assert_ne!(second_name, "report.pdf");
    assert!(second_name.starts_with("report_"));
    assert!(second_name.ends_with(".pdf"));

    let raw = app.get_raw("/api/uploads/report.pdf", &token).await;
    assert_eq!(raw.status, StatusCode::OK);
    assert_eq!(raw.body, b"%PDF-first");

    let raw = app
        .get_raw(&format!("/api/uploads/{second_name}"), &token)
        .await;
    assert_eq!(raw.status, StatusCode::OK);
    assert_eq!(raw.body, b"%PDF-second");

    let list = app.request("GET", "/api/uploads", None, Some(&token)).await;
    assert_eq!(list.body["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_disallowed_extension_is_rejected_before_write() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;

    let response = app.upload(&token, "setup.exe", b"MZ").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "VALIDATION_ERROR");

    let list = app.request("GET", "/api/uploads", None, Some(&token)).await;
    assert!(list.body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_filename_is_sanitized() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;

    let response = app.upload(&token, "Fotografia antiga ç.JPG", b"jpeg").await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["data"]["filename"], "Fotografia_antiga_c.JPG");
}

#[tokio::test]
async fn test_range_request_returns_partial_content() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;
    app.upload(&token, "fala.mp3", b"0123456789").await;

    let req = Request::builder()
        .method("GET")
        .uri("/api/uploads/fala.mp3")
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .header(RANGE, "bytes=2-5")
        .body(Body::empty())
        .unwrap();
    let raw = app.send(req).await;

    assert_eq!(raw.status, StatusCode::PARTIAL_CONTENT);
    assert_eq!(raw.body, b"2345");
    assert_eq!(raw.header("content-type"), Some("audio/mpeg"));
}

#[tokio::test]
async fn test_delete_upload() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;
    app.upload(&token, "nota.txt", b"texto").await;

    let response = app
        .request("DELETE", "/api/uploads/nota.txt", None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let raw = app.get_raw("/api/uploads/nota.txt", &token).await;
    assert_eq!(raw.status, StatusCode::NOT_FOUND);

    let response = app
        .request("DELETE", "/api/uploads/nota.txt", None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_viewer_can_read_but_not_write() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    app.upload(&admin, "mapa.png", b"png").await;
    let viewer = app.create_user("vic", "viewer").await;

    let response = app.upload(&viewer, "outro.png", b"png").await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app
        .request("DELETE", "/api/uploads/mapa.png", None, Some(&viewer))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let raw = app.get_raw("/api/uploads/mapa.png", &viewer).await;
    assert_eq!(raw.status, StatusCode::OK);
}

#[tokio::test]
async fn test_oversized_upload_is_rejected() {
    let app = TestApp::with_config(|config| {
        config.storage.max_upload_size_bytes = 1024;
    })
    .await;
    let token = app.admin_token().await;

    let response = app.upload(&token, "grande.pdf", &vec![b'x'; 4096]).await;
    assert_eq!(response.status, StatusCode::PAYLOAD_TOO_LARGE);

    let list = app.request("GET", "/api/uploads", None, Some(&token)).await;
    assert!(list.body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_missing_file_field() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;

    let req = Request::builder()
        .method("POST")
        .uri("/api/uploads")
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .header(
            CONTENT_TYPE,
            "multipart/form-data; boundary=registry-test-boundary",
        )
        .body(Body::from(multipart_body("other", "a.pdf", b"%PDF")))
        .unwrap();
    let raw = app.send(req).await;

    assert_eq!(raw.status, StatusCode::BAD_REQUEST);
}
