//! Integration tests for Excel and Word exports.

mod helpers;

use axum::body::Body;
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use http::{Request, StatusCode};
use serde_json::{Value, json};

use helpers::{RawResponse, TestApp};

const XLSX: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
const DOCX: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

async fn export(app: &TestApp, path: &str, body: Value, token: &str) -> RawResponse {
    let req = Request::builder()
        .method("POST")
        .uri(path)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.send(req).await
}

#[tokio::test]
async fn test_empty_excel_export_is_valid() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;

    let raw = export(&app, "/api/exports/excel", json!([]), &token).await;

    assert_eq!(raw.status, StatusCode::OK);
    assert_eq!(raw.header("content-type"), Some(XLSX));
    assert!(raw.body.starts_with(b"PK"));
    let disposition = raw.header("content-disposition").unwrap();
    assert!(disposition.starts_with("attachment; filename=\"export_"));
    assert!(disposition.ends_with(".xlsx\""));
}

#[tokio::test]
async fn test_empty_word_export_is_valid() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;

    let raw = export(&app, "/api/exports/word?name=vazio", json!([]), &token).await;

    assert_eq!(raw.status, StatusCode::OK);
    assert_eq!(raw.header("content-type"), Some(DOCX));
    assert_eq!(
        raw.header("content-disposition"),
        Some("attachment; filename=\"vazio.docx\"")
    );
    assert!(raw.body.starts_with(b"PK"));
}

#[tokio::test]
async fn test_export_history_and_redownload() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;
    let records = json!([
        { "id": "1", "Arquivo": "Carta", "Data": "1890" },
        { "id": "2", "Arquivo": "Mapa", "Escala": "1:5000" }
    ]);

    let raw = export(&app, "/api/exports/excel?name=acervo", records, &token).await;
    assert_eq!(raw.status, StatusCode::OK);

    let history = app.request("GET", "/api/exports", None, Some(&token)).await;
    assert_eq!(history.status, StatusCode::OK);
    let entries = history.body["data"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["output_file_name"], "acervo.xlsx");
    assert_eq!(entries[0]["kind"], "Excel");
    assert_eq!(entries[0]["actor"], "admin");
    assert_eq!(entries[0]["document_count"], 2);
    assert_eq!(entries[0]["snapshot"][1]["Arquivo"], "Mapa");

    let again = app.get_raw("/api/exports/acervo.xlsx", &token).await;
    assert_eq!(again.status, StatusCode::OK);
    assert_eq!(again.body, raw.body);

    let audit = app.request("GET", "/api/audit", None, Some(&token)).await;
    assert!(audit.body["data"]
        .as_array()
        .unwrap()
        .iter()
        .any(|e| e["action"] == "EXPORT_EXCEL"));
}

#[tokio::test]
async fn test_word_export_with_media() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;
    app.upload(&token, "fala.mp3", b"ID3").await;
    app.upload(&token, "quebrada.png", b"not really a png").await;

    let records = json!([
        { "Arquivo": "Entrevista", "associated_file_name": "fala.mp3" },
        { "Arquivo": "Foto", "arquivo_nome": "quebrada.png" },
        { "Arquivo": "Sem mídia", "usuario": "ana" }
    ]);

    let with_media = export(&app, "/api/exports/word?name=midia", records.clone(), &token).await;
    assert_eq!(with_media.status, StatusCode::OK);
    assert!(with_media.body.starts_with(b"PK"));

    let without = export(
        &app,
        "/api/exports/word?name=sem_midia&media=false",
        records,
        &token,
    )
    .await;
    assert_eq!(without.status, StatusCode::OK);
    assert!(with_media.body.len() > without.body.len());
}

#[tokio::test]
async fn test_viewer_exports_but_cannot_read_history() {
    let app = TestApp::new().await;
    let viewer = app.create_user("vic", "viewer").await;

    let raw = export(&app, "/api/exports/excel", json!([{ "Arquivo": "x" }]), &viewer).await;
    assert_eq!(raw.status, StatusCode::OK);

    let history = app.request("GET", "/api/exports", None, Some(&viewer)).await;
    assert_eq!(history.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_export_body_must_be_array_of_objects() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;

    let raw = export(&app, "/api/exports/excel", json!({ "Arquivo": "x" }), &token).await;
    assert_eq!(raw.status, StatusCode::BAD_REQUEST);

    let raw = export(&app, "/api/exports/excel", json!([1, 2]), &token).await;
    assert_eq!(raw.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_download_unknown_export() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;

    let raw = app.get_raw("/api/exports/nada.xlsx", &token).await;
    assert_eq!(raw.status, StatusCode::NOT_FOUND);
}
