//! Integration tests for document CRUD.

mod helpers;

use http::StatusCode;
use serde_json::json;

use helpers::TestApp;

#[tokio::test]
async fn test_add_list_get_round_trip() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;

    let fields = json!({
        "Arquivo": "Carta de 1890",
        "Local": "Rio de Janeiro",
        "Caixa": 12,
        "Tags": ["correspondência", "família"]
    });
    let response = app
        .request("POST", "/api/documents", Some(fields.clone()), Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    let id = response.body["data"]["id"].as_str().unwrap().to_string();
    assert!(!id.is_empty());

    let response = app.request("GET", "/api/documents", None, Some(&token)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"].as_array().unwrap().len(), 1);

    let response = app
        .request("GET", &format!("/api/documents/{id}"), None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let doc = &response.body["data"];
    for (key, value) in fields.as_object().unwrap() {
        assert_eq!(&doc[key], value, "field {key}");
    }
    assert!(doc["created_at"].as_str().is_some());
}

#[tokio::test]
async fn test_rapid_adds_get_distinct_ids() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;

    let mut ids = Vec::new();
    for n in 0..2 {
        let response = app
            .request(
                "POST",
                "/api/documents",
                Some(json!({ "Arquivo": format!("doc {n}") })),
                Some(&token),
            )
            .await;
        ids.push(response.body["data"]["id"].as_str().unwrap().to_string());
    }

    assert_ne!(ids[0], ids[1]);
}

#[tokio::test]
async fn test_update_keeps_identity() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;

    let response = app
        .request(
            "POST",
            "/api/documents",
            Some(json!({ "Arquivo": "Mapa" })),
            Some(&token),
        )
        .await;
    let created = response.body["data"].clone();
    let id = created["id"].as_str().unwrap();

    let response = app
        .request(
            "PUT",
            &format!("/api/documents/{id}"),
            Some(json!({ "id": "forged", "Arquivo": "Mapa revisado", "Escala": "1:5000" })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let updated = &response.body["data"];
    assert_eq!(updated["id"], id);
    assert_eq!(updated["Arquivo"], "Mapa revisado");
    assert_eq!(updated["Escala"], "1:5000");
    assert_eq!(updated["created_at"], created["created_at"]);
    assert!(updated["updated_at"].as_str().is_some());

    let response = app
        .request(
            "PUT",
            "/api/documents/missing",
            Some(json!({ "Arquivo": "x" })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_missing_leaves_collection_untouched() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;

    app.request(
        "POST",
        "/api/documents",
        Some(json!({ "Arquivo": "Foto" })),
        Some(&token),
    )
    .await;

    let response = app
        .request("DELETE", "/api/documents/does-not-exist", None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["error"], "NOT_FOUND");

    let response = app.request("GET", "/api/documents", None, Some(&token)).await;
    assert_eq!(response.body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_delete_document() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;

    let response = app
        .request(
            "POST",
            "/api/documents",
            Some(json!({ "Arquivo": "Ata" })),
            Some(&token),
        )
        .await;
    let id = response.body["data"]["id"].as_str().unwrap().to_string();

    let response = app
        .request("DELETE", &format!("/api/documents/{id}"), None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app
        .request("GET", &format!("/api/documents/{id}"), None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app.request("GET", "/api/audit", None, Some(&token)).await;
    let actions: Vec<&str> = response.body["data"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|e| e["action"].as_str())
        .collect();
    assert!(actions.contains(&"ADD_DOCUMENT"));
    assert!(actions.contains(&"DELETE_DOCUMENT"));
}

#[tokio::test]
async fn test_viewer_is_read_only() {
    let app = TestApp::new().await;
    let viewer = app.create_user("vic", "viewer").await;

    let response = app
        .request(
            "POST",
            "/api/documents",
            Some(json!({ "Arquivo": "x" })),
            Some(&viewer),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.body["error"], "FORBIDDEN");

    let response = app.request("GET", "/api/documents", None, Some(&viewer)).await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app.request("GET", "/api/audit", None, Some(&viewer)).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_body_must_be_an_object() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;

    let response = app
        .request("POST", "/api/documents", Some(json!(["a", "b"])), Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}
