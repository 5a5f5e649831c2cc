//! Shared test helpers for integration tests.

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use http::{HeaderMap, Request, StatusCode};
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

use registry_core::config::AppConfig;
use registry_core::config::auth::BootstrapAdmin;
use registry_database::open_store;

/// Bootstrap administrator seeded into every test app.
pub const ADMIN: &str = "admin";
/// Password that satisfies the default strength policy.
pub const STRONG_PASSWORD: &str = "Velvet-Harbor-Quince-7";

const BOUNDARY: &str = "registry-test-boundary";
const BODY_LIMIT: usize = 16 * 1024 * 1024;

/// Test application backed by a JSON store in a temporary directory.
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Application config
    pub config: AppConfig,
    _dir: TempDir,
}

impl TestApp {
    /// Create a new test application with default settings.
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Create a test application after adjusting the configuration.
    pub async fn with_config(adjust: impl FnOnce(&mut AppConfig)) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");

        let mut config = AppConfig::default();
        config.storage.data_root = dir.path().to_string_lossy().into_owned();
        config.auth.jwt_secret = "integration-test-secret-0123456789".to_string();
        config.auth.bootstrap_admin = Some(BootstrapAdmin {
            username: ADMIN.to_string(),
            password: STRONG_PASSWORD.to_string(),
        });
        adjust(&mut config);

        let store = open_store(&config).await.expect("Failed to open store");
        let state = registry_api::build_state(config.clone(), store)
            .await
            .expect("Failed to build state");

        Self {
            router: registry_api::build_app(state),
            config,
            _dir: dir,
        }
    }

    /// Login and return the bearer token
    pub async fn login(&self, username: &str, password: &str) -> String {
        let response = self
            .request(
                "POST",
                "/api/auth/login",
                Some(json!({ "username": username, "password": password })),
                None,
            )
            .await;

        assert_eq!(
            response.status,
            StatusCode::OK,
            "Login failed: {:?}",
            response.body
        );

        response.body["data"]["token"]
            .as_str()
            .expect("No token in login response")
            .to_string()
    }

    /// Token of the bootstrap administrator
    pub async fn admin_token(&self) -> String {
        self.login(ADMIN, STRONG_PASSWORD).await
    }

    /// Register an account through the API and return its token
    pub async fn create_user(&self, username: &str, role: &str) -> String {
        let admin = self.admin_token().await;
        let response = self
            .request(
                "POST",
                "/api/users",
                Some(json!({
                    "username": username,
                    "password": STRONG_PASSWORD,
                    "role": role,
                })),
                Some(&admin),
            )
            .await;
        assert_eq!(
            response.status,
            StatusCode::CREATED,
            "Register failed: {:?}",
            response.body
        );
        self.login(username, STRONG_PASSWORD).await
    }

    /// Make a JSON request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header(CONTENT_TYPE, "application/json");

        if let Some(token) = token {
            req = req.header(AUTHORIZATION, format!("Bearer {token}"));
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        self.send(req).await.into()
    }

    /// Upload `data` as the multipart field `file`
    pub async fn upload(&self, token: &str, filename: &str, data: &[u8]) -> TestResponse {
        let req = Request::builder()
            .method("POST")
            .uri("/api/uploads")
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .header(
                CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(multipart_body("file", filename, data)))
            .expect("Failed to build request");

        self.send(req).await.into()
    }

    /// Send a prepared request and keep the raw response
    pub async fn send(&self, req: Request<Body>) -> RawResponse {
        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), BODY_LIMIT)
            .await
            .expect("Failed to read body")
            .to_vec();

        RawResponse {
            status,
            headers,
            body,
        }
    }

    /// GET with only an Authorization header
    pub async fn get_raw(&self, path: &str, token: &str) -> RawResponse {
        let req = Request::builder()
            .method("GET")
            .uri(path)
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .expect("Failed to build request");
        self.send(req).await
    }
}

/// Build a single-field multipart body.
pub fn multipart_body(field: &str, filename: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// Response with a parsed JSON body
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}

/// Response with the body left as bytes
#[derive(Debug)]
pub struct RawResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Body bytes
    pub body: Vec<u8>,
}

impl RawResponse {
    /// A header value as text, if present.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

impl From<RawResponse> for TestResponse {
    fn from(raw: RawResponse) -> Self {
        Self {
            status: raw.status,
            body: serde_json::from_slice(&raw.body).unwrap_or(Value::Null),
        }
    }
}
