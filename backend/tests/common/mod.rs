// Not every util is used in every test file, so we allow dead code
#![allow(dead_code)]

use std::sync::Arc;

use axum::{body::Body, http::Request, response::Response, Router};
use http_body_util::BodyExt;
use serde_json::json;
use tower::ServiceExt;

use backend::db::Database;
use backend::images::ImageService;
use backend::jwt::JwtManager;
use backend::media_storage::{InMemoryObjectStore, ObjectStore, UploadPolicy};
use backend::routes;
use backend::state::AppState;

pub const TEST_JWT_SECRET: &[u8] = b"integration-test-secret";
pub const PUBLIC_BASE_URL: &str = "https://cdn.test.invalid";

/// Test harness running the real router against an in-memory object
/// store and an in-memory database.
pub struct TestContext {
    pub router: Router,
    pub store: Arc<InMemoryObjectStore>,
    pub db: Database,
    pub jwt_manager: Arc<JwtManager>,
}

impl TestContext {
    pub async fn new() -> Self {
        tracing_subscriber::fmt().try_init().ok();

        let db = Database::open_in_memory()
            .await
            .expect("Failed to open in-memory database");
        let store = Arc::new(InMemoryObjectStore::new());
        let jwt_manager = Arc::new(JwtManager::new(TEST_JWT_SECRET, 3600));

        let object_store: Arc<dyn ObjectStore> = store.clone();
        let images = ImageService::new(
            db.clone(),
            object_store,
            UploadPolicy::new(PUBLIC_BASE_URL),
        );

        let state = AppState {
            db: db.clone(),
            images,
            jwt_manager: jwt_manager.clone(),
        };

        let router = routes::handler(state);

        Self {
            router,
            store,
            db,
            jwt_manager,
        }
    }

    pub async fn send_post_request(
        &self,
        route: &str,
        payload: serde_json::Value,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        let request = Request::builder()
            .uri(route)
            .method("POST")
            .header("Content-Type", "application/json")
            .body(Body::from(payload.to_string()))?;

        let response = self.router.clone().oneshot(request).await?;
        Ok(response)
    }

    pub async fn send_authed_post_request(
        &self,
        route: &str,
        token: &str,
        payload: serde_json::Value,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        let request = Request::builder()
            .uri(route)
            .method("POST")
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {token}"))
            .body(Body::from(payload.to_string()))?;

        let response = self.router.clone().oneshot(request).await?;
        Ok(response)
    }

    pub async fn send_get_request(
        &self,
        route: &str,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        let request = Request::builder()
            .uri(route)
            .method("GET")
            .body(Body::empty())?;

        let response = self.router.clone().oneshot(request).await?;
        Ok(response)
    }

    pub async fn send_authed_get_request(
        &self,
        route: &str,
        token: &str,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        let request = Request::builder()
            .uri(route)
            .method("GET")
            .header("Authorization", format!("Bearer {token}"))
            .body(Body::empty())?;

        let response = self.router.clone().oneshot(request).await?;
        Ok(response)
    }

    pub async fn send_authed_delete_request(
        &self,
        route: &str,
        token: &str,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        let request = Request::builder()
            .uri(route)
            .method("DELETE")
            .header("Authorization", format!("Bearer {token}"))
            .body(Body::empty())?;

        let response = self.router.clone().oneshot(request).await?;
        Ok(response)
    }

    /// Registers a user and returns their bearer token
    pub async fn register_user(&self, username: &str) -> String {
        let response = self
            .send_post_request(
                "/api/auth/register",
                json!({
                    "username": username,
                    "email": format!("{username}@example.com"),
                    "password": "correct-horse-battery",
                }),
            )
            .await
            .expect("Failed to send register request");

        assert_eq!(response.status(), http::StatusCode::CREATED);

        let body = parse_response_body(response).await;
        body["access_token"]
            .as_str()
            .expect("register response missing access_token")
            .to_string()
    }

    /// The user id bound to a token issued by this context
    pub fn user_id_from_token(&self, token: &str) -> i64 {
        self.jwt_manager
            .validate(token)
            .expect("invalid test token")
            .user_id()
            .expect("token subject is not a user id")
    }

    /// Runs the full slot-issue / simulated-upload / confirm sequence and
    /// returns the confirmed image metadata.
    pub async fn confirm_uploaded_image(
        &self,
        token: &str,
        filename: &str,
        content_type: &str,
        size_bytes: i64,
    ) -> serde_json::Value {
        let response = self
            .send_authed_post_request(
                "/api/images/upload-url",
                token,
                json!({
                    "filename": filename,
                    "content_type": content_type,
                    "size_bytes": size_bytes,
                }),
            )
            .await
            .expect("Failed to send upload-url request");
        assert_eq!(response.status(), http::StatusCode::OK);

        let slot = parse_response_body(response).await;
        let storage_key = slot["storage_key"].as_str().unwrap();

        // Simulate the client's direct PUT to the object store
        self.store.put_object(storage_key, size_bytes, content_type);

        let response = self
            .send_authed_post_request(
                "/api/images/confirm",
                token,
                json!({
                    "storage_key": storage_key,
                    "filename": filename,
                    "content_type": content_type,
                    "size_bytes": size_bytes,
                }),
            )
            .await
            .expect("Failed to send confirm request");
        assert_eq!(response.status(), http::StatusCode::CREATED);

        parse_response_body(response).await
    }
}

/// Parse response body to JSON
pub async fn parse_response_body(response: Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

/// Recovers the storage key from an image response's derived public URL
pub fn storage_key_of(image: &serde_json::Value) -> String {
    let prefix = format!("{PUBLIC_BASE_URL}/");
    image["public_url"]
        .as_str()
        .expect("image response missing public_url")
        .strip_prefix(&prefix)
        .expect("public_url not under the test base URL")
        .to_string()
}
