mod common;

use common::*;

use backend::jwt::JwtManager;
use http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_health_endpoint() {
    let ctx = TestContext::new().await;

    let response = ctx
        .send_get_request("/api/health")
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body["status"], "ok");
    assert!(body["semver"].is_string());
}

// Registration

#[tokio::test]
async fn test_register_happy_path() {
    let ctx = TestContext::new().await;

    let response = ctx
        .send_post_request(
            "/api/auth/register",
            json!({
                "username": "alice",
                "email": "alice@example.com",
                "password": "correct-horse-battery",
            }),
        )
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::CREATED);

    let body = parse_response_body(response).await;
    assert_eq!(body["token_type"], "bearer");

    let token = body["access_token"].as_str().unwrap();
    let claims = ctx.jwt_manager.validate(token).expect("token must verify");
    assert!(claims.user_id().is_some());
}

#[tokio::test]
async fn test_register_duplicate_username() {
    let ctx = TestContext::new().await;
    ctx.register_user("alice").await;

    let response = ctx
        .send_post_request(
            "/api/auth/register",
            json!({
                "username": "alice",
                "email": "other@example.com",
                "password": "correct-horse-battery",
            }),
        )
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = parse_response_body(response).await;
    assert_eq!(body["error"]["code"], "username_taken");
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let ctx = TestContext::new().await;
    ctx.register_user("alice").await;

    let response = ctx
        .send_post_request(
            "/api/auth/register",
            json!({
                "username": "alice2",
                "email": "alice@example.com",
                "password": "correct-horse-battery",
            }),
        )
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = parse_response_body(response).await;
    assert_eq!(body["error"]["code"], "email_taken");
}

#[tokio::test]
async fn test_register_rejects_invalid_fields() {
    let ctx = TestContext::new().await;

    // Username too short
    let response = ctx
        .send_post_request(
            "/api/auth/register",
            json!({
                "username": "ab",
                "email": "ab@example.com",
                "password": "correct-horse-battery",
            }),
        )
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Username with invalid characters
    let response = ctx
        .send_post_request(
            "/api/auth/register",
            json!({
                "username": "not a name",
                "email": "x@example.com",
                "password": "correct-horse-battery",
            }),
        )
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Malformed email
    let response = ctx
        .send_post_request(
            "/api/auth/register",
            json!({
                "username": "bob",
                "email": "not-an-email",
                "password": "correct-horse-battery",
            }),
        )
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Password too short
    let response = ctx
        .send_post_request(
            "/api/auth/register",
            json!({
                "username": "bob",
                "email": "bob@example.com",
                "password": "short",
            }),
        )
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// Login

#[tokio::test]
async fn test_login_with_username_and_email() {
    let ctx = TestContext::new().await;
    ctx.register_user("alice").await;

    for identifier in ["alice", "alice@example.com"] {
        let response = ctx
            .send_post_request(
                "/api/auth/login",
                json!({
                    "username": identifier,
                    "password": "correct-horse-battery",
                }),
            )
            .await
            .expect("Failed to send request");

        assert_eq!(response.status(), StatusCode::OK);
        let body = parse_response_body(response).await;
        assert_eq!(body["token_type"], "bearer");
        assert!(body["access_token"].is_string());
    }
}

#[tokio::test]
async fn test_login_failures_are_uniform() {
    let ctx = TestContext::new().await;
    ctx.register_user("alice").await;

    // Wrong password for a real user
    let response = ctx
        .send_post_request(
            "/api/auth/login",
            json!({ "username": "alice", "password": "wrong-password" }),
        )
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let wrong_password = parse_response_body(response).await;

    // Unknown user entirely
    let response = ctx
        .send_post_request(
            "/api/auth/login",
            json!({ "username": "mallory", "password": "wrong-password" }),
        )
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let unknown_user = parse_response_body(response).await;

    // Same body for both: no existence oracle
    assert_eq!(wrong_password, unknown_user);
    assert_eq!(wrong_password["error"]["code"], "invalid_credentials");
}

// Current user

#[tokio::test]
async fn test_me_returns_profile() {
    let ctx = TestContext::new().await;
    let token = ctx.register_user("alice").await;

    let response = ctx
        .send_authed_get_request("/api/auth/me", &token)
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body["username"], "alice");
    assert_eq!(body["email"], "alice@example.com");
    assert!(body["id"].is_i64());
    assert!(body["created_at"].is_string());
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn test_me_requires_token() {
    let ctx = TestContext::new().await;

    let response = ctx
        .send_get_request("/api/auth/me")
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = parse_response_body(response).await;
    assert_eq!(body["error"]["code"], "missing_token");
}

#[tokio::test]
async fn test_expired_token_is_rejected() {
    let ctx = TestContext::new().await;
    let token = ctx.register_user("alice").await;
    let user_id = ctx.user_id_from_token(&token);

    // Same secret, expiry already in the past
    let expired_issuer = JwtManager::new(TEST_JWT_SECRET, -3600);
    let expired_token = expired_issuer.issue_token(user_id).unwrap();

    let response = ctx
        .send_authed_get_request("/api/auth/me", &expired_token)
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = parse_response_body(response).await;
    assert_eq!(body["error"]["code"], "invalid_token");
}

#[tokio::test]
async fn test_tampered_token_is_rejected() {
    let ctx = TestContext::new().await;
    let token = ctx.register_user("alice").await;

    let flipped = if token.ends_with('A') { 'B' } else { 'A' };
    let mut tampered = token[..token.len() - 1].to_string();
    tampered.push(flipped);

    let response = ctx
        .send_authed_get_request("/api/auth/me", &tampered)
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_foreign_secret_token_is_rejected() {
    let ctx = TestContext::new().await;
    let token = ctx.register_user("alice").await;
    let user_id = ctx.user_id_from_token(&token);

    let foreign_issuer = JwtManager::new(b"some-other-secret", 3600);
    let foreign_token = foreign_issuer.issue_token(user_id).unwrap();

    let response = ctx
        .send_authed_get_request("/api/auth/me", &foreign_token)
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
