mod common;

use auth::Claims;
use auth_service::user::models::UserId;
use auth_service::user::ports::UserRepository;
use chrono::Utc;
use common::TestApp;
use reqwest::StatusCode;
use serde_json::json;

const DUPLICATE_MESSAGE: &str = "User with this email already exists";
const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid login credentials";

#[tokio::test]
async fn test_register_success() {
    let app = TestApp::spawn().await;

    let response = app
        .register(&json!({"email": "a@b.com", "password": "password123"}))
        .await;

    assert_eq!(response.status(), StatusCode::CREATED);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "User created");
    assert_eq!(app.repository.count_by_email("a@b.com").await, 1);
}

#[tokio::test]
async fn test_register_stores_hash_not_plaintext() {
    let app = TestApp::spawn().await;

    app.register(&json!({"email": "a@b.com", "password": "password123"}))
        .await;

    let session: serde_json::Value = app
        .login(&json!({"email": "a@b.com", "password": "password123"}))
        .await
        .json()
        .await
        .expect("Failed to parse response");
    let user_id = UserId::from_string(session["userId"].as_str().unwrap()).unwrap();

    let stored = app
        .repository
        .find_by_id(&user_id)
        .await
        .unwrap()
        .expect("User should be stored");
    assert_ne!(stored.password_hash, "password123");
    assert!(stored.password_hash.starts_with("$argon2id$"));
}

#[tokio::test]
async fn test_register_invalid_email() {
    let app = TestApp::spawn().await;

    let response = app
        .register(&json!({"email": "not-an-email", "password": "password123"}))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "Invalid registration data");
    assert_eq!(body["errors"][0]["field"], "email");
    assert!(app.repository.is_empty().await);
}

#[tokio::test]
async fn test_register_numeric_email() {
    let app = TestApp::spawn().await;

    let response = app
        .register(&json!({"email": 123, "password": "password123"}))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "Invalid registration data");
    assert_eq!(body["errors"][0]["field"], "email");
    assert_eq!(body["errors"][0]["message"], "Invalid email");
    assert!(app.repository.is_empty().await);
}

#[tokio::test]
async fn test_register_form_encoded_body_reports_field_errors() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/api/auth/register")
        .header("Content-Type", "application/x-www-form-urlencoded")
        .body("email=a%40b.com&password=password123")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "Invalid registration data");
    assert_eq!(body["errors"].as_array().map(Vec::len), Some(2));
    assert!(app.repository.is_empty().await);
}

#[tokio::test]
async fn test_register_short_password() {
    let app = TestApp::spawn().await;

    let response = app
        .register(&json!({"email": "a@b.com", "password": "short"}))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    let errors = body["errors"].as_array().unwrap();
    assert!(!errors.is_empty());
    assert_eq!(errors[0]["field"], "password");
    assert!(app.repository.is_empty().await);
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let app = TestApp::spawn().await;
    let credentials = json!({"email": "a@b.com", "password": "password123"});

    let first = app.register(&credentials).await;
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = app.register(&credentials).await;
    assert_eq!(second.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = second.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], DUPLICATE_MESSAGE);
    assert!(body.get("errors").is_none());
    assert_eq!(app.repository.count_by_email("a@b.com").await, 1);
}

#[tokio::test]
async fn test_register_duplicate_differs_only_in_case() {
    let app = TestApp::spawn().await;

    app.register(&json!({"email": "a@b.com", "password": "password123"}))
        .await;
    let response = app
        .register(&json!({"email": "A@B.COM", "password": "password123"}))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(app.repository.len().await, 1);
}

#[tokio::test]
async fn test_concurrent_duplicate_registrations_store_one_user() {
    let app = TestApp::spawn().await;
    let credentials = json!({"email": "race@b.com", "password": "password123"});

    let (first, second) = tokio::join!(app.register(&credentials), app.register(&credentials));

    let mut statuses = vec![first.status().as_u16(), second.status().as_u16()];
    statuses.sort();
    assert_eq!(statuses, vec![201, 400]);
    assert_eq!(app.repository.count_by_email("race@b.com").await, 1);
}

#[tokio::test]
async fn test_login_success() {
    let app = TestApp::spawn().await;

    app.register(&json!({"email": "a@b.com", "password": "password123"}))
        .await;

    let response = app
        .login(&json!({"email": "a@b.com", "password": "password123"}))
        .await;

    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    let token = body["token"].as_str().expect("token should be a string");
    let user_id = body["userId"].as_str().expect("userId should be a string");

    let claims: Claims = app.jwt_handler.decode(token).expect("Token should verify");
    assert_eq!(claims.user_id(), Some(user_id));
    assert_eq!(claims.sub.as_deref(), Some(user_id));

    let expires_in = claims.exp.unwrap() - Utc::now().timestamp();
    assert!((3590..=3600).contains(&expires_in), "expires in {expires_in}s");
}

#[tokio::test]
async fn test_login_normalizes_email() {
    let app = TestApp::spawn().await;

    app.register(&json!({"email": "a@b.com", "password": "password123"}))
        .await;

    let response = app
        .login(&json!({"email": "  A@B.com", "password": "password123"}))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_login_does_not_reveal_which_field_is_wrong() {
    let app = TestApp::spawn().await;

    app.register(&json!({"email": "a@b.com", "password": "password123"}))
        .await;

    let wrong_password = app
        .login(&json!({"email": "a@b.com", "password": "wrong"}))
        .await;
    let unknown_email = app
        .login(&json!({"email": "nobody@b.com", "password": "password123"}))
        .await;

    assert_eq!(wrong_password.status(), StatusCode::BAD_REQUEST);
    assert_eq!(unknown_email.status(), StatusCode::BAD_REQUEST);

    let wrong_password: serde_json::Value = wrong_password.json().await.unwrap();
    let unknown_email: serde_json::Value = unknown_email.json().await.unwrap();
    assert_eq!(wrong_password, unknown_email);
    assert_eq!(wrong_password["message"], INVALID_CREDENTIALS_MESSAGE);
}

#[tokio::test]
async fn test_login_missing_password() {
    let app = TestApp::spawn().await;

    let response = app.login(&json!({"email": "a@b.com"})).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "Invalid login data");
    assert_eq!(body["errors"][0]["field"], "password");
}

#[tokio::test]
async fn test_login_non_string_password() {
    let app = TestApp::spawn().await;

    app.register(&json!({"email": "a@b.com", "password": "password123"}))
        .await;

    let response = app
        .login(&json!({"email": "a@b.com", "password": 12345678}))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "Invalid login data");
    assert_eq!(body["errors"][0]["field"], "password");
    assert_eq!(body["errors"][0]["message"], "Password is required");
}

#[tokio::test]
async fn test_current_user_with_token() {
    let app = TestApp::spawn().await;

    app.register(&json!({"email": "a@b.com", "password": "password123"}))
        .await;
    let session: serde_json::Value = app
        .login(&json!({"email": "a@b.com", "password": "password123"}))
        .await
        .json()
        .await
        .expect("Failed to parse response");

    let response = app
        .get_authenticated("/api/auth/me", session["token"].as_str().unwrap())
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["userId"], session["userId"]);
    assert_eq!(body["email"], "a@b.com");
    assert!(body["createdAt"].is_string());
}

#[tokio::test]
async fn test_current_user_without_token() {
    let app = TestApp::spawn().await;

    let response = app
        .get("/api/auth/me")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_current_user_with_expired_token() {
    let app = TestApp::spawn().await;

    let expired = Claims::for_user(uuid::Uuid::new_v4(), chrono::Duration::hours(-1));
    let token = app.jwt_handler.encode(&expired).unwrap();

    let response = app
        .get_authenticated("/api/auth/me", &token)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_example_scenario() {
    let app = TestApp::spawn().await;

    let registered = app
        .register(&json!({"email": "a@b.com", "password": "password123"}))
        .await;
    assert_eq!(registered.status(), StatusCode::CREATED);

    let logged_in = app
        .login(&json!({"email": "a@b.com", "password": "password123"}))
        .await;
    assert_eq!(logged_in.status(), StatusCode::OK);

    let rejected = app
        .login(&json!({"email": "a@b.com", "password": "wrong"}))
        .await;
    assert_eq!(rejected.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = rejected.json().await.unwrap();
    assert_eq!(body["message"], INVALID_CREDENTIALS_MESSAGE);
}
