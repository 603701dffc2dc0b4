mod common;

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;

use common::{register, send, send_raw, test_app, PASSWORD};

#[tokio::test]
async fn register_then_login() {
    let (app, tokens) = test_app();

    let token = register(&app, "test@example.com").await;
    let claims = tokens.verify(&token).unwrap();
    assert_eq!(claims.email, "test@example.com");

    let (status, _, body) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "test@example.com", "password": PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["errors"], json!([]));
    assert!(body["token"].is_string());
}

#[tokio::test]
async fn duplicate_registration_is_bad_request() {
    let (app, _) = test_app();
    register(&app, "test@example.com").await;

    let (status, _, body) = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "email": "test@example.com",
            "password": PASSWORD,
            "confirmPassword": PASSWORD
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({
            "success": false,
            "token": null,
            "errors": ["Email 'test@example.com' is already taken."]
        })
    );
}

#[tokio::test]
async fn weak_password_is_rejected() {
    let (app, _) = test_app();
    let (status, _, body) = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "email": "test@example.com",
            "password": "short",
            "confirmPassword": "short"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(!body["errors"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn wrong_password_gives_generic_error() {
    let (app, _) = test_app();
    register(&app, "test@example.com").await;

    let (status, _, body) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "test@example.com", "password": "WrongPassword!" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"], json!(["Invalid email or password"]));
    assert_eq!(body["token"], json!(null));
}

#[tokio::test]
async fn malformed_body_returns_auth_result() {
    let (app, _) = test_app();

    for uri in ["/api/auth/login", "/api/auth/register"] {
        let (status, _, body) =
            send_raw(&app, "POST", uri, None, Some("{not json".to_string())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["errors"].as_array().unwrap().len(), 1);
    }
}
