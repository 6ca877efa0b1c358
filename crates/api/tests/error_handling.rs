//! Error envelope: `AppError` mapping and the request-id aware renderer.

mod common;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::{body_json, get, get_auth, post_json, TEST_PASSWORD};
use http_body_util::BodyExt;
use serde_json::json;
use webdash_api::config::AppEnv;
use webdash_api::error::AppError;
use webdash_core::error::{CoreError, FieldError};

/// Helper: convert an `AppError` into its status code and parsed JSON body.
async fn error_to_response(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

#[tokio::test]
async fn not_found_hides_internal_detail() {
    let err = AppError::Core(CoreError::NotFound {
        entity: "User",
        id: "42".into(),
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "Resource not found");
    assert!(json.get("message").is_none());
}

#[tokio::test]
async fn field_errors_are_listed() {
    let err = AppError::from(FieldError::new("contactEmail", "Please enter a valid email address"));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Please enter a valid email address");
    assert_eq!(json["fields"][0]["field"], "contactEmail");
}

#[tokio::test]
async fn internal_errors_are_generic() {
    let (status, json) = error_to_response(AppError::InternalError("pool exhausted".into())).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "An internal error occurred");
    assert!(!json.to_string().contains("pool exhausted"));
}

#[tokio::test]
async fn rate_limit_maps_to_429() {
    let (status, json) = error_to_response(AppError::Core(CoreError::RateLimited("x".into()))).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(json["error"], "Too many requests. Please try again later");
}

#[tokio::test]
async fn handler_errors_carry_the_request_id() {
    let app = common::build_test_app();

    let response = get_auth(app.router(), "/api/v1/account", "garbage").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let header = response
        .headers()
        .get("x-request-id")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();

    let json = body_json(response).await;
    assert_eq!(json["requestId"], header);
    assert!(json.get("message").is_none());
}

#[tokio::test]
async fn unknown_routes_and_bad_json_use_the_envelope() {
    let app = common::build_test_app();

    let response = get(app.router(), "/api/v1/nope").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "Resource not found");
    assert!(json["requestId"].is_string());

    let response = post_json(app.router(), "/api/v1/auth/login", json!({ "email": 1 })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Invalid request data");
}

#[tokio::test]
async fn development_mode_exposes_detail() {
    let mut config = common::test_config();
    config.app_env = AppEnv::Development;
    let app = common::build_test_app_with(config, common::FakeDomains::default());

    let response = post_json(
        app.router(),
        "/api/v1/auth/login",
        json!({ "email": "nobody@crumb.test", "password": TEST_PASSWORD }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Invalid email or password");
}
