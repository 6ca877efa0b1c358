//! Email verification codes: rate limiting and the verify flow.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{Duration, Utc};
use common::{body_json, post_json, send};
use serde_json::json;
use webdash_core::verification::storage_key;
use webdash_db::models::verification_code::VerificationCode;
use webdash_db::DocumentStore;

async fn seed_code(app: &common::TestApp, email: &str, code: &str, expires_in: Duration) -> String {
    let key = storage_key(email, &app.state.config.verification_salt);
    let now = Utc::now();
    app.store
        .upsert_verification_code(VerificationCode {
            key: key.clone(),
            email: email.to_string(),
            code: code.to_string(),
            created_at: now - Duration::minutes(10),
            expires_at: now + expires_in,
        })
        .await
        .unwrap();
    key
}

async fn verify(app: &common::TestApp, email: &str, code: &str) -> bool {
    let response = post_json(
        app.router(),
        "/api/v1/auth/verification/verify",
        json!({ "email": email, "code": code }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["data"]["verified"].as_bool().unwrap()
}

async fn send_code(app: &common::TestApp, email: &str, ip: &str) -> StatusCode {
    let request = Request::post("/api/v1/auth/verification/send")
        .header("content-type", "application/json")
        .header("x-forwarded-for", ip)
        .body(Body::from(json!({ "email": email }).to_string()))
        .unwrap();
    send(app.router(), request).await.status()
}

fn last_code(app: &common::TestApp) -> String {
    let sent = app.mailer.sent();
    let subject = &sent.last().unwrap().subject;
    subject.rsplit(' ').next().unwrap().to_string()
}

#[tokio::test]
async fn sixth_request_in_window_is_rate_limited() {
    let app = common::build_test_app();

    for _ in 0..5 {
        assert_eq!(send_code(&app, "owner@crumb.test", "203.0.113.7").await, StatusCode::OK);
    }
    assert_eq!(
        send_code(&app, "owner@crumb.test", "203.0.113.7").await,
        StatusCode::TOO_MANY_REQUESTS
    );

    // Other clients are unaffected.
    assert_eq!(send_code(&app, "owner@crumb.test", "198.51.100.2").await, StatusCode::OK);
    assert_eq!(app.mailer.sent().len(), 6);
}

#[tokio::test]
async fn spoofed_forwarding_entries_do_not_reset_the_limit() {
    let app = common::build_test_app();

    // Only the hop appended by the proxy counts.
    for n in 0..5 {
        let chain = format!("192.0.2.{n}, 203.0.113.9");
        assert_eq!(send_code(&app, "owner@crumb.test", &chain).await, StatusCode::OK);
    }
    assert_eq!(
        send_code(&app, "owner@crumb.test", "192.0.2.99, 203.0.113.9").await,
        StatusCode::TOO_MANY_REQUESTS
    );
}

#[tokio::test]
async fn forwarding_header_is_ignored_without_a_trusted_proxy() {
    let mut config = common::test_config();
    config.trust_proxy_headers = false;
    let app = common::build_test_app_with(config, common::FakeDomains::default());

    for n in 0..5 {
        let ip = format!("192.0.2.{n}");
        assert_eq!(send_code(&app, "owner@crumb.test", &ip).await, StatusCode::OK);
    }
    assert_eq!(
        send_code(&app, "owner@crumb.test", "192.0.2.200").await,
        StatusCode::TOO_MANY_REQUESTS
    );
}

#[tokio::test]
async fn correct_code_verifies_once() {
    let app = common::build_test_app();
    assert_eq!(send_code(&app, "Owner@Crumb.test", "203.0.113.8").await, StatusCode::OK);
    let code = last_code(&app);
    assert_eq!(code.len(), 6);

    let response = post_json(
        app.router(),
        "/api/v1/auth/verification/verify",
        json!({ "email": "owner@crumb.test", "code": "000000" }),
    )
    .await;
    assert_eq!(body_json(response).await["data"]["verified"], false);

    // A wrong guess does not burn the code.
    let response = post_json(
        app.router(),
        "/api/v1/auth/verification/verify",
        json!({ "email": "OWNER@crumb.test", "code": code }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["verified"], true);

    let response = post_json(
        app.router(),
        "/api/v1/auth/verification/verify",
        json!({ "email": "owner@crumb.test", "code": code }),
    )
    .await;
    assert_eq!(body_json(response).await["data"]["verified"], false);
}

#[tokio::test]
async fn expired_code_is_refused_and_removed() {
    let app = common::build_test_app();
    let key = seed_code(&app, "late@crumb.test", "482913", Duration::seconds(-1)).await;

    assert!(!verify(&app, "late@crumb.test", "482913").await);
    assert!(app.store.find_verification_code(&key).await.unwrap().is_none());
}

#[tokio::test]
async fn mismatch_keeps_the_record_for_a_retry() {
    let app = common::build_test_app();
    let key = seed_code(&app, "retry@crumb.test", "482913", Duration::minutes(5)).await;

    assert!(!verify(&app, "retry@crumb.test", "111111").await);
    assert!(app.store.find_verification_code(&key).await.unwrap().is_some());
    assert!(!verify(&app, "someone@crumb.test", "482913").await);
    assert!(app.store.find_verification_code(&key).await.unwrap().is_some());

    assert!(verify(&app, "Retry@crumb.test", "482913").await);
    assert!(app.store.find_verification_code(&key).await.unwrap().is_none());
}

#[tokio::test]
async fn invalid_email_is_rejected() {
    let app = common::build_test_app();
    assert_eq!(send_code(&app, "nope", "203.0.113.9").await, StatusCode::BAD_REQUEST);
    assert!(app.mailer.sent().is_empty());
}
