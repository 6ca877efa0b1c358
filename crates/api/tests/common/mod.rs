#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use webdash_api::active_uploads::ActiveUploads;
use webdash_api::auth::jwt::JwtConfig;
use webdash_api::config::{AppEnv, ServerConfig};
use webdash_api::middleware::rate_limit::FixedWindowLimiter;
use webdash_api::router::build_app_router;
use webdash_api::state::AppState;
use webdash_core::types::UserId;
use webdash_db::models::user::UpdateBilling;
use webdash_db::{DocumentStore, MemoryStore};
use webdash_services::domains::{DomainLookup, DomainLookupError, DomainStatus};
use webdash_services::email::{EmailMessage, MailError, Mailer, SentEmail};
use webdash_services::site_builder::{GeneratedSite, SiteBuilder, SiteBuilderError, SiteRequest};
use webdash_services::storage::{LocalObjectStore, ObjectStore, ObjectStoreError};
use webdash_services::stripe::{CheckoutRequest, CheckoutSession, PaymentGateway, StripeError};

pub const WEBHOOK_SECRET: &str = "whsec_test_secret";
pub const TEST_PASSWORD: &str = "correct-horse-battery";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3001".to_string()],
        request_timeout_secs: 30,
        app_env: AppEnv::Production,
        database_url: None,
        jwt: JwtConfig {
            secret: "test-jwt-secret-with-enough-length".to_string(),
            access_token_expiry_mins: 60,
        },
        verification_salt: "test-salt".to_string(),
        stripe_webhook_secret: WEBHOOK_SECRET.to_string(),
        app_base_url: "http://localhost:3001".to_string(),
        upload_dir: String::new(),
        upload_public_base_url: "http://localhost:3000/uploads".to_string(),
        trust_proxy_headers: true,
    }
}

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

/// Records every message; fails when `fail` is set.
#[derive(Default)]
pub struct FakeMailer {
    pub sent: Mutex<Vec<EmailMessage>>,
    pub fail: Mutex<bool>,
}

impl FakeMailer {
    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for FakeMailer {
    async fn send(&self, message: &EmailMessage) -> Result<SentEmail, MailError> {
        if *self.fail.lock().unwrap() {
            return Err(MailError::Provider {
                status: 503,
                body: "unavailable".into(),
            });
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(SentEmail {
            message_id: Some(format!("<msg-{}@test>", self.sent.lock().unwrap().len())),
        })
    }
}

/// Stripe stand-in. Customer emails are looked up in `customers`.
#[derive(Default)]
pub struct FakePayments {
    pub customers: Mutex<HashMap<String, String>>,
    pub checkouts: Mutex<Vec<CheckoutRequest>>,
    pub cancelled: Mutex<Vec<String>>,
}

#[async_trait]
impl PaymentGateway for FakePayments {
    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, StripeError> {
        self.checkouts.lock().unwrap().push(request.clone());
        Ok(CheckoutSession {
            id: "cs_test_123".into(),
            url: Some("https://checkout.stripe.test/cs_test_123".into()),
        })
    }

    async fn customer_email(&self, customer_id: &str) -> Result<Option<String>, StripeError> {
        Ok(self.customers.lock().unwrap().get(customer_id).cloned())
    }

    async fn cancel_subscription(&self, subscription_id: &str) -> Result<(), StripeError> {
        self.cancelled.lock().unwrap().push(subscription_id.to_string());
        Ok(())
    }
}

/// Domain lookup with canned `(domain, status)` results.
#[derive(Default)]
pub struct FakeDomains {
    pub results: Vec<(String, String)>,
}

#[async_trait]
impl DomainLookup for FakeDomains {
    async fn search(&self, _query: &str) -> Result<Vec<String>, DomainLookupError> {
        Ok(self.results.iter().map(|(d, _)| d.clone()).collect())
    }

    async fn status(&self, domains: &[String]) -> Result<Vec<DomainStatus>, DomainLookupError> {
        Ok(self
            .results
            .iter()
            .filter(|(d, _)| domains.contains(d))
            .map(|(domain, status)| DomainStatus {
                domain: domain.clone(),
                status: status.clone(),
            })
            .collect())
    }
}

/// Site builder that succeeds immediately.
#[derive(Default)]
pub struct FakeSiteBuilder {
    pub requests: Mutex<Vec<SiteRequest>>,
}

#[async_trait]
impl SiteBuilder for FakeSiteBuilder {
    async fn generate(&self, request: &SiteRequest) -> Result<GeneratedSite, SiteBuilderError> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(GeneratedSite {
            site_id: "site_1".into(),
            website_url: Some("https://crumb.webdash.site".into()),
            editor_url: Some("https://builder.test/edit/site_1".into()),
        })
    }
}

/// Object store that parks the first `put` until `release` is notified, so
/// a test can act while an upload is between files.
#[derive(Default)]
pub struct GatedObjectStore {
    pub stored: Mutex<Vec<String>>,
    pub deleted: Mutex<Vec<String>>,
    pub entered: tokio::sync::Notify,
    pub release: tokio::sync::Notify,
}

#[async_trait]
impl ObjectStore for GatedObjectStore {
    async fn put(&self, key: &str, _bytes: &[u8], _content_type: &str) -> Result<String, ObjectStoreError> {
        let first = {
            let mut stored = self.stored.lock().unwrap();
            stored.push(key.to_string());
            stored.len() == 1
        };
        if first {
            self.entered.notify_one();
            self.release.notified().await;
        }
        Ok(format!("https://files.test/{key}"))
    }

    async fn delete(&self, key: &str) -> Result<(), ObjectStoreError> {
        self.deleted.lock().unwrap().push(key.to_string());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub store: Arc<MemoryStore>,
    pub mailer: Arc<FakeMailer>,
    pub payments: Arc<FakePayments>,
    pub site_builder: Arc<FakeSiteBuilder>,
    pub upload_dir: TempDir,
}

impl TestApp {
    pub fn router(&self) -> Router {
        self.router.clone()
    }
}

/// Build the full application router on an in-memory store with fake
/// external services.
pub fn build_test_app() -> TestApp {
    build_test_app_with(test_config(), FakeDomains::default())
}

pub fn build_test_app_with(config: ServerConfig, domains: FakeDomains) -> TestApp {
    assemble(config, domains, None)
}

/// Like [`build_test_app`] but storing uploads in `object_store`.
pub fn build_test_app_with_object_store(object_store: Arc<dyn ObjectStore>) -> TestApp {
    assemble(test_config(), FakeDomains::default(), Some(object_store))
}

fn assemble(
    mut config: ServerConfig,
    domains: FakeDomains,
    object_store: Option<Arc<dyn ObjectStore>>,
) -> TestApp {
    let upload_dir = tempfile::tempdir().unwrap();
    config.upload_dir = upload_dir.path().to_string_lossy().into_owned();
    let object_store: Arc<dyn ObjectStore> = match object_store {
        Some(object_store) => object_store,
        None => Arc::new(LocalObjectStore::new(
            upload_dir.path(),
            config.upload_public_base_url.clone(),
        )),
    };

    let store = Arc::new(MemoryStore::new());
    let mailer = Arc::new(FakeMailer::default());
    let payments = Arc::new(FakePayments::default());
    let site_builder = Arc::new(FakeSiteBuilder::default());

    let state = AppState {
        store: store.clone(),
        config: Arc::new(config.clone()),
        mailer: mailer.clone(),
        payments: payments.clone(),
        domains: Arc::new(domains),
        site_builder: site_builder.clone(),
        object_store,
        verification_limiter: Arc::new(FixedWindowLimiter::new(
            5,
            std::time::Duration::from_secs(300),
        )),
        active_uploads: Arc::new(ActiveUploads::new()),
    };

    TestApp {
        router: build_app_router(state.clone(), &config),
        state,
        store,
        mailer,
        payments,
        site_builder,
        upload_dir,
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::get(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    json_request(app, "POST", uri, body, None).await
}

pub async fn post_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response<Body> {
    json_request(app, "POST", uri, body, Some(token)).await
}

pub async fn put_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response<Body> {
    json_request(app, "PUT", uri, body, Some(token)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::delete(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

async fn json_request(
    app: Router,
    method: &str,
    uri: &str,
    body: Value,
    token: Option<&str>,
) -> Response<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    send(app, builder.body(Body::from(body.to_string())).unwrap()).await
}

/// Sign up through the API and return `(access_token, user_id)`.
pub async fn signup(app: Router, email: &str) -> (String, UserId) {
    let body = serde_json::json!({
        "email": email,
        "password": TEST_PASSWORD,
        "name": "Test Owner",
    });
    let response = post_json(app, "/api/v1/auth/signup", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    let token = json["data"]["access_token"].as_str().unwrap().to_string();
    let id = json["data"]["user"]["id"].as_str().unwrap().parse().unwrap();
    (token, id)
}

/// Sign up and mark the account paid on `plan`, as the checkout webhook
/// would.
pub async fn signup_paid(app: &TestApp, email: &str, plan: &str) -> (String, UserId) {
    let (token, user_id) = signup(app.router(), email).await;
    app.store
        .update_billing(
            user_id,
            UpdateBilling {
                plan_type: Some(plan.into()),
                billing_cycle: Some("monthly".into()),
                has_paid: Some(true),
                subscription_status: Some("active".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    (token, user_id)
}

/// One file part in a multipart body.
pub struct Part<'a> {
    pub field: &'a str,
    pub file_name: &'a str,
    pub content_type: &'a str,
    pub bytes: Vec<u8>,
}

pub const BOUNDARY: &str = "webdash-test-boundary";

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                part.field, part.file_name
            )
            .as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", part.content_type).as_bytes());
        body.extend_from_slice(&part.bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub async fn post_multipart_auth(
    app: Router,
    uri: &str,
    parts: &[Part<'_>],
    token: &str,
) -> Response<Body> {
    let request = Request::post(uri)
        .header("authorization", format!("Bearer {token}"))
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap();
    send(app, request).await
}
