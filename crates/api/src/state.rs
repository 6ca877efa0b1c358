use std::sync::Arc;

use webdash_db::DocumentStore;
use webdash_services::domains::DomainLookup;
use webdash_services::email::Mailer;
use webdash_services::site_builder::SiteBuilder;
use webdash_services::storage::ObjectStore;
use webdash_services::stripe::PaymentGateway;

use crate::active_uploads::ActiveUploads;
use crate::config::ServerConfig;
use crate::middleware::rate_limit::FixedWindowLimiter;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: everything is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub config: Arc<ServerConfig>,
    pub mailer: Arc<dyn Mailer>,
    pub payments: Arc<dyn PaymentGateway>,
    pub domains: Arc<dyn DomainLookup>,
    pub site_builder: Arc<dyn SiteBuilder>,
    pub object_store: Arc<dyn ObjectStore>,
    /// Limits verification-code requests per client IP.
    pub verification_limiter: Arc<FixedWindowLimiter>,
    pub active_uploads: Arc<ActiveUploads>,
}
