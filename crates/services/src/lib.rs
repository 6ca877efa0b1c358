//! Clients for the third-party services WebDash depends on.
//!
//! Each client sits behind a trait so the API can hold `Arc<dyn Trait>` and
//! tests can substitute in-process fakes:
//!
//! - [`email::Mailer`]: transactional email (Mailgun).
//! - [`stripe::PaymentGateway`]: checkout sessions, customer lookup and
//!   subscription cancellation (Stripe).
//! - [`domains::DomainLookup`]: domain suggestions and registration status.
//! - [`site_builder::SiteBuilder`]: AI website generation.
//! - [`storage::ObjectStore`]: storage for questionnaire uploads.

pub mod domains;
pub mod email;
pub mod site_builder;
pub mod storage;
pub mod stripe;

use std::time::Duration;

/// HTTP request timeout shared by the outbound clients.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Build the shared outbound HTTP client.
pub fn http_client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()
}
