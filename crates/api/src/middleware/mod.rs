//! Request extractors and middleware.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated user from a JWT Bearer token.
//! - [`rbac::RequireAdmin`], [`rbac::CurrentUser`], [`rbac::RequirePaid`] -- role and account gates.
//! - [`client_ip::ClientIp`] -- caller IP for rate limiting.
//! - [`rate_limit::FixedWindowLimiter`] -- per-key fixed-window limiter.
//! - [`error_envelope::render_errors`] -- error envelope with request id.

pub mod auth;
pub mod client_ip;
pub mod error_envelope;
pub mod rate_limit;
pub mod rbac;
