//! Email verification code model.

use sqlx::FromRow;
use webdash_core::types::Timestamp;

/// A pending verification code from the `verification_codes` table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct VerificationCode {
    /// Salted SHA-256 of the lowercased email.
    pub key: String,
    /// Lowercased email, compared again on verify.
    pub email: String,
    pub code: String,
    pub created_at: Timestamp,
    pub expires_at: Timestamp,
}
