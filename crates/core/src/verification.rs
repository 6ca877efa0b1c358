//! Email verification codes.
//!
//! A code is stored under a salted hash of the lowercased email so the
//! storage key does not reveal the address. The original (lowercased) email
//! is kept alongside for a second equality check on verify.

use chrono::Duration;
use rand::Rng;

use crate::hashing::sha256_hex;
use crate::types::Timestamp;

/// Codes expire this long after they are issued.
pub const CODE_TTL_MINUTES: i64 = 10;

/// Number of digits in a code.
pub const CODE_LENGTH: usize = 6;

/// Outcome of comparing a submitted code with the stored record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeCheck {
    /// Code and email match and the record is still live. Consume it.
    Valid,
    /// The record is past its expiry. Remove it.
    Expired,
    /// Wrong code or email. Keep the record so the user can retry.
    Mismatch,
}

/// Lowercase and trim an email for keying and comparison.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Storage key for an email's verification code.
pub fn storage_key(email: &str, salt: &str) -> String {
    sha256_hex(format!("{salt}:{}", normalize_email(email)).as_bytes())
}

/// Generate a random six-digit code (no leading zero).
pub fn generate_code() -> String {
    let code: u32 = rand::rng().random_range(100_000..1_000_000);
    code.to_string()
}

/// Expiry timestamp for a code issued at `issued_at`.
pub fn expires_at(issued_at: Timestamp) -> Timestamp {
    issued_at + Duration::minutes(CODE_TTL_MINUTES)
}

/// Compare a submitted code against a stored record.
///
/// Expiry is checked first and is inclusive: a check at exactly
/// `expires_at` is already expired.
pub fn check_code(
    stored_email: &str,
    stored_code: &str,
    stored_expires_at: Timestamp,
    email: &str,
    code: &str,
    now: Timestamp,
) -> CodeCheck {
    if now >= stored_expires_at {
        return CodeCheck::Expired;
    }
    if stored_email != normalize_email(email) || stored_code != code.trim() {
        return CodeCheck::Mismatch;
    }
    CodeCheck::Valid
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn t0() -> Timestamp {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn generated_codes_are_six_digits() {
        for _ in 0..100 {
            let code = generate_code();
            assert_eq!(code.len(), CODE_LENGTH);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn key_ignores_case_and_whitespace_but_depends_on_salt() {
        assert_eq!(
            storage_key(" Owner@Shop.com ", "salt"),
            storage_key("owner@shop.com", "salt")
        );
        assert_ne!(storage_key("owner@shop.com", "a"), storage_key("owner@shop.com", "b"));
        assert!(!storage_key("owner@shop.com", "salt").contains("owner"));
    }

    #[test]
    fn code_expires_exactly_ten_minutes_after_issue() {
        let expiry = expires_at(t0());
        let just_before = expiry - Duration::seconds(1);
        assert_eq!(
            check_code("a@b.com", "123456", expiry, "a@b.com", "123456", just_before),
            CodeCheck::Valid
        );
        assert_eq!(
            check_code("a@b.com", "123456", expiry, "a@b.com", "123456", expiry),
            CodeCheck::Expired
        );
        assert_eq!(
            check_code("a@b.com", "123456", expiry, "a@b.com", "123456", expiry + Duration::minutes(5)),
            CodeCheck::Expired
        );
    }

    #[test]
    fn wrong_code_or_email_is_a_mismatch() {
        let expiry = expires_at(t0());
        assert_eq!(
            check_code("a@b.com", "123456", expiry, "a@b.com", "654321", t0()),
            CodeCheck::Mismatch
        );
        assert_eq!(
            check_code("a@b.com", "123456", expiry, "c@d.com", "123456", t0()),
            CodeCheck::Mismatch
        );
        assert_eq!(
            check_code("a@b.com", "123456", expiry, "A@B.com", "123456", t0()),
            CodeCheck::Valid
        );
    }
}
