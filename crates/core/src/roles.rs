//! Role name constants.

/// Agency staff: may list customers and update project progress.
pub const ROLE_ADMIN: &str = "admin";

/// Paying customer (the default for sign-ups).
pub const ROLE_USER: &str = "user";
