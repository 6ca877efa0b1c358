//! Repository layer: one zero-sized struct per table, each taking a
//! `&PgPool` so callers control transactions and pooling.

pub mod reminder_repo;
pub mod user_repo;
pub mod verification_code_repo;

pub use reminder_repo::ReminderRepo;
pub use user_repo::UserRepo;
pub use verification_code_repo::VerificationCodeRepo;
