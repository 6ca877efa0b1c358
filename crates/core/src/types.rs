/// User records are keyed by random UUIDs so the id can travel in checkout URLs.
pub type UserId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
