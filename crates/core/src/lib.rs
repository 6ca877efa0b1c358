//! Domain logic for the WebDash backend.
//!
//! Everything in this crate is pure: no database, network or filesystem
//! access. The API and persistence crates call into these modules for
//! questionnaire sequencing, answer validation, billing event handling,
//! verification codes, upload rules and domain pricing.

pub mod billing;
pub mod domains;
pub mod error;
pub mod hashing;
pub mod plans;
pub mod questionnaire;
pub mod roles;
pub mod site_generation;
pub mod types;
pub mod uploads;
pub mod verification;
