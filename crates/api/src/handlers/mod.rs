pub mod account;
pub mod admin;
pub mod auth;
pub mod billing;
pub mod dashboard;
pub mod domains;
pub mod questionnaire;
pub mod uploads;
pub mod verification;
pub mod webhooks;
