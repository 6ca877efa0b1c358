//! Background tasks.
//!
//! - [`reminders`] -- long-running sweep that sends due questionnaire
//!   reminders; accepts a [`CancellationToken`](tokio_util::sync::CancellationToken)
//!   for graceful shutdown.
//! - [`site_generation`] -- one-shot task spawned after questionnaire
//!   submission.

pub mod reminders;
pub mod site_generation;
