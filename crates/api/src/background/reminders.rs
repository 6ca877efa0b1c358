//! Questionnaire reminder sweep.
//!
//! Every minute, sends each pending reminder whose due time has passed.
//! Reminders are processed one at a time; a send failure marks that reminder
//! `failed` and moves on. Failed reminders are not retried.

use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use webdash_services::email::reminder_email;

use crate::state::AppState;

/// How often the sweep runs.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Counts from one sweep.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepOutcome {
    pub sent: usize,
    pub failed: usize,
}

/// Run the sweep loop until `cancel` is triggered.
pub async fn run(state: AppState, cancel: CancellationToken) {
    tracing::info!(interval_secs = SWEEP_INTERVAL.as_secs(), "Reminder sweep started");

    let mut interval = tokio::time::interval(SWEEP_INTERVAL);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Reminder sweep stopping");
                break;
            }
            _ = interval.tick() => {
                let outcome = sweep_once(&state).await;
                if outcome.sent + outcome.failed > 0 {
                    tracing::info!(sent = outcome.sent, failed = outcome.failed, "Reminder sweep: processed due reminders");
                } else {
                    tracing::debug!("Reminder sweep: nothing due");
                }
            }
        }
    }
}

/// Send every reminder due now.
pub async fn sweep_once(state: &AppState) -> SweepOutcome {
    let mut outcome = SweepOutcome::default();

    let due = match state.store.list_due_reminders(Utc::now()).await {
        Ok(due) => due,
        Err(e) => {
            tracing::error!(error = %e, "Reminder sweep: failed to list due reminders");
            return outcome;
        }
    };

    let link = state.config.app_url("/questionnaire");
    for reminder in due {
        let message = reminder_email(&reminder.email, &reminder.name, &link);
        let result = match state.mailer.send(&message).await {
            Ok(sent) => {
                outcome.sent += 1;
                state
                    .store
                    .mark_reminder_sent(reminder.id, sent.message_id, Utc::now())
                    .await
            }
            Err(e) => {
                outcome.failed += 1;
                tracing::warn!(reminder_id = %reminder.id, error = %e, "Reminder email failed");
                state
                    .store
                    .mark_reminder_failed(reminder.id, e.to_string())
                    .await
            }
        };
        if let Err(e) = result {
            tracing::error!(reminder_id = %reminder.id, error = %e, "Failed to record reminder outcome");
        }
    }

    outcome
}
