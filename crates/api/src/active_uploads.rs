//! One in-flight upload per user.
//!
//! Starting an upload cancels the user's previous one. The handler holds an
//! [`UploadGuard`] for the duration of the request and checks its token
//! between files; dropping the guard clears the registration unless a newer
//! upload has replaced it.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio_util::sync::CancellationToken;
use webdash_core::types::UserId;

type Registry = Arc<Mutex<HashMap<UserId, (u64, CancellationToken)>>>;

#[derive(Default)]
pub struct ActiveUploads {
    entries: Registry,
    next_id: AtomicU64,
}

impl ActiveUploads {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new upload for `user_id`, cancelling any earlier one.
    pub fn begin(&self, user_id: UserId) -> UploadGuard {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let token = CancellationToken::new();
        let previous = self
            .lock()
            .insert(user_id, (id, token.clone()));
        if let Some((_, previous)) = previous {
            tracing::info!(user_id = %user_id, "Cancelling previous upload");
            previous.cancel();
        }
        UploadGuard {
            entries: Arc::clone(&self.entries),
            user_id,
            id,
            token,
        }
    }

    /// Cancel the user's active upload. Returns `false` when none was running.
    pub fn cancel(&self, user_id: UserId) -> bool {
        match self.lock().remove(&user_id) {
            Some((_, token)) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    #[cfg(test)]
    fn is_active(&self, user_id: UserId) -> bool {
        self.lock().contains_key(&user_id)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<UserId, (u64, CancellationToken)>> {
        // A poisoned map is still structurally valid.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

pub struct UploadGuard {
    entries: Registry,
    user_id: UserId,
    id: u64,
    token: CancellationToken,
}

impl UploadGuard {
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Drop for UploadGuard {
    fn drop(&mut self) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        if entries.get(&self.user_id).is_some_and(|(id, _)| *id == self.id) {
            entries.remove(&self.user_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    #[test]
    fn new_upload_cancels_previous() {
        let uploads = ActiveUploads::new();
        let user = Uuid::new_v4();
        let first = uploads.begin(user);
        let second = uploads.begin(user);
        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());

        // The stale guard must not clear the newer registration.
        drop(first);
        assert!(uploads.is_active(user));
        drop(second);
        assert!(!uploads.is_active(user));
    }

    #[test]
    fn explicit_cancel() {
        let uploads = ActiveUploads::new();
        let user = Uuid::new_v4();
        assert!(!uploads.cancel(user));
        let guard = uploads.begin(user);
        assert!(uploads.cancel(user));
        assert!(guard.is_cancelled());
    }

    #[test]
    fn users_are_independent() {
        let uploads = ActiveUploads::new();
        let a = uploads.begin(Uuid::new_v4());
        let _b = uploads.begin(Uuid::new_v4());
        assert!(!a.is_cancelled());
    }
}
