//! Deterministic doubles for the log ID and notifier ports.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::domain::LogId;
use crate::domain::ports::{AarNotice, AarNotifier, AarNotifierError, LogIdGenerator};

/// Hands out `log-1`, `log-2`, ...
#[derive(Debug, Default)]
pub struct SequentialLogIds(AtomicUsize);

impl LogIdGenerator for SequentialLogIds {
    fn next_log_id(&self) -> LogId {
        let next = self.0.fetch_add(1, Ordering::SeqCst) + 1;
        match LogId::new(format!("log-{next}")) {
            Ok(id) => id,
            Err(error) => panic!("sequential log id invalid: {error}"),
        }
    }
}

/// Records every notice; optionally fails each post.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<AarNotice>>,
    fail: bool,
}

impl RecordingNotifier {
    /// Notifier whose posts always fail after recording.
    pub fn failing() -> Self {
        Self {
            notices: Mutex::default(),
            fail: true,
        }
    }

    /// Notices posted so far.
    pub fn notices(&self) -> Vec<AarNotice> {
        match self.notices.lock() {
            Ok(notices) => notices.clone(),
            Err(_) => panic!("notices mutex"),
        }
    }
}

#[async_trait]
impl AarNotifier for RecordingNotifier {
    async fn post_notice(&self, notice: &AarNotice) -> Result<(), AarNotifierError> {
        match self.notices.lock() {
            Ok(mut notices) => notices.push(notice.clone()),
            Err(_) => panic!("notices mutex"),
        }
        if self.fail {
            return Err(AarNotifierError::transport("channel offline"));
        }
        Ok(())
    }
}
