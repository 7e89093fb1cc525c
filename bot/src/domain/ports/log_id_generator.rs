//! Driven port for minting AAR log identifiers.

use crate::domain::LogId;

/// Source of fresh, unique log IDs.
#[cfg_attr(test, mockall::automock)]
pub trait LogIdGenerator: Send + Sync {
    /// Mint a log ID that has never been handed out before.
    fn next_log_id(&self) -> LogId;
}
