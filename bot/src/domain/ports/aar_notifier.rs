//! Driven port for announcing accepted AARs in a channel.

use async_trait::async_trait;

use super::define_port_error;

/// Channel notice describing a freshly logged AAR.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AarNotice {
    /// Ledger lookup key, quoted so members can reference the report later.
    pub log_id: String,
    /// Event type label.
    pub event_type: String,
    /// Display name of the submitting trooper.
    pub submitter_name: String,
    /// SteamID of the submitting trooper.
    pub submitter_steam_id: String,
}

define_port_error! {
    /// Errors surfaced while posting a notice.
    pub enum AarNotifierError {
        /// The channel endpoint could not be reached.
        Transport { message: String } => "notice transport failed: {message}",
        /// The channel endpoint refused the notice.
        Rejected { message: String } => "notice rejected: {message}",
    }
}

/// Port for posting AAR notices.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AarNotifier: Send + Sync {
    /// Post one notice.
    async fn post_notice(&self, notice: &AarNotice) -> Result<(), AarNotifierError>;
}

/// Notifier used when no channel is configured; it only logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingAarNotifier;

#[async_trait]
impl AarNotifier for LoggingAarNotifier {
    async fn post_notice(&self, notice: &AarNotice) -> Result<(), AarNotifierError> {
        tracing::info!(
            log_id = %notice.log_id,
            event_type = %notice.event_type,
            submitter = %notice.submitter_name,
            "aar notice (no channel configured)"
        );
        Ok(())
    }
}
