//! Webhook-backed [`AarNotifier`].
//!
//! Posts one plain message per accepted report. Mentions are disabled so a
//! display name such as `@everyone` cannot ping the channel.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Serialize;
use tracing::debug;

use crate::domain::ports::{AarNotice, AarNotifier, AarNotifierError};

#[derive(Debug, Serialize, PartialEq, Eq)]
struct WebhookPayload {
    content: String,
    allowed_mentions: AllowedMentions,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct AllowedMentions {
    parse: Vec<String>,
}

/// Notifier posting to a Discord webhook URL.
pub struct DiscordWebhookNotifier {
    client: Client,
    webhook: Url,
}

impl DiscordWebhookNotifier {
    /// Build a notifier for `webhook`.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(webhook: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, webhook })
    }
}

#[async_trait]
impl AarNotifier for DiscordWebhookNotifier {
    async fn post_notice(&self, notice: &AarNotice) -> Result<(), AarNotifierError> {
        let response = self
            .client
            .post(self.webhook.clone())
            .json(&payload(notice))
            .send()
            .await
            .map_err(|error| AarNotifierError::transport(error.to_string()))?;

        let status = response.status();
        if status.is_success() {
            debug!(log_id = %notice.log_id, "aar notice posted");
            return Ok(());
        }
        Err(map_status(status))
    }
}

fn payload(notice: &AarNotice) -> WebhookPayload {
    WebhookPayload {
        content: format!(
            "New **{event}** AAR submitted by {name} (`{steam}`).\nLog ID: `{log_id}`",
            event = notice.event_type,
            name = notice.submitter_name,
            steam = notice.submitter_steam_id,
            log_id = notice.log_id,
        ),
        allowed_mentions: AllowedMentions { parse: Vec::new() },
    }
}

fn map_status(status: StatusCode) -> AarNotifierError {
    let message = format!("status {}", status.as_u16());
    if status.is_client_error() && status != StatusCode::TOO_MANY_REQUESTS {
        AarNotifierError::rejected(message)
    } else {
        AarNotifierError::transport(message)
    }
}
