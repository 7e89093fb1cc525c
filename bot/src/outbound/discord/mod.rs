//! Discord outbound adapters.

mod webhook_notifier;

pub use webhook_notifier::DiscordWebhookNotifier;
