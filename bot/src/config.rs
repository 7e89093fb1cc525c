//! Bot configuration loaded via OrthoConfig.
//!
//! Every value can come from the command line, a config file, or an
//! `AAR_BOT_*` environment variable. Accessors supply defaults; values with
//! no sensible default are reported by [`BotSettings::require`].

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

const DEFAULT_SHEETS_API_BASE: &str = "https://sheets.googleapis.com/";
const DEFAULT_LEDGER_SHEET_NAME: &str = "AARs";
const DEFAULT_CACHE_TTL_MINUTES: u64 = 5;
const DEFAULT_REFRESH_INTERVAL_MINUTES: u64 = 4;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

const DEFAULT_REGISTRATION_RANGE: &str = "Registration!A:E";
const DEFAULT_MAIN_RANGE: &str = "Main!A:Z";
const DEFAULT_PROMOTIONS_RANGE: &str = "Promotions!A:Z";
const DEFAULT_STATISTICS_RANGE: &str = "Statistics!A:Z";
const DEFAULT_PUNISHMENTS_RANGE: &str = "Punishments!A:Z";
const DEFAULT_BLACKLIST_RANGE: &str = "Blacklist!A:E";

/// A required setting was absent or malformed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    /// No value was supplied.
    #[error("missing required setting {name}")]
    Missing {
        /// Setting name as used in the environment (without prefix).
        name: &'static str,
    },
    /// A URL setting did not parse.
    #[error("setting {name} is not a valid url: {message}")]
    InvalidUrl {
        /// Setting name.
        name: &'static str,
        /// Parser message.
        message: String,
    },
}

/// Runtime settings for the AAR bot.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "AAR_BOT")]
pub struct BotSettings {
    /// Sheets API root.
    pub sheets_api_base: Option<String>,
    /// OAuth access token for the Sheets API.
    pub sheets_access_token: Option<String>,
    /// Spreadsheet holding the AAR ledger.
    pub aar_sheet_id: Option<String>,
    /// Tab name of the ledger inside `aar_sheet_id`.
    pub ledger_sheet_name: Option<String>,
    /// Spreadsheet holding roster, promotion, and discipline tabs.
    pub roster_sheet_id: Option<String>,
    /// Range behind the `registrationdata` alias.
    pub registration_range: Option<String>,
    /// Range behind the `mainsheetdata` alias.
    pub main_range: Option<String>,
    /// Range behind the `promosfromdb` alias.
    pub promotions_range: Option<String>,
    /// Range behind the `statistics` alias.
    pub statistics_range: Option<String>,
    /// Range behind the `punishments` alias.
    pub punishments_range: Option<String>,
    /// Range behind the `blacklist` alias.
    pub blacklist_range: Option<String>,
    /// Minutes a cached range stays fresh.
    pub cache_ttl_minutes: Option<u64>,
    /// Minutes between background refresh sweeps.
    pub refresh_interval_minutes: Option<u64>,
    /// Per-request HTTP timeout in seconds.
    pub http_timeout_secs: Option<u64>,
    /// Discord webhook for AAR notices; notices are only logged when unset.
    pub discord_webhook_url: Option<String>,
}

fn minutes(value: u64) -> Duration {
    Duration::from_secs(value.saturating_mul(60))
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).map(str::trim).filter(|value| !value.is_empty())
}

impl BotSettings {
    /// Sheets API root, falling back to the public endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidUrl`] when the configured base does not
    /// parse.
    pub fn sheets_api_base(&self) -> Result<Url, SettingsError> {
        let raw = non_blank(self.sheets_api_base.as_ref()).unwrap_or(DEFAULT_SHEETS_API_BASE);
        Url::parse(raw).map_err(|error| SettingsError::InvalidUrl {
            name: "SHEETS_API_BASE",
            message: error.to_string(),
        })
    }

    /// Ledger tab name.
    pub fn ledger_sheet_name(&self) -> &str {
        non_blank(self.ledger_sheet_name.as_ref()).unwrap_or(DEFAULT_LEDGER_SHEET_NAME)
    }

    /// Cache TTL.
    pub fn cache_ttl(&self) -> Duration {
        minutes(self.cache_ttl_minutes.unwrap_or(DEFAULT_CACHE_TTL_MINUTES))
    }

    /// Background refresh interval.
    pub fn refresh_interval(&self) -> Duration {
        minutes(
            self.refresh_interval_minutes
                .unwrap_or(DEFAULT_REFRESH_INTERVAL_MINUTES),
        )
    }

    /// HTTP request timeout.
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs.unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS))
    }

    /// Webhook URL, if notices should be posted.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidUrl`] when the configured URL does not
    /// parse.
    pub fn discord_webhook_url(&self) -> Result<Option<Url>, SettingsError> {
        non_blank(self.discord_webhook_url.as_ref())
            .map(|raw| {
                Url::parse(raw).map_err(|error| SettingsError::InvalidUrl {
                    name: "DISCORD_WEBHOOK_URL",
                    message: error.to_string(),
                })
            })
            .transpose()
    }

    /// Roster aliases paired with their ranges, in registration order.
    pub fn roster_ranges(&self) -> [(&'static str, &str); 6] {
        [
            (
                "registrationdata",
                non_blank(self.registration_range.as_ref()).unwrap_or(DEFAULT_REGISTRATION_RANGE),
            ),
            (
                "mainsheetdata",
                non_blank(self.main_range.as_ref()).unwrap_or(DEFAULT_MAIN_RANGE),
            ),
            (
                "promosfromdb",
                non_blank(self.promotions_range.as_ref()).unwrap_or(DEFAULT_PROMOTIONS_RANGE),
            ),
            (
                "statistics",
                non_blank(self.statistics_range.as_ref()).unwrap_or(DEFAULT_STATISTICS_RANGE),
            ),
            (
                "punishments",
                non_blank(self.punishments_range.as_ref()).unwrap_or(DEFAULT_PUNISHMENTS_RANGE),
            ),
            (
                "blacklist",
                non_blank(self.blacklist_range.as_ref()).unwrap_or(DEFAULT_BLACKLIST_RANGE),
            ),
        ]
    }

    /// Value of a setting that has no default.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Missing`] when `value` is absent or blank.
    pub fn require<'a>(
        value: Option<&'a String>,
        name: &'static str,
    ) -> Result<&'a str, SettingsError> {
        non_blank(value).ok_or(SettingsError::Missing { name })
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings defaults and environment overrides.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARIABLES: [&str; 15] = [
        "AAR_BOT_SHEETS_API_BASE",
        "AAR_BOT_SHEETS_ACCESS_TOKEN",
        "AAR_BOT_AAR_SHEET_ID",
        "AAR_BOT_LEDGER_SHEET_NAME",
        "AAR_BOT_ROSTER_SHEET_ID",
        "AAR_BOT_REGISTRATION_RANGE",
        "AAR_BOT_MAIN_RANGE",
        "AAR_BOT_PROMOTIONS_RANGE",
        "AAR_BOT_STATISTICS_RANGE",
        "AAR_BOT_PUNISHMENTS_RANGE",
        "AAR_BOT_BLACKLIST_RANGE",
        "AAR_BOT_CACHE_TTL_MINUTES",
        "AAR_BOT_REFRESH_INTERVAL_MINUTES",
        "AAR_BOT_HTTP_TIMEOUT_SECS",
        "AAR_BOT_DISCORD_WEBHOOK_URL",
    ];

    fn load_from_empty_args() -> BotSettings {
        BotSettings::load_from_iter([OsString::from("battalion-bot")])
            .expect("config should load")
    }

    fn env_with(overrides: &[(&str, &str)]) -> Vec<(&'static str, Option<String>)> {
        VARIABLES
            .iter()
            .map(|name| {
                let value = overrides
                    .iter()
                    .find(|(key, _)| key == name)
                    .map(|(_, value)| (*value).to_owned());
                (*name, value)
            })
            .collect()
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env(env_with(&[]));

        let settings = load_from_empty_args();
        assert_eq!(
            settings.sheets_api_base().expect("default url").as_str(),
            DEFAULT_SHEETS_API_BASE
        );
        assert_eq!(settings.ledger_sheet_name(), "AARs");
        assert_eq!(settings.cache_ttl(), Duration::from_secs(300));
        assert_eq!(settings.refresh_interval(), Duration::from_secs(240));
        assert_eq!(settings.http_timeout(), Duration::from_secs(10));
        assert_eq!(settings.discord_webhook_url(), Ok(None));
        assert_eq!(
            settings.roster_ranges()[0],
            ("registrationdata", "Registration!A:E")
        );
        assert_eq!(
            BotSettings::require(settings.sheets_access_token.as_ref(), "SHEETS_ACCESS_TOKEN"),
            Err(SettingsError::Missing {
                name: "SHEETS_ACCESS_TOKEN"
            })
        );
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env(env_with(&[
            ("AAR_BOT_SHEETS_ACCESS_TOKEN", "ya29.token"),
            ("AAR_BOT_AAR_SHEET_ID", "aar-sheet"),
            ("AAR_BOT_LEDGER_SHEET_NAME", "Ledger"),
            ("AAR_BOT_BLACKLIST_RANGE", "BL!A:F"),
            ("AAR_BOT_CACHE_TTL_MINUTES", "2"),
            ("AAR_BOT_REFRESH_INTERVAL_MINUTES", "1"),
            (
                "AAR_BOT_DISCORD_WEBHOOK_URL",
                "https://discord.com/api/webhooks/1/abc",
            ),
        ]));

        let settings = load_from_empty_args();
        assert_eq!(
            BotSettings::require(settings.sheets_access_token.as_ref(), "SHEETS_ACCESS_TOKEN"),
            Ok("ya29.token")
        );
        assert_eq!(settings.aar_sheet_id.as_deref(), Some("aar-sheet"));
        assert_eq!(settings.ledger_sheet_name(), "Ledger");
        assert_eq!(settings.roster_ranges()[5], ("blacklist", "BL!A:F"));
        assert_eq!(settings.cache_ttl(), Duration::from_secs(120));
        assert_eq!(settings.refresh_interval(), Duration::from_secs(60));
        assert_eq!(
            settings
                .discord_webhook_url()
                .expect("valid url")
                .map(String::from),
            Some("https://discord.com/api/webhooks/1/abc".to_owned())
        );
    }

    #[rstest]
    fn malformed_webhook_urls_are_reported() {
        let _guard = lock_env(env_with(&[("AAR_BOT_DISCORD_WEBHOOK_URL", "not a url")]));

        let settings = load_from_empty_args();
        assert!(matches!(
            settings.discord_webhook_url(),
            Err(SettingsError::InvalidUrl {
                name: "DISCORD_WEBHOOK_URL",
                ..
            })
        ));
    }
}
