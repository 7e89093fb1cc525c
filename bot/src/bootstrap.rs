//! Wiring of adapters, cache, and services from [`BotSettings`].

use std::sync::Arc;
use std::time::Duration;

use mockable::{Clock, DefaultClock};
use thiserror::Error;
use tracing::info;

use crate::config::{BotSettings, SettingsError};
use crate::domain::ports::{
    AarNotifier, CacheKey, CacheKeyValidationError, LogIdGenerator, LoggingAarNotifier,
    SheetAddress, SheetReader, SheetWriter,
};
use crate::domain::{
    AarSubmissionPorts, AarSubmissionService, LedgerSheet, LedgerWriter, PeriodicRefresh,
    RosterAliases, RosterService, SheetCache, SheetCacheConfig, SheetCacheError,
};
use crate::outbound::discord::DiscordWebhookNotifier;
use crate::outbound::log_id::UuidLogIdGenerator;
use crate::outbound::sheets::{SheetsHttpClient, SheetsHttpConfig};

/// Alias of the full ledger range.
pub const LEDGER_ALIAS: &str = "aarledger";

/// Startup failures.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Settings were missing or malformed.
    #[error(transparent)]
    Settings(#[from] SettingsError),
    /// An HTTP client could not be built.
    #[error("http client setup failed: {0}")]
    Http(#[from] reqwest::Error),
    /// A configured sheet ID or range is not a usable address.
    #[error("invalid sheet address: {0}")]
    Address(#[from] CacheKeyValidationError),
    /// Alias registration failed.
    #[error(transparent)]
    Cache(#[from] SheetCacheError),
}

/// Driven adapters the runtime is assembled from.
#[derive(Clone)]
pub struct RuntimePorts {
    /// Range reads.
    pub reader: Arc<dyn SheetReader>,
    /// Range writes.
    pub writer: Arc<dyn SheetWriter>,
    /// AAR notices.
    pub notifier: Arc<dyn AarNotifier>,
    /// Log ID minting.
    pub log_ids: Arc<dyn LogIdGenerator>,
    /// Wall clock.
    pub clock: Arc<dyn Clock>,
}

impl RuntimePorts {
    /// Production adapters for `settings`.
    ///
    /// # Errors
    ///
    /// Returns an error when the access token is missing, a URL is malformed,
    /// or an HTTP client cannot be built.
    pub fn from_settings(settings: &BotSettings) -> Result<Self, BootstrapError> {
        let token = BotSettings::require(
            settings.sheets_access_token.as_ref(),
            "SHEETS_ACCESS_TOKEN",
        )?;
        let sheets = Arc::new(SheetsHttpClient::new(SheetsHttpConfig {
            api_base: settings.sheets_api_base()?,
            access_token: token.to_owned(),
            timeout: settings.http_timeout(),
        })?);
        let notifier: Arc<dyn AarNotifier> = match settings.discord_webhook_url()? {
            Some(webhook) => Arc::new(DiscordWebhookNotifier::new(
                webhook,
                settings.http_timeout(),
            )?),
            None => Arc::new(LoggingAarNotifier),
        };

        Ok(Self {
            reader: Arc::clone(&sheets) as Arc<dyn SheetReader>,
            writer: sheets,
            notifier,
            log_ids: Arc::new(UuidLogIdGenerator),
            clock: Arc::new(DefaultClock),
        })
    }
}

/// Assembled services sharing one cache.
pub struct BotRuntime {
    /// Shared sheet cache.
    pub cache: Arc<SheetCache>,
    /// Roster and statistics lookups.
    pub roster: RosterService,
    /// AAR submission and edits.
    pub submissions: AarSubmissionService,
    refresh_interval: Duration,
}

impl BotRuntime {
    /// Open the cache, bind every alias, and build the services.
    ///
    /// # Errors
    ///
    /// Returns an error when a sheet ID is missing or an address is invalid.
    pub fn assemble(settings: &BotSettings, ports: RuntimePorts) -> Result<Self, BootstrapError> {
        let aar_sheet = BotSettings::require(settings.aar_sheet_id.as_ref(), "AAR_SHEET_ID")?;
        let roster_sheet =
            BotSettings::require(settings.roster_sheet_id.as_ref(), "ROSTER_SHEET_ID")?;

        let cache = SheetCache::open(
            Arc::clone(&ports.reader),
            Arc::clone(&ports.clock),
            SheetCacheConfig {
                ttl: settings.cache_ttl(),
            },
        );
        for (alias, range) in settings.roster_ranges() {
            let address = SheetAddress::new(roster_sheet, range)?;
            cache.register_alias(&address, &[CacheKey::new(alias)?])?;
        }
        let ledger = LedgerSheet::new(
            aar_sheet,
            settings.ledger_sheet_name(),
            CacheKey::new(LEDGER_ALIAS)?,
        )?;
        cache.register_alias(&ledger.full_range()?, &[ledger.alias().clone()])?;

        let roster = RosterService::new(
            Arc::clone(&cache),
            RosterAliases {
                registration: CacheKey::new("registrationdata")?,
                blacklist: CacheKey::new("blacklist")?,
            },
            ledger.clone(),
        );
        let writer = LedgerWriter::new(
            ports.reader,
            ports.writer,
            Arc::clone(&cache),
            ledger,
        );
        let submissions = AarSubmissionService::new(
            writer,
            roster.clone(),
            Arc::clone(&cache),
            AarSubmissionPorts {
                log_ids: ports.log_ids,
                notifier: ports.notifier,
                clock: ports.clock,
            },
        );

        info!(
            aliases = cache.stats().entry_count,
            ttl_secs = settings.cache_ttl().as_secs(),
            "bot runtime assembled"
        );
        Ok(Self {
            cache,
            roster,
            submissions,
            refresh_interval: settings.refresh_interval(),
        })
    }

    /// Start the background refresh sweep at the configured interval.
    pub fn start_refresh(&self) -> PeriodicRefresh {
        self.cache.start_periodic_refresh(self.refresh_interval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use ortho_config::OrthoConfig;
    use rstest::rstest;

    use crate::test_support::{InMemorySheetStore, RecordingNotifier, SequentialLogIds};

    fn ports() -> RuntimePorts {
        let store = Arc::new(InMemorySheetStore::new());
        RuntimePorts {
            reader: Arc::clone(&store) as Arc<dyn SheetReader>,
            writer: store,
            notifier: Arc::new(RecordingNotifier::default()),
            log_ids: Arc::new(SequentialLogIds::default()),
            clock: Arc::new(DefaultClock),
        }
    }

    fn settings(vars: [(&'static str, Option<String>); 3]) -> BotSettings {
        let _guard = lock_env(vars);
        BotSettings::load_from_iter([OsString::from("battalion-bot")]).expect("config should load")
    }

    #[rstest]
    fn every_alias_is_bound_at_startup() {
        let settings = settings([
            ("AAR_BOT_AAR_SHEET_ID", Some("aar-db".to_owned())),
            ("AAR_BOT_ROSTER_SHEET_ID", Some("roster-db".to_owned())),
            ("AAR_BOT_LEDGER_SHEET_NAME", None),
        ]);

        let runtime = BotRuntime::assemble(&settings, ports()).expect("assembles");

        for alias in [
            "registrationdata",
            "mainsheetdata",
            "promosfromdb",
            "statistics",
            "punishments",
            "blacklist",
        ] {
            let address = runtime
                .cache
                .alias_address(&CacheKey::new(alias).expect("key"))
                .expect("bound");
            assert_eq!(address.source_id(), "roster-db");
        }
        let ledger = runtime
            .cache
            .alias_address(&CacheKey::new(LEDGER_ALIAS).expect("key"))
            .expect("bound");
        assert_eq!(ledger.to_string(), "aar-db:AARs!A:GR");
    }

    #[rstest]
    fn missing_sheet_ids_are_reported() {
        let settings = settings([
            ("AAR_BOT_AAR_SHEET_ID", None),
            ("AAR_BOT_ROSTER_SHEET_ID", Some("roster-db".to_owned())),
            ("AAR_BOT_LEDGER_SHEET_NAME", None),
        ]);

        let error = BotRuntime::assemble(&settings, ports())
            .err()
            .expect("aar sheet id is required");
        assert!(matches!(
            error,
            BootstrapError::Settings(SettingsError::Missing {
                name: "AAR_SHEET_ID"
            })
        ));
    }

    #[rstest]
    fn production_ports_need_an_access_token() {
        let settings = {
            let _guard = lock_env([("AAR_BOT_SHEETS_ACCESS_TOKEN", None::<String>)]);
            BotSettings::load_from_iter([OsString::from("battalion-bot")])
                .expect("config should load")
        };
        assert!(matches!(
            RuntimePorts::from_settings(&settings),
            Err(BootstrapError::Settings(SettingsError::Missing { .. }))
        ));
    }
}
