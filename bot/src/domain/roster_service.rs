//! Read-only lookups over cached roster, blacklist, and ledger sheets.
//!
//! Rows are matched by identifier, so header rows never match and need no
//! special handling.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::Error;
use super::ledger_writer::LedgerSheet;
use super::ports::{CacheKey, SheetRows};
use super::row_encoder::LedgerRow;
use super::sheet_cache::{SheetCache, SheetCacheError};

/// A registered trooper, from `[discordId, steamId, displayName, rank, joinedOn]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    /// Discord user ID.
    pub discord_id: String,
    /// SteamID.
    pub steam_id: String,
    /// In-character display name.
    pub display_name: String,
    /// Current rank.
    pub rank: String,
    /// Date the trooper joined.
    pub joined_on: String,
}

/// A blacklist record, from `[steamId, name, reason, issuedBy, issuedOn]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlacklistEntry {
    /// Blacklisted SteamID.
    pub steam_id: String,
    /// Name at the time of blacklisting.
    pub name: String,
    /// Stated reason.
    pub reason: String,
    /// Who issued it.
    pub issued_by: String,
    /// When it was issued.
    pub issued_on: String,
}

/// AAR totals for one submitter.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AarStats {
    /// Reports submitted.
    pub total: usize,
    /// Reports per event type label.
    pub by_event_type: BTreeMap<String, usize>,
    /// Timestamp text of the most recently appended report.
    pub latest: Option<String>,
}

/// Cache aliases the roster lookups read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterAliases {
    /// Alias of the registration sheet.
    pub registration: CacheKey,
    /// Alias of the blacklist sheet.
    pub blacklist: CacheKey,
}

fn map_cache_error(error: SheetCacheError) -> Error {
    match error {
        SheetCacheError::Fetch(error) => {
            Error::service_unavailable(format!("roster unavailable: {error}"))
        }
        other => Error::internal(format!("roster cache misconfigured: {other}")),
    }
}

fn cell(row: &[String], column: usize) -> String {
    row.get(column).map(|value| value.trim().to_owned()).unwrap_or_default()
}

/// Blank IDs match nothing, including blank cells.
fn same_id(cell: Option<&str>, id: &str) -> bool {
    let id = id.trim();
    !id.is_empty() && cell.is_some_and(|value| value.trim().eq_ignore_ascii_case(id))
}

/// Roster queries.
#[derive(Clone)]
pub struct RosterService {
    cache: Arc<SheetCache>,
    aliases: RosterAliases,
    ledger: LedgerSheet,
}

impl RosterService {
    /// Build the service over a shared cache.
    pub fn new(cache: Arc<SheetCache>, aliases: RosterAliases, ledger: LedgerSheet) -> Self {
        Self {
            cache,
            aliases,
            ledger,
        }
    }

    /// Registration whose SteamID matches.
    pub async fn registration_by_steam_id(
        &self,
        steam_id: &str,
    ) -> Result<Option<Registration>, Error> {
        self.find_registration(|row| same_id(row.get(1).map(String::as_str), steam_id))
            .await
    }

    /// Registration whose Discord ID matches.
    pub async fn registration_by_discord_id(
        &self,
        discord_id: &str,
    ) -> Result<Option<Registration>, Error> {
        self.find_registration(|row| same_id(row.first().map(String::as_str), discord_id))
            .await
    }

    /// Registered display name for a SteamID, skipping blank names.
    pub async fn display_name_for(&self, steam_id: &str) -> Result<Option<String>, Error> {
        Ok(self
            .registration_by_steam_id(steam_id)
            .await?
            .map(|registration| registration.display_name)
            .filter(|name| !name.is_empty()))
    }

    /// First blacklist entry for a SteamID.
    pub async fn blacklist_entry(&self, steam_id: &str) -> Result<Option<BlacklistEntry>, Error> {
        let rows = self.alias_rows(&self.aliases.blacklist).await?;
        Ok(rows
            .iter()
            .find(|row| same_id(row.first().map(String::as_str), steam_id))
            .map(|row| BlacklistEntry {
                steam_id: cell(row, 0),
                name: cell(row, 1),
                reason: cell(row, 2),
                issued_by: cell(row, 3),
                issued_on: cell(row, 4),
            }))
    }

    /// Ledger totals for reports submitted by `steam_id`.
    pub async fn aar_stats(&self, steam_id: &str) -> Result<AarStats, Error> {
        let rows = self.alias_rows(self.ledger.alias()).await?;
        let mut stats = AarStats::default();
        for cells in rows.iter() {
            let row = LedgerRow::from_cells(cells.clone());
            if !same_id(Some(row.submitter_steam_id()), steam_id) {
                continue;
            }
            stats.total += 1;
            *stats
                .by_event_type
                .entry(row.event_type().to_owned())
                .or_default() += 1;
            stats.latest = Some(row.timestamp().to_owned());
        }
        Ok(stats)
    }

    async fn find_registration(
        &self,
        matches: impl Fn(&Vec<String>) -> bool,
    ) -> Result<Option<Registration>, Error> {
        let rows = self.alias_rows(&self.aliases.registration).await?;
        Ok(rows.iter().find(|row| matches(row)).map(|row| Registration {
            discord_id: cell(row, 0),
            steam_id: cell(row, 1),
            display_name: cell(row, 2),
            rank: cell(row, 3),
            joined_on: cell(row, 4),
        }))
    }

    async fn alias_rows(&self, alias: &CacheKey) -> Result<Arc<SheetRows>, Error> {
        if alias == self.ledger.alias() {
            let address = self
                .ledger
                .full_range()
                .map_err(|error| Error::internal(format!("invalid ledger address: {error}")))?;
            return self
                .cache
                .get(&address, Some(alias), false)
                .await
                .map_err(map_cache_error);
        }
        self.cache
            .get_alias(alias, false)
            .await
            .map_err(map_cache_error)
    }
}

#[cfg(test)]
#[path = "roster_service_tests.rs"]
mod tests;
