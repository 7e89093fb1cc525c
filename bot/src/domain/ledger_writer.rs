//! Persists encoded AAR rows to the ledger sheet and edits them by log ID.
//!
//! Appends read the occupied height of the key column and write one row
//! below it. Two appends racing on the same height overwrite each other;
//! callers serialise appends through [`crate::domain::AarSubmissionService`].

use std::sync::Arc;

use tracing::{debug, info};

use super::column_map::{LOG_ID_COLUMN, ROW_WIDTH, column_to_letter, columns_for_label};
use super::ports::{
    CacheKey, CacheKeyValidationError, SheetAddress, SheetReadError, SheetReader, SheetWrite,
    SheetWriteError, SheetWriter, ValueInputMode,
};
use super::row_encoder::{LedgerRow, encode_row};
use super::sheet_cache::{SheetCache, SheetCacheError};
use super::{AarRecord, Error, LogId};

/// Where the ledger lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerSheet {
    source_id: String,
    sheet_name: String,
    alias: CacheKey,
}

impl LedgerSheet {
    /// Describe the ledger tab `sheet_name` of spreadsheet `source_id`,
    /// cached under `alias`.
    pub fn new(
        source_id: impl Into<String>,
        sheet_name: impl Into<String>,
        alias: CacheKey,
    ) -> Result<Self, CacheKeyValidationError> {
        let ledger = Self {
            source_id: source_id.into(),
            sheet_name: sheet_name.into(),
            alias,
        };
        ledger.full_range()?;
        Ok(ledger)
    }

    /// Cache alias for the full ledger.
    pub fn alias(&self) -> &CacheKey {
        &self.alias
    }

    /// Every ledger column, all rows.
    pub fn full_range(&self) -> Result<SheetAddress, CacheKeyValidationError> {
        SheetAddress::new(
            self.source_id.as_str(),
            format!("{}!A:{}", self.sheet_name, column_to_letter(ROW_WIDTH)),
        )
    }

    fn key_column(&self) -> Result<SheetAddress, CacheKeyValidationError> {
        SheetAddress::new(self.source_id.as_str(), format!("{}!A:A", self.sheet_name))
    }

    fn row_range(&self, row_index: usize, width: usize) -> Result<SheetAddress, CacheKeyValidationError> {
        SheetAddress::new(
            self.source_id.as_str(),
            format!(
                "{sheet}!A{row_index}:{last}{row_index}",
                sheet = self.sheet_name,
                last = column_to_letter(width.max(1)),
            ),
        )
    }
}

/// A ledger row located by its log ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerMatch {
    /// Row contents, padded to full width.
    pub row: LedgerRow,
    /// 1-based sheet row number.
    pub row_index: usize,
}

/// Result of extending a row's participants.
///
/// Any cached copy of the ledger is stale once this is returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantsUpdate {
    /// 1-based sheet row number that was rewritten.
    pub row_index: usize,
    /// Event type label of the row.
    pub event_type: String,
    /// New participants cell content.
    pub participants: String,
}

fn map_read_error(error: SheetReadError) -> Error {
    Error::service_unavailable(format!("ledger unavailable: {error}"))
}

fn map_cache_error(error: SheetCacheError) -> Error {
    match error {
        SheetCacheError::Fetch(error) => map_read_error(error),
        other => Error::internal(format!("ledger cache misconfigured: {other}")),
    }
}

fn map_write_error(error: SheetWriteError) -> Error {
    Error::write_failed(format!("ledger write failed: {error}"))
}

fn map_address_error(error: CacheKeyValidationError) -> Error {
    Error::internal(format!("invalid ledger address: {error}"))
}

/// Writes and edits ledger rows.
pub struct LedgerWriter {
    reader: Arc<dyn SheetReader>,
    writer: Arc<dyn SheetWriter>,
    cache: Arc<SheetCache>,
    ledger: LedgerSheet,
}

impl LedgerWriter {
    /// Build a writer over the given ports.
    pub fn new(
        reader: Arc<dyn SheetReader>,
        writer: Arc<dyn SheetWriter>,
        cache: Arc<SheetCache>,
        ledger: LedgerSheet,
    ) -> Self {
        Self {
            reader,
            writer,
            cache,
            ledger,
        }
    }

    /// Ledger location.
    pub fn ledger(&self) -> &LedgerSheet {
        &self.ledger
    }

    /// Encode `record` and write it to the first unused row; returns the row
    /// number written.
    ///
    /// The occupied height is read straight from the store, never from the
    /// cache, so a stale cache cannot cause an overwrite.
    pub async fn append(&self, record: &AarRecord) -> Result<usize, Error> {
        let row = encode_row(record)?;
        let key_column = self.ledger.key_column().map_err(map_address_error)?;
        let occupied = self
            .reader
            .read_range(&key_column)
            .await
            .map_err(map_read_error)?
            .iter()
            .filter(|cells| cells.first().is_some_and(|cell| !cell.is_empty()))
            .count();
        let row_index = occupied + 1;

        self.write_row(row_index, &row).await?;
        info!(
            row_index,
            log_id = %record.log_id,
            event_type = %record.event_type,
            "aar appended to ledger"
        );
        Ok(row_index)
    }

    /// Locate the row whose log ID column equals `log_id`.
    ///
    /// Scans the cached ledger first and forces one refetch before giving up,
    /// so rows written by other processes are still found.
    pub async fn find_by_log_id(&self, log_id: &LogId) -> Result<Option<LedgerMatch>, Error> {
        if let Some(found) = self.scan(log_id, false).await? {
            return Ok(Some(found));
        }
        debug!(log_id = %log_id, "log id not in cached ledger; refetching");
        self.scan(log_id, true).await
    }

    /// Append `names` to the participants of the row identified by `log_id`
    /// and rewrite the whole row in place.
    ///
    /// # Errors
    ///
    /// [`crate::domain::ErrorCode::NotFound`] when no row carries the log ID;
    /// [`crate::domain::ErrorCode::UnsupportedEventType`] when the row's event
    /// type has no editable participants column, in which case nothing is
    /// written.
    pub async fn append_participants(
        &self,
        log_id: &LogId,
        names: &[String],
    ) -> Result<ParticipantsUpdate, Error> {
        let LedgerMatch { mut row, row_index } = self
            .find_by_log_id(log_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("no aar with log id {log_id}")))?;

        let event_type = row.event_type().to_owned();
        let column = columns_for_label(&event_type)
            .and_then(|layout| layout.participants_column())
            .ok_or_else(|| {
                Error::unsupported_event_type(format!(
                    "participants cannot be added to a {event_type} aar"
                ))
            })?;

        let participants = join_participants(row.cell(column), names);
        row.set(column, participants.as_str());
        self.write_row(row_index, &row).await?;
        info!(row_index, log_id = %log_id, added = names.len(), "aar participants extended");

        Ok(ParticipantsUpdate {
            row_index,
            event_type,
            participants,
        })
    }

    async fn scan(&self, log_id: &LogId, force_refresh: bool) -> Result<Option<LedgerMatch>, Error> {
        let address = self.ledger.full_range().map_err(map_address_error)?;
        let rows = self
            .cache
            .get(&address, Some(self.ledger.alias()), force_refresh)
            .await
            .map_err(map_cache_error)?;

        Ok(rows
            .iter()
            .position(|cells| {
                cells
                    .get(LOG_ID_COLUMN)
                    .is_some_and(|cell| cell == log_id.as_str())
            })
            .and_then(|index| {
                rows.get(index).map(|cells| LedgerMatch {
                    row: LedgerRow::from_cells(cells.clone()),
                    row_index: index + 1,
                })
            }))
    }

    async fn write_row(&self, row_index: usize, row: &LedgerRow) -> Result<(), Error> {
        let width = row.used_width();
        let address = self
            .ledger
            .row_range(row_index, width)
            .map_err(map_address_error)?;
        self.writer
            .write_range(&SheetWrite {
                address,
                values: vec![row.written_cells()],
                mode: ValueInputMode::UserEntered,
            })
            .await
            .map_err(map_write_error)
    }
}

/// `existing, a, b` or just `a, b` when nothing was recorded yet.
fn join_participants(existing: &str, names: &[String]) -> String {
    let added = names.join(", ");
    if existing.trim().is_empty() {
        added
    } else {
        format!("{existing}, {added}")
    }
}

#[cfg(test)]
#[path = "ledger_writer_tests.rs"]
mod tests;
