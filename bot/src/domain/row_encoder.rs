//! Projects AAR records onto fixed-width ledger rows and back.

use super::column_map::{
    EVENT_TYPE_COLUMN, LOG_ID_COLUMN, ROW_WIDTH, SUBMITTER_NAME_COLUMN, SUBMITTER_STEAM_ID_COLUMN,
    TIMESTAMP_COLUMN, columns_for_label,
};
use super::{AarFields, AarRecord, Error, format_timestamp};

/// One ledger row: at least [`ROW_WIDTH`] string cells, empty cells as `""`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerRow(Vec<String>);

impl LedgerRow {
    /// An all-empty row.
    pub fn blank() -> Self {
        Self(vec![String::new(); ROW_WIDTH])
    }

    /// Wrap cells read from the sheet, padding short (ragged) rows.
    pub fn from_cells(mut cells: Vec<String>) -> Self {
        if cells.len() < ROW_WIDTH {
            cells.resize(ROW_WIDTH, String::new());
        }
        Self(cells)
    }

    /// Cell content, `""` for any column beyond the row.
    pub fn cell(&self, column: usize) -> &str {
        self.0.get(column).map_or("", String::as_str)
    }

    /// Overwrite one cell. Columns beyond the row grow it.
    pub fn set(&mut self, column: usize, value: impl Into<String>) {
        if column >= self.0.len() {
            self.0.resize(column + 1, String::new());
        }
        if let Some(cell) = self.0.get_mut(column) {
            *cell = value.into();
        }
    }

    /// Number of columns up to and including the last non-empty cell.
    pub fn used_width(&self) -> usize {
        self.0
            .iter()
            .rposition(|cell| !cell.is_empty())
            .map_or(0, |last| last + 1)
    }

    /// Event type label stored in the row.
    pub fn event_type(&self) -> &str {
        self.cell(EVENT_TYPE_COLUMN)
    }

    /// Log ID stored in the row.
    pub fn log_id(&self) -> &str {
        self.cell(LOG_ID_COLUMN)
    }

    /// Submitter SteamID stored in the row.
    pub fn submitter_steam_id(&self) -> &str {
        self.cell(SUBMITTER_STEAM_ID_COLUMN)
    }

    /// Timestamp text stored in the row.
    pub fn timestamp(&self) -> &str {
        self.cell(TIMESTAMP_COLUMN)
    }

    /// Cells trimmed to [`LedgerRow::used_width`], as written to the sheet.
    pub fn written_cells(&self) -> Vec<String> {
        self.0.iter().take(self.used_width()).cloned().collect()
    }

    /// All cells.
    pub fn cells(&self) -> &[String] {
        &self.0
    }
}

/// Encode `record` into a ledger row.
///
/// The five common columns are always written. Fields are placed according
/// to the event type's layout; absent fields are written as `""` and labels
/// outside the layout table produce a row with only the common columns.
///
/// # Errors
///
/// Returns [`crate::domain::ErrorCode::InvalidRequest`] when the record has
/// no event type.
///
/// # Examples
/// ```
/// use battalion_bot::domain::{AarFields, AarRecord, LogId, encode_row};
/// use chrono::Utc;
///
/// let record = AarRecord {
///     event_type: "Tryout".to_owned(),
///     submitter_name: "CT-1234 Hevy".to_owned(),
///     submitter_steam_id: "STEAM_0:1:1".to_owned(),
///     fields: AarFields::new().with("passedCTs", "Echo, Fives"),
///     log_id: LogId::new("abc123").expect("valid id"),
///     timestamp: Utc::now(),
/// };
/// let row = encode_row(&record).expect("encodes");
/// assert_eq!(row.cell(7), "Echo, Fives");
/// assert_eq!(row.log_id(), "abc123");
/// ```
pub fn encode_row(record: &AarRecord) -> Result<LedgerRow, Error> {
    if record.event_type.trim().is_empty() {
        return Err(Error::invalid_request("aar record is missing its event type"));
    }

    let mut row = LedgerRow::blank();
    row.set(TIMESTAMP_COLUMN, format_timestamp(record.timestamp));
    row.set(SUBMITTER_NAME_COLUMN, record.submitter_name.as_str());
    row.set(SUBMITTER_STEAM_ID_COLUMN, record.submitter_steam_id.as_str());
    row.set(EVENT_TYPE_COLUMN, record.event_type.as_str());
    row.set(LOG_ID_COLUMN, record.log_id.as_str());

    if let Some(layout) = columns_for_label(&record.event_type) {
        for placement in layout.fields {
            row.set(placement.column, record.fields.get(placement.field));
        }
    }
    Ok(row)
}

/// Read back the fields the row's event type declares.
///
/// Returns `None` when the row's label is not in the layout table. Empty
/// cells are omitted from the result.
pub fn decode_fields(row: &LedgerRow) -> Option<AarFields> {
    let layout = columns_for_label(row.event_type())?;
    Some(
        layout
            .fields
            .iter()
            .filter(|placement| !row.cell(placement.column).is_empty())
            .map(|placement| (placement.field, row.cell(placement.column)))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    //! Encoding coverage against the live sheet layout.

    use chrono::{TimeZone, Utc};
    use rstest::{fixture, rstest};

    use super::*;
    use crate::domain::column_map::{COMMON_COLUMNS, columns_for};
    use crate::domain::{EventType, LogId};

    #[fixture]
    fn tryout() -> AarRecord {
        AarRecord {
            event_type: EventType::Tryout.label().to_owned(),
            submitter_name: "CC-2224 Cody".to_owned(),
            submitter_steam_id: "STEAM_0:0:2224".to_owned(),
            fields: AarFields::new()
                .with("officerSteamId", "S1")
                .with("startingCTs", "10")
                .with("endingCTs", "8")
                .with("passedCTs", "A,B"),
            log_id: LogId::new("log-1").expect("valid log id"),
            timestamp: Utc
                .with_ymd_and_hms(2024, 6, 2, 20, 15, 0)
                .single()
                .expect("valid time"),
        }
    }

    #[rstest]
    fn tryout_fields_land_in_their_columns(tryout: AarRecord) {
        let row = encode_row(&tryout).expect("encodes");

        assert_eq!(row.cell(4), "S1");
        assert_eq!(row.cell(5), "10");
        assert_eq!(row.cell(6), "8");
        assert_eq!(row.cell(7), "A,B");
        assert_eq!(row.cell(75), "", "officerName defaults to empty");
    }

    #[rstest]
    fn common_columns_are_always_written(tryout: AarRecord) {
        let row = encode_row(&tryout).expect("encodes");

        assert_eq!(row.cell(0), "6/02/2024 20:15:00");
        assert_eq!(row.cell(1), "CC-2224 Cody");
        assert_eq!(row.cell(2), "STEAM_0:0:2224");
        assert_eq!(row.cell(3), "Tryout");
        assert_eq!(row.cell(109), "log-1");
        assert_eq!(row.cells().len(), ROW_WIDTH);
    }

    #[rstest]
    fn columns_outside_the_layout_stay_empty(tryout: AarRecord) {
        let mut record = tryout;
        record.fields.insert("participants", "should be ignored");
        let row = encode_row(&record).expect("encodes");

        let layout = columns_for(EventType::Tryout);
        for column in 0..ROW_WIDTH {
            let owned = COMMON_COLUMNS.contains(&column)
                || layout.fields.iter().any(|p| p.column == column);
            if !owned {
                assert_eq!(row.cell(column), "", "column {column} should be empty");
            }
        }
    }

    #[rstest]
    fn unknown_event_type_writes_only_common_columns(tryout: AarRecord) {
        let mut record = tryout;
        record.event_type = "Bake Sale".to_owned();
        let row = encode_row(&record).expect("encodes");

        let populated: Vec<usize> = (0..ROW_WIDTH)
            .filter(|column| !row.cell(*column).is_empty())
            .collect();
        assert_eq!(populated, COMMON_COLUMNS.to_vec());
    }

    #[rstest]
    fn blank_event_type_is_rejected(tryout: AarRecord) {
        let mut record = tryout;
        record.event_type = "  ".to_owned();
        let err = encode_row(&record).expect_err("blank type");
        assert_eq!(err.code(), crate::domain::ErrorCode::InvalidRequest);
    }

    #[rstest]
    fn every_declared_field_round_trips() {
        for event in EventType::ALL {
            let layout = columns_for(event);
            let fields: AarFields = layout
                .fields
                .iter()
                .map(|p| (p.field, format!("{}-value", p.field)))
                .collect();
            let record = AarRecord {
                event_type: event.label().to_owned(),
                submitter_name: "name".to_owned(),
                submitter_steam_id: "steam".to_owned(),
                fields: fields.clone(),
                log_id: LogId::new("id").expect("valid log id"),
                timestamp: Utc::now(),
            };

            let row = encode_row(&record).expect("encodes");
            assert_eq!(decode_fields(&row), Some(fields), "{event}");
        }
    }

    #[rstest]
    fn used_width_tracks_last_populated_cell(tryout: AarRecord) {
        let row = encode_row(&tryout).expect("encodes");
        assert_eq!(row.used_width(), LOG_ID_COLUMN + 1);
        assert_eq!(row.written_cells().len(), LOG_ID_COLUMN + 1);
    }

    #[rstest]
    fn short_rows_are_padded_on_read() {
        let row = LedgerRow::from_cells(vec!["a".to_owned(), "b".to_owned()]);
        assert_eq!(row.cells().len(), ROW_WIDTH);
        assert_eq!(row.cell(150), "");
    }
}
