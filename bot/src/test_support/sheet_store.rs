//! In-memory stand-in for the spreadsheet, speaking A1 ranges.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{
    SheetAddress, SheetReadError, SheetReader, SheetRows, SheetWrite, SheetWriteError, SheetWriter,
};

#[derive(Debug, Default)]
struct StoreState {
    sheets: HashMap<(String, String), SheetRows>,
    reads: HashMap<String, usize>,
    writes: Vec<SheetWrite>,
    fail_reads: bool,
    fail_writes: bool,
}

/// Spreadsheet double that records reads and writes.
#[derive(Debug, Default)]
pub struct InMemorySheetStore {
    state: Mutex<StoreState>,
}

struct CellRange {
    sheet: String,
    start_col: usize,
    start_row: Option<usize>,
    end_col: usize,
    end_row: Option<usize>,
}

impl InMemorySheetStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the contents of one sheet tab.
    pub fn seed(&self, source_id: &str, sheet: &str, rows: SheetRows) {
        self.lock()
            .sheets
            .insert((source_id.to_owned(), sheet.to_owned()), rows);
    }

    /// Current contents of one sheet tab.
    pub fn rows(&self, source_id: &str, sheet: &str) -> SheetRows {
        self.lock()
            .sheets
            .get(&(source_id.to_owned(), sheet.to_owned()))
            .cloned()
            .unwrap_or_default()
    }

    /// Number of reads issued against `address`.
    pub fn read_count(&self, address: &SheetAddress) -> usize {
        self.lock()
            .reads
            .get(&address.to_string())
            .copied()
            .unwrap_or(0)
    }

    /// Writes received, oldest first.
    pub fn writes(&self) -> Vec<SheetWrite> {
        self.lock().writes.clone()
    }

    /// Make subsequent reads fail (or succeed again).
    pub fn fail_reads(&self, fail: bool) {
        self.lock().fail_reads = fail;
    }

    /// Make subsequent writes fail (or succeed again).
    pub fn fail_writes(&self, fail: bool) {
        self.lock().fail_writes = fail;
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("sheet store mutex"),
        }
    }
}

#[async_trait]
impl SheetReader for InMemorySheetStore {
    async fn read_range(&self, address: &SheetAddress) -> Result<SheetRows, SheetReadError> {
        let mut state = self.lock();
        *state.reads.entry(address.to_string()).or_default() += 1;
        if state.fail_reads {
            return Err(SheetReadError::transport("store offline"));
        }
        let range = parse_range(address.range()).ok_or_else(|| {
            SheetReadError::rejected(format!("unparseable range {}", address.range()))
        })?;
        let grid = state
            .sheets
            .get(&(address.source_id().to_owned(), range.sheet.clone()))
            .cloned()
            .unwrap_or_default();

        let first = range.start_row.unwrap_or(1).max(1);
        let last = range.end_row.unwrap_or(grid.len());
        let mut rows: SheetRows = (first..=last)
            .map(|row_number| {
                let row = grid.get(row_number - 1).cloned().unwrap_or_default();
                let mut cells: Vec<String> = row
                    .into_iter()
                    .skip(range.start_col)
                    .take(range.end_col + 1 - range.start_col)
                    .collect();
                while cells.last().is_some_and(String::is_empty) {
                    cells.pop();
                }
                cells
            })
            .collect();
        while rows.last().is_some_and(Vec::is_empty) {
            rows.pop();
        }
        Ok(rows)
    }
}

#[async_trait]
impl SheetWriter for InMemorySheetStore {
    async fn write_range(&self, write: &SheetWrite) -> Result<(), SheetWriteError> {
        let mut state = self.lock();
        if state.fail_writes {
            return Err(SheetWriteError::transport("store offline"));
        }
        let range = parse_range(write.address.range()).ok_or_else(|| {
            SheetWriteError::rejected(format!("unparseable range {}", write.address.range()))
        })?;
        let start_row = range
            .start_row
            .ok_or_else(|| SheetWriteError::rejected("writes need an explicit start row"))?;

        let key = (write.address.source_id().to_owned(), range.sheet.clone());
        let grid = state.sheets.entry(key).or_default();
        for (offset, values) in write.values.iter().enumerate() {
            let row_index = start_row - 1 + offset;
            if grid.len() <= row_index {
                grid.resize(row_index + 1, Vec::new());
            }
            let row = &mut grid[row_index];
            for (column_offset, value) in values.iter().enumerate() {
                let column = range.start_col + column_offset;
                if row.len() <= column {
                    row.resize(column + 1, String::new());
                }
                row[column] = value.clone();
            }
        }
        state.writes.push(write.clone());
        Ok(())
    }
}

fn parse_range(range: &str) -> Option<CellRange> {
    let (sheet, cells) = range.split_once('!')?;
    let (start, end) = cells.split_once(':').unwrap_or((cells, cells));
    let (start_col, start_row) = parse_cell(start)?;
    let (end_col, end_row) = parse_cell(end)?;
    Some(CellRange {
        sheet: sheet.to_owned(),
        start_col,
        start_row,
        end_col,
        end_row,
    })
}

fn parse_cell(cell: &str) -> Option<(usize, Option<usize>)> {
    let split = cell.find(|c: char| c.is_ascii_digit()).unwrap_or(cell.len());
    let (letters, digits) = cell.split_at(split);
    if letters.is_empty() {
        return None;
    }
    let column = letters.chars().try_fold(0_usize, |acc, c| {
        c.is_ascii_uppercase()
            .then(|| acc * 26 + usize::from(c as u8 - b'A' + 1))
    })?;
    let row = if digits.is_empty() {
        None
    } else {
        Some(digits.parse().ok()?)
    };
    Some((column - 1, row))
}
