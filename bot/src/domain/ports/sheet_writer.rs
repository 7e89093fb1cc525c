//! Driven port for overwriting cell ranges in the tabular store.

use async_trait::async_trait;

use super::{SheetAddress, SheetRows, define_port_error};

/// How the store should interpret written values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueInputMode {
    /// Values are stored literally.
    Raw,
    /// Values are parsed as if typed by a user (dates, numbers, formulas).
    #[default]
    UserEntered,
}

impl ValueInputMode {
    /// Wire name used by the Sheets `valueInputOption` parameter.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Raw => "RAW",
            Self::UserEntered => "USER_ENTERED",
        }
    }
}

/// One overwrite request: the values replace whatever occupies `address`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetWrite {
    /// Target range, sized to `values`.
    pub address: SheetAddress,
    /// Row-major values to write.
    pub values: SheetRows,
    /// Interpretation mode for the values.
    pub mode: ValueInputMode,
}

define_port_error! {
    /// Errors surfaced while writing to the tabular store.
    pub enum SheetWriteError {
        /// Network transport failed before a response arrived.
        Transport { message: String } => "sheet write transport failed: {message}",
        /// The store did not answer in time.
        Timeout { message: String } => "sheet write timed out: {message}",
        /// The store refused the write.
        Rejected { message: String } => "sheet write rejected: {message}",
    }
}

/// Port for overwriting one range.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SheetWriter: Send + Sync {
    /// Overwrite the cells addressed by `write.address` with `write.values`.
    async fn write_range(&self, write: &SheetWrite) -> Result<(), SheetWriteError>;
}
