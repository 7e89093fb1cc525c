//! Driven port for reading rectangular cell ranges from the tabular store.

use async_trait::async_trait;

use super::{SheetAddress, define_port_error};

/// Rows of string cells as returned by the store; rows may be ragged.
pub type SheetRows = Vec<Vec<String>>;

define_port_error! {
    /// Errors surfaced while reading from the tabular store.
    pub enum SheetReadError {
        /// Network transport failed before a response arrived.
        Transport { message: String } => "sheet read transport failed: {message}",
        /// The store did not answer in time.
        Timeout { message: String } => "sheet read timed out: {message}",
        /// The store throttled the request.
        RateLimited { message: String } => "sheet read rate limited: {message}",
        /// The store refused the request (bad range, missing permission).
        Rejected { message: String } => "sheet read rejected: {message}",
        /// The response body could not be decoded.
        Decode { message: String } => "sheet read response invalid: {message}",
    }
}

/// Port for fetching the current contents of one sheet range.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SheetReader: Send + Sync {
    /// Fetch every row in `address`. An empty range yields an empty vector.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// use battalion_bot::domain::ports::{SheetAddress, SheetReader};
    ///
    /// let address = SheetAddress::new("sheet-id", "Registration!A:E")?;
    /// let rows = reader.read_range(&address).await?;
    /// assert!(rows.iter().all(|row| row.len() <= 5));
    /// ```
    async fn read_range(&self, address: &SheetAddress) -> Result<SheetRows, SheetReadError>;
}

/// Fixture reader returning no rows for every range.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureSheetReader;

#[async_trait]
impl SheetReader for FixtureSheetReader {
    async fn read_range(&self, _address: &SheetAddress) -> Result<SheetRows, SheetReadError> {
        Ok(Vec::new())
    }
}
