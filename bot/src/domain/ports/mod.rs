//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod aar_notifier;
mod cache_key;
mod log_id_generator;
mod sheet_reader;
mod sheet_writer;

#[cfg(test)]
pub use aar_notifier::MockAarNotifier;
pub use aar_notifier::{AarNotice, AarNotifier, AarNotifierError, LoggingAarNotifier};
pub use cache_key::{CacheKey, CacheKeyValidationError, SheetAddress};
#[cfg(test)]
pub use log_id_generator::MockLogIdGenerator;
pub use log_id_generator::LogIdGenerator;
#[cfg(test)]
pub use sheet_reader::MockSheetReader;
pub use sheet_reader::{FixtureSheetReader, SheetReadError, SheetReader, SheetRows};
#[cfg(test)]
pub use sheet_writer::MockSheetWriter;
pub use sheet_writer::{SheetWrite, SheetWriteError, SheetWriter, ValueInputMode};
