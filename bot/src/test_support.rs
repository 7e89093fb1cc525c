//! Test utilities for the bot crate.
//!
//! Shared doubles for unit tests (in `src/`) and integration tests (in
//! `tests/`). Compiled for tests and behind the `test-support` feature.

mod clock;
mod doubles;
mod gated_reader;
mod sheet_store;

pub use clock::MutableClock;
pub use doubles::{RecordingNotifier, SequentialLogIds};
pub use gated_reader::GatedSheetReader;
pub use sheet_store::InMemorySheetStore;
