//! Google Sheets outbound adapter.
//!
//! A thin HTTP implementation of the `SheetReader` and `SheetWriter` ports.

mod dto;
mod http_client;

pub use http_client::{SheetsHttpClient, SheetsHttpConfig};
