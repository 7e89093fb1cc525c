//! Outbound adapters implementing domain ports.
//!
//! - **sheets**: Google Sheets v4 values API for reading and writing ranges
//! - **discord**: webhook notices for newly logged AARs
//! - **log_id**: UUID-based log IDs
//!
//! Adapters translate between wire formats and domain types. They contain no
//! business logic.

pub mod discord;
pub mod log_id;
pub mod sheets;
