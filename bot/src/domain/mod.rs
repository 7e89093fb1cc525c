//! AAR ledger domain.
//!
//! Purpose: model after-action reports, their fixed column layout in the
//! ledger sheet, the TTL cache every sheet read goes through, and the
//! services that submit and edit reports. Adapters live in
//! [`crate::outbound`] and plug in through [`ports`].
//!
//! Public surface:
//! - Error / ErrorCode: failures reported to callers.
//! - EventType, AarRecord, AarFields, LogId: report data.
//! - column_map, encode_row, LedgerRow: ledger row layout.
//! - SheetCache: TTL cache with aliases and periodic refresh.
//! - LedgerWriter, RosterService, AarSubmissionService: operations.

pub mod aar_record;
pub mod aar_submission;
pub mod column_map;
pub mod error;
pub mod event_type;
pub mod ledger_writer;
pub mod ports;
pub mod roster_service;
pub mod row_encoder;
pub mod sheet_cache;

pub use self::aar_record::{
    AarFields, AarRecord, LogId, LogIdValidationError, TIMESTAMP_FORMAT, format_timestamp,
};
pub use self::aar_submission::{
    AarSubmissionPorts, AarSubmissionService, SubmitAarRequest, SubmittedAar,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::event_type::{EventType, UnknownEventType};
pub use self::ledger_writer::{LedgerMatch, LedgerSheet, LedgerWriter, ParticipantsUpdate};
pub use self::roster_service::{
    AarStats, BlacklistEntry, Registration, RosterAliases, RosterService,
};
pub use self::row_encoder::{LedgerRow, decode_fields, encode_row};
pub use self::sheet_cache::{
    CacheEntryStats, CacheStats, DEFAULT_TTL, PeriodicRefresh, RefreshReport, SheetCache,
    SheetCacheConfig, SheetCacheError,
};
