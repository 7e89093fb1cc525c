//! After-action report records as captured from a submission.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

/// `strftime` pattern for ledger timestamps: `M/DD/YYYY HH:MM:SS`.
pub const TIMESTAMP_FORMAT: &str = "%-m/%d/%Y %H:%M:%S";

/// Format a capture time the way the ledger stores it.
///
/// # Examples
/// ```
/// use battalion_bot::domain::format_timestamp;
/// use chrono::{TimeZone, Utc};
///
/// let at = Utc.with_ymd_and_hms(2024, 3, 7, 18, 4, 9).single().expect("valid time");
/// assert_eq!(format_timestamp(at), "3/07/2024 18:04:09");
/// ```
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Opaque identifier that locates one AAR row for later edits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LogId(String);

/// Validation errors for [`LogId`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LogIdValidationError {
    /// The identifier was blank.
    #[error("log id must not be empty")]
    Empty,
    /// The identifier had surrounding whitespace.
    #[error("log id must not contain surrounding whitespace")]
    ContainsWhitespace,
}

impl LogId {
    /// Validate and wrap a raw log ID.
    pub fn new(value: impl Into<String>) -> Result<Self, LogIdValidationError> {
        let raw = value.into();
        if raw.trim().is_empty() {
            return Err(LogIdValidationError::Empty);
        }
        if raw.trim() != raw {
            return Err(LogIdValidationError::ContainsWhitespace);
        }
        Ok(Self(raw))
    }

    /// Log ID in UUID simple form (32 lowercase hex digits).
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id.simple().to_string())
    }

    /// Borrow the identifier.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for LogId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named values supplied with a report. Missing names read as `""`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AarFields(BTreeMap<String, String>);

impl AarFields {
    /// Empty field bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert or replace a value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    /// Value for `name`, or `""` when absent.
    pub fn get(&self, name: &str) -> &str {
        self.0.get(name).map_or("", String::as_str)
    }

    /// Whether `name` holds a value with non-whitespace content.
    pub fn has_value(&self, name: &str) -> bool {
        !self.get(name).trim().is_empty()
    }

    /// Iterate over present fields in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K, V> FromIterator<(K, V)> for AarFields
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// One fully resolved AAR, ready to be encoded into a ledger row.
///
/// `event_type` holds the raw sheet label so rows read back from the ledger
/// round-trip even when their label is no longer a known [`crate::domain::EventType`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AarRecord {
    /// Sheet label of the event type.
    pub event_type: String,
    /// Display name of the submitting trooper.
    pub submitter_name: String,
    /// SteamID of the submitting trooper.
    pub submitter_steam_id: String,
    /// Kind-specific values.
    pub fields: AarFields,
    /// Lookup key persisted in the log ID column.
    pub log_id: LogId,
    /// Capture time.
    pub timestamp: DateTime<Utc>,
}
