//! AAR submission and participant edits.
//!
//! [`AarSubmissionService`] validates a report against the column map,
//! resolves names from the roster, mints the log ID, appends the row, posts a
//! notice, and invalidates the cached ledger. Appends and participant edits
//! both read the sheet before writing it, so they run one at a time behind an
//! async lock.

use std::sync::Arc;

use mockable::Clock;
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::column_map::{EventColumns, columns_for};
use super::ledger_writer::{LedgerWriter, ParticipantsUpdate};
use super::ports::{AarNotice, AarNotifier, LogIdGenerator};
use super::roster_service::RosterService;
use super::sheet_cache::SheetCache;
use super::{AarFields, AarRecord, Error, EventType, LogId};

/// Basic Training trainee slots.
const TRAINEE_SLOTS: usize = 5;

/// A report as entered by the submitter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitAarRequest {
    /// Kind of activity reported.
    pub event_type: EventType,
    /// Submitter SteamID.
    pub submitter_steam_id: String,
    /// Name to use when the submitter is not registered.
    pub fallback_name: String,
    /// Event-specific fields keyed by logical name.
    pub fields: AarFields,
}

/// Outcome of a successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedAar {
    /// Log ID minted for the report.
    pub log_id: LogId,
    /// 1-based ledger row the report landed on.
    pub row_index: usize,
    /// Name recorded as submitter.
    pub submitter_name: String,
    /// Whether the notice was delivered.
    pub notified: bool,
}

/// Collaborators the submission service drives besides the ledger.
#[derive(Clone)]
pub struct AarSubmissionPorts {
    /// Mints log IDs.
    pub log_ids: Arc<dyn LogIdGenerator>,
    /// Announces new reports.
    pub notifier: Arc<dyn AarNotifier>,
    /// Stamps submissions.
    pub clock: Arc<dyn Clock>,
}

/// Submission orchestration.
pub struct AarSubmissionService {
    ledger: LedgerWriter,
    roster: RosterService,
    cache: Arc<SheetCache>,
    ports: AarSubmissionPorts,
    write_lock: Mutex<()>,
}

impl AarSubmissionService {
    /// Build the service. `cache` must be the cache the ledger writer reads
    /// through, so invalidation reaches it.
    pub fn new(
        ledger: LedgerWriter,
        roster: RosterService,
        cache: Arc<SheetCache>,
        ports: AarSubmissionPorts,
    ) -> Self {
        Self {
            ledger,
            roster,
            cache,
            ports,
            write_lock: Mutex::new(()),
        }
    }

    /// Validate, record, and announce one report.
    ///
    /// # Errors
    ///
    /// [`crate::domain::ErrorCode::InvalidRequest`] when the SteamID or a
    /// required field is blank; ledger failures as returned by
    /// [`LedgerWriter::append`]. A failed notice is not an error.
    pub async fn submit(&self, request: SubmitAarRequest) -> Result<SubmittedAar, Error> {
        let SubmitAarRequest {
            event_type,
            submitter_steam_id,
            fallback_name,
            mut fields,
        } = request;
        let submitter_steam_id = submitter_steam_id.trim().to_owned();
        if submitter_steam_id.is_empty() {
            return Err(Error::invalid_request("submitter steam id is required"));
        }
        validate_required(columns_for(event_type), &fields)?;

        let submitter_name = self
            .resolve_name(&submitter_steam_id)
            .await
            .unwrap_or_else(|| fallback_name.trim().to_owned());
        if event_type == EventType::BasicTraining {
            self.fill_trainee_names(&mut fields).await;
        }

        let record = AarRecord {
            event_type: event_type.label().to_owned(),
            submitter_name: submitter_name.clone(),
            submitter_steam_id: submitter_steam_id.clone(),
            fields,
            log_id: self.ports.log_ids.next_log_id(),
            timestamp: self.ports.clock.utc(),
        };

        let row_index = {
            let _guard = self.write_lock.lock().await;
            self.ledger.append(&record).await?
        };
        self.invalidate_ledger();

        let notice = AarNotice {
            log_id: record.log_id.to_string(),
            event_type: record.event_type.clone(),
            submitter_name: submitter_name.clone(),
            submitter_steam_id,
        };
        let notified = match self.ports.notifier.post_notice(&notice).await {
            Ok(()) => true,
            Err(error) => {
                warn!(log_id = %record.log_id, error = %error, "aar notice failed");
                false
            }
        };

        info!(log_id = %record.log_id, row_index, notified, "aar submitted");
        Ok(SubmittedAar {
            log_id: record.log_id,
            row_index,
            submitter_name,
            notified,
        })
    }

    /// Add `names` to the participants of the report `log_id`.
    ///
    /// # Errors
    ///
    /// [`crate::domain::ErrorCode::InvalidRequest`] for a malformed log ID or
    /// when every name is blank; otherwise as
    /// [`LedgerWriter::append_participants`].
    pub async fn append_participants(
        &self,
        log_id: &str,
        names: &[String],
    ) -> Result<ParticipantsUpdate, Error> {
        let log_id = LogId::new(log_id.trim())
            .map_err(|error| Error::invalid_request(format!("invalid log id: {error}")))?;
        let names: Vec<String> = names
            .iter()
            .map(|name| name.trim())
            .filter(|name| !name.is_empty())
            .map(str::to_owned)
            .collect();
        if names.is_empty() {
            return Err(Error::invalid_request("at least one participant is required"));
        }

        let update = {
            let _guard = self.write_lock.lock().await;
            self.ledger.append_participants(&log_id, &names).await?
        };
        self.invalidate_ledger();
        Ok(update)
    }

    async fn resolve_name(&self, steam_id: &str) -> Option<String> {
        match self.roster.display_name_for(steam_id).await {
            Ok(name) => name,
            Err(error) => {
                warn!(error = %error, "roster unavailable; using supplied name");
                None
            }
        }
    }

    async fn fill_trainee_names(&self, fields: &mut AarFields) {
        for slot in 1..=TRAINEE_SLOTS {
            let name_field = format!("trainee{slot}Name");
            let steam_field = format!("trainee{slot}SteamId");
            if fields.has_value(&name_field) || !fields.has_value(&steam_field) {
                continue;
            }
            let steam_id = fields.get(&steam_field).trim().to_owned();
            if let Some(name) = self.resolve_name(&steam_id).await {
                fields.insert(name_field, name);
            }
        }
    }

    fn invalidate_ledger(&self) {
        self.cache.clear(Some(self.ledger.ledger().alias()));
    }
}

fn validate_required(layout: &EventColumns, fields: &AarFields) -> Result<(), Error> {
    match layout
        .fields
        .iter()
        .find(|column| column.required && !fields.has_value(column.field))
    {
        Some(missing) => Err(Error::invalid_request(format!(
            "{} is required for {} reports",
            missing.field, layout.event_type
        ))),
        None => Ok(()),
    }
}
