//! Ledger column layout: where each AAR field lives in a sheet row.
//!
//! The layout is shared with the live spreadsheet, so every index here is
//! part of the wire format. Each `(event type, field)` pair owns exactly one
//! column and no column is shared between event types.

use super::EventType;

/// Number of cells in every ledger row (`A` through `GR`).
pub const ROW_WIDTH: usize = 200;
/// Capture time, `M/DD/YYYY HH:MM:SS` UTC.
pub const TIMESTAMP_COLUMN: usize = 0;
/// Submitter display name.
pub const SUBMITTER_NAME_COLUMN: usize = 1;
/// Submitter SteamID.
pub const SUBMITTER_STEAM_ID_COLUMN: usize = 2;
/// Event type label.
pub const EVENT_TYPE_COLUMN: usize = 3;
/// Log ID used for later lookups.
pub const LOG_ID_COLUMN: usize = 109;

/// Columns written for every row regardless of event type.
pub const COMMON_COLUMNS: [usize; 5] = [
    TIMESTAMP_COLUMN,
    SUBMITTER_NAME_COLUMN,
    SUBMITTER_STEAM_ID_COLUMN,
    EVENT_TYPE_COLUMN,
    LOG_ID_COLUMN,
];

/// Field name that editable event types extend after submission.
pub const PARTICIPANTS_FIELD: &str = "participants";

/// One field of an event type and the absolute column it is written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldColumn {
    /// Field name as it appears in the submitted field bag.
    pub field: &'static str,
    /// Zero-based absolute column index.
    pub column: usize,
    /// Whether a submission must supply a non-blank value.
    pub required: bool,
}

/// Column layout for one event type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventColumns {
    /// Event type the layout applies to.
    pub event_type: EventType,
    /// Field placements.
    pub fields: &'static [FieldColumn],
    /// Whether the participants column may be extended later.
    pub editable: bool,
}

impl EventColumns {
    /// Column for `field`, if this event type records it.
    pub fn column_of(&self, field: &str) -> Option<usize> {
        self.fields
            .iter()
            .find(|placement| placement.field == field)
            .map(|placement| placement.column)
    }

    /// Participants column when the event type supports later edits.
    pub fn participants_column(&self) -> Option<usize> {
        if self.editable {
            self.column_of(PARTICIPANTS_FIELD)
        } else {
            None
        }
    }
}

const fn required(field: &'static str, column: usize) -> FieldColumn {
    FieldColumn {
        field,
        column,
        required: true,
    }
}

const fn optional(field: &'static str, column: usize) -> FieldColumn {
    FieldColumn {
        field,
        column,
        required: false,
    }
}

const fn standard_event(first: usize) -> [FieldColumn; 4] {
    [
        optional("eventTitle", first),
        optional("gamemaster", first + 1),
        required(PARTICIPANTS_FIELD, first + 2),
        optional("summary", first + 3),
    ]
}

const fn certification(first: usize) -> [FieldColumn; 3] {
    [
        optional("traineeName", first),
        required("traineeSteamId", first + 1),
        required("result", first + 2),
    ]
}

static SERVER_1_EVENT: [FieldColumn; 4] = standard_event(18);
static SERVER_2_EVENT: [FieldColumn; 4] = standard_event(22);
static TRAINING_SIMULATION: [FieldColumn; 4] = [
    optional("host", 26),
    optional("simulation", 27),
    required(PARTICIPANTS_FIELD, 28),
    optional("summary", 29),
];
static JOINT_TRAINING_SIMULATION: [FieldColumn; 4] = [
    optional("host", 30),
    optional("battalions", 31),
    required(PARTICIPANTS_FIELD, 32),
    optional("summary", 33),
];
static TRYOUT: [FieldColumn; 5] = [
    required("officerSteamId", 4),
    optional("startingCTs", 5),
    optional("endingCTs", 6),
    required("passedCTs", 7),
    optional("officerName", 75),
];
static BASIC_TRAINING: [FieldColumn; 10] = [
    optional("trainee1Name", 8),
    required("trainee1SteamId", 9),
    optional("trainee2Name", 10),
    optional("trainee2SteamId", 11),
    optional("trainee3Name", 12),
    optional("trainee3SteamId", 13),
    optional("trainee4Name", 14),
    optional("trainee4SteamId", 15),
    optional("trainee5Name", 16),
    optional("trainee5SteamId", 17),
];
static RANK_EXAM: [FieldColumn; 4] = [
    optional("traineeName", 34),
    required("traineeSteamId", 35),
    optional("rank", 36),
    required("result", 37),
];
static MEDICAL_CERTIFICATION: [FieldColumn; 3] = certification(38);
static PILOT_CERTIFICATION: [FieldColumn; 3] = certification(41);
static ARF_CERTIFICATION: [FieldColumn; 3] = certification(44);
static HEAVY_WEAPONS_CERTIFICATION: [FieldColumn; 3] = certification(47);
static ENGINEER_CERTIFICATION: [FieldColumn; 3] = certification(50);
static MARKSMAN_CERTIFICATION: [FieldColumn; 3] = certification(53);
static RECON_CERTIFICATION: [FieldColumn; 3] = certification(56);
static SPECIALIST_CERTIFICATION: [FieldColumn; 4] = [
    required("certification", 59),
    optional("traineeName", 60),
    required("traineeSteamId", 61),
    required("result", 62),
];
static NCO_ACADEMY: [FieldColumn; 4] = [
    optional("instructor", 63),
    optional("traineeName", 64),
    required("traineeSteamId", 65),
    required("result", 66),
];
static OFFICER_TRAINING: [FieldColumn; 5] = [
    optional("instructor", 67),
    optional("traineeName", 68),
    required("traineeSteamId", 69),
    required("result", 70),
    optional("notes", 71),
];

const fn layout(
    event_type: EventType,
    fields: &'static [FieldColumn],
    editable: bool,
) -> EventColumns {
    EventColumns {
        event_type,
        fields,
        editable,
    }
}

/// The complete ledger layout, one entry per event type.
pub static COLUMN_MAP: [EventColumns; 17] = [
    layout(EventType::Server1Event, &SERVER_1_EVENT, true),
    layout(EventType::Server2Event, &SERVER_2_EVENT, true),
    layout(EventType::TrainingSimulation, &TRAINING_SIMULATION, true),
    layout(
        EventType::JointTrainingSimulation,
        &JOINT_TRAINING_SIMULATION,
        true,
    ),
    layout(EventType::Tryout, &TRYOUT, false),
    layout(EventType::BasicTraining, &BASIC_TRAINING, false),
    layout(EventType::RankExam, &RANK_EXAM, false),
    layout(EventType::MedicalCertification, &MEDICAL_CERTIFICATION, false),
    layout(EventType::PilotCertification, &PILOT_CERTIFICATION, false),
    layout(EventType::ArfCertification, &ARF_CERTIFICATION, false),
    layout(
        EventType::HeavyWeaponsCertification,
        &HEAVY_WEAPONS_CERTIFICATION,
        false,
    ),
    layout(EventType::EngineerCertification, &ENGINEER_CERTIFICATION, false),
    layout(EventType::MarksmanCertification, &MARKSMAN_CERTIFICATION, false),
    layout(EventType::ReconCertification, &RECON_CERTIFICATION, false),
    layout(
        EventType::SpecialistCertification,
        &SPECIALIST_CERTIFICATION,
        false,
    ),
    layout(EventType::NcoAcademy, &NCO_ACADEMY, false),
    layout(EventType::OfficerTraining, &OFFICER_TRAINING, false),
];

/// Layout for `event_type`.
pub fn columns_for(event_type: EventType) -> &'static EventColumns {
    // Entries are stored in declaration order of `EventType`.
    &COLUMN_MAP[event_type as usize]
}

/// Layout for a raw sheet label; `None` for labels outside the table.
pub fn columns_for_label(label: &str) -> Option<&'static EventColumns> {
    EventType::from_label(label).map(columns_for)
}

/// Convert a 1-based column number to its spreadsheet letters (1 → `A`, 27 → `AA`).
///
/// Returns an empty string for 0, which has no letter form.
pub fn column_to_letter(column: usize) -> String {
    let mut remaining = column;
    let mut letters = Vec::new();
    while remaining > 0 {
        let offset = (remaining - 1) % 26;
        letters.push(char::from(b'A' + offset as u8));
        remaining = (remaining - 1) / 26;
    }
    letters.iter().rev().collect()
}

#[cfg(test)]
mod tests {
    //! Pins the ledger layout to the live sheet.

    use std::collections::BTreeSet;

    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1, "A")]
    #[case(26, "Z")]
    #[case(27, "AA")]
    #[case(52, "AZ")]
    #[case(53, "BA")]
    #[case(110, "DF")]
    #[case(200, "GR")]
    #[case(702, "ZZ")]
    #[case(703, "AAA")]
    fn column_letters_follow_bijective_base26(#[case] column: usize, #[case] letters: &str) {
        assert_eq!(column_to_letter(column), letters);
    }

    #[rstest]
    fn column_zero_has_no_letters() {
        assert_eq!(column_to_letter(0), "");
    }

    #[rstest]
    fn every_event_type_has_exactly_one_layout() {
        for event in EventType::ALL {
            let matches = COLUMN_MAP
                .iter()
                .filter(|entry| entry.event_type == event)
                .count();
            assert_eq!(matches, 1, "{event} should appear once");
            assert_eq!(columns_for(event).event_type, event);
        }
    }

    #[rstest]
    fn no_column_is_shared() {
        let mut seen: BTreeSet<usize> = COMMON_COLUMNS.into_iter().collect();
        for entry in &COLUMN_MAP {
            for placement in entry.fields {
                assert!(
                    placement.column < ROW_WIDTH,
                    "{}.{} outside row",
                    entry.event_type,
                    placement.field
                );
                assert!(
                    seen.insert(placement.column),
                    "column {} reused by {}.{}",
                    placement.column,
                    entry.event_type,
                    placement.field
                );
            }
        }
    }

    #[rstest]
    fn field_names_are_unique_within_a_type() {
        for entry in &COLUMN_MAP {
            let names: BTreeSet<_> = entry.fields.iter().map(|p| p.field).collect();
            assert_eq!(names.len(), entry.fields.len(), "{}", entry.event_type);
        }
    }

    #[rstest]
    fn tryout_layout_matches_sheet() {
        let tryout = columns_for(EventType::Tryout);
        assert_eq!(tryout.column_of("officerName"), Some(75));
        assert_eq!(tryout.column_of("officerSteamId"), Some(4));
        assert_eq!(tryout.column_of("startingCTs"), Some(5));
        assert_eq!(tryout.column_of("endingCTs"), Some(6));
        assert_eq!(tryout.column_of("passedCTs"), Some(7));
    }

    #[rstest]
    fn basic_training_uses_name_and_steam_id_pairs() {
        let basic = columns_for(EventType::BasicTraining);
        for (slot, first) in (1..=5).zip([8, 10, 12, 14, 16]) {
            assert_eq!(basic.column_of(&format!("trainee{slot}Name")), Some(first));
            assert_eq!(basic.column_of(&format!("trainee{slot}SteamId")), Some(first + 1));
        }
    }

    #[rstest]
    fn only_standard_and_simulation_events_are_editable() {
        let editable: Vec<_> = COLUMN_MAP
            .iter()
            .filter(|entry| entry.participants_column().is_some())
            .map(|entry| entry.event_type)
            .collect();
        assert_eq!(
            editable,
            vec![
                EventType::Server1Event,
                EventType::Server2Event,
                EventType::TrainingSimulation,
                EventType::JointTrainingSimulation,
            ]
        );
    }

    #[rstest]
    fn unknown_labels_have_no_layout() {
        assert!(columns_for_label("Bake Sale").is_none());
        assert!(columns_for_label("Rank Exam").is_some());
    }
}
