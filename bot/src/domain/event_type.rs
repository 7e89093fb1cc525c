//! AAR event types and their sheet labels.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Kind of event an AAR reports on.
///
/// The label returned by [`EventType::label`] is what column 3 of the ledger
/// stores; it must match the sheet byte for byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventType {
    /// Standard event hosted on server one.
    Server1Event,
    /// Standard event hosted on server two.
    Server2Event,
    /// Battalion-internal training simulation.
    TrainingSimulation,
    /// Training simulation run with other battalions.
    JointTrainingSimulation,
    /// Cadet tryout.
    Tryout,
    /// Basic training for up to five trainees.
    BasicTraining,
    /// Rank exam.
    RankExam,
    /// Medical certification.
    MedicalCertification,
    /// Pilot certification.
    PilotCertification,
    /// ARF certification.
    ArfCertification,
    /// Heavy weapons certification.
    HeavyWeaponsCertification,
    /// Engineer certification.
    EngineerCertification,
    /// Marksman certification.
    MarksmanCertification,
    /// Recon certification.
    ReconCertification,
    /// Certification not covered by a dedicated type.
    SpecialistCertification,
    /// NCO academy course.
    NcoAcademy,
    /// Officer training course.
    OfficerTraining,
}

impl EventType {
    /// Every event type, in ledger column order.
    pub const ALL: [Self; 17] = [
        Self::Server1Event,
        Self::Server2Event,
        Self::TrainingSimulation,
        Self::JointTrainingSimulation,
        Self::Tryout,
        Self::BasicTraining,
        Self::RankExam,
        Self::MedicalCertification,
        Self::PilotCertification,
        Self::ArfCertification,
        Self::HeavyWeaponsCertification,
        Self::EngineerCertification,
        Self::MarksmanCertification,
        Self::ReconCertification,
        Self::SpecialistCertification,
        Self::NcoAcademy,
        Self::OfficerTraining,
    ];

    /// Sheet label for this event type.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Server1Event => "Server 1 Event",
            Self::Server2Event => "Server 2 Event",
            Self::TrainingSimulation => "Training Simulation",
            Self::JointTrainingSimulation => "Joint Training Simulation",
            Self::Tryout => "Tryout",
            Self::BasicTraining => "Basic Training",
            Self::RankExam => "Rank Exam",
            Self::MedicalCertification => "Medical Certification",
            Self::PilotCertification => "Pilot Certification",
            Self::ArfCertification => "ARF Certification",
            Self::HeavyWeaponsCertification => "Heavy Weapons Certification",
            Self::EngineerCertification => "Engineer Certification",
            Self::MarksmanCertification => "Marksman Certification",
            Self::ReconCertification => "Recon Certification",
            Self::SpecialistCertification => "Specialist Certification",
            Self::NcoAcademy => "NCO Academy",
            Self::OfficerTraining => "Officer Training",
        }
    }

    /// Look up an event type by its exact sheet label.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|event| event.label() == label)
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Returned when a label does not name a known event type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown event type: {label}")]
pub struct UnknownEventType {
    /// The rejected label.
    pub label: String,
}

impl FromStr for EventType {
    type Err = UnknownEventType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s).ok_or_else(|| UnknownEventType {
            label: s.to_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn labels_round_trip_for_every_type() {
        for event in EventType::ALL {
            assert_eq!(event.label().parse::<EventType>(), Ok(event));
        }
    }

    #[rstest]
    #[case("server 1 event")]
    #[case("Tryout ")]
    #[case("Bake Sale")]
    fn labels_are_matched_exactly(#[case] label: &str) {
        let err = label.parse::<EventType>().expect_err("unknown label");
        assert_eq!(err.label, label);
    }

    #[rstest]
    fn labels_are_unique() {
        let mut labels: Vec<_> = EventType::ALL.iter().map(|event| event.label()).collect();
        labels.sort_unstable();
        labels.dedup();
        assert_eq!(labels.len(), EventType::ALL.len());
    }
}
