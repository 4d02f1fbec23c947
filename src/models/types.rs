//! Common domain type definitions
//!
//! This module contains the closed enum types used across the record models
//! and the aggregation logic to ensure consistency and code reuse.

use serde::Serialize;
use std::fmt;

/// Gender of a patient (administrative gender value set)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Gender {
    /// Male gender
    Male,
    /// Female gender
    Female,
    /// Diverse gender
    Diverse,
    /// Unknown or not specified
    Unknown,
}

impl Gender {
    /// All genders in fixed reporting order
    pub const ALL: [Self; 4] = [Self::Male, Self::Female, Self::Diverse, Self::Unknown];

    /// Display label used in report cells
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
            Self::Diverse => "diverse",
            Self::Unknown => "unknown",
        }
    }
}

impl From<&str> for Gender {
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "m" | "male" => Self::Male,
            "f" | "w" | "female" => Self::Female,
            "d" | "diverse" => Self::Diverse,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Vital status of a patient at discharge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum VitalStatus {
    /// Patient discharged alive (or still in treatment)
    Alive,
    /// Patient deceased during the encounter
    Dead,
    /// Discharge disposition missing or ambiguous
    Unknown,
}

impl VitalStatus {
    /// Display label used in report cells
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Alive => "alive",
            Self::Dead => "dead",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for VitalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Administrative class of an encounter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CaseClass {
    /// Full inpatient stay (pre-stationary contacts are counted as outpatient)
    Inpatient,
    /// Outpatient or pre-stationary contact
    Outpatient,
}

impl CaseClass {
    /// Display label used in report cells
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Inpatient => "inpatient",
            Self::Outpatient => "outpatient",
        }
    }
}

/// Qualitative outcome of a lab observation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum QualitativeResult {
    /// Pathogen detected
    Positive,
    /// Pathogen not detected
    Negative,
    /// Indeterminate or inconclusive result
    Borderline,
}

/// Diagnosis reliability marker attached to an ICD coding
///
/// The letters follow the German diagnosis-certainty value set: `A`
/// (excluded), `G` (confirmed), `V` (suspected), `Z` (state after).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DiagnosisReliability {
    /// Diagnosis explicitly excluded
    Excluded,
    /// Diagnosis confirmed
    Confirmed,
    /// Suspected diagnosis
    Suspected,
    /// State after the diagnosed condition
    StateAfter,
    /// No reliability coding present
    Missing,
}

impl From<&str> for DiagnosisReliability {
    fn from(s: &str) -> Self {
        match s.trim().to_uppercase().as_str() {
            "A" => Self::Excluded,
            "G" => Self::Confirmed,
            "V" => Self::Suspected,
            "Z" => Self::StateAfter,
            _ => Self::Missing,
        }
    }
}

/// Kind of a location referenced by an encounter's location stays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LocationKind {
    /// Standard ward
    NormalWard,
    /// Intensive care unit
    Icu,
    /// Any other location (corridors, imaging, ...), ignored by the classifier
    Other,
}

/// Kind of a clinical support procedure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ProcedureKind {
    /// Artificial ventilation
    Ventilation,
    /// Extracorporeal membrane oxygenation
    Ecmo,
}

/// Case flag assigned by the flagging step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CaseFlag {
    /// Confirmed case (diagnosis or positive lab evidence)
    Positive,
    /// Inconclusive evidence only
    Borderline,
    /// Only negative evidence
    Negative,
}

impl CaseFlag {
    /// Display label used in report cells
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Borderline => "borderline",
            Self::Negative => "negative",
        }
    }
}
