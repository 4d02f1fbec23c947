//! A Rust library for computing dashboard statistics for hospitalized
//! patients during an epidemic, from longitudinal clinical event records.
//!
//! The engine flags cases as positive/borderline/negative, classifies each
//! encounter onto a clinical severity ladder (ward, ICU, ICU with
//! ventilation, ICU with ECMO) and aggregates the classified encounters
//! into cumulative counts, current snapshots, daily timelines and
//! length-of-stay distributions. Inputs are in-memory record collections
//! supplied by the caller; the output is a [`report::Report`] keyed by a
//! fixed enumeration of data items.

pub mod algorithm;
pub mod config;
pub mod error;
pub mod models;
pub mod report;
pub mod utils;

// Re-export the most common types for easier use
// Core types
pub use config::{DashboardConfig, VariantMapping};
pub use error::{DashboardError, Result};
pub use models::{
    CaseClass, CaseFlag, DiagnosisRecord, DiagnosisReliability, Encounter, Gender, LabObservation,
    LocationStay, Patient, ProcedureRecord, QualitativeResult, RecordBundle, VitalStatus,
};

// Classification and aggregation
pub use algorithm::{FlagSummary, TreatmentLevel, classify_bundle, flag_cases};

// Report output
pub use report::{DataItem, DataItemValue, Report, generate_report};

// Utility types
pub use utils::Interval;
