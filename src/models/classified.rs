//! Classified encounter view
//!
//! Joins an encounter with everything the aggregators need: the case flag,
//! the classifier output, the patient demographics and the admission age.
//! Views are built fresh for every report run and borrow the underlying
//! records; they carry no lifecycle of their own.

use crate::algorithm::treatment::{Classification, TreatmentLevel};
use crate::models::encounter::Encounter;
use crate::models::types::{CaseFlag, Gender, VitalStatus};
use chrono::NaiveDate;

/// Per-run enriched view over one encounter
#[derive(Debug, Clone)]
pub struct ClassifiedEncounter<'a> {
    /// The underlying encounter record
    pub encounter: &'a Encounter,
    /// Gender of the linked patient; `Unknown` when the patient record is
    /// missing
    pub gender: Gender,
    /// Age in whole years at admission, when birth date and admission are
    /// both known
    pub age: Option<u16>,
    /// Classifier output for this encounter
    pub classification: Classification,
}

impl<'a> ClassifiedEncounter<'a> {
    /// Case identifier of the underlying encounter
    #[must_use]
    pub fn case_id(&self) -> &str {
        &self.encounter.case_id
    }

    /// Patient identifier of the underlying encounter
    #[must_use]
    pub fn patient_id(&self) -> &str {
        &self.encounter.patient_id
    }

    /// Case flag assigned by the flagging step
    #[must_use]
    pub fn flag(&self) -> Option<CaseFlag> {
        self.encounter.case_flag
    }

    /// Whether the case was flagged positive
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.encounter.is_positive()
    }

    /// Vital status at discharge
    #[must_use]
    pub fn vital_status(&self) -> VitalStatus {
        self.encounter.vital_status
    }

    /// Highest severity reached during the stay
    #[must_use]
    pub fn max_level(&self) -> TreatmentLevel {
        self.classification.max_level
    }

    /// Severity at the evaluation time, for open encounters only
    #[must_use]
    pub fn current_level(&self) -> Option<TreatmentLevel> {
        self.classification.current_level
    }

    /// Admission day, if the period start is recorded
    #[must_use]
    pub fn admission_day(&self) -> Option<NaiveDate> {
        self.encounter.admission().map(|ts| ts.date())
    }
}
