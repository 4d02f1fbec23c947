//! Diagnosis entity model

use crate::models::types::DiagnosisReliability;

/// An ICD-coded diagnosis with its reliability marker
#[derive(Debug, Clone)]
pub struct DiagnosisRecord {
    /// Id of the case the diagnosis was recorded on
    pub case_id: String,
    /// Id of the diagnosed patient
    pub patient_id: String,
    /// ICD-10 code (e.g. "U07.1")
    pub icd_code: String,
    /// Diagnosis certainty marker
    pub reliability: DiagnosisReliability,
}

impl DiagnosisRecord {
    /// Create a new diagnosis record
    #[must_use]
    pub const fn new(
        case_id: String,
        patient_id: String,
        icd_code: String,
        reliability: DiagnosisReliability,
    ) -> Self {
        Self {
            case_id,
            patient_id,
            icd_code,
            reliability,
        }
    }
}
