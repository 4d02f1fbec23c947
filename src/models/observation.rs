//! Lab observation entity model

use crate::models::types::QualitativeResult;
use chrono::NaiveDateTime;

/// A timestamped qualitative test result linked to a case
#[derive(Debug, Clone)]
pub struct LabObservation {
    /// Id of the case the sample was collected for
    pub case_id: String,
    /// Id of the tested patient
    pub patient_id: String,
    /// Code of the performed test (e.g. a PCR or variant-assessment code)
    pub test_code: String,
    /// Qualitative outcome
    pub result: QualitativeResult,
    /// Variant classification answer code, present on variant assessments
    pub variant_code: Option<String>,
    /// Collection timestamp
    pub effective: NaiveDateTime,
}

impl LabObservation {
    /// Create a new lab observation
    #[must_use]
    pub const fn new(
        case_id: String,
        patient_id: String,
        test_code: String,
        result: QualitativeResult,
        effective: NaiveDateTime,
    ) -> Self {
        Self {
            case_id,
            patient_id,
            test_code,
            result,
            variant_code: None,
            effective,
        }
    }

    /// Attach a variant classification answer code
    #[must_use]
    pub fn with_variant_code(mut self, variant_code: String) -> Self {
        self.variant_code = Some(variant_code);
        self
    }
}
