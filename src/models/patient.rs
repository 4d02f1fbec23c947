//! Patient entity model

use crate::models::types::Gender;
use chrono::NaiveDate;

/// Demographic anchor for one or more encounters
#[derive(Debug, Clone)]
pub struct Patient {
    /// Patient identifier
    pub patient_id: String,
    /// Birth date, used for age-at-admission; may be missing
    pub birth_date: Option<NaiveDate>,
    /// Administrative gender
    pub gender: Gender,
}

impl Patient {
    /// Create a new patient
    #[must_use]
    pub const fn new(patient_id: String, birth_date: Option<NaiveDate>, gender: Gender) -> Self {
        Self {
            patient_id,
            birth_date,
            gender,
        }
    }
}
