//! Encounter entity model
//!
//! An encounter is one hospital stay or outpatient contact. It owns its
//! ordered location-stay intervals; procedures and lab observations are
//! linked by case id and live in their own collections.

use crate::models::types::{CaseClass, CaseFlag, LocationKind, VitalStatus};
use crate::utils::Interval;
use chrono::NaiveDateTime;

/// One interval spent at a ward/ICU/other location during an encounter
#[derive(Debug, Clone)]
pub struct LocationStay {
    /// Id of the referenced location resource
    pub location_id: String,
    /// Ward/ICU classification of the location
    pub kind: LocationKind,
    /// Stay interval; an open end means the patient is still there
    pub period: Interval,
}

impl LocationStay {
    /// Create a new location stay
    #[must_use]
    pub const fn new(location_id: String, kind: LocationKind, period: Interval) -> Self {
        Self {
            location_id,
            kind,
            period,
        }
    }
}

/// Representation of a single hospital or outpatient contact episode
#[derive(Debug, Clone)]
pub struct Encounter {
    /// Case identifier, unique per contact episode
    pub case_id: String,
    /// Id of the patient this encounter belongs to
    pub patient_id: String,
    /// Inpatient/outpatient classification
    pub case_class: CaseClass,
    /// Encounter period; start may be missing on malformed records,
    /// end is missing while the encounter is still open
    pub period: Option<Interval>,
    /// Vital status at discharge
    pub vital_status: VitalStatus,
    /// Location stays in recording order
    pub locations: Vec<LocationStay>,
    /// Zip code of the patient's residence at admission
    pub zip_code: Option<String>,
    /// Flag attached by the case-flagging step; `None` until flagging ran
    /// or when no evidence exists for the case
    pub case_flag: Option<CaseFlag>,
    /// Set when the flag was assigned through the twelve-day carry-over
    /// rule rather than direct evidence on this case
    pub carried_over: bool,
}

impl Encounter {
    /// Create a new encounter without location data
    #[must_use]
    pub const fn new(
        case_id: String,
        patient_id: String,
        case_class: CaseClass,
        period: Option<Interval>,
        vital_status: VitalStatus,
    ) -> Self {
        Self {
            case_id,
            patient_id,
            case_class,
            period,
            vital_status,
            locations: Vec::new(),
            zip_code: None,
            case_flag: None,
            carried_over: false,
        }
    }

    /// Attach a location stay, keeping recording order
    #[must_use]
    pub fn with_location(mut self, stay: LocationStay) -> Self {
        self.locations.push(stay);
        self
    }

    /// Attach a residence zip code
    #[must_use]
    pub fn with_zip_code(mut self, zip_code: String) -> Self {
        self.zip_code = Some(zip_code);
        self
    }

    /// Whether the encounter is still open (no recorded period end)
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.period.is_some_and(|p| p.is_open())
    }

    /// Admission timestamp, if recorded
    #[must_use]
    pub fn admission(&self) -> Option<NaiveDateTime> {
        self.period.map(|p| p.start)
    }

    /// Discharge timestamp, if the encounter is closed
    #[must_use]
    pub fn discharge(&self) -> Option<NaiveDateTime> {
        self.period.and_then(|p| p.end)
    }

    /// Whether the flagging step marked this case positive
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.case_flag == Some(CaseFlag::Positive)
    }

    /// Whether the case class counts as inpatient for reporting
    #[must_use]
    pub fn is_inpatient(&self) -> bool {
        self.case_class == CaseClass::Inpatient
    }

    /// Location stays of a given kind
    pub fn stays_of_kind(&self, kind: LocationKind) -> impl Iterator<Item = &LocationStay> {
        self.locations.iter().filter(move |stay| stay.kind == kind)
    }
}
