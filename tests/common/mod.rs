//! Shared fixture builders for the integration tests
#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use epidash::models::types::LocationKind;
use epidash::{
    CaseClass, DiagnosisRecord, DiagnosisReliability, Encounter, Gender, Interval, LabObservation,
    LocationStay, Patient, ProcedureRecord, QualitativeResult, RecordBundle, VitalStatus,
};

/// A timestamp inside the reporting period
pub fn dt(year: i32, month: u32, day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}

pub fn day(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// Evaluation time used by all fixtures
pub fn eval_time() -> NaiveDateTime {
    dt(2021, 6, 30, 12)
}

pub fn closed(start: NaiveDateTime, end: NaiveDateTime) -> Option<Interval> {
    Some(Interval::closed(start, end).unwrap())
}

pub fn open(start: NaiveDateTime) -> Option<Interval> {
    Some(Interval::open_ended(start))
}

pub fn inpatient(
    case_id: &str,
    patient_id: &str,
    period: Option<Interval>,
    vital_status: VitalStatus,
) -> Encounter {
    Encounter::new(
        case_id.to_string(),
        patient_id.to_string(),
        CaseClass::Inpatient,
        period,
        vital_status,
    )
}

pub fn outpatient(case_id: &str, patient_id: &str, period: Option<Interval>) -> Encounter {
    Encounter::new(
        case_id.to_string(),
        patient_id.to_string(),
        CaseClass::Outpatient,
        period,
        VitalStatus::Alive,
    )
}

pub fn ward_stay(location_id: &str, start: NaiveDateTime, end: NaiveDateTime) -> LocationStay {
    LocationStay::new(
        location_id.to_string(),
        LocationKind::NormalWard,
        Interval::closed(start, end).unwrap(),
    )
}

pub fn icu_stay(location_id: &str, start: NaiveDateTime, end: NaiveDateTime) -> LocationStay {
    LocationStay::new(
        location_id.to_string(),
        LocationKind::Icu,
        Interval::closed(start, end).unwrap(),
    )
}

pub fn icu_stay_open(location_id: &str, start: NaiveDateTime) -> LocationStay {
    LocationStay::new(
        location_id.to_string(),
        LocationKind::Icu,
        Interval::open_ended(start),
    )
}

pub fn patient(patient_id: &str, birth: NaiveDate, gender: Gender) -> Patient {
    Patient::new(patient_id.to_string(), Some(birth), gender)
}

/// PCR observation with the default positive test code
pub fn pcr_observation(
    case_id: &str,
    patient_id: &str,
    result: QualitativeResult,
    effective: NaiveDateTime,
) -> LabObservation {
    LabObservation::new(
        case_id.to_string(),
        patient_id.to_string(),
        "94306-8".to_string(),
        result,
        effective,
    )
}

/// Variant assessment observation with the given answer code
pub fn variant_observation(
    case_id: &str,
    patient_id: &str,
    answer_code: &str,
    effective: NaiveDateTime,
) -> LabObservation {
    LabObservation::new(
        case_id.to_string(),
        patient_id.to_string(),
        "96741-4".to_string(),
        QualitativeResult::Positive,
        effective,
    )
    .with_variant_code(answer_code.to_string())
}

pub fn confirmed_diagnosis(
    case_id: &str,
    patient_id: &str,
    reliability: DiagnosisReliability,
) -> DiagnosisRecord {
    DiagnosisRecord::new(
        case_id.to_string(),
        patient_id.to_string(),
        "U07.1".to_string(),
        reliability,
    )
}

pub fn borderline_diagnosis(
    case_id: &str,
    patient_id: &str,
    reliability: DiagnosisReliability,
) -> DiagnosisRecord {
    DiagnosisRecord::new(
        case_id.to_string(),
        patient_id.to_string(),
        "U07.2".to_string(),
        reliability,
    )
}

pub fn ventilation(case_id: &str, start: NaiveDateTime, end: NaiveDateTime) -> ProcedureRecord {
    ProcedureRecord::new(
        case_id.to_string(),
        epidash::models::types::ProcedureKind::Ventilation,
        Interval::closed(start, end).unwrap(),
    )
}

pub fn ventilation_open(case_id: &str, start: NaiveDateTime) -> ProcedureRecord {
    ProcedureRecord::new(
        case_id.to_string(),
        epidash::models::types::ProcedureKind::Ventilation,
        Interval::open_ended(start),
    )
}

pub fn ecmo(case_id: &str, start: NaiveDateTime, end: NaiveDateTime) -> ProcedureRecord {
    ProcedureRecord::new(
        case_id.to_string(),
        epidash::models::types::ProcedureKind::Ecmo,
        Interval::closed(start, end).unwrap(),
    )
}

pub fn bundle(
    encounters: Vec<Encounter>,
    patients: Vec<Patient>,
    conditions: Vec<DiagnosisRecord>,
    observations: Vec<LabObservation>,
    procedures: Vec<ProcedureRecord>,
) -> RecordBundle {
    RecordBundle::new(
        encounters,
        patients,
        conditions,
        observations,
        procedures,
        eval_time(),
    )
}
