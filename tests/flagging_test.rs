//! Tests for the case-flagging logic

mod common;

use common::*;
use epidash::{
    CaseFlag, DashboardConfig, DiagnosisReliability, QualitativeResult, VitalStatus, flag_cases,
};

#[test]
fn positive_lab_result_is_sticky_over_later_negative() {
    let mut bundle = bundle(
        vec![inpatient(
            "C1",
            "P1",
            closed(dt(2021, 3, 1, 8), dt(2021, 3, 10, 8)),
            VitalStatus::Alive,
        )],
        vec![],
        vec![],
        vec![
            pcr_observation("C1", "P1", QualitativeResult::Positive, dt(2021, 3, 1, 9)),
            pcr_observation("C1", "P1", QualitativeResult::Negative, dt(2021, 3, 3, 9)),
        ],
        vec![],
    );
    let summary = flag_cases(&mut bundle, &DashboardConfig::default());

    assert_eq!(summary.positive, vec!["C1".to_string()]);
    assert!(summary.negative.is_empty());
    assert_eq!(bundle.encounters[0].case_flag, Some(CaseFlag::Positive));
}

#[test]
fn inconclusive_lab_without_confirmation_is_borderline() {
    let mut bundle = bundle(
        vec![inpatient(
            "C1",
            "P1",
            closed(dt(2021, 3, 1, 8), dt(2021, 3, 10, 8)),
            VitalStatus::Alive,
        )],
        vec![],
        vec![],
        vec![pcr_observation(
            "C1",
            "P1",
            QualitativeResult::Borderline,
            dt(2021, 3, 1, 9),
        )],
        vec![],
    );
    let summary = flag_cases(&mut bundle, &DashboardConfig::default());

    assert_eq!(summary.borderline, vec!["C1".to_string()]);
    assert!(summary.positive.is_empty());
}

#[test]
fn diagnosis_reliability_steers_the_flag() {
    let mut bundle = bundle(
        vec![
            inpatient("C1", "P1", closed(dt(2021, 3, 1, 8), dt(2021, 3, 5, 8)), VitalStatus::Alive),
            inpatient("C2", "P2", closed(dt(2021, 3, 1, 8), dt(2021, 3, 5, 8)), VitalStatus::Alive),
            inpatient("C3", "P3", closed(dt(2021, 3, 1, 8), dt(2021, 3, 5, 8)), VitalStatus::Alive),
            inpatient("C4", "P4", closed(dt(2021, 3, 1, 8), dt(2021, 3, 5, 8)), VitalStatus::Alive),
        ],
        vec![],
        vec![
            confirmed_diagnosis("C1", "P1", DiagnosisReliability::Confirmed),
            confirmed_diagnosis("C2", "P2", DiagnosisReliability::Suspected),
            confirmed_diagnosis("C3", "P3", DiagnosisReliability::Excluded),
            borderline_diagnosis("C4", "P4", DiagnosisReliability::Missing),
        ],
        vec![],
        vec![],
    );
    let summary = flag_cases(&mut bundle, &DashboardConfig::default());

    assert_eq!(summary.positive, vec!["C1".to_string()]);
    assert_eq!(summary.borderline, vec!["C2".to_string(), "C4".to_string()]);
    assert_eq!(summary.negative, vec!["C3".to_string()]);
}

#[test]
fn lab_results_before_the_qualifying_date_are_ignored() {
    let mut bundle = bundle(
        vec![inpatient(
            "C1",
            "P1",
            closed(dt(2021, 3, 1, 8), dt(2021, 3, 10, 8)),
            VitalStatus::Alive,
        )],
        vec![],
        vec![],
        vec![pcr_observation(
            "C1",
            "P1",
            QualitativeResult::Positive,
            dt(2019, 12, 1, 9),
        )],
        vec![],
    );
    let summary = flag_cases(&mut bundle, &DashboardConfig::default());

    assert_eq!(summary.flagged_count(), 0);
    assert_eq!(bundle.encounters[0].case_flag, None);
}

#[test]
fn recent_positive_outpatient_contact_carries_over_to_inpatient_stay() {
    let mut bundle = bundle(
        vec![
            outpatient("A1", "P1", closed(dt(2021, 3, 1, 8), dt(2021, 3, 1, 12))),
            inpatient("S1", "P1", open(dt(2021, 3, 10, 8)), VitalStatus::Unknown),
            // same patient, but 19 days later: outside the window
            outpatient("A2", "P2", closed(dt(2021, 3, 1, 8), dt(2021, 3, 1, 12))),
            inpatient("S2", "P2", open(dt(2021, 3, 20, 8)), VitalStatus::Unknown),
        ],
        vec![],
        vec![],
        vec![
            pcr_observation("A1", "P1", QualitativeResult::Positive, dt(2021, 3, 1, 9)),
            pcr_observation("A2", "P2", QualitativeResult::Positive, dt(2021, 3, 1, 9)),
        ],
        vec![],
    );
    let summary = flag_cases(&mut bundle, &DashboardConfig::default());

    assert!(summary.positive.contains(&"S1".to_string()));
    assert!(!summary.positive.contains(&"S2".to_string()));
    let carried = bundle
        .encounters
        .iter()
        .find(|e| e.case_id == "S1")
        .unwrap();
    assert!(carried.carried_over);
    assert_eq!(carried.case_flag, Some(CaseFlag::Positive));
}

#[test]
fn flag_sets_are_disjoint() {
    let mut bundle = bundle(
        vec![
            inpatient("C1", "P1", closed(dt(2021, 3, 1, 8), dt(2021, 3, 5, 8)), VitalStatus::Alive),
            inpatient("C2", "P2", closed(dt(2021, 3, 1, 8), dt(2021, 3, 5, 8)), VitalStatus::Alive),
        ],
        vec![],
        vec![confirmed_diagnosis("C2", "P2", DiagnosisReliability::Suspected)],
        vec![
            pcr_observation("C1", "P1", QualitativeResult::Negative, dt(2021, 3, 2, 9)),
            pcr_observation("C1", "P1", QualitativeResult::Positive, dt(2021, 3, 3, 9)),
        ],
        vec![],
    );
    let summary = flag_cases(&mut bundle, &DashboardConfig::default());

    for case_id in &summary.positive {
        assert!(!summary.borderline.contains(case_id));
        assert!(!summary.negative.contains(case_id));
    }
    for case_id in &summary.borderline {
        assert!(!summary.negative.contains(case_id));
    }
    assert_eq!(summary.positive, vec!["C1".to_string()]);
    assert_eq!(summary.borderline, vec!["C2".to_string()]);
}
