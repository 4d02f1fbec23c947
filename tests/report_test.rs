//! End-to-end tests for report generation

mod common;

use common::*;
use epidash::report::export::crosstab_to_csv;
use epidash::{
    DashboardConfig, DataItem, DataItemValue, Gender, QualitativeResult, RecordBundle,
    VitalStatus, generate_report,
};

/// A small but fully populated record bundle
fn sample_bundle() -> RecordBundle {
    bundle(
        vec![
            inpatient(
                "E1",
                "P1",
                closed(dt(2021, 3, 1, 10), dt(2021, 3, 5, 10)),
                VitalStatus::Alive,
            )
            .with_location(ward_stay("W1", dt(2021, 3, 1, 10), dt(2021, 3, 5, 10)))
            .with_location(icu_stay("I1", dt(2021, 3, 3, 0), dt(2021, 3, 4, 0)))
            .with_zip_code("53127".to_string()),
            inpatient("E2", "P2", open(dt(2021, 6, 20, 8)), VitalStatus::Unknown)
                .with_location(icu_stay_open("I1", dt(2021, 6, 21, 8)))
                .with_zip_code("10115".to_string()),
            inpatient(
                "E3",
                "P3",
                closed(dt(2021, 4, 1, 8), dt(2021, 4, 12, 20)),
                VitalStatus::Dead,
            )
            .with_location(icu_stay("I2", dt(2021, 4, 2, 0), dt(2021, 4, 12, 0))),
            outpatient("E4", "P4", closed(dt(2021, 5, 1, 9), dt(2021, 5, 1, 11))),
        ],
        vec![
            patient("P1", day(2000, 1, 1), Gender::Male),
            patient("P2", day(1985, 7, 15), Gender::Female),
            patient("P3", day(1945, 3, 2), Gender::Male),
            patient("P4", day(1995, 11, 30), Gender::Diverse),
        ],
        vec![],
        vec![
            pcr_observation("E1", "P1", QualitativeResult::Positive, dt(2021, 3, 1, 11)),
            pcr_observation("E2", "P2", QualitativeResult::Positive, dt(2021, 6, 20, 9)),
            pcr_observation("E3", "P3", QualitativeResult::Positive, dt(2021, 4, 1, 9)),
            pcr_observation("E4", "P4", QualitativeResult::Borderline, dt(2021, 5, 1, 10)),
            variant_observation("E1", "P1", "LA31569-9", dt(2021, 3, 2, 9)),
        ],
        vec![
            ventilation("E3", dt(2021, 4, 3, 0), dt(2021, 4, 8, 0)),
            ventilation_open("E2", dt(2021, 6, 22, 8)),
        ],
    )
}

#[test]
fn identical_input_yields_byte_identical_output() {
    let config = DashboardConfig::default();
    let mut first = sample_bundle();
    let mut second = sample_bundle();

    let report_a = generate_report(&mut first, &config).unwrap();
    let report_b = generate_report(&mut second, &config).unwrap();

    assert_eq!(report_a.to_json().unwrap(), report_b.to_json().unwrap());
}

#[test]
fn every_data_item_is_produced_exactly_once_in_fixed_order() {
    let config = DashboardConfig::default();
    let mut bundle = sample_bundle();
    let report = generate_report(&mut bundle, &config).unwrap();

    let produced: Vec<DataItem> = report.items().iter().map(|(item, _)| *item).collect();
    assert_eq!(produced, DataItem::ALL.to_vec());
}

#[test]
fn report_serializes_under_the_stable_item_keys() {
    let config = DashboardConfig::default();
    let mut bundle = sample_bundle();
    let report = generate_report(&mut bundle, &config).unwrap();

    let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
    let object = json.as_object().unwrap();
    assert_eq!(object.len(), DataItem::ALL.len());
    assert!(object.contains_key("current.treatmentlevel"));
    assert!(object.contains_key("cumulative.age"));
    assert!(object.contains_key("cumulative.lengthofstay.icu.dead"));
    assert!(object.contains_key("timeline.test.positive"));
}

#[test]
fn current_counts_reflect_only_the_open_encounter() {
    let config = DashboardConfig::default();
    let mut bundle = sample_bundle();
    let report = generate_report(&mut bundle, &config).unwrap();

    let Some(DataItemValue::LabelCounts(levels)) = report.get(DataItem::CurrentTreatmentLevel)
    else {
        panic!("current.treatmentlevel must be label counts");
    };
    // E2 is the only open encounter; its ventilation is running
    let by_label: Vec<(&str, u64)> = levels
        .iter()
        .map(|cell| (cell.label.as_str(), cell.count))
        .collect();
    assert_eq!(
        by_label,
        vec![
            ("normal_ward", 0),
            ("icu", 0),
            ("icu_with_ventilation", 1),
            ("icu_with_ecmo", 0)
        ]
    );
}

#[test]
fn length_of_stay_items_carry_the_expected_hours() {
    let config = DashboardConfig::default();
    let mut bundle = sample_bundle();
    let report = generate_report(&mut bundle, &config).unwrap();

    let Some(DataItemValue::Durations(hospital)) =
        report.get(DataItem::CumulativeLengthOfStayHospital)
    else {
        panic!("hospital length of stay must be a duration list");
    };
    // E1: 4 days = 96h, E3: 11 days 12h = 276h; E2 is open and excluded
    assert_eq!(hospital, &vec![96, 276]);

    let Some(DataItemValue::Durations(icu_dead)) =
        report.get(DataItem::CumulativeLengthOfStayIcuDead)
    else {
        panic!("icu length of stay must be a duration list");
    };
    assert_eq!(icu_dead, &vec![240]);
}

#[test]
fn crosstab_item_renders_as_csv() {
    let config = DashboardConfig::default();
    let mut bundle = sample_bundle();
    let report = generate_report(&mut bundle, &config).unwrap();

    let Some(DataItemValue::Crosstab(crosstab)) =
        report.get(DataItem::CurrentTreatmentLevelCrosstab)
    else {
        panic!("crosstab item must carry the crosstab shape");
    };
    let csv = crosstab_to_csv(crosstab);
    let mut lines = csv.lines();
    assert_eq!(
        lines.next(),
        Some("normal_ward;icu;icu_with_ventilation;icu_with_ecmo")
    );
    assert_eq!(lines.next(), Some(";;E2;"));
}

#[test]
fn evaluation_before_the_qualifying_date_is_rejected() {
    let config = DashboardConfig::default();
    let mut bundle = RecordBundle::new(vec![], vec![], vec![], vec![], vec![], dt(2019, 1, 1, 0));
    assert!(generate_report(&mut bundle, &config).is_err());
}

#[test]
fn borderline_case_appears_in_the_case_id_lists() {
    let config = DashboardConfig::default();
    let mut bundle = sample_bundle();
    let report = generate_report(&mut bundle, &config).unwrap();

    let Some(DataItemValue::CaseIdLists(lists)) = report.get(DataItem::CaseNrs) else {
        panic!("casenrs must be case id lists");
    };
    assert_eq!(lists[0].label, "positive");
    assert_eq!(
        lists[0].case_ids,
        vec!["E1".to_string(), "E2".to_string(), "E3".to_string()]
    );
    assert_eq!(lists[1].label, "borderline");
    assert_eq!(lists[1].case_ids, vec!["E4".to_string()]);
}
