//! Case flagging
//!
//! Assigns each case a positive/borderline/negative flag from its
//! diagnosis codes and lab results. Positive evidence is sticky: a later
//! negative result never downgrades a case that has positive evidence.
//! The flag is written onto the encounter so downstream aggregators can
//! filter without re-scanning the observation list.

use crate::config::DashboardConfig;
use crate::models::bundle::RecordBundle;
use crate::models::types::{CaseFlag, DiagnosisReliability, QualitativeResult};
use chrono::NaiveDateTime;
use rustc_hash::FxHashMap;

/// Disjoint case-id sets produced by the flagging step, in encounter input
/// order
#[derive(Debug, Default, Clone)]
pub struct FlagSummary {
    /// Cases with positive evidence
    pub positive: Vec<String>,
    /// Cases with inconclusive evidence only
    pub borderline: Vec<String>,
    /// Cases with negative evidence only
    pub negative: Vec<String>,
}

impl FlagSummary {
    /// Total number of flagged cases
    #[must_use]
    pub fn flagged_count(&self) -> usize {
        self.positive.len() + self.borderline.len() + self.negative.len()
    }
}

/// Flag every case in the bundle and tag its encounter.
///
/// The only mutation the engine performs: `encounter.case_flag` (and the
/// carry-over marker) are written; identity fields are never touched.
pub fn flag_cases(bundle: &mut RecordBundle, config: &DashboardConfig) -> FlagSummary {
    log::debug!("started case flagging for {} encounters", bundle.encounter_count());

    let evidence = collect_evidence(bundle, config);

    for encounter in &mut bundle.encounters {
        if let Some(&flag) = evidence.get(encounter.case_id.as_str()) {
            encounter.case_flag = Some(flag);
        }
    }

    apply_twelve_day_carry_over(bundle, config);

    let mut summary = FlagSummary::default();
    for encounter in &bundle.encounters {
        match encounter.case_flag {
            Some(CaseFlag::Positive) => summary.positive.push(encounter.case_id.clone()),
            Some(CaseFlag::Borderline) => summary.borderline.push(encounter.case_id.clone()),
            Some(CaseFlag::Negative) => summary.negative.push(encounter.case_id.clone()),
            None => {}
        }
    }

    log::debug!(
        "finished case flagging: {} positive, {} borderline, {} negative",
        summary.positive.len(),
        summary.borderline.len(),
        summary.negative.len()
    );
    summary
}

/// Gather the strongest evidence per case id.
fn collect_evidence(bundle: &RecordBundle, config: &DashboardConfig) -> FxHashMap<String, CaseFlag> {
    let reporting_start: NaiveDateTime = config
        .qualifying_date
        .and_hms_opt(0, 0, 0)
        .expect("midnight exists");

    let mut evidence: FxHashMap<String, CaseFlag> = FxHashMap::default();

    // Lab results inside the reporting period.
    for observation in &bundle.observations {
        if !config.is_pcr_test(&observation.test_code) {
            continue;
        }
        if observation.effective < reporting_start || observation.effective > bundle.eval_time {
            continue;
        }
        let flag = match observation.result {
            QualitativeResult::Positive => CaseFlag::Positive,
            QualitativeResult::Borderline => CaseFlag::Borderline,
            QualitativeResult::Negative => CaseFlag::Negative,
        };
        upgrade(&mut evidence, &observation.case_id, flag);
    }

    // Diagnosis codes, weighted by their reliability marker.
    for condition in &bundle.conditions {
        let is_confirmed_code = config
            .confirmed_diagnosis_codes
            .iter()
            .any(|code| code == &condition.icd_code);
        let is_borderline_code = config
            .borderline_diagnosis_codes
            .iter()
            .any(|code| code == &condition.icd_code);
        if !is_confirmed_code && !is_borderline_code {
            continue;
        }

        let flag = match condition.reliability {
            DiagnosisReliability::Excluded => CaseFlag::Negative,
            DiagnosisReliability::Suspected => CaseFlag::Borderline,
            DiagnosisReliability::Confirmed
            | DiagnosisReliability::StateAfter
            | DiagnosisReliability::Missing => {
                if is_confirmed_code {
                    CaseFlag::Positive
                } else {
                    CaseFlag::Borderline
                }
            }
        };
        upgrade(&mut evidence, &condition.case_id, flag);
    }

    evidence
}

/// Keep the strongest flag per case: positive beats borderline beats
/// negative.
fn upgrade(evidence: &mut FxHashMap<String, CaseFlag>, case_id: &str, flag: CaseFlag) {
    const fn strength(flag: CaseFlag) -> u8 {
        match flag {
            CaseFlag::Negative => 0,
            CaseFlag::Borderline => 1,
            CaseFlag::Positive => 2,
        }
    }

    evidence
        .entry(case_id.to_string())
        .and_modify(|current| {
            if strength(flag) > strength(*current) {
                *current = flag;
            }
        })
        .or_insert(flag);
}

/// An inpatient stay beginning within the configured window after a
/// positive outpatient contact of the same patient is itself positive.
fn apply_twelve_day_carry_over(bundle: &mut RecordBundle, config: &DashboardConfig) {
    let positive_outpatient_starts: Vec<(String, NaiveDateTime)> = bundle
        .encounters
        .iter()
        .filter(|e| e.is_positive() && !e.is_inpatient())
        .filter_map(|e| e.admission().map(|start| (e.patient_id.clone(), start)))
        .collect();
    if positive_outpatient_starts.is_empty() {
        return;
    }

    for encounter in &mut bundle.encounters {
        if !encounter.is_inpatient() || encounter.is_positive() {
            continue;
        }
        let Some(inpatient_start) = encounter.admission() else {
            continue;
        };
        let carried = positive_outpatient_starts.iter().any(|(pid, start)| {
            pid == &encounter.patient_id
                && *start <= inpatient_start
                && (inpatient_start.date() - start.date()).num_days()
                    <= config.days_after_outpatient_stay
        });
        if carried {
            log::debug!(
                "inpatient case {} marked positive via recent positive outpatient contact",
                encounter.case_id
            );
            encounter.case_flag = Some(CaseFlag::Positive);
            encounter.carried_over = true;
        }
    }
}
