//! Cumulative aggregation
//!
//! Counts and distributions across the entire observation period,
//! independent of whether encounters are still open. Demographic cells
//! (gender, age, zip code) count each patient once, anchored at the
//! earliest positive encounter; result counts are per case.

use crate::algorithm::flagging::FlagSummary;
use crate::algorithm::treatment::TreatmentLevel;
use crate::config::DashboardConfig;
use crate::models::bundle::RecordBundle;
use crate::models::classified::ClassifiedEncounter;
use crate::models::types::{CaseFlag, Gender, VitalStatus};
use chrono::NaiveDateTime;
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;

/// Result structure of the cumulative aggregator
#[derive(Debug, Clone)]
pub struct CumulativeStats {
    /// Flagged case counts per flag class
    pub results: Vec<(CaseFlag, u64)>,
    /// Positive patients per gender
    pub gender: Vec<(Gender, u64)>,
    /// Surviving positive patients per gender
    pub gender_alive: Vec<(Gender, u64)>,
    /// Deceased positive patients per gender
    pub gender_dead: Vec<(Gender, u64)>,
    /// Positive patients with an inpatient encounter, per gender
    pub inpatient_gender: Vec<(Gender, u64)>,
    /// Positive patients with an outpatient encounter, per gender
    pub outpatient_gender: Vec<(Gender, u64)>,
    /// Age-bucket counts of all positive patients
    pub age: Vec<u64>,
    /// Age-bucket counts of surviving positive patients
    pub age_alive: Vec<u64>,
    /// Age-bucket counts of deceased positive patients
    pub age_dead: Vec<u64>,
    /// Age-bucket counts of patients with an inpatient encounter
    pub inpatient_age: Vec<u64>,
    /// Age-bucket counts of patients with an outpatient encounter
    pub outpatient_age: Vec<u64>,
    /// Patients per maximal treatment level reached
    pub max_treatment_level: Vec<(TreatmentLevel, u64)>,
    /// Age-bucket counts per maximal treatment level
    pub age_by_max_level: Vec<(TreatmentLevel, Vec<u64>)>,
    /// Positive patients per residence zip code, ascending by code
    pub zip_codes: Vec<(String, u64)>,
    /// Variant assessment counts per recognized variant label
    pub variant_results: Vec<(String, u64)>,
}

/// Per-patient accumulation over all positive encounters
#[derive(Debug)]
struct PatientAccumulator {
    gender: Gender,
    age: Option<u16>,
    earliest_admission: Option<NaiveDateTime>,
    vital_status: VitalStatus,
    max_level: TreatmentLevel,
    zip_code: Option<String>,
    has_inpatient: bool,
    has_outpatient: bool,
}

impl PatientAccumulator {
    fn absorb(&mut self, view: &ClassifiedEncounter<'_>) {
        // Age is anchored at the earliest recorded positive admission.
        if let Some(admission) = view.encounter.admission() {
            if self
                .earliest_admission
                .is_none_or(|earliest| admission < earliest)
            {
                self.earliest_admission = Some(admission);
                self.age = view.age;
            }
        }
        if view.gender != Gender::Unknown {
            self.gender = view.gender;
        }
        // A recorded death wins over every other vital status.
        match view.vital_status() {
            VitalStatus::Dead => self.vital_status = VitalStatus::Dead,
            VitalStatus::Alive => {
                if self.vital_status == VitalStatus::Unknown {
                    self.vital_status = VitalStatus::Alive;
                }
            }
            VitalStatus::Unknown => {}
        }
        self.max_level = self.max_level.max(view.max_level());
        if self.zip_code.is_none() {
            self.zip_code = view.encounter.zip_code.clone();
        }
        if view.encounter.is_inpatient() {
            self.has_inpatient = true;
        } else {
            self.has_outpatient = true;
        }
    }
}

/// Run the cumulative aggregation over the classified collection.
#[must_use]
pub fn cumulative_stats(
    classified: &[ClassifiedEncounter<'_>],
    bundle: &RecordBundle,
    flags: &FlagSummary,
    config: &DashboardConfig,
) -> CumulativeStats {
    log::debug!("started cumulative aggregation");

    // Patient-level accumulation in first-seen order.
    let mut order: Vec<&str> = Vec::new();
    let mut patients: FxHashMap<&str, PatientAccumulator> = FxHashMap::default();
    for view in classified.iter().filter(|v| v.is_positive()) {
        let accumulator = patients
            .entry(view.patient_id())
            .or_insert_with(|| {
                order.push(view.patient_id());
                PatientAccumulator {
                    gender: Gender::Unknown,
                    age: None,
                    earliest_admission: None,
                    vital_status: VitalStatus::Unknown,
                    max_level: TreatmentLevel::Outpatient,
                    zip_code: None,
                    has_inpatient: false,
                    has_outpatient: false,
                }
            });
        accumulator.absorb(view);
    }

    let bucket_count = config.age_bucket_bounds.len();
    let mut gender_counts = GenderCounter::default();
    let mut gender_alive = GenderCounter::default();
    let mut gender_dead = GenderCounter::default();
    let mut inpatient_gender = GenderCounter::default();
    let mut outpatient_gender = GenderCounter::default();
    let mut age = vec![0u64; bucket_count];
    let mut age_alive = vec![0u64; bucket_count];
    let mut age_dead = vec![0u64; bucket_count];
    let mut inpatient_age = vec![0u64; bucket_count];
    let mut outpatient_age = vec![0u64; bucket_count];
    let mut level_counts: FxHashMap<TreatmentLevel, u64> = FxHashMap::default();
    let mut age_by_level: FxHashMap<TreatmentLevel, Vec<u64>> = FxHashMap::default();
    let mut zip_codes: BTreeMap<String, u64> = BTreeMap::new();

    for patient_id in &order {
        let acc = &patients[patient_id];

        gender_counts.add(acc.gender);
        match acc.vital_status {
            VitalStatus::Alive => gender_alive.add(acc.gender),
            VitalStatus::Dead => gender_dead.add(acc.gender),
            VitalStatus::Unknown => {}
        }
        if acc.has_inpatient {
            inpatient_gender.add(acc.gender);
        }
        if acc.has_outpatient {
            outpatient_gender.add(acc.gender);
        }

        if let Some(patient_age) = acc.age {
            let bucket = config.age_bucket_index(patient_age);
            age[bucket] += 1;
            match acc.vital_status {
                VitalStatus::Alive => age_alive[bucket] += 1,
                VitalStatus::Dead => age_dead[bucket] += 1,
                VitalStatus::Unknown => {}
            }
            if acc.has_inpatient {
                inpatient_age[bucket] += 1;
            }
            if acc.has_outpatient {
                outpatient_age[bucket] += 1;
            }
            age_by_level
                .entry(acc.max_level)
                .or_insert_with(|| vec![0u64; bucket_count])[bucket] += 1;
        }

        *level_counts.entry(acc.max_level).or_insert(0) += 1;

        if let Some(zip) = &acc.zip_code {
            *zip_codes.entry(zip.clone()).or_insert(0) += 1;
        }
    }

    // Variant assessments are counted per observation, not per patient.
    let mut variant_counts: FxHashMap<&str, u64> = FxHashMap::default();
    for observation in &bundle.observations {
        if !config.is_variant_test(&observation.test_code) {
            continue;
        }
        if let Some(label) = observation
            .variant_code
            .as_deref()
            .and_then(|code| config.variant_label(code))
        {
            *variant_counts.entry(label).or_insert(0) += 1;
        }
    }

    let stats = CumulativeStats {
        results: vec![
            (CaseFlag::Positive, flags.positive.len() as u64),
            (CaseFlag::Borderline, flags.borderline.len() as u64),
            (CaseFlag::Negative, flags.negative.len() as u64),
        ],
        gender: gender_counts.into_pairs(),
        gender_alive: gender_alive.into_pairs(),
        gender_dead: gender_dead.into_pairs(),
        inpatient_gender: inpatient_gender.into_pairs(),
        outpatient_gender: outpatient_gender.into_pairs(),
        age,
        age_alive,
        age_dead,
        inpatient_age,
        outpatient_age,
        max_treatment_level: TreatmentLevel::ALL
            .iter()
            .map(|&level| (level, level_counts.get(&level).copied().unwrap_or(0)))
            .collect(),
        age_by_max_level: TreatmentLevel::ALL
            .iter()
            .map(|&level| {
                (
                    level,
                    age_by_level
                        .get(&level)
                        .cloned()
                        .unwrap_or_else(|| vec![0u64; bucket_count]),
                )
            })
            .collect(),
        zip_codes: zip_codes.into_iter().collect(),
        variant_results: config
            .variant_mappings
            .iter()
            .map(|mapping| {
                (
                    mapping.label.clone(),
                    variant_counts
                        .get(mapping.label.as_str())
                        .copied()
                        .unwrap_or(0),
                )
            })
            .collect(),
    };

    log::debug!("finished cumulative aggregation");
    stats
}

/// Counter keyed by the fixed gender order
#[derive(Debug, Default)]
struct GenderCounter {
    counts: [u64; 4],
}

impl GenderCounter {
    fn add(&mut self, gender: Gender) {
        let idx = Gender::ALL
            .iter()
            .position(|&g| g == gender)
            .expect("gender is in the fixed order");
        self.counts[idx] += 1;
    }

    fn into_pairs(self) -> Vec<(Gender, u64)> {
        Gender::ALL
            .iter()
            .zip(self.counts)
            .map(|(&gender, count)| (gender, count))
            .collect()
    }
}
