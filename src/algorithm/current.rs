//! Current-snapshot aggregation
//!
//! The same groupings as the cumulative aggregator, restricted to positive
//! inpatient encounters that are still open at the evaluation time. Levels
//! come from the classifier output; this module never re-derives them.

use crate::algorithm::treatment::TreatmentLevel;
use crate::config::DashboardConfig;
use crate::models::classified::ClassifiedEncounter;
use crate::models::types::Gender;
use serde::Serialize;

/// One row of the current treatment-level crosstab
#[derive(Debug, Clone, Serialize)]
pub struct CrosstabRow {
    /// Current treatment level of this row
    pub level: TreatmentLevel,
    /// Case ids at this level, in input order
    pub case_ids: Vec<String>,
    /// Patient counts per gender at this level
    pub gender_counts: Vec<(Gender, u64)>,
}

/// Crosstab of the currently treated patients by level and gender
#[derive(Debug, Clone, Serialize)]
pub struct Crosstab {
    /// One row per inpatient treatment level, ward first
    pub rows: Vec<CrosstabRow>,
}

/// Result structure of the current-snapshot aggregator
#[derive(Debug, Clone)]
pub struct CurrentStats {
    /// Open encounters per current treatment level
    pub treatment_level: Vec<(TreatmentLevel, u64)>,
    /// Open encounters per maximal treatment level reached so far
    pub max_treatment_level: Vec<(TreatmentLevel, u64)>,
    /// Age-bucket counts per maximal treatment level
    pub age_by_max_level: Vec<(TreatmentLevel, Vec<u64>)>,
    /// Level-by-gender crosstab with case-id lists
    pub crosstab: Crosstab,
}

/// Inpatient levels in crosstab/report order
const INPATIENT_LEVELS: [TreatmentLevel; 4] = [
    TreatmentLevel::NormalWard,
    TreatmentLevel::Icu,
    TreatmentLevel::IcuWithVentilation,
    TreatmentLevel::IcuWithEcmo,
];

/// Run the current-snapshot aggregation over the classified collection.
#[must_use]
pub fn current_stats(
    classified: &[ClassifiedEncounter<'_>],
    config: &DashboardConfig,
) -> CurrentStats {
    log::debug!("started current-snapshot aggregation");

    // Closed encounters never appear here: current_level is None for them.
    let open_inpatients: Vec<&ClassifiedEncounter<'_>> = classified
        .iter()
        .filter(|view| view.is_positive() && view.encounter.is_inpatient())
        .filter(|view| view.current_level().is_some())
        .collect();

    let bucket_count = config.age_bucket_bounds.len();
    let mut level_counts = [0u64; 4];
    let mut max_level_counts = [0u64; 4];
    let mut age_by_max_level = vec![vec![0u64; bucket_count]; 4];
    let mut rows: Vec<CrosstabRow> = INPATIENT_LEVELS
        .iter()
        .map(|&level| CrosstabRow {
            level,
            case_ids: Vec::new(),
            gender_counts: Gender::ALL.iter().map(|&g| (g, 0)).collect(),
        })
        .collect();

    for view in &open_inpatients {
        let current = view
            .current_level()
            .expect("filtered to views with a current level");
        if let Some(idx) = level_index(current) {
            level_counts[idx] += 1;
            rows[idx].case_ids.push(view.case_id().to_string());
            let gender_idx = Gender::ALL
                .iter()
                .position(|&g| g == view.gender)
                .expect("gender is in the fixed order");
            rows[idx].gender_counts[gender_idx].1 += 1;
        }

        if let Some(idx) = level_index(view.max_level()) {
            max_level_counts[idx] += 1;
            if let Some(age) = view.age {
                age_by_max_level[idx][config.age_bucket_index(age)] += 1;
            }
        }
    }

    let stats = CurrentStats {
        treatment_level: INPATIENT_LEVELS
            .iter()
            .zip(level_counts)
            .map(|(&level, count)| (level, count))
            .collect(),
        max_treatment_level: INPATIENT_LEVELS
            .iter()
            .zip(max_level_counts)
            .map(|(&level, count)| (level, count))
            .collect(),
        age_by_max_level: INPATIENT_LEVELS
            .iter()
            .zip(age_by_max_level)
            .map(|(&level, buckets)| (level, buckets))
            .collect(),
        crosstab: Crosstab { rows },
    };

    log::debug!(
        "finished current-snapshot aggregation over {} open encounters",
        open_inpatients.len()
    );
    stats
}

/// Index of an inpatient level in the fixed row order; outpatient has no
/// row
const fn level_index(level: TreatmentLevel) -> Option<usize> {
    match level {
        TreatmentLevel::Outpatient => None,
        TreatmentLevel::NormalWard => Some(0),
        TreatmentLevel::Icu => Some(1),
        TreatmentLevel::IcuWithVentilation => Some(2),
        TreatmentLevel::IcuWithEcmo => Some(3),
    }
}
