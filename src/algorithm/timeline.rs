//! Timeline aggregation
//!
//! Buckets events by calendar day into zero-filled, contiguous series so
//! that day-over-day deltas are meaningful to chart renderers. Every
//! series spans the earliest to the latest event day of its category;
//! grouped series (variants, level transitions) share one span so their
//! rows align.

use crate::algorithm::treatment::TreatmentLevel;
use crate::config::DashboardConfig;
use crate::models::bundle::RecordBundle;
use crate::models::classified::ClassifiedEncounter;
use crate::models::types::{QualitativeResult, VitalStatus};
use crate::utils::day_range;
use chrono::{NaiveDate, NaiveDateTime};
use itertools::Itertools;
use std::collections::BTreeMap;

/// Result structure of the timeline aggregator
#[derive(Debug, Clone)]
pub struct TimelineStats {
    /// Deaths per day (day of discharge)
    pub deaths: Vec<(NaiveDate, u64)>,
    /// Performed disease tests per day (day of collection)
    pub tests: Vec<(NaiveDate, u64)>,
    /// Positive disease tests per day
    pub tests_positive: Vec<(NaiveDate, u64)>,
    /// Variant assessment results per day, one series per variant label
    pub variant_results: Vec<(String, Vec<(NaiveDate, u64)>)>,
    /// Treatment-level transitions per day, one series per level entered
    pub level_transitions: Vec<(TreatmentLevel, Vec<(NaiveDate, u64)>)>,
}

/// Run the timeline aggregation.
#[must_use]
pub fn timeline_stats(
    classified: &[ClassifiedEncounter<'_>],
    bundle: &RecordBundle,
    config: &DashboardConfig,
) -> TimelineStats {
    log::debug!("started timeline aggregation");

    let reporting_start: NaiveDateTime = config
        .qualifying_date
        .and_hms_opt(0, 0, 0)
        .expect("midnight exists");
    let in_window =
        |ts: NaiveDateTime| ts >= reporting_start && ts <= bundle.eval_time;

    // Deaths: day of discharge of closed, positive, non-outpatient
    // encounters with a confirmed death.
    let death_days: Vec<NaiveDate> = classified
        .iter()
        .filter(|view| view.is_positive() && view.encounter.is_inpatient())
        .filter(|view| view.vital_status() == VitalStatus::Dead)
        .filter_map(|view| view.encounter.discharge())
        .map(|discharge| discharge.date())
        .collect();

    // Test series over the disease PCR observations in the reporting window.
    let mut test_days: Vec<NaiveDate> = Vec::new();
    let mut positive_test_days: Vec<NaiveDate> = Vec::new();
    for observation in &bundle.observations {
        if !config.is_pcr_test(&observation.test_code) || !in_window(observation.effective) {
            continue;
        }
        test_days.push(observation.effective.date());
        if observation.result == QualitativeResult::Positive {
            positive_test_days.push(observation.effective.date());
        }
    }

    // Variant results, bucketed by collection day of the assessment.
    let variant_events: Vec<(String, NaiveDate)> = bundle
        .observations
        .iter()
        .filter(|obs| config.is_variant_test(&obs.test_code) && in_window(obs.effective))
        .filter_map(|obs| {
            obs.variant_code
                .as_deref()
                .and_then(|code| config.variant_label(code))
                .map(|label| (label.to_string(), obs.effective.date()))
        })
        .collect();
    let variant_labels: Vec<String> = config
        .variant_mappings
        .iter()
        .map(|mapping| mapping.label.clone())
        .collect();

    // Level transitions on the day the classifier's interval boundary falls.
    let transition_events: Vec<(TreatmentLevel, NaiveDate)> = classified
        .iter()
        .filter(|view| view.is_positive())
        .flat_map(|view| {
            view.classification
                .transitions
                .iter()
                .map(|&(day, level)| (level, day))
        })
        .collect();

    let stats = TimelineStats {
        deaths: zero_filled(&death_days),
        tests: zero_filled(&test_days),
        tests_positive: zero_filled(&positive_test_days),
        variant_results: grouped_series(&variant_events, &variant_labels),
        level_transitions: grouped_series(&transition_events, &TreatmentLevel::ALL),
    };

    log::debug!("finished timeline aggregation");
    stats
}

/// Contiguous, zero-filled daily counts from the first to the last event
/// day. No events yield an empty series.
#[must_use]
pub fn zero_filled(event_days: &[NaiveDate]) -> Vec<(NaiveDate, u64)> {
    let Some((first, last)) = span(event_days.iter().copied()) else {
        return Vec::new();
    };
    let mut counts: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    for &day in event_days {
        *counts.entry(day).or_insert(0) += 1;
    }
    day_range(first, last)
        .into_iter()
        .map(|day| (day, counts.get(&day).copied().unwrap_or(0)))
        .collect()
}

/// Zero-filled series per group key over the shared span of all events.
/// Keys without events get an all-zero series; with no events at all,
/// every series is empty.
fn grouped_series<K: Clone + PartialEq>(
    events: &[(K, NaiveDate)],
    keys: &[K],
) -> Vec<(K, Vec<(NaiveDate, u64)>)> {
    let shared_span = span(events.iter().map(|(_, day)| *day));

    keys.iter()
        .map(|key| {
            let series = match shared_span {
                Some((first, last)) => {
                    let mut counts: BTreeMap<NaiveDate, u64> = BTreeMap::new();
                    for (event_key, day) in events {
                        if event_key == key {
                            *counts.entry(*day).or_insert(0) += 1;
                        }
                    }
                    day_range(first, last)
                        .into_iter()
                        .map(|day| (day, counts.get(&day).copied().unwrap_or(0)))
                        .collect()
                }
                None => Vec::new(),
            };
            (key.clone(), series)
        })
        .collect()
}

/// First and last day among the events, if any
fn span(days: impl Iterator<Item = NaiveDate>) -> Option<(NaiveDate, NaiveDate)> {
    use itertools::MinMaxResult;
    match days.minmax() {
        MinMaxResult::NoElements => None,
        MinMaxResult::OneElement(day) => Some((day, day)),
        MinMaxResult::MinMax(first, last) => Some((first, last)),
    }
}
