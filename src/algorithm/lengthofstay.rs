//! Length-of-stay calculation
//!
//! Hospital and ICU duration distributions in whole hours, keyed by vital
//! status. Only closed encounters contribute; open stays are excluded
//! entirely rather than imputed with the evaluation time. Overlapping ICU
//! location records are merged into disjoint spans before summing, so a
//! patient can never contribute more than 24 hours of ICU time per
//! calendar day.

use crate::models::classified::ClassifiedEncounter;
use crate::models::encounter::Encounter;
use crate::models::types::{LocationKind, VitalStatus};
use crate::utils::interval::merge_union;
use crate::utils::{Interval, whole_hours};

/// Result structure of the length-of-stay calculator
#[derive(Debug, Clone, Default)]
pub struct LengthOfStayStats {
    /// Hospital stay hours of all closed positive inpatient encounters
    pub hospital: Vec<i64>,
    /// Hospital stay hours, survivors only
    pub hospital_alive: Vec<i64>,
    /// Hospital stay hours, deceased only
    pub hospital_dead: Vec<i64>,
    /// ICU hours of all closed positive encounters with ICU time
    pub icu: Vec<i64>,
    /// ICU hours, survivors only
    pub icu_alive: Vec<i64>,
    /// ICU hours, deceased only
    pub icu_dead: Vec<i64>,
}

/// Run the length-of-stay calculation over the classified collection.
#[must_use]
pub fn length_of_stay_stats(classified: &[ClassifiedEncounter<'_>]) -> LengthOfStayStats {
    log::debug!("started length-of-stay calculation");

    let mut stats = LengthOfStayStats::default();

    for view in classified {
        if !view.is_positive() || !view.encounter.is_inpatient() {
            continue;
        }
        let Some(period) = view.encounter.period else {
            continue;
        };
        // Still open: no length of stay yet.
        let Some(discharge) = period.end else {
            continue;
        };

        let hours = whole_hours(period.start, discharge);
        stats.hospital.push(hours);
        match view.vital_status() {
            VitalStatus::Alive => stats.hospital_alive.push(hours),
            VitalStatus::Dead => stats.hospital_dead.push(hours),
            VitalStatus::Unknown => {}
        }

        if let Some(icu_hours) = icu_hours(view.encounter, discharge) {
            stats.icu.push(icu_hours);
            match view.vital_status() {
                VitalStatus::Alive => stats.icu_alive.push(icu_hours),
                VitalStatus::Dead => stats.icu_dead.push(icu_hours),
                VitalStatus::Unknown => {}
            }
        }
    }

    log::debug!(
        "finished length-of-stay calculation: {} hospital stays, {} icu stays",
        stats.hospital.len(),
        stats.icu.len()
    );
    stats
}

/// Total ICU hours of a closed encounter, or `None` when it has no ICU
/// time. ICU location intervals are clipped to the discharge and merged
/// before summing so overlapping records count once.
fn icu_hours(encounter: &Encounter, discharge: chrono::NaiveDateTime) -> Option<i64> {
    let clipped: Vec<Interval> = encounter
        .stays_of_kind(LocationKind::Icu)
        .filter_map(|stay| {
            let end = stay.period.clipped_end(discharge);
            Interval::closed(stay.period.start, end)
        })
        .filter(|iv| iv.seconds(discharge) > 0)
        .collect();
    if clipped.is_empty() {
        return None;
    }

    let total_hours = merge_union(clipped)
        .into_iter()
        .map(|span| {
            whole_hours(
                span.start,
                span.end.expect("merged intervals are closed"),
            )
        })
        .sum();
    Some(total_hours)
}
