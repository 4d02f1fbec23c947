//! Treatment-level classification
//!
//! This module implements the severity state machine: given an encounter,
//! its location stays and the support procedures linked to its case, it
//! determines the maximal clinical severity reached during the stay and the
//! severity at the evaluation time.
//!
//! Precedence is a fixed total order over a closed enum; resolving
//! conflicting evidence for a time slice is a max-by-rank fold, never a
//! runtime error.

use crate::models::bundle::RecordBundle;
use crate::models::classified::ClassifiedEncounter;
use crate::models::encounter::Encounter;
use crate::models::procedure::ProcedureRecord;
use crate::models::types::{CaseClass, Gender, LocationKind, ProcedureKind};
use crate::utils::{Interval, age_in_years};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use smallvec::SmallVec;
use std::fmt;

/// Clinical severity states, ordered by rank (low to high).
///
/// Death is not a level: vital status is tracked separately and never
/// rewrites the historical maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum TreatmentLevel {
    /// Outpatient contact, no admission
    Outpatient = 0,
    /// Admitted to a standard ward
    NormalWard = 1,
    /// Admitted to an intensive care unit
    Icu = 2,
    /// ICU with artificial ventilation running
    IcuWithVentilation = 3,
    /// ICU with ECMO running
    IcuWithEcmo = 4,
}

impl TreatmentLevel {
    /// All levels in ascending rank order
    pub const ALL: [Self; 5] = [
        Self::Outpatient,
        Self::NormalWard,
        Self::Icu,
        Self::IcuWithVentilation,
        Self::IcuWithEcmo,
    ];

    /// Display label used in report cells
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Outpatient => "outpatient",
            Self::NormalWard => "normal_ward",
            Self::Icu => "icu",
            Self::IcuWithVentilation => "icu_with_ventilation",
            Self::IcuWithEcmo => "icu_with_ecmo",
        }
    }

    /// Whether this level implies an ICU stay
    #[must_use]
    pub const fn is_icu(self) -> bool {
        matches!(self, Self::Icu | Self::IcuWithVentilation | Self::IcuWithEcmo)
    }
}

impl fmt::Display for TreatmentLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Result of classifying one encounter
#[derive(Debug, Clone)]
pub struct Classification {
    /// Highest severity ever reached during the stay
    pub max_level: TreatmentLevel,
    /// Severity at the evaluation time; `None` for closed encounters
    pub current_level: Option<TreatmentLevel>,
    /// Days on which the running maximum rose, with the level entered
    pub transitions: Vec<(NaiveDate, TreatmentLevel)>,
}

/// One contiguous span during which a severity state applies
#[derive(Debug, Clone, Copy)]
struct SeveritySlice {
    level: TreatmentLevel,
    period: Interval,
}

/// Classify an encounter against its location stays and procedures.
///
/// `procedures` must be the support procedures linked to this encounter's
/// case; records for other cases are the caller's filtering mistake and
/// would corrupt the result.
#[must_use]
pub fn classify(
    encounter: &Encounter,
    procedures: &[&ProcedureRecord],
    eval_time: NaiveDateTime,
) -> Classification {
    let base_level = match encounter.case_class {
        CaseClass::Inpatient => TreatmentLevel::NormalWard,
        CaseClass::Outpatient => TreatmentLevel::Outpatient,
    };

    let Some(period) = encounter.period else {
        // No period start: the encounter cannot be placed on the time axis.
        // It keeps its class-derived level and stays out of every
        // time-bounded computation.
        return Classification {
            max_level: base_level,
            current_level: None,
            transitions: Vec::new(),
        };
    };

    let slices = severity_slices(encounter, period, base_level, procedures);

    // Historical maximum: only spans that begin before the bounded end of
    // the encounter count; open interval ends never extend history.
    let bound = period.clipped_end(eval_time);
    let max_level = slices
        .iter()
        .filter(|slice| slice.period.start < bound || slice.period.start == period.start)
        .map(|slice| slice.level)
        .max()
        .unwrap_or(base_level);

    let current_level = if encounter.is_open() {
        let covering = slices
            .iter()
            .filter(|slice| slice.period.covers(eval_time))
            .map(|slice| slice.level)
            .max();
        // An open inpatient encounter whose ICU stays all ended is back on
        // a standard ward.
        Some(covering.unwrap_or(base_level))
    } else {
        None
    };

    let transitions = collect_transitions(&slices, bound);

    Classification {
        max_level,
        current_level,
        transitions,
    }
}

/// Classify every encounter in the bundle, joining in the patient
/// demographics. Views are returned in encounter input order.
#[must_use]
pub fn classify_bundle(bundle: &RecordBundle) -> Vec<ClassifiedEncounter<'_>> {
    log::debug!("started classification of {} encounters", bundle.encounter_count());

    let classified = bundle
        .encounters
        .iter()
        .map(|encounter| {
            let procedures: Vec<&ProcedureRecord> =
                bundle.procedures_for(&encounter.case_id).collect();
            let classification = classify(encounter, &procedures, bundle.eval_time);

            let patient = bundle.patient(&encounter.patient_id);
            if patient.is_none() {
                log::warn!(
                    "no patient record for {} referenced by case {}",
                    encounter.patient_id,
                    encounter.case_id
                );
            }
            let gender = patient.map_or(Gender::Unknown, |p| p.gender);
            let age = patient
                .and_then(|p| p.birth_date)
                .zip(encounter.admission())
                .and_then(|(birth, admission)| age_in_years(birth, admission.date()));

            ClassifiedEncounter {
                encounter,
                gender,
                age,
                classification,
            }
        })
        .collect();

    log::debug!("finished classification");
    classified
}

/// Build the severity spans for one encounter.
///
/// A support procedure only produces its elevated level where its run
/// overlaps an ICU location stay; ventilation recorded without a concurrent
/// ICU stay leaves the encounter at plain ICU/ward level.
fn severity_slices(
    encounter: &Encounter,
    period: Interval,
    base_level: TreatmentLevel,
    procedures: &[&ProcedureRecord],
) -> SmallVec<[SeveritySlice; 8]> {
    let mut slices: SmallVec<[SeveritySlice; 8]> = SmallVec::new();
    slices.push(SeveritySlice {
        level: base_level,
        period,
    });

    if encounter.case_class == CaseClass::Outpatient {
        // Outpatient contacts carry no ward/ICU geography.
        return slices;
    }

    for stay in encounter.stays_of_kind(LocationKind::Icu) {
        let Some(stay_period) = period.intersect(&stay.period) else {
            log::warn!(
                "icu stay at {} lies outside the period of case {}",
                stay.location_id,
                encounter.case_id
            );
            continue;
        };
        slices.push(SeveritySlice {
            level: TreatmentLevel::Icu,
            period: stay_period,
        });

        for procedure in procedures {
            let level = match procedure.kind {
                ProcedureKind::Ventilation => TreatmentLevel::IcuWithVentilation,
                ProcedureKind::Ecmo => TreatmentLevel::IcuWithEcmo,
            };
            if let Some(overlap) = stay_period.intersect(&procedure.period) {
                slices.push(SeveritySlice {
                    level,
                    period: overlap,
                });
            }
        }
    }

    slices
}

/// Days on which the running maximum severity rose, in ascending order.
fn collect_transitions(
    slices: &[SeveritySlice],
    bound: NaiveDateTime,
) -> Vec<(NaiveDate, TreatmentLevel)> {
    let mut ordered: Vec<&SeveritySlice> = slices
        .iter()
        .filter(|slice| slice.period.start <= bound)
        .collect();
    ordered.sort_by_key(|slice| (slice.period.start, slice.level));

    let mut transitions = Vec::new();
    let mut running_max: Option<TreatmentLevel> = None;
    for slice in ordered {
        if running_max.is_none_or(|max| slice.level > max) {
            running_max = Some(slice.level);
            transitions.push((slice.period.start.date(), slice.level));
        }
    }
    transitions
}
