//! Input record bundle
//!
//! Owns the parallel record collections handed over by the ingestion
//! collaborator and provides the id-keyed lookups the aggregation logic
//! needs. Records referencing a case id that is not present in the
//! encounter list are skipped with a warning; they never fail the run.

use crate::models::condition::DiagnosisRecord;
use crate::models::encounter::Encounter;
use crate::models::observation::LabObservation;
use crate::models::patient::Patient;
use crate::models::procedure::ProcedureRecord;
use chrono::NaiveDateTime;
use rustc_hash::{FxHashMap, FxHashSet};

/// The five input collections plus the caller-supplied evaluation time
#[derive(Debug)]
pub struct RecordBundle {
    /// All encounters in input order
    pub encounters: Vec<Encounter>,
    /// All patients
    pub patients: Vec<Patient>,
    /// All diagnosis records
    pub conditions: Vec<DiagnosisRecord>,
    /// All lab observations
    pub observations: Vec<LabObservation>,
    /// All ventilation/ECMO procedures
    pub procedures: Vec<ProcedureRecord>,
    /// "Now" for every current/open computation
    pub eval_time: NaiveDateTime,

    procedures_by_case: FxHashMap<String, Vec<usize>>,
    patients_by_id: FxHashMap<String, usize>,
}

impl RecordBundle {
    /// Assemble a bundle and build the id-keyed indexes.
    ///
    /// Procedures referencing unknown case ids are kept in the collection
    /// but excluded from the per-case index; dangling observation
    /// references are reported. Malformed references never fail the run.
    #[must_use]
    pub fn new(
        encounters: Vec<Encounter>,
        patients: Vec<Patient>,
        conditions: Vec<DiagnosisRecord>,
        observations: Vec<LabObservation>,
        procedures: Vec<ProcedureRecord>,
        eval_time: NaiveDateTime,
    ) -> Self {
        let known_cases: FxHashSet<&str> =
            encounters.iter().map(|e| e.case_id.as_str()).collect();

        let mut procedures_by_case: FxHashMap<String, Vec<usize>> = FxHashMap::default();
        for (idx, procedure) in procedures.iter().enumerate() {
            if !known_cases.contains(procedure.case_id.as_str()) {
                log::warn!(
                    "procedure for unknown case {} skipped during indexing",
                    procedure.case_id
                );
                continue;
            }
            procedures_by_case
                .entry(procedure.case_id.clone())
                .or_default()
                .push(idx);
        }

        for observation in &observations {
            if !known_cases.contains(observation.case_id.as_str()) {
                log::warn!(
                    "observation references unknown case {}",
                    observation.case_id
                );
            }
        }

        let patients_by_id = patients
            .iter()
            .enumerate()
            .map(|(idx, p)| (p.patient_id.clone(), idx))
            .collect();

        Self {
            encounters,
            patients,
            conditions,
            observations,
            procedures,
            eval_time,
            procedures_by_case,
            patients_by_id,
        }
    }

    /// All procedures recorded for a case, in input order
    pub fn procedures_for(&self, case_id: &str) -> impl Iterator<Item = &ProcedureRecord> {
        self.procedures_by_case
            .get(case_id)
            .into_iter()
            .flatten()
            .map(|&idx| &self.procedures[idx])
    }

    /// The patient a record points at, if present
    #[must_use]
    pub fn patient(&self, patient_id: &str) -> Option<&Patient> {
        self.patients_by_id
            .get(patient_id)
            .map(|&idx| &self.patients[idx])
    }

    /// Number of encounters in the bundle
    #[must_use]
    pub fn encounter_count(&self) -> usize {
        self.encounters.len()
    }
}
