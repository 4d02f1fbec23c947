//! Procedure entity model
//!
//! Ventilation and ECMO runs, referenced by case id. The ingesting
//! collaborator resolves the raw procedure codings against the configured
//! code lists before handing the records to the engine.

use crate::models::types::ProcedureKind;
use crate::utils::Interval;

/// A timestamped clinical support intervention
#[derive(Debug, Clone)]
pub struct ProcedureRecord {
    /// Id of the case this procedure belongs to
    pub case_id: String,
    /// Ventilation or ECMO
    pub kind: ProcedureKind,
    /// Period the procedure ran; an open end means it is still active
    pub period: Interval,
}

impl ProcedureRecord {
    /// Create a new procedure record
    #[must_use]
    pub const fn new(case_id: String, kind: ProcedureKind, period: Interval) -> Self {
        Self {
            case_id,
            kind,
            period,
        }
    }
}
