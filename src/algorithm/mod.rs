//! Aggregation algorithms
//!
//! Case flagging and treatment-level classification feed four independent
//! aggregators (cumulative, current, timeline, length-of-stay). The
//! aggregators share the immutable classified collection and never depend
//! on each other's output.

pub mod cumulative;
pub mod current;
pub mod flagging;
pub mod lengthofstay;
pub mod timeline;
pub mod treatment;

pub use cumulative::{CumulativeStats, cumulative_stats};
pub use current::{Crosstab, CrosstabRow, CurrentStats, current_stats};
pub use flagging::{FlagSummary, flag_cases};
pub use lengthofstay::{LengthOfStayStats, length_of_stay_stats};
pub use timeline::{TimelineStats, timeline_stats};
pub use treatment::{Classification, TreatmentLevel, classify, classify_bundle};
