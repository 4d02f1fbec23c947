//! Text export of the current treatment-level crosstab
//!
//! A pure formatting view over the crosstab data item: one column per
//! inpatient treatment level, one case id per cell, semicolon separated.
//! No logic of its own.

use crate::report::CrosstabValue;

const DELIMITER: char = ';';

/// Render the crosstab as semicolon-separated text.
///
/// The header row carries the level labels; below it, the case-id lists
/// are laid out column-wise until the longest list is exhausted.
#[must_use]
pub fn crosstab_to_csv(crosstab: &CrosstabValue) -> String {
    let mut out = String::new();

    for (idx, row) in crosstab.rows.iter().enumerate() {
        if idx > 0 {
            out.push(DELIMITER);
        }
        out.push_str(&row.level);
    }
    out.push('\n');

    let depth = crosstab
        .rows
        .iter()
        .map(|row| row.case_ids.len())
        .max()
        .unwrap_or(0);
    for line in 0..depth {
        for (idx, row) in crosstab.rows.iter().enumerate() {
            if idx > 0 {
                out.push(DELIMITER);
            }
            if let Some(case_id) = row.case_ids.get(line) {
                out.push_str(case_id);
            }
        }
        out.push('\n');
    }

    out
}
