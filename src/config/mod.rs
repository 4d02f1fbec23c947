//! Configuration for the dashboard engine.
//!
//! All reference vocabulary (test codes, variant mappings, qualitative
//! result codes, procedure codes) and the reporting parameters are carried
//! in one value that is passed by reference into every component. Nothing
//! in the engine reads process-wide state.

use crate::error::{DashboardError, Result};
use chrono::NaiveDate;

/// Mapping from a variant-assessment answer code to its display label
#[derive(Debug, Clone)]
pub struct VariantMapping {
    /// Answer code as found on the lab observation (e.g. "LA31569-9")
    pub code: String,
    /// Label used in the report (e.g. "Alpha")
    pub label: String,
}

impl VariantMapping {
    fn new(code: &str, label: &str) -> Self {
        Self {
            code: code.to_string(),
            label: label.to_string(),
        }
    }
}

/// Configuration for report generation
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// ICD codes that confirm the disease (default: U07.1)
    pub confirmed_diagnosis_codes: Vec<String>,
    /// ICD codes coding a suspected/borderline finding (default: U07.2)
    pub borderline_diagnosis_codes: Vec<String>,
    /// Test codes accepted as disease PCR tests
    pub pcr_test_codes: Vec<String>,
    /// Test codes of variant-assessment observations
    pub variant_test_codes: Vec<String>,
    /// Recognized variant answer codes and their report labels
    pub variant_mappings: Vec<VariantMapping>,
    /// Procedure codes counting as artificial ventilation
    pub ventilation_procedure_codes: Vec<String>,
    /// Procedure codes counting as ECMO
    pub ecmo_procedure_codes: Vec<String>,
    /// Lower bounds of the age buckets, ascending; the last bucket is
    /// open-ended
    pub age_bucket_bounds: Vec<u16>,
    /// First day of the reporting period; earlier lab evidence is ignored
    pub qualifying_date: NaiveDate,
    /// Maximum gap in days for the outpatient-to-inpatient positive
    /// carry-over rule
    pub days_after_outpatient_stay: i64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            confirmed_diagnosis_codes: vec!["U07.1".to_string()],
            borderline_diagnosis_codes: vec!["U07.2".to_string()],
            pcr_test_codes: vec![
                "94306-8".to_string(),
                "96763-8".to_string(),
                "94640-0".to_string(),
            ],
            variant_test_codes: vec!["96741-4".to_string(), "96895-8".to_string()],
            variant_mappings: vec![
                VariantMapping::new("LA31569-9", "Alpha"),
                VariantMapping::new("LA31570-7", "Beta"),
                VariantMapping::new("LA31621-8", "Gamma"),
                VariantMapping::new("LA32552-4", "Delta"),
                VariantMapping::new("LA33381-7", "Omicron"),
            ],
            ventilation_procedure_codes: vec!["40617009".to_string(), "57485005".to_string()],
            ecmo_procedure_codes: vec!["182744004".to_string()],
            // under-20 collapsed into one bucket, five-year bands up to 89, 90+
            age_bucket_bounds: vec![0, 20, 25, 30, 35, 40, 45, 50, 55, 60, 65, 70, 75, 80, 85, 90],
            qualifying_date: NaiveDate::from_ymd_opt(2020, 1, 27)
                .expect("valid default qualifying date"),
            days_after_outpatient_stay: 12,
        }
    }
}

impl DashboardConfig {
    /// Check the configuration for unusable values.
    pub fn validate(&self) -> Result<()> {
        if self.age_bucket_bounds.is_empty()
            || self.age_bucket_bounds[0] != 0
            || !self.age_bucket_bounds.is_sorted()
            || self
                .age_bucket_bounds
                .windows(2)
                .any(|pair| pair[0] == pair[1])
        {
            return Err(DashboardError::InvalidAgeBuckets(
                self.age_bucket_bounds.clone(),
            ));
        }
        if self.pcr_test_codes.is_empty() {
            return Err(DashboardError::Config(
                "no PCR test codes configured".to_string(),
            ));
        }
        if self.confirmed_diagnosis_codes.is_empty() {
            return Err(DashboardError::Config(
                "no confirmed diagnosis codes configured".to_string(),
            ));
        }
        Ok(())
    }

    /// Index of the bucket the given age falls into.
    ///
    /// Bounds are lower bounds, so every age at or above the last bound
    /// lands in the final, open-ended bucket.
    #[must_use]
    pub fn age_bucket_index(&self, age: u16) -> usize {
        self.age_bucket_bounds
            .iter()
            .rposition(|&bound| age >= bound)
            .unwrap_or(0)
    }

    /// Display label of a bucket ("20-24", "90+", ...)
    #[must_use]
    pub fn age_bucket_label(&self, index: usize) -> String {
        let lower = self.age_bucket_bounds[index];
        match self.age_bucket_bounds.get(index + 1) {
            Some(next) => format!("{lower}-{}", next - 1),
            None => format!("{lower}+"),
        }
    }

    /// All bucket labels in ascending order
    #[must_use]
    pub fn age_bucket_labels(&self) -> Vec<String> {
        (0..self.age_bucket_bounds.len())
            .map(|idx| self.age_bucket_label(idx))
            .collect()
    }

    /// Whether a test code identifies a disease PCR test
    #[must_use]
    pub fn is_pcr_test(&self, test_code: &str) -> bool {
        self.pcr_test_codes.iter().any(|code| code == test_code)
    }

    /// Whether a test code identifies a variant assessment
    #[must_use]
    pub fn is_variant_test(&self, test_code: &str) -> bool {
        self.variant_test_codes.iter().any(|code| code == test_code)
    }

    /// Report label for a variant answer code, if the code is recognized
    #[must_use]
    pub fn variant_label(&self, answer_code: &str) -> Option<&str> {
        self.variant_mappings
            .iter()
            .find(|mapping| mapping.code == answer_code)
            .map(|mapping| mapping.label.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_age_maps_to_exactly_one_bucket() {
        let config = DashboardConfig::default();
        for age in 0..=130u16 {
            let idx = config.age_bucket_index(age);
            assert!(age >= config.age_bucket_bounds[idx]);
            if let Some(&next) = config.age_bucket_bounds.get(idx + 1) {
                assert!(age < next);
            }
        }
    }

    #[test]
    fn unsorted_bounds_are_rejected() {
        let config = DashboardConfig {
            age_bucket_bounds: vec![0, 30, 20],
            ..DashboardConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn bucket_labels_cover_band_and_open_end() {
        let config = DashboardConfig::default();
        assert_eq!(config.age_bucket_label(0), "0-19");
        assert_eq!(config.age_bucket_label(1), "20-24");
        let last = config.age_bucket_bounds.len() - 1;
        assert_eq!(config.age_bucket_label(last), "90+");
    }
}
