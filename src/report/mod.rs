//! Report assembly
//!
//! The output contract of the engine: a closed enumeration of data items,
//! each produced exactly once per run, mapped to one of a closed set of
//! value shapes. Identifiers and shapes are stable across runs; downstream
//! reporting depends on them.

pub mod export;

use crate::algorithm::cumulative::{CumulativeStats, cumulative_stats};
use crate::algorithm::current::{Crosstab, CurrentStats, current_stats};
use crate::algorithm::flagging::{FlagSummary, flag_cases};
use crate::algorithm::lengthofstay::{LengthOfStayStats, length_of_stay_stats};
use crate::algorithm::timeline::{TimelineStats, timeline_stats};
use crate::algorithm::treatment::{TreatmentLevel, classify_bundle};
use crate::config::DashboardConfig;
use crate::error::{DashboardError, Result};
use crate::models::bundle::RecordBundle;
use crate::models::types::Gender;
use chrono::NaiveDate;
use serde::Serialize;
use serde::ser::SerializeMap;

/// The fixed enumeration of report data items.
///
/// Every variant is produced exactly once per report generation; the
/// string keys mirror the dashboard item names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DataItem {
    /// Flagged case ids per flag class
    CaseNrs,
    /// Open encounters per current treatment level
    CurrentTreatmentLevel,
    /// Open encounters per maximal treatment level
    CurrentMaxTreatmentLevel,
    /// Ages of open encounters with ward maximum
    CurrentAgeMaxTreatmentLevelNormalWard,
    /// Ages of open encounters with plain-ICU maximum
    CurrentAgeMaxTreatmentLevelIcu,
    /// Ages of open encounters with ventilation maximum
    CurrentAgeMaxTreatmentLevelIcuWithVentilation,
    /// Ages of open encounters with ECMO maximum
    CurrentAgeMaxTreatmentLevelIcuWithEcmo,
    /// Level-by-gender crosstab of the currently treated patients
    CurrentTreatmentLevelCrosstab,
    /// Flagged case counts per flag class
    CumulativeResults,
    /// Positive patients per gender
    CumulativeGender,
    /// Surviving positive patients per gender
    CumulativeGenderAlive,
    /// Deceased positive patients per gender
    CumulativeGenderDead,
    /// Inpatient-treated positive patients per gender
    CumulativeInpatientGender,
    /// Outpatient-treated positive patients per gender
    CumulativeOutpatientGender,
    /// Age distribution of all positive patients
    CumulativeAge,
    /// Age distribution of surviving positive patients
    CumulativeAgeAlive,
    /// Age distribution of deceased positive patients
    CumulativeAgeDead,
    /// Age distribution of inpatient-treated positive patients
    CumulativeInpatientAge,
    /// Age distribution of outpatient-treated positive patients
    CumulativeOutpatientAge,
    /// Positive patients per maximal treatment level
    CumulativeMaxTreatmentLevel,
    /// Age distribution at outpatient maximum
    CumulativeAgeMaxTreatmentLevelOutpatient,
    /// Age distribution at ward maximum
    CumulativeAgeMaxTreatmentLevelNormalWard,
    /// Age distribution at plain-ICU maximum
    CumulativeAgeMaxTreatmentLevelIcu,
    /// Age distribution at ventilation maximum
    CumulativeAgeMaxTreatmentLevelIcuWithVentilation,
    /// Age distribution at ECMO maximum
    CumulativeAgeMaxTreatmentLevelIcuWithEcmo,
    /// Positive patients per residence zip code
    CumulativeZipCode,
    /// Variant assessment counts per variant
    CumulativeVariantTestResults,
    /// Hospital stay hours of closed encounters
    CumulativeLengthOfStayHospital,
    /// Hospital stay hours, survivors
    CumulativeLengthOfStayHospitalAlive,
    /// Hospital stay hours, deceased
    CumulativeLengthOfStayHospitalDead,
    /// ICU hours of closed encounters
    CumulativeLengthOfStayIcu,
    /// ICU hours, survivors
    CumulativeLengthOfStayIcuAlive,
    /// ICU hours, deceased
    CumulativeLengthOfStayIcuDead,
    /// Performed tests per day
    TimelineTests,
    /// Positive tests per day
    TimelineTestPositive,
    /// Treatment-level transitions per day and level
    TimelineMaxTreatmentLevel,
    /// Deaths per day
    TimelineDeaths,
    /// Variant results per day and variant
    TimelineVariantTestResults,
}

impl DataItem {
    /// All items in fixed report order
    pub const ALL: [Self; 38] = [
        Self::CaseNrs,
        Self::CurrentTreatmentLevel,
        Self::CurrentMaxTreatmentLevel,
        Self::CurrentAgeMaxTreatmentLevelNormalWard,
        Self::CurrentAgeMaxTreatmentLevelIcu,
        Self::CurrentAgeMaxTreatmentLevelIcuWithVentilation,
        Self::CurrentAgeMaxTreatmentLevelIcuWithEcmo,
        Self::CurrentTreatmentLevelCrosstab,
        Self::CumulativeResults,
        Self::CumulativeGender,
        Self::CumulativeGenderAlive,
        Self::CumulativeGenderDead,
        Self::CumulativeInpatientGender,
        Self::CumulativeOutpatientGender,
        Self::CumulativeAge,
        Self::CumulativeAgeAlive,
        Self::CumulativeAgeDead,
        Self::CumulativeInpatientAge,
        Self::CumulativeOutpatientAge,
        Self::CumulativeMaxTreatmentLevel,
        Self::CumulativeAgeMaxTreatmentLevelOutpatient,
        Self::CumulativeAgeMaxTreatmentLevelNormalWard,
        Self::CumulativeAgeMaxTreatmentLevelIcu,
        Self::CumulativeAgeMaxTreatmentLevelIcuWithVentilation,
        Self::CumulativeAgeMaxTreatmentLevelIcuWithEcmo,
        Self::CumulativeZipCode,
        Self::CumulativeVariantTestResults,
        Self::CumulativeLengthOfStayHospital,
        Self::CumulativeLengthOfStayHospitalAlive,
        Self::CumulativeLengthOfStayHospitalDead,
        Self::CumulativeLengthOfStayIcu,
        Self::CumulativeLengthOfStayIcuAlive,
        Self::CumulativeLengthOfStayIcuDead,
        Self::TimelineTests,
        Self::TimelineTestPositive,
        Self::TimelineMaxTreatmentLevel,
        Self::TimelineDeaths,
        Self::TimelineVariantTestResults,
    ];

    /// Stable string identifier of this item
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::CaseNrs => "casenrs",
            Self::CurrentTreatmentLevel => "current.treatmentlevel",
            Self::CurrentMaxTreatmentLevel => "current.maxtreatmentlevel",
            Self::CurrentAgeMaxTreatmentLevelNormalWard => {
                "current.age.maxtreatmentlevel.normal_ward"
            }
            Self::CurrentAgeMaxTreatmentLevelIcu => "current.age.maxtreatmentlevel.icu",
            Self::CurrentAgeMaxTreatmentLevelIcuWithVentilation => {
                "current.age.maxtreatmentlevel.icu_with_ventilation"
            }
            Self::CurrentAgeMaxTreatmentLevelIcuWithEcmo => {
                "current.age.maxtreatmentlevel.icu_with_ecmo"
            }
            Self::CurrentTreatmentLevelCrosstab => "current.treatmentlevel.crosstab",
            Self::CumulativeResults => "cumulative.results",
            Self::CumulativeGender => "cumulative.gender",
            Self::CumulativeGenderAlive => "cumulative.gender.alive",
            Self::CumulativeGenderDead => "cumulative.gender.dead",
            Self::CumulativeInpatientGender => "cumulative.inpatient.gender",
            Self::CumulativeOutpatientGender => "cumulative.outpatient.gender",
            Self::CumulativeAge => "cumulative.age",
            Self::CumulativeAgeAlive => "cumulative.age.alive",
            Self::CumulativeAgeDead => "cumulative.age.dead",
            Self::CumulativeInpatientAge => "cumulative.inpatient.age",
            Self::CumulativeOutpatientAge => "cumulative.outpatient.age",
            Self::CumulativeMaxTreatmentLevel => "cumulative.maxtreatmentlevel",
            Self::CumulativeAgeMaxTreatmentLevelOutpatient => {
                "cumulative.age.maxtreatmentlevel.outpatient"
            }
            Self::CumulativeAgeMaxTreatmentLevelNormalWard => {
                "cumulative.age.maxtreatmentlevel.normal_ward"
            }
            Self::CumulativeAgeMaxTreatmentLevelIcu => "cumulative.age.maxtreatmentlevel.icu",
            Self::CumulativeAgeMaxTreatmentLevelIcuWithVentilation => {
                "cumulative.age.maxtreatmentlevel.icu_with_ventilation"
            }
            Self::CumulativeAgeMaxTreatmentLevelIcuWithEcmo => {
                "cumulative.age.maxtreatmentlevel.icu_with_ecmo"
            }
            Self::CumulativeZipCode => "cumulative.zipcode",
            Self::CumulativeVariantTestResults => "cumulative.varianttestresults",
            Self::CumulativeLengthOfStayHospital => "cumulative.lengthofstay.hospital",
            Self::CumulativeLengthOfStayHospitalAlive => "cumulative.lengthofstay.hospital.alive",
            Self::CumulativeLengthOfStayHospitalDead => "cumulative.lengthofstay.hospital.dead",
            Self::CumulativeLengthOfStayIcu => "cumulative.lengthofstay.icu",
            Self::CumulativeLengthOfStayIcuAlive => "cumulative.lengthofstay.icu.alive",
            Self::CumulativeLengthOfStayIcuDead => "cumulative.lengthofstay.icu.dead",
            Self::TimelineTests => "timeline.tests",
            Self::TimelineTestPositive => "timeline.test.positive",
            Self::TimelineMaxTreatmentLevel => "timeline.maxtreatmentlevel",
            Self::TimelineDeaths => "timeline.deaths",
            Self::TimelineVariantTestResults => "timeline.varianttestresults",
        }
    }
}

/// One labeled count cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelCount {
    /// Cell label (gender, level, flag class, zip code, ...)
    pub label: String,
    /// Number of patients/cases/observations in the cell
    pub count: u64,
}

/// One age-bucket count cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BucketCount {
    /// Bucket label, e.g. "20-24" or "90+"
    pub bucket: String,
    /// Number of patients in the bucket
    pub count: u64,
}

/// One day of a time series
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayCount {
    /// Calendar day
    pub day: NaiveDate,
    /// Number of events on that day
    pub count: u64,
}

/// An ordered case-id list with its label
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelCases {
    /// List label (flag class)
    pub label: String,
    /// Case ids in first-observation order
    pub case_ids: Vec<String>,
}

/// A labeled time series
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelSeries {
    /// Series label (variant or treatment level)
    pub label: String,
    /// Zero-filled daily counts
    pub series: Vec<DayCount>,
}

/// One row of the serialized crosstab
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrosstabRowValue {
    /// Treatment-level label of the row
    pub level: String,
    /// Case ids currently at this level
    pub case_ids: Vec<String>,
    /// Patient counts per gender
    pub genders: Vec<LabelCount>,
}

/// The current treatment-level crosstab
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrosstabValue {
    /// One row per inpatient level, ward first
    pub rows: Vec<CrosstabRowValue>,
}

/// The closed set of value shapes a data item can carry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum DataItemValue {
    /// Counts per label, in fixed label order
    LabelCounts(Vec<LabelCount>),
    /// Counts per age bucket, ascending
    AgeDistribution(Vec<BucketCount>),
    /// Ordered case-id lists per label
    CaseIdLists(Vec<LabelCases>),
    /// Observed durations in whole hours, input order
    Durations(Vec<i64>),
    /// A zero-filled daily time series
    TimeSeries(Vec<DayCount>),
    /// One zero-filled series per label
    LabeledTimeSeries(Vec<LabelSeries>),
    /// The current treatment-level crosstab
    Crosstab(CrosstabValue),
}

/// A generated report: every data item exactly once, in fixed order
#[derive(Debug, Clone)]
pub struct Report {
    items: Vec<(DataItem, DataItemValue)>,
}

impl Report {
    /// The value of a data item
    #[must_use]
    pub fn get(&self, item: DataItem) -> Option<&DataItemValue> {
        self.items
            .iter()
            .find(|(candidate, _)| *candidate == item)
            .map(|(_, value)| value)
    }

    /// All items in report order
    #[must_use]
    pub fn items(&self) -> &[(DataItem, DataItemValue)] {
        &self.items
    }

    /// Serialize the report as a JSON object keyed by item identifier
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl Serialize for Report {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.items.len()))?;
        for (item, value) in &self.items {
            map.serialize_entry(item.key(), value)?;
        }
        map.end()
    }
}

/// Generate the full report from the record bundle.
///
/// Flags the cases (the one permitted mutation), classifies every
/// encounter, then runs the four aggregators as independent parallel tasks
/// over the shared classified collection.
pub fn generate_report(bundle: &mut RecordBundle, config: &DashboardConfig) -> Result<Report> {
    config.validate()?;
    if bundle.eval_time.date() < config.qualifying_date {
        return Err(DashboardError::EvalBeforeQualifying {
            eval: bundle.eval_time,
            qualifying: config.qualifying_date,
        });
    }

    log::debug!("started report generation");
    let flags = flag_cases(bundle, config);

    // Flagging was the one permitted mutation; everything below reads a
    // shared view so the aggregators can run in parallel.
    let bundle: &RecordBundle = bundle;
    let classified = classify_bundle(bundle);

    let ((cumulative, current), (timeline, length_of_stay)) = rayon::join(
        || {
            rayon::join(
                || cumulative_stats(&classified, bundle, &flags, config),
                || current_stats(&classified, config),
            )
        },
        || {
            rayon::join(
                || timeline_stats(&classified, bundle, config),
                || length_of_stay_stats(&classified),
            )
        },
    );

    let report = assemble(
        &flags,
        &cumulative,
        &current,
        &timeline,
        &length_of_stay,
        config,
    );
    log::debug!("finished report generation: {} data items", report.items.len());
    Ok(report)
}

fn assemble(
    flags: &FlagSummary,
    cumulative: &CumulativeStats,
    current: &CurrentStats,
    timeline: &TimelineStats,
    length_of_stay: &LengthOfStayStats,
    config: &DashboardConfig,
) -> Report {
    let bucket_labels = config.age_bucket_labels();
    let age_value = |buckets: &[u64]| {
        DataItemValue::AgeDistribution(
            bucket_labels
                .iter()
                .zip(buckets)
                .map(|(label, &count)| BucketCount {
                    bucket: label.clone(),
                    count,
                })
                .collect(),
        )
    };
    let age_for_level = |pairs: &[(TreatmentLevel, Vec<u64>)], level: TreatmentLevel| {
        let buckets = pairs
            .iter()
            .find(|(candidate, _)| *candidate == level)
            .map(|(_, buckets)| buckets.as_slice())
            .unwrap_or(&[]);
        age_value(buckets)
    };

    let items = DataItem::ALL
        .iter()
        .map(|&item| {
            let value = match item {
                DataItem::CaseNrs => DataItemValue::CaseIdLists(vec![
                    LabelCases {
                        label: "positive".to_string(),
                        case_ids: flags.positive.clone(),
                    },
                    LabelCases {
                        label: "borderline".to_string(),
                        case_ids: flags.borderline.clone(),
                    },
                    LabelCases {
                        label: "negative".to_string(),
                        case_ids: flags.negative.clone(),
                    },
                ]),
                DataItem::CurrentTreatmentLevel => level_counts(&current.treatment_level),
                DataItem::CurrentMaxTreatmentLevel => level_counts(&current.max_treatment_level),
                DataItem::CurrentAgeMaxTreatmentLevelNormalWard => {
                    age_for_level(&current.age_by_max_level, TreatmentLevel::NormalWard)
                }
                DataItem::CurrentAgeMaxTreatmentLevelIcu => {
                    age_for_level(&current.age_by_max_level, TreatmentLevel::Icu)
                }
                DataItem::CurrentAgeMaxTreatmentLevelIcuWithVentilation => {
                    age_for_level(&current.age_by_max_level, TreatmentLevel::IcuWithVentilation)
                }
                DataItem::CurrentAgeMaxTreatmentLevelIcuWithEcmo => {
                    age_for_level(&current.age_by_max_level, TreatmentLevel::IcuWithEcmo)
                }
                DataItem::CurrentTreatmentLevelCrosstab => {
                    DataItemValue::Crosstab(crosstab_value(&current.crosstab))
                }
                DataItem::CumulativeResults => DataItemValue::LabelCounts(
                    cumulative
                        .results
                        .iter()
                        .map(|&(flag, count)| LabelCount {
                            label: flag.display_name().to_string(),
                            count,
                        })
                        .collect(),
                ),
                DataItem::CumulativeGender => gender_counts(&cumulative.gender),
                DataItem::CumulativeGenderAlive => gender_counts(&cumulative.gender_alive),
                DataItem::CumulativeGenderDead => gender_counts(&cumulative.gender_dead),
                DataItem::CumulativeInpatientGender => gender_counts(&cumulative.inpatient_gender),
                DataItem::CumulativeOutpatientGender => {
                    gender_counts(&cumulative.outpatient_gender)
                }
                DataItem::CumulativeAge => age_value(&cumulative.age),
                DataItem::CumulativeAgeAlive => age_value(&cumulative.age_alive),
                DataItem::CumulativeAgeDead => age_value(&cumulative.age_dead),
                DataItem::CumulativeInpatientAge => age_value(&cumulative.inpatient_age),
                DataItem::CumulativeOutpatientAge => age_value(&cumulative.outpatient_age),
                DataItem::CumulativeMaxTreatmentLevel => {
                    level_counts(&cumulative.max_treatment_level)
                }
                DataItem::CumulativeAgeMaxTreatmentLevelOutpatient => {
                    age_for_level(&cumulative.age_by_max_level, TreatmentLevel::Outpatient)
                }
                DataItem::CumulativeAgeMaxTreatmentLevelNormalWard => {
                    age_for_level(&cumulative.age_by_max_level, TreatmentLevel::NormalWard)
                }
                DataItem::CumulativeAgeMaxTreatmentLevelIcu => {
                    age_for_level(&cumulative.age_by_max_level, TreatmentLevel::Icu)
                }
                DataItem::CumulativeAgeMaxTreatmentLevelIcuWithVentilation => age_for_level(
                    &cumulative.age_by_max_level,
                    TreatmentLevel::IcuWithVentilation,
                ),
                DataItem::CumulativeAgeMaxTreatmentLevelIcuWithEcmo => {
                    age_for_level(&cumulative.age_by_max_level, TreatmentLevel::IcuWithEcmo)
                }
                DataItem::CumulativeZipCode => DataItemValue::LabelCounts(
                    cumulative
                        .zip_codes
                        .iter()
                        .map(|(zip, count)| LabelCount {
                            label: zip.clone(),
                            count: *count,
                        })
                        .collect(),
                ),
                DataItem::CumulativeVariantTestResults => DataItemValue::LabelCounts(
                    cumulative
                        .variant_results
                        .iter()
                        .map(|(label, count)| LabelCount {
                            label: label.clone(),
                            count: *count,
                        })
                        .collect(),
                ),
                DataItem::CumulativeLengthOfStayHospital => {
                    DataItemValue::Durations(length_of_stay.hospital.clone())
                }
                DataItem::CumulativeLengthOfStayHospitalAlive => {
                    DataItemValue::Durations(length_of_stay.hospital_alive.clone())
                }
                DataItem::CumulativeLengthOfStayHospitalDead => {
                    DataItemValue::Durations(length_of_stay.hospital_dead.clone())
                }
                DataItem::CumulativeLengthOfStayIcu => {
                    DataItemValue::Durations(length_of_stay.icu.clone())
                }
                DataItem::CumulativeLengthOfStayIcuAlive => {
                    DataItemValue::Durations(length_of_stay.icu_alive.clone())
                }
                DataItem::CumulativeLengthOfStayIcuDead => {
                    DataItemValue::Durations(length_of_stay.icu_dead.clone())
                }
                DataItem::TimelineTests => time_series(&timeline.tests),
                DataItem::TimelineTestPositive => time_series(&timeline.tests_positive),
                DataItem::TimelineMaxTreatmentLevel => DataItemValue::LabeledTimeSeries(
                    timeline
                        .level_transitions
                        .iter()
                        .map(|(level, series)| LabelSeries {
                            label: level.display_name().to_string(),
                            series: day_counts(series),
                        })
                        .collect(),
                ),
                DataItem::TimelineDeaths => time_series(&timeline.deaths),
                DataItem::TimelineVariantTestResults => DataItemValue::LabeledTimeSeries(
                    timeline
                        .variant_results
                        .iter()
                        .map(|(label, series)| LabelSeries {
                            label: label.clone(),
                            series: day_counts(series),
                        })
                        .collect(),
                ),
            };
            (item, value)
        })
        .collect();

    Report { items }
}

fn level_counts(pairs: &[(TreatmentLevel, u64)]) -> DataItemValue {
    DataItemValue::LabelCounts(
        pairs
            .iter()
            .map(|&(level, count)| LabelCount {
                label: level.display_name().to_string(),
                count,
            })
            .collect(),
    )
}

fn gender_counts(pairs: &[(Gender, u64)]) -> DataItemValue {
    DataItemValue::LabelCounts(
        pairs
            .iter()
            .map(|&(gender, count)| LabelCount {
                label: gender.display_name().to_string(),
                count,
            })
            .collect(),
    )
}

fn day_counts(series: &[(NaiveDate, u64)]) -> Vec<DayCount> {
    series
        .iter()
        .map(|&(day, count)| DayCount { day, count })
        .collect()
}

fn time_series(series: &[(NaiveDate, u64)]) -> DataItemValue {
    DataItemValue::TimeSeries(day_counts(series))
}

fn crosstab_value(crosstab: &Crosstab) -> CrosstabValue {
    CrosstabValue {
        rows: crosstab
            .rows
            .iter()
            .map(|row| CrosstabRowValue {
                level: row.level.display_name().to_string(),
                case_ids: row.case_ids.clone(),
                genders: row
                    .gender_counts
                    .iter()
                    .map(|&(gender, count)| LabelCount {
                        label: gender.display_name().to_string(),
                        count,
                    })
                    .collect(),
            })
            .collect(),
    }
}
