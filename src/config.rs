//! Pipeline configuration
//!
//! Every decision rule the aggregations apply - classifier keywords, the
//! purpose alias table, the subset quantile, the mode-duration column list,
//! and the snapshot filter sets - lives here as data. Defaults carry the
//! documented rules; a run can inject its own table via JSON.

use crate::types::TripRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Quantile used to cut the longest-trip subsets (keeps the top 30%)
pub const DEFAULT_SUBSET_QUANTILE: f64 = 0.7;

/// Keyword rules for the mode classifier.
///
/// Matching is case-insensitive; keywords are stored lowercase.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Exact-match descriptor for Bike Only
    pub bike_only_token: String,
    /// Substring keywords that mark a descriptor as Multimodal
    pub transit_keywords: Vec<String>,
    /// Substring keyword that marks a descriptor as Bike + Walk
    pub walk_keyword: String,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            bike_only_token: "bicycle".to_string(),
            transit_keywords: vec![
                "subway".to_string(),
                "bus".to_string(),
                "tram".to_string(),
                "rail".to_string(),
            ],
            walk_keyword: "walk".to_string(),
        }
    }
}

/// Which per-scenario duration column a subset reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationColumn {
    Bike,
    WalkTransit,
    Multimodal,
}

impl DurationColumn {
    pub fn as_str(&self) -> &'static str {
        match self {
            DurationColumn::Bike => "bike_duration_min",
            DurationColumn::WalkTransit => "walk_transit_duration_min",
            DurationColumn::Multimodal => "multimodal_duration_min",
        }
    }

    /// Read this column's value from a record
    pub fn value(&self, record: &TripRecord) -> Option<f64> {
        match self {
            DurationColumn::Bike => record.bike_duration_min,
            DurationColumn::WalkTransit => record.walk_transit_duration_min,
            DurationColumn::Multimodal => record.multimodal_duration_min,
        }
    }
}

/// One named mode whose longest trips get their own subset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModeDurationSpec {
    /// Display label (e.g. "Walk + Transit")
    pub label: String,
    /// Duration column the threshold is computed from
    pub column: DurationColumn,
}

/// Row filter applied to the snapshot view.
///
/// An empty list keeps every row; a filter on a column the input does not
/// carry is skipped rather than dropping everything.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotFilter {
    pub seasons: Vec<String>,
    pub weekday_types: Vec<String>,
}

impl Default for SnapshotFilter {
    fn default() -> Self {
        Self {
            seasons: vec!["spring_fall".to_string(), "summer".to_string()],
            weekday_types: vec![
                "Weekday".to_string(),
                "Saturday".to_string(),
                "Sunday".to_string(),
            ],
        }
    }
}

/// Complete pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub classifier: ClassifierConfig,
    /// Purpose label -> shorter display alias
    pub purpose_aliases: BTreeMap<String, String>,
    /// Quantile for the per-mode longest-trip cut
    pub subset_quantile: f64,
    /// Modes that get longest-trip subsets
    pub mode_durations: Vec<ModeDurationSpec>,
    /// Snapshot view row filter
    pub filter: SnapshotFilter,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            classifier: ClassifierConfig::default(),
            purpose_aliases: BTreeMap::from([(
                "Complementary/Supplemental".to_string(),
                "Comp/Supp".to_string(),
            )]),
            subset_quantile: DEFAULT_SUBSET_QUANTILE,
            mode_durations: vec![
                ModeDurationSpec {
                    label: "Bike Only".to_string(),
                    column: DurationColumn::Bike,
                },
                ModeDurationSpec {
                    label: "Walk + Transit".to_string(),
                    column: DurationColumn::WalkTransit,
                },
                ModeDurationSpec {
                    label: "Multimodal".to_string(),
                    column: DurationColumn::Multimodal,
                },
            ],
            filter: SnapshotFilter::default(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from JSON; missing fields fall back to defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_rules_match_documented_values() {
        let config = PipelineConfig::default();

        assert_eq!(config.classifier.bike_only_token, "bicycle");
        assert_eq!(
            config.classifier.transit_keywords,
            vec!["subway", "bus", "tram", "rail"]
        );
        assert_eq!(config.classifier.walk_keyword, "walk");
        assert_eq!(config.subset_quantile, 0.7);
        assert_eq!(
            config.purpose_aliases.get("Complementary/Supplemental"),
            Some(&"Comp/Supp".to_string())
        );
        assert_eq!(config.mode_durations.len(), 3);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = PipelineConfig::from_json(r#"{"subset_quantile": 0.9}"#).unwrap();

        assert_eq!(config.subset_quantile, 0.9);
        assert_eq!(config.classifier.bike_only_token, "bicycle");
        assert_eq!(config.filter.seasons, vec!["spring_fall", "summer"]);
    }

    #[test]
    fn test_duration_column_reads_record() {
        let record = TripRecord {
            bike_duration_min: Some(12.0),
            walk_transit_duration_min: Some(30.0),
            ..Default::default()
        };

        assert_eq!(DurationColumn::Bike.value(&record), Some(12.0));
        assert_eq!(DurationColumn::WalkTransit.value(&record), Some(30.0));
        assert_eq!(DurationColumn::Multimodal.value(&record), None);
    }

    #[test]
    fn test_config_round_trip() {
        let config = PipelineConfig::default();
        let json = config.to_json().unwrap();
        let back = PipelineConfig::from_json(&json).unwrap();

        assert_eq!(back.subset_quantile, config.subset_quantile);
        assert_eq!(back.mode_durations.len(), config.mode_durations.len());
    }
}
