//! Core types for the tripsight pipeline
//!
//! This module defines the data that flows through each stage: typed trip
//! records, the in-memory trip table, derived mode categories, and the
//! aggregate artifacts handed to the presentation layer.

use crate::error::PipelineError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Semantic travel-mode category derived from the free-text mode descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModeCategory {
    #[serde(rename = "Bike Only")]
    BikeOnly,
    #[serde(rename = "Bike + Walk")]
    BikeWalk,
    #[serde(rename = "Multimodal")]
    Multimodal,
    #[serde(rename = "Other")]
    Other,
}

impl ModeCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModeCategory::BikeOnly => "Bike Only",
            ModeCategory::BikeWalk => "Bike + Walk",
            ModeCategory::Multimodal => "Multimodal",
            ModeCategory::Other => "Other",
        }
    }
}

/// Trip origin coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

/// One observed trip, after ingest typing.
///
/// Every analysis field is optional: the loader decides which columns it can
/// supply, and each aggregation checks presence explicitly instead of
/// assuming a fixed schema.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TripRecord {
    /// Origin coordinates (both lat and lon, or nothing)
    pub origin: Option<GeoPoint>,
    /// Free-text descriptor of the modes used (e.g. "Subway, Walk")
    pub modes_used: Option<String>,
    /// Scenario duration: bike-only routing (minutes)
    pub bike_duration_min: Option<f64>,
    /// Scenario duration: walk + transit routing (minutes)
    pub walk_transit_duration_min: Option<f64>,
    /// Scenario duration: multimodal routing (minutes)
    pub multimodal_duration_min: Option<f64>,
    /// Observed trip duration (minutes)
    pub trip_duration_min: Option<f64>,
    /// Start hour of day, 0-23
    pub start_hour: Option<u8>,
    /// Weekday label (e.g. "Monday")
    pub weekday: Option<String>,
    /// Month label (e.g. "July")
    pub month: Option<String>,
    /// Season label (e.g. "summer")
    pub season: Option<String>,
    /// Weekday-type label ("Weekday", "Saturday", "Sunday")
    pub weekday_type: Option<String>,
    /// Upstream trip-purpose classification (e.g. "First Mile")
    pub trip_purpose: Option<String>,
    /// Whether the trip started within proximity of a transit stop
    pub near_transit: Option<bool>,
    /// Start station name
    pub start_station: Option<String>,
    /// Derived mode category; set by the classifier, never by the loader
    pub mode_category: Option<ModeCategory>,
}

/// Named columns the aggregations depend on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    StartHour,
    Weekday,
    Month,
    TripPurpose,
    TripDuration,
    NearTransit,
    StartStation,
}

impl Column {
    pub fn as_str(&self) -> &'static str {
        match self {
            Column::StartHour => "start_hour",
            Column::Weekday => "weekday",
            Column::Month => "month",
            Column::TripPurpose => "trip_purpose",
            Column::TripDuration => "trip_duration_min",
            Column::NearTransit => "near_transit",
            Column::StartStation => "start_station",
        }
    }
}

/// In-memory snapshot of trip records.
///
/// The table is read-only from the aggregations' point of view; derived
/// views (filtered, classified) are fresh copies.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TripTable {
    pub rows: Vec<TripRecord>,
}

impl TripTable {
    pub fn new(rows: Vec<TripRecord>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// A column is present when at least one row carries a value for it
    pub fn has_column(&self, column: Column) -> bool {
        self.rows.iter().any(|r| match column {
            Column::StartHour => r.start_hour.is_some(),
            Column::Weekday => r.weekday.is_some(),
            Column::Month => r.month.is_some(),
            Column::TripPurpose => r.trip_purpose.is_some(),
            Column::TripDuration => r.trip_duration_min.is_some(),
            Column::NearTransit => r.near_transit.is_some(),
            Column::StartStation => r.start_station.is_some(),
        })
    }
}

/// A derived artifact that may have degraded instead of computing.
///
/// Unavailability is part of the payload contract: the presentation layer
/// renders a placeholder rather than failing a page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Artifact<T> {
    Available {
        #[serde(flatten)]
        data: T,
    },
    Unavailable {
        reason: String,
    },
}

impl<T> Artifact<T> {
    pub fn from_result(result: Result<T, PipelineError>) -> Self {
        match result {
            Ok(data) => Artifact::Available { data },
            Err(e) => Artifact::Unavailable {
                reason: e.to_string(),
            },
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Artifact::Available { .. })
    }

    pub fn as_available(&self) -> Option<&T> {
        match self {
            Artifact::Available { data } => Some(data),
            Artifact::Unavailable { .. } => None,
        }
    }
}

/// Trip-purpose distribution (drives the breakdown/donut tile)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistributionArtifact {
    /// Display label -> occurrence count, after alias collapsing
    pub counts: BTreeMap<String, u64>,
    /// Sum of all counts
    pub total: u64,
}

/// Dense hour-of-day x weekday frequency grid (drives the heatmap)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeatmapArtifact {
    /// Hour axis, always 0..=23
    pub hours: Vec<u8>,
    /// Weekday axis, distinct observed labels in Monday-to-Sunday order
    pub weekdays: Vec<String>,
    /// counts[weekday_index][hour] - zero cells are explicit
    pub counts: Vec<Vec<u64>>,
    /// Sum of all cells
    pub total: u64,
}

/// Min/max duration within a subset, for proportional color encoding
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DurationBounds {
    pub min: f64,
    pub max: f64,
}

/// One trip origin retained in a longest-trip subset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubsetPoint {
    pub lat: f64,
    pub lon: f64,
    pub duration_min: f64,
}

/// Longest-trip subset for one mode-duration scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModeSubset {
    /// Display label for the mode (e.g. "Walk + Transit")
    pub label: String,
    /// Percentile threshold the subset was cut at (minutes)
    pub threshold_min: f64,
    /// Duration bounds within the subset (minutes)
    pub bounds: DurationBounds,
    /// Origins of the retained trips
    pub points: Vec<SubsetPoint>,
}

/// Per-mode subset outcome; modes with no duration data report as such
/// instead of aborting the other modes' computation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ModeSubsetResult {
    Available {
        #[serde(flatten)]
        subset: ModeSubset,
    },
    NoData {
        label: String,
    },
}

impl ModeSubsetResult {
    pub fn label(&self) -> &str {
        match self {
            ModeSubsetResult::Available { subset } => &subset.label,
            ModeSubsetResult::NoData { label } => label,
        }
    }

    pub fn as_available(&self) -> Option<&ModeSubset> {
        match self {
            ModeSubsetResult::Available { subset } => Some(subset),
            ModeSubsetResult::NoData { .. } => None,
        }
    }
}

/// Scalar KPI value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KpiValue {
    Integer(i64),
    Number(f64),
    Text(String),
}

/// Individually-reported KPI outcome
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum KpiResult {
    Available { value: KpiValue },
    Unavailable { reason: String },
}

impl KpiResult {
    pub fn from_result(result: Result<KpiValue, PipelineError>) -> Self {
        match result {
            Ok(value) => KpiResult::Available { value },
            Err(e) => KpiResult::Unavailable {
                reason: e.to_string(),
            },
        }
    }

    pub fn as_available(&self) -> Option<&KpiValue> {
        match self {
            KpiResult::Available { value } => Some(value),
            KpiResult::Unavailable { .. } => None,
        }
    }
}

/// Classified origin point for the mode-efficiency view
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifiedPoint {
    pub lat: f64,
    pub lon: f64,
    pub mode: ModeCategory,
}

/// All artifacts from one pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardArtifacts {
    /// Trip-purpose distribution over the snapshot view
    pub purpose_distribution: Artifact<DistributionArtifact>,
    /// Hour x weekday frequency grid over the snapshot view
    pub hour_weekday_grid: Artifact<HeatmapArtifact>,
    /// Per-mode longest-trip subsets over the mode view
    pub longest_trips: Vec<ModeSubsetResult>,
    /// Named KPI scalars over the snapshot view
    pub kpis: BTreeMap<String, KpiResult>,
    /// Mode category -> row count in the classified view
    pub mode_counts: BTreeMap<String, u64>,
    /// Classified origins for the mode-efficiency map
    pub mode_points: Vec<ClassifiedPoint>,
}

/// Snapshot producer metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Snapshot provenance: where the rows came from and what was dropped
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotProvenance {
    pub computed_at_utc: String,
    pub rows_ingested: usize,
    pub rows_dropped: usize,
    pub snapshot_rows: usize,
    pub mode_view_rows: usize,
    pub seasons: Vec<String>,
    pub weekday_types: Vec<String>,
}

/// Complete snapshot payload - the sole contract with the presentation layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotPayload {
    pub snapshot_version: String,
    pub producer: SnapshotProducer,
    pub provenance: SnapshotProvenance,
    pub artifacts: DashboardArtifacts,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_mode_category_labels() {
        assert_eq!(ModeCategory::BikeOnly.as_str(), "Bike Only");
        assert_eq!(ModeCategory::BikeWalk.as_str(), "Bike + Walk");
        assert_eq!(ModeCategory::Multimodal.as_str(), "Multimodal");
        assert_eq!(ModeCategory::Other.as_str(), "Other");
    }

    #[test]
    fn test_mode_category_serde_round_trip() {
        let json = serde_json::to_string(&ModeCategory::BikeWalk).unwrap();
        assert_eq!(json, "\"Bike + Walk\"");

        let back: ModeCategory = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ModeCategory::BikeWalk);
    }

    #[test]
    fn test_column_presence() {
        let mut table = TripTable::default();
        assert!(!table.has_column(Column::StartHour));

        table.rows.push(TripRecord {
            start_hour: Some(8),
            ..Default::default()
        });
        table.rows.push(TripRecord::default());

        assert!(table.has_column(Column::StartHour));
        assert!(!table.has_column(Column::Weekday));
    }

    #[test]
    fn test_artifact_serialization_marks_status() {
        let available = Artifact::Available {
            data: DistributionArtifact {
                counts: BTreeMap::from([("First Mile".to_string(), 3u64)]),
                total: 3,
            },
        };
        let json = serde_json::to_value(&available).unwrap();
        assert_eq!(json["status"], "available");
        assert_eq!(json["counts"]["First Mile"], 3);

        let unavailable: Artifact<DistributionArtifact> = Artifact::Unavailable {
            reason: "required column missing from input: trip_purpose".to_string(),
        };
        let json = serde_json::to_value(&unavailable).unwrap();
        assert_eq!(json["status"], "unavailable");
        assert!(json["reason"].as_str().unwrap().contains("trip_purpose"));
    }

    #[test]
    fn test_kpi_value_untagged_serialization() {
        assert_eq!(
            serde_json::to_string(&KpiValue::Number(12.34)).unwrap(),
            "12.34"
        );
        assert_eq!(serde_json::to_string(&KpiValue::Integer(8)).unwrap(), "8");
        assert_eq!(
            serde_json::to_string(&KpiValue::Text("July".to_string())).unwrap(),
            "\"July\""
        );
    }
}
