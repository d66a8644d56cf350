//! Pipeline orchestration
//!
//! This module provides the public API for tripsight. A `SnapshotProcessor`
//! takes an injected trip table (no process-global state), builds the two
//! working views, and runs the four aggregations, each degrading in
//! isolation. `raw_trips_to_snapshot_json` is the one-shot path from loader
//! output to the encoded snapshot payload.

use crate::aggregate::{hour_weekday_grid, kpi_summary, longest_trip_subsets, purpose_distribution};
use crate::classifier::ModeClassifier;
use crate::config::{PipelineConfig, SnapshotFilter};
use crate::encoder::SnapshotEncoder;
use crate::error::PipelineError;
use crate::schema::RawTripAdapter;
use crate::types::{
    Artifact, ClassifiedPoint, DashboardArtifacts, TripTable,
};
use log::{info, warn};
use std::collections::BTreeMap;

/// Result of one pipeline run: the working views plus the artifacts
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Season/weekday-type filtered view the purpose, grid, and KPI
    /// aggregations read
    pub snapshot: TripTable,
    /// Classified mode view the subset aggregation reads
    pub mode_view: TripTable,
    pub artifacts: DashboardArtifacts,
}

/// Configured, re-runnable pipeline
#[derive(Debug, Clone, Default)]
pub struct SnapshotProcessor {
    config: PipelineConfig,
    classifier: ModeClassifier,
}

impl SnapshotProcessor {
    pub fn new(config: PipelineConfig) -> Self {
        let classifier = ModeClassifier::new(config.classifier.clone());
        Self { config, classifier }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the full pipeline over one input snapshot.
    ///
    /// The input table is read-only; both views are fresh copies. Every
    /// artifact is computed even when others degrade.
    pub fn run(&self, table: &TripTable) -> PipelineOutput {
        let snapshot = apply_filter(table, &self.config.filter);
        let mode_view = self.classifier.mode_view(table);
        info!(
            "pipeline run: {} input rows, {} in snapshot view, {} in mode view",
            table.len(),
            snapshot.len(),
            mode_view.len()
        );

        let purpose_distribution = Artifact::from_result(purpose_distribution(
            &snapshot,
            &self.config.purpose_aliases,
        ));
        if let Artifact::Unavailable { reason } = &purpose_distribution {
            warn!("purpose distribution unavailable: {reason}");
        }

        let hour_weekday_grid = Artifact::from_result(hour_weekday_grid(&snapshot));
        if let Artifact::Unavailable { reason } = &hour_weekday_grid {
            warn!("hour/weekday grid unavailable: {reason}");
        }

        let longest_trips = longest_trip_subsets(
            &mode_view,
            &self.config.mode_durations,
            self.config.subset_quantile,
        );

        let kpis = kpi_summary(&snapshot);

        let mut mode_counts: BTreeMap<String, u64> = BTreeMap::new();
        let mut mode_points = Vec::with_capacity(mode_view.len());
        for row in &mode_view.rows {
            if let (Some(category), Some(origin)) = (row.mode_category, row.origin) {
                *mode_counts.entry(category.as_str().to_string()).or_insert(0) += 1;
                mode_points.push(ClassifiedPoint {
                    lat: origin.lat,
                    lon: origin.lon,
                    mode: category,
                });
            }
        }

        PipelineOutput {
            snapshot,
            mode_view,
            artifacts: DashboardArtifacts {
                purpose_distribution,
                hour_weekday_grid,
                longest_trips,
                kpis,
                mode_counts,
                mode_points,
            },
        }
    }
}

/// Keep rows matching the configured season / weekday-type sets.
///
/// An empty set keeps everything; a filter on a column the input does not
/// carry is skipped rather than dropping every row.
fn apply_filter(table: &TripTable, filter: &SnapshotFilter) -> TripTable {
    let filter_seasons =
        !filter.seasons.is_empty() && table.rows.iter().any(|r| r.season.is_some());
    let filter_weekday_types =
        !filter.weekday_types.is_empty() && table.rows.iter().any(|r| r.weekday_type.is_some());

    let rows = table
        .rows
        .iter()
        .filter(|r| {
            if filter_seasons {
                match &r.season {
                    Some(s) if filter.seasons.contains(s) => {}
                    _ => return false,
                }
            }
            if filter_weekday_types {
                match &r.weekday_type {
                    Some(w) if filter.weekday_types.contains(w) => {}
                    _ => return false,
                }
            }
            true
        })
        .cloned()
        .collect();
    TripTable::new(rows)
}

/// Convert raw loader output (NDJSON) straight to a snapshot payload JSON.
///
/// # Example
/// ```ignore
/// let json = raw_trips_to_snapshot_json(ndjson, &PipelineConfig::default())?;
/// ```
pub fn raw_trips_to_snapshot_json(
    raw_ndjson: &str,
    config: &PipelineConfig,
) -> Result<String, PipelineError> {
    let records = RawTripAdapter::parse_ndjson(raw_ndjson)?;
    let (table, report) = RawTripAdapter::to_table(&records);

    let processor = SnapshotProcessor::new(config.clone());
    let output = processor.run(&table);

    let encoder = SnapshotEncoder::new();
    encoder.encode_to_json(&output, &report, config)
}
