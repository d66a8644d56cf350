//! Hour x weekday frequency grid
//!
//! Produces a dense count matrix over hour-of-day (always 0-23) and the
//! distinct observed weekday labels. Zero cells are explicit because the
//! consuming chart renders a full matrix; a sparse mapping would leave
//! holes instead of zeros.

use crate::error::PipelineError;
use crate::types::{Column, HeatmapArtifact, TripTable};
use std::collections::HashMap;

/// Canonical weekday ordering for the grid's vertical axis
pub const WEEKDAY_ORDER: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

fn canonical_index(label: &str) -> Option<usize> {
    WEEKDAY_ORDER.iter().position(|d| d.eq_ignore_ascii_case(label))
}

/// Compute the dense hour x weekday frequency grid.
///
/// Requires both axis columns; if either is absent the artifact is reported
/// unavailable rather than failing the pipeline. Rows missing either axis
/// value are excluded from the grid.
pub fn hour_weekday_grid(table: &TripTable) -> Result<HeatmapArtifact, PipelineError> {
    for column in [Column::StartHour, Column::Weekday] {
        if !table.has_column(column) {
            return Err(PipelineError::MissingColumn(column.as_str().to_string()));
        }
    }

    // Distinct observed labels, ordered Monday-to-Sunday with anything
    // unrecognized after, in first-seen order.
    let mut weekdays: Vec<String> = Vec::new();
    let mut first_seen: HashMap<String, usize> = HashMap::new();
    for row in &table.rows {
        if let Some(label) = &row.weekday {
            if !first_seen.contains_key(label) {
                first_seen.insert(label.clone(), weekdays.len());
                weekdays.push(label.clone());
            }
        }
    }
    weekdays.sort_by_key(|label| {
        (
            canonical_index(label).unwrap_or(WEEKDAY_ORDER.len()),
            first_seen[label],
        )
    });

    let index: HashMap<&str, usize> = weekdays
        .iter()
        .enumerate()
        .map(|(i, label)| (label.as_str(), i))
        .collect();

    let mut counts = vec![vec![0u64; 24]; weekdays.len()];
    let mut total = 0u64;
    for row in &table.rows {
        if let (Some(hour), Some(label)) = (row.start_hour, &row.weekday) {
            counts[index[label.as_str()]][hour as usize] += 1;
            total += 1;
        }
    }

    Ok(HeatmapArtifact {
        hours: (0..24).collect(),
        weekdays,
        counts,
        total,
    })
}
