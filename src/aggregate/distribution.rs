//! Trip-purpose distribution
//!
//! Counts occurrences per purpose label after collapsing configured labels
//! to shorter display aliases. Output order is irrelevant downstream; the
//! presentation layer colors by label identity, not position.

use crate::error::PipelineError;
use crate::types::{Column, DistributionArtifact, TripTable};
use std::collections::BTreeMap;

/// Apply the alias table to one label. Exact-match rename; labels without
/// an alias pass through, which makes collapsing idempotent as long as
/// alias targets are not themselves alias keys.
pub fn collapse_alias(aliases: &BTreeMap<String, String>, label: &str) -> String {
    aliases
        .get(label)
        .cloned()
        .unwrap_or_else(|| label.to_string())
}

/// Count trips per purpose label over the snapshot view
pub fn purpose_distribution(
    table: &TripTable,
    aliases: &BTreeMap<String, String>,
) -> Result<DistributionArtifact, PipelineError> {
    if !table.has_column(Column::TripPurpose) {
        return Err(PipelineError::MissingColumn(
            Column::TripPurpose.as_str().to_string(),
        ));
    }

    let mut counts: BTreeMap<String, u64> = BTreeMap::new();
    for row in &table.rows {
        if let Some(purpose) = &row.trip_purpose {
            *counts.entry(collapse_alias(aliases, purpose)).or_insert(0) += 1;
        }
    }

    let total = counts.values().sum();
    Ok(DistributionArtifact { counts, total })
}
