//! Scalar KPI derivation
//!
//! A fixed set of named summary scalars over the snapshot view. Each KPI is
//! computed on its own: a missing source column marks that one KPI
//! unavailable and leaves the rest alone. Fractional values are rounded to
//! two decimals for display; integer and text values pass through.

use crate::error::PipelineError;
use crate::types::{Column, KpiResult, KpiValue, TripTable};
use std::collections::{BTreeMap, BTreeSet};

pub const KPI_MEDIAN_DURATION: &str = "Median Trip Duration (min)";
pub const KPI_TOP_START_HOUR: &str = "Most Popular Start Hour";
pub const KPI_TOP_MONTH: &str = "Most Popular Month";
pub const KPI_NEAR_TRANSIT_PCT: &str = "Trips Near Transit (%)";
pub const KPI_UNIQUE_STATIONS: &str = "Unique Stations";

/// Compute every KPI, each reported individually
pub fn kpi_summary(table: &TripTable) -> BTreeMap<String, KpiResult> {
    BTreeMap::from([
        (
            KPI_MEDIAN_DURATION.to_string(),
            KpiResult::from_result(median_duration(table)),
        ),
        (
            KPI_TOP_START_HOUR.to_string(),
            KpiResult::from_result(top_start_hour(table)),
        ),
        (
            KPI_TOP_MONTH.to_string(),
            KpiResult::from_result(top_month(table)),
        ),
        (
            KPI_NEAR_TRANSIT_PCT.to_string(),
            KpiResult::from_result(near_transit_pct(table)),
        ),
        (
            KPI_UNIQUE_STATIONS.to_string(),
            KpiResult::from_result(unique_stations(table)),
        ),
    ])
}

fn require(table: &TripTable, column: Column) -> Result<(), PipelineError> {
    if table.has_column(column) {
        Ok(())
    } else {
        Err(PipelineError::MissingColumn(column.as_str().to_string()))
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn median_duration(table: &TripTable) -> Result<KpiValue, PipelineError> {
    require(table, Column::TripDuration)?;

    let mut values: Vec<f64> = table
        .rows
        .iter()
        .filter_map(|r| r.trip_duration_min)
        .collect();
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let n = values.len();
    let median = if n % 2 == 0 {
        (values[n / 2 - 1] + values[n / 2]) / 2.0
    } else {
        values[n / 2]
    };
    Ok(KpiValue::Number(round2(median)))
}

fn top_start_hour(table: &TripTable) -> Result<KpiValue, PipelineError> {
    require(table, Column::StartHour)?;

    // BTreeMap iteration order makes ties resolve to the smallest hour
    let mut counts: BTreeMap<u8, u64> = BTreeMap::new();
    for row in &table.rows {
        if let Some(hour) = row.start_hour {
            *counts.entry(hour).or_insert(0) += 1;
        }
    }
    let (hour, _) = counts
        .iter()
        .max_by_key(|(hour, count)| (**count, std::cmp::Reverse(**hour)))
        .ok_or_else(|| PipelineError::MissingColumn(Column::StartHour.as_str().to_string()))?;
    Ok(KpiValue::Integer(*hour as i64))
}

fn top_month(table: &TripTable) -> Result<KpiValue, PipelineError> {
    require(table, Column::Month)?;

    let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
    for row in &table.rows {
        if let Some(month) = &row.month {
            *counts.entry(month.as_str()).or_insert(0) += 1;
        }
    }
    // ties resolve to the lexicographically smallest label
    let (month, _) = counts
        .iter()
        .max_by_key(|(month, count)| (**count, std::cmp::Reverse(**month)))
        .ok_or_else(|| PipelineError::MissingColumn(Column::Month.as_str().to_string()))?;
    Ok(KpiValue::Text(month.to_string()))
}

fn near_transit_pct(table: &TripTable) -> Result<KpiValue, PipelineError> {
    require(table, Column::NearTransit)?;

    let flagged: Vec<bool> = table.rows.iter().filter_map(|r| r.near_transit).collect();
    let near = flagged.iter().filter(|b| **b).count();
    let pct = (near as f64) / (flagged.len() as f64) * 100.0;
    Ok(KpiValue::Number(round2(pct)))
}

fn unique_stations(table: &TripTable) -> Result<KpiValue, PipelineError> {
    require(table, Column::StartStation)?;

    let stations: BTreeSet<&str> = table
        .rows
        .iter()
        .filter_map(|r| r.start_station.as_deref())
        .collect();
    Ok(KpiValue::Integer(stations.len() as i64))
}
