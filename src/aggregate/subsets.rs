//! Per-mode longest-trip subsets
//!
//! For each configured mode-duration column, independently: drop rows with
//! no duration for that column, cut at the configured quantile of that
//! mode's own distribution, and keep the rows at or above the threshold.
//! Thresholds are always mode-relative; distributions are never pooled.

use crate::config::ModeDurationSpec;
use crate::types::{
    DurationBounds, ModeSubset, ModeSubsetResult, SubsetPoint, TripTable,
};
use log::debug;

/// Quantile with linear interpolation between order statistics
/// (position q * (n - 1)), matching the source data's tooling.
/// Input need not be sorted. Returns None for an empty slice.
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    if lower == upper {
        return Some(sorted[lower]);
    }
    let frac = pos - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * frac)
}

/// Compute the longest-trip subset for every configured mode.
///
/// Modes are independent: a mode with no duration data reports NoData and
/// never disturbs the other modes' computation.
pub fn longest_trip_subsets(
    mode_view: &TripTable,
    specs: &[ModeDurationSpec],
    q: f64,
) -> Vec<ModeSubsetResult> {
    specs
        .iter()
        .map(|spec| subset_for_mode(mode_view, spec, q))
        .collect()
}

fn subset_for_mode(table: &TripTable, spec: &ModeDurationSpec, q: f64) -> ModeSubsetResult {
    let with_duration: Vec<_> = table
        .rows
        .iter()
        .filter_map(|row| {
            let duration = spec.column.value(row)?;
            Some((row, duration))
        })
        .collect();

    let durations: Vec<f64> = with_duration.iter().map(|(_, d)| *d).collect();
    let threshold = match quantile(&durations, q) {
        Some(t) => t,
        None => {
            debug!("no {} data for mode {}", spec.column.as_str(), spec.label);
            return ModeSubsetResult::NoData {
                label: spec.label.clone(),
            };
        }
    };

    let mut points = Vec::new();
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for (row, duration) in with_duration {
        if duration < threshold {
            continue;
        }
        min = min.min(duration);
        max = max.max(duration);
        if let Some(origin) = row.origin {
            points.push(SubsetPoint {
                lat: origin.lat,
                lon: origin.lon,
                duration_min: duration,
            });
        }
    }

    ModeSubsetResult::Available {
        subset: ModeSubset {
            label: spec.label.clone(),
            threshold_min: threshold,
            bounds: DurationBounds { min, max },
            points,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DurationColumn, PipelineConfig};
    use crate::types::{GeoPoint, TripRecord};
    use pretty_assertions::assert_eq;

    fn spec(label: &str, column: DurationColumn) -> ModeDurationSpec {
        ModeDurationSpec {
            label: label.to_string(),
            column,
        }
    }

    fn bike_row(duration: Option<f64>) -> TripRecord {
        TripRecord {
            origin: Some(GeoPoint {
                lat: 42.36,
                lon: -71.06,
            }),
            bike_duration_min: duration,
            ..Default::default()
        }
    }

    #[test]
    fn test_quantile_linear_interpolation() {
        let values: Vec<f64> = (1..=10).map(|i| (i * 10) as f64).collect();
        // pandas-style: pos = 0.7 * 9 = 6.3 -> 70 + 0.3 * 10 = 73
        assert!((quantile(&values, 0.7).unwrap() - 73.0).abs() < 1e-9);
        assert_eq!(quantile(&values, 0.0), Some(10.0));
        assert_eq!(quantile(&values, 1.0), Some(100.0));
        assert_eq!(quantile(&[5.0], 0.7), Some(5.0));
        assert_eq!(quantile(&[], 0.7), None);
    }

    #[test]
    fn test_quantile_ignores_input_order() {
        let values = vec![30.0, 10.0, 20.0];
        assert_eq!(quantile(&values, 0.5), Some(20.0));
    }

    #[test]
    fn test_top_30_percent_of_ten_values() {
        let rows: Vec<_> = (1..=10).map(|i| bike_row(Some((i * 10) as f64))).collect();
        let table = TripTable::new(rows);

        let results =
            longest_trip_subsets(&table, &[spec("Bike Only", DurationColumn::Bike)], 0.7);
        assert_eq!(results.len(), 1);

        let subset = results[0].as_available().unwrap();
        assert!((subset.threshold_min - 73.0).abs() < 1e-9);

        let mut kept: Vec<f64> = subset.points.iter().map(|p| p.duration_min).collect();
        kept.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(kept, vec![80.0, 90.0, 100.0]);
        assert_eq!(subset.bounds.min, 80.0);
        assert_eq!(subset.bounds.max, 100.0);
    }

    #[test]
    fn test_every_kept_row_meets_its_modes_threshold() {
        let rows: Vec<_> = [12.0, 45.0, 7.0, 33.0, 28.0, 51.0, 19.0]
            .iter()
            .map(|d| bike_row(Some(*d)))
            .collect();
        let table = TripTable::new(rows);

        let results =
            longest_trip_subsets(&table, &[spec("Bike Only", DurationColumn::Bike)], 0.7);
        let subset = results[0].as_available().unwrap();
        assert!(subset
            .points
            .iter()
            .all(|p| p.duration_min >= subset.threshold_min));
    }

    #[test]
    fn test_thresholds_are_mode_relative() {
        let mut rows = Vec::new();
        for i in 1..=10 {
            let mut row = bike_row(Some((i * 10) as f64));
            // walk+transit distribution sits an order of magnitude lower
            row.walk_transit_duration_min = Some(i as f64);
            rows.push(row);
        }
        let table = TripTable::new(rows);

        let results = longest_trip_subsets(
            &table,
            &[
                spec("Bike Only", DurationColumn::Bike),
                spec("Walk + Transit", DurationColumn::WalkTransit),
            ],
            0.7,
        );

        let bike = results[0].as_available().unwrap();
        let walk = results[1].as_available().unwrap();
        assert!((bike.threshold_min - 73.0).abs() < 1e-9);
        assert!((walk.threshold_min - 7.3).abs() < 1e-9);
        assert_eq!(bike.points.len(), walk.points.len());
    }

    #[test]
    fn test_empty_mode_reports_no_data_without_disturbing_others() {
        let table = TripTable::new(vec![bike_row(Some(20.0)), bike_row(Some(40.0))]);
        let config = PipelineConfig::default();

        let results = longest_trip_subsets(&table, &config.mode_durations, 0.7);
        assert_eq!(results.len(), 3);
        assert!(results[0].as_available().is_some());
        assert!(matches!(
            &results[1],
            ModeSubsetResult::NoData { label } if label == "Walk + Transit"
        ));
        assert!(matches!(&results[2], ModeSubsetResult::NoData { .. }));
    }

    #[test]
    fn test_rows_without_duration_are_dropped_before_the_cut() {
        let table = TripTable::new(vec![
            bike_row(Some(10.0)),
            bike_row(None),
            bike_row(Some(20.0)),
            bike_row(Some(30.0)),
        ]);

        let results =
            longest_trip_subsets(&table, &[spec("Bike Only", DurationColumn::Bike)], 0.5);
        let subset = results[0].as_available().unwrap();
        // median of {10, 20, 30} is 20; the None row never enters
        assert_eq!(subset.threshold_min, 20.0);
        assert_eq!(subset.points.len(), 2);
    }
}
