//! Raw record ingest
//!
//! Parses loader output (NDJSON or a JSON array) into raw trip records and
//! converts them to the typed table the pipeline runs on. A row with an
//! unparseable coordinate, duration, hour, or flag is dropped and counted;
//! it never fails the run.

use crate::error::PipelineError;
use crate::schema::raw_trip::{FieldValue, RawTripRecord};
use crate::types::{GeoPoint, TripRecord, TripTable};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Ingest outcome: how many rows survived typing, and why the rest did not
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestReport {
    pub rows_read: usize,
    pub rows_kept: usize,
    pub rows_dropped: usize,
    /// Column name -> count of rows dropped because of that column
    pub drops: BTreeMap<String, usize>,
}

/// Adapter from raw trip records to the typed trip table
pub struct RawTripAdapter;

impl RawTripAdapter {
    /// Parse newline-delimited JSON (one record per line)
    pub fn parse_ndjson(input: &str) -> Result<Vec<RawTripRecord>, PipelineError> {
        let mut records = Vec::new();
        for (idx, line) in input.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let record: RawTripRecord = serde_json::from_str(trimmed).map_err(|e| {
                PipelineError::ParseError(format!("line {}: {}", idx + 1, e))
            })?;
            records.push(record);
        }
        Ok(records)
    }

    /// Parse a JSON array of records
    pub fn parse_array(input: &str) -> Result<Vec<RawTripRecord>, PipelineError> {
        let records: Vec<RawTripRecord> = serde_json::from_str(input)?;
        Ok(records)
    }

    /// Convert raw records to a typed table, dropping malformed rows
    pub fn to_table(records: &[RawTripRecord]) -> (TripTable, IngestReport) {
        let mut report = IngestReport {
            rows_read: records.len(),
            ..Default::default()
        };
        let mut rows = Vec::with_capacity(records.len());

        for record in records {
            match Self::type_record(record) {
                Ok(row) => rows.push(row),
                Err(column) => {
                    debug!("dropping row (trip_id={:?}): malformed {column}", record.trip_id);
                    *report.drops.entry(column).or_insert(0) += 1;
                }
            }
        }

        report.rows_kept = rows.len();
        report.rows_dropped = report.rows_read - report.rows_kept;
        info!(
            "ingested {} rows, dropped {}",
            report.rows_kept, report.rows_dropped
        );

        (TripTable::new(rows), report)
    }

    /// Type one record; Err carries the offending column name
    fn type_record(record: &RawTripRecord) -> Result<TripRecord, String> {
        if record.validate().is_err() {
            return Err("schema_version".to_string());
        }

        let lat = coerce_f64(&record.origin_lat, "origin_lat")?;
        let lon = coerce_f64(&record.origin_lon, "origin_lon")?;
        // Both coordinates or nothing; a lone value cannot place an origin
        let origin = match (lat, lon) {
            (Some(lat), Some(lon)) => Some(GeoPoint { lat, lon }),
            _ => None,
        };

        let start_hour = match coerce_f64(&record.start_hour, "start_hour")? {
            Some(h) if h.fract() == 0.0 && (0.0..=23.0).contains(&h) => Some(h as u8),
            Some(_) => return Err("start_hour".to_string()),
            None => None,
        };

        let near_transit = match &record.near_transit {
            None => None,
            Some(v) if v.is_null() => None,
            Some(v) => match v.as_bool() {
                Some(b) => Some(b),
                None => return Err("near_transit".to_string()),
            },
        };

        Ok(TripRecord {
            origin,
            modes_used: clean_text(&record.modes_used),
            bike_duration_min: coerce_f64(&record.bike_duration_min, "bike_duration_min")?,
            walk_transit_duration_min: coerce_f64(
                &record.walk_transit_duration_min,
                "walk_transit_duration_min",
            )?,
            multimodal_duration_min: coerce_f64(
                &record.multimodal_duration_min,
                "multimodal_duration_min",
            )?,
            trip_duration_min: coerce_f64(&record.trip_duration_min, "trip_duration_min")?,
            start_hour,
            weekday: clean_text(&record.weekday),
            month: clean_text(&record.month),
            season: clean_text(&record.season),
            weekday_type: clean_text(&record.weekday_type),
            trip_purpose: clean_text(&record.trip_purpose),
            near_transit,
            start_station: clean_text(&record.start_station),
            mode_category: None,
        })
    }
}

/// Absent and null both mean "no value"; present-but-unparseable is malformed
fn coerce_f64(field: &Option<FieldValue>, column: &str) -> Result<Option<f64>, String> {
    match field {
        None => Ok(None),
        Some(v) if v.is_null() => Ok(None),
        Some(v) => v.as_f64().map(Some).ok_or_else(|| column.to_string()),
    }
}

fn clean_text(field: &Option<String>) -> Option<String> {
    field
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn raw(json: &str) -> RawTripRecord {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_parse_ndjson() {
        let input = "\n{\"modes_used\": \"Bicycle\"}\n  \n{\"start_hour\": 8}\n";
        let records = RawTripAdapter::parse_ndjson(input).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].modes_used.as_deref(), Some("Bicycle"));
    }

    #[test]
    fn test_parse_ndjson_reports_line_number() {
        let input = "{\"modes_used\": \"Bicycle\"}\nnot json\n";
        let err = RawTripAdapter::parse_ndjson(input).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_parse_array() {
        let records =
            RawTripAdapter::parse_array(r#"[{"weekday": "Monday"}, {"weekday": "Friday"}]"#)
                .unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_typing_keeps_well_formed_rows() {
        let records = vec![raw(r#"{
            "origin_lat": "42.36", "origin_lon": "-71.06",
            "modes_used": "Subway, Walk",
            "bike_duration_min": 18.5,
            "start_hour": "8",
            "weekday": " Tuesday ",
            "near_transit": 1
        }"#)];

        let (table, report) = RawTripAdapter::to_table(&records);
        assert_eq!(report.rows_kept, 1);
        assert_eq!(report.rows_dropped, 0);

        let row = &table.rows[0];
        assert_eq!(row.origin.unwrap().lat, 42.36);
        assert_eq!(row.start_hour, Some(8));
        assert_eq!(row.weekday.as_deref(), Some("Tuesday"));
        assert_eq!(row.near_transit, Some(true));
        assert!(row.mode_category.is_none());
    }

    #[test]
    fn test_malformed_values_drop_rows_not_the_run() {
        let records = vec![
            raw(r#"{"origin_lat": "not-a-number", "origin_lon": 1.0}"#),
            raw(r#"{"start_hour": 25}"#),
            raw(r#"{"start_hour": 7.5}"#),
            raw(r#"{"near_transit": "maybe"}"#),
            raw(r#"{"weekday": "Monday"}"#),
        ];

        let (table, report) = RawTripAdapter::to_table(&records);
        assert_eq!(report.rows_read, 5);
        assert_eq!(report.rows_kept, 1);
        assert_eq!(report.rows_dropped, 4);
        assert_eq!(report.drops.get("origin_lat"), Some(&1));
        assert_eq!(report.drops.get("start_hour"), Some(&2));
        assert_eq!(report.drops.get("near_transit"), Some(&1));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_lone_coordinate_means_no_origin() {
        let records = vec![raw(r#"{"origin_lat": 42.36}"#)];
        let (table, report) = RawTripAdapter::to_table(&records);
        assert_eq!(report.rows_kept, 1);
        assert!(table.rows[0].origin.is_none());
    }

    #[test]
    fn test_null_and_empty_text_mean_missing() {
        let records = vec![raw(
            r#"{"bike_duration_min": null, "modes_used": "  ", "trip_purpose": ""}"#,
        )];
        let (table, _) = RawTripAdapter::to_table(&records);
        let row = &table.rows[0];
        assert!(row.bike_duration_min.is_none());
        assert!(row.modes_used.is_none());
        assert!(row.trip_purpose.is_none());
    }

    #[test]
    fn test_wrong_schema_version_drops_row() {
        let records = vec![raw(r#"{"schema_version": "trip.raw_record.v9"}"#)];
        let (table, report) = RawTripAdapter::to_table(&records);
        assert!(table.is_empty());
        assert_eq!(report.drops.get("schema_version"), Some(&1));
    }
}
