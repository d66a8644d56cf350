//! trip.raw_record.v1 schema definition
//!
//! A loader-agnostic schema for per-trip records. Numeric fields accept
//! either JSON numbers or numeric strings, because upstream loaders that
//! read CSV exports routinely hand every cell over as text. Typing (and
//! dropping rows whose values do not parse) happens in the adapter.

use serde::{Deserialize, Serialize};

/// Current schema version
pub const SCHEMA_VERSION: &str = "trip.raw_record.v1";

/// A raw field value before typing.
///
/// Null is distinct from an absent field only at the wire level; both mean
/// "no value" to the adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Integer(i64),
    Number(f64),
    Boolean(bool),
    Text(String),
    Null,
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Coerce to f64; numeric strings parse, anything else is malformed
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Integer(i) => Some(*i as f64),
            FieldValue::Text(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Coerce to bool; accepts booleans, 0/1, and true/false text
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Boolean(b) => Some(*b),
            FieldValue::Integer(0) => Some(false),
            FieldValue::Integer(1) => Some(true),
            FieldValue::Number(n) if *n == 0.0 => Some(false),
            FieldValue::Number(n) if *n == 1.0 => Some(true),
            FieldValue::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => Some(true),
                "false" | "0" | "no" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }
}

/// The main trip.raw_record.v1 schema.
///
/// Every analysis field is optional so that loaders can supply whichever
/// columns their source carries; the aggregations degrade per artifact when
/// a column is missing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawTripRecord {
    /// Schema version identifier; validated when present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<String>,
    /// Optional trip identifier, carried through for debugging
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trip_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin_lat: Option<FieldValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin_lon: Option<FieldValue>,
    /// Free-text descriptor of the modes used
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modes_used: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bike_duration_min: Option<FieldValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub walk_transit_duration_min: Option<FieldValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multimodal_duration_min: Option<FieldValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trip_duration_min: Option<FieldValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_hour: Option<FieldValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weekday: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub season: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weekday_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trip_purpose: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub near_transit: Option<FieldValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_station: Option<String>,
}

impl RawTripRecord {
    /// Validate the record schema
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(version) = &self.schema_version {
            if version != SCHEMA_VERSION {
                return Err(ValidationError::InvalidSchemaVersion {
                    expected: SCHEMA_VERSION.to_string(),
                    actual: version.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Validation errors for raw trip records
#[derive(Debug, Clone, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid schema version: expected {expected}, got {actual}")]
    InvalidSchemaVersion { expected: String, actual: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_value_accepts_numeric_strings() {
        assert_eq!(FieldValue::Text("42.36".to_string()).as_f64(), Some(42.36));
        assert_eq!(FieldValue::Number(8.0).as_f64(), Some(8.0));
        assert_eq!(FieldValue::Integer(8).as_f64(), Some(8.0));
        assert_eq!(FieldValue::Text("n/a".to_string()).as_f64(), None);
        assert_eq!(FieldValue::Boolean(true).as_f64(), None);
    }

    #[test]
    fn test_field_value_bool_coercion() {
        assert_eq!(FieldValue::Boolean(true).as_bool(), Some(true));
        assert_eq!(FieldValue::Integer(0).as_bool(), Some(false));
        assert_eq!(FieldValue::Text("True".to_string()).as_bool(), Some(true));
        assert_eq!(FieldValue::Text("maybe".to_string()).as_bool(), None);
    }

    #[test]
    fn test_empty_text_counts_as_null() {
        assert!(FieldValue::Null.is_null());
        assert!(FieldValue::Text("  ".to_string()).is_null());
        assert!(!FieldValue::Integer(0).is_null());
    }

    #[test]
    fn test_deserialize_mixed_typing() {
        let json = r#"{
            "schema_version": "trip.raw_record.v1",
            "origin_lat": "42.3601",
            "origin_lon": -71.0589,
            "modes_used": "Subway, Walk",
            "start_hour": 8,
            "weekday": "Tuesday",
            "near_transit": "true"
        }"#;

        let record: RawTripRecord = serde_json::from_str(json).unwrap();
        assert!(record.validate().is_ok());
        assert_eq!(record.origin_lat.unwrap().as_f64(), Some(42.3601));
        assert_eq!(record.origin_lon.unwrap().as_f64(), Some(-71.0589));
        assert_eq!(record.start_hour.unwrap().as_f64(), Some(8.0));
        assert_eq!(record.near_transit.unwrap().as_bool(), Some(true));
        assert!(record.trip_purpose.is_none());
    }

    #[test]
    fn test_validate_rejects_wrong_schema_version() {
        let record = RawTripRecord {
            schema_version: Some("trip.raw_record.v2".to_string()),
            ..Default::default()
        };
        assert!(record.validate().is_err());
    }
}
