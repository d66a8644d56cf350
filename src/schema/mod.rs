//! trip.raw_record.v1 schema and ingest adapter

pub mod adapter;
pub mod raw_trip;

pub use adapter::{IngestReport, RawTripAdapter};
pub use raw_trip::{FieldValue, RawTripRecord, ValidationError, SCHEMA_VERSION};
