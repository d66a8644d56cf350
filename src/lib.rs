//! tripsight - classification and aggregation engine for bikeshare and
//! multimodal trip records
//!
//! Tripsight turns raw per-trip records into the aggregate artifacts a
//! dashboard renders, through a deterministic pipeline: ingest typing →
//! mode classification → independent aggregations → snapshot encoding.
//!
//! ## Modules
//!
//! - **schema**: trip.raw_record.v1 ingest schema and adapter
//! - **classifier**: free-text mode descriptor → mode category
//! - **aggregate**: purpose distribution, hour×weekday grid, per-mode
//!   longest-trip subsets, scalar KPIs
//! - **pipeline** / **encoder**: orchestration and the trip.snapshot.v1
//!   payload handed to the presentation layer

pub mod aggregate;
pub mod classifier;
pub mod config;
pub mod encoder;
pub mod error;
pub mod pipeline;
pub mod schema;
pub mod types;

pub use classifier::ModeClassifier;
pub use config::PipelineConfig;
pub use encoder::{SnapshotEncoder, SNAPSHOT_VERSION};
pub use error::PipelineError;
pub use pipeline::{raw_trips_to_snapshot_json, PipelineOutput, SnapshotProcessor};

// Schema exports
pub use schema::{IngestReport, RawTripAdapter, RawTripRecord, SCHEMA_VERSION};

// Core data types
pub use types::{ModeCategory, SnapshotPayload, TripRecord, TripTable};

/// Tripsight version embedded in all snapshot payloads
pub const TRIPSIGHT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for snapshot payloads
pub const PRODUCER_NAME: &str = "tripsight";
