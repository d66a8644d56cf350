//! Snapshot encoding
//!
//! Wraps one pipeline run's artifacts into a versioned snapshot payload
//! with producer and provenance metadata. The serialized payload is the
//! only thing the presentation layer ever sees.

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::pipeline::PipelineOutput;
use crate::schema::IngestReport;
use crate::types::{SnapshotPayload, SnapshotProducer, SnapshotProvenance};
use crate::{PRODUCER_NAME, TRIPSIGHT_VERSION};
use chrono::Utc;
use uuid::Uuid;

/// Current snapshot schema version
pub const SNAPSHOT_VERSION: &str = "trip.snapshot.v1";

/// Encoder for producing snapshot payloads
pub struct SnapshotEncoder {
    instance_id: String,
}

impl Default for SnapshotEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    /// Build the snapshot payload for one pipeline run
    pub fn encode(
        &self,
        output: &PipelineOutput,
        report: &IngestReport,
        config: &PipelineConfig,
    ) -> SnapshotPayload {
        let producer = SnapshotProducer {
            name: PRODUCER_NAME.to_string(),
            version: TRIPSIGHT_VERSION.to_string(),
            instance_id: self.instance_id.clone(),
        };

        let provenance = SnapshotProvenance {
            computed_at_utc: Utc::now().to_rfc3339(),
            rows_ingested: report.rows_read,
            rows_dropped: report.rows_dropped,
            snapshot_rows: output.snapshot.len(),
            mode_view_rows: output.mode_view.len(),
            seasons: config.filter.seasons.clone(),
            weekday_types: config.filter.weekday_types.clone(),
        };

        SnapshotPayload {
            snapshot_version: SNAPSHOT_VERSION.to_string(),
            producer,
            provenance,
            artifacts: output.artifacts.clone(),
        }
    }

    /// Encode to a pretty JSON string
    pub fn encode_to_json(
        &self,
        output: &PipelineOutput,
        report: &IngestReport,
        config: &PipelineConfig,
    ) -> Result<String, PipelineError> {
        let payload = self.encode(output, report, config);
        serde_json::to_string_pretty(&payload).map_err(PipelineError::JsonError)
    }
}
