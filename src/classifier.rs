//! Mode classification
//!
//! Maps a free-text mode descriptor to exactly one `ModeCategory` and builds
//! the classified mode view the efficiency and longest-trip artifacts read.
//! Classification is a pure function over the descriptor string; the keyword
//! table comes from configuration.

use crate::config::ClassifierConfig;
use crate::types::{ModeCategory, TripTable};
use log::debug;

/// Classifier for mode descriptors
#[derive(Debug, Clone, Default)]
pub struct ModeClassifier {
    config: ClassifierConfig,
}

impl ModeClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    /// Classify a descriptor. Case-insensitive, first match wins:
    /// exact bike-only token, then transit keywords, then the walk keyword,
    /// then Other.
    pub fn classify(&self, descriptor: &str) -> ModeCategory {
        let upper = descriptor.trim().to_uppercase();

        if upper == self.config.bike_only_token.to_uppercase() {
            return ModeCategory::BikeOnly;
        }
        if self
            .config
            .transit_keywords
            .iter()
            .any(|kw| upper.contains(&kw.to_uppercase()))
        {
            return ModeCategory::Multimodal;
        }
        if upper.contains(&self.config.walk_keyword.to_uppercase()) {
            return ModeCategory::BikeWalk;
        }
        ModeCategory::Other
    }

    /// Build the classified mode view.
    ///
    /// Rows missing origin coordinates or a descriptor are dropped before
    /// classification (they cannot be mapped), and rows that classify as
    /// Other are excluded from all downstream mode aggregation. The input
    /// table is untouched.
    pub fn mode_view(&self, table: &TripTable) -> TripTable {
        let rows: Vec<_> = table
            .rows
            .iter()
            .filter(|r| r.origin.is_some())
            .filter_map(|r| {
                let descriptor = r.modes_used.as_deref()?;
                let category = self.classify(descriptor);
                if category == ModeCategory::Other {
                    return None;
                }
                let mut row = r.clone();
                row.mode_category = Some(category);
                Some(row)
            })
            .collect();

        debug!(
            "mode view: {} of {} rows classified",
            rows.len(),
            table.len()
        );
        TripTable::new(rows)
    }
}
