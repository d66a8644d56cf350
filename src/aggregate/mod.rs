//! Trip aggregation operations
//!
//! Four independent, single-pass aggregations over the classified trip
//! table. They share no mutable state and may run in any order; each one
//! degrades in isolation when its inputs are missing.

pub mod distribution;
pub mod heatmap;
pub mod kpi;
pub mod subsets;

pub use distribution::purpose_distribution;
pub use heatmap::hour_weekday_grid;
pub use kpi::kpi_summary;
pub use subsets::longest_trip_subsets;
