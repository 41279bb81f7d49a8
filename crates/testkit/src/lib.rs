#![warn(missing_docs)]
//! Deterministic testing surfaces: terrain-grid fingerprints, golden
//! snapshots, and worldtest metrics reporting.

mod grid;
mod metrics;
mod snapshot;

pub use grid::*;
pub use metrics::*;
pub use snapshot::*;
