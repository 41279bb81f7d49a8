//! Error taxonomy for the world model.
//!
//! Configuration gaps (unknown biome family) resolve through documented
//! defaults and never surface here; these variants are reserved for
//! invariant violations that must fail loudly.

use thiserror::Error;

/// Errors surfaced by world-model operations.
#[derive(Debug, Error, PartialEq)]
pub enum WorldError {
    /// A sample point was inserted twice into the same biome region.
    #[error("duplicate sample point at ({x}, {y})")]
    DuplicateSamplePoint {
        /// World X of the offending point.
        x: f64,
        /// World Y of the offending point.
        y: f64,
    },

    /// A query hit a region that was never generated.
    #[error("no cached biome region covers ({x}, {y})")]
    RegionNotCached {
        /// World X of the query.
        x: i64,
        /// World Y of the query.
        y: i64,
    },

    /// An object id was used that the world does not know.
    #[error("unknown world object {0}")]
    UnknownObject(u64),

    /// A tile slot index fell outside the chunk's dense grid.
    #[error("tile slot {slot} out of range for a {width}x{height} chunk")]
    SlotOutOfRange {
        /// Offending slot index.
        slot: usize,
        /// Chunk width in tiles.
        width: usize,
        /// Chunk height in tiles.
        height: usize,
    },
}
