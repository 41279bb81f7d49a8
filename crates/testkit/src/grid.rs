//! Terrain-grid fingerprints for deterministic comparisons.

use serde::{Deserialize, Serialize};

/// A rectangular glyph grid captured from generated terrain.
///
/// Worldtests render each chunk's terrain to one glyph per tile, then
/// compare grids (or just their hashes) across generation rounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerrainGrid {
    rows: Vec<String>,
}

impl TerrainGrid {
    /// Build a grid from glyph rows. Rows must be equally wide.
    pub fn from_rows(rows: Vec<String>) -> Self {
        if let Some(first) = rows.first() {
            let width = first.chars().count();
            debug_assert!(
                rows.iter().all(|row| row.chars().count() == width),
                "terrain grid rows must be equally wide"
            );
        }
        Self { rows }
    }

    /// Grid rows, top to bottom.
    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    /// Hex fingerprint of the grid contents.
    pub fn fingerprint(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        for row in &self.rows {
            hasher.update(row.as_bytes());
            hasher.update(b"\n");
        }
        hasher.finalize().to_hex().to_string()
    }

    /// Render the grid as one newline-joined block for failure output.
    pub fn render(&self) -> String {
        self.rows.join("\n")
    }

    /// Number of differing glyph positions between two equally sized
    /// grids.
    pub fn diff_count(&self, other: &TerrainGrid) -> usize {
        self.rows
            .iter()
            .zip(other.rows.iter())
            .map(|(a, b)| a.chars().zip(b.chars()).filter(|(x, y)| x != y).count())
            .sum()
    }
}
