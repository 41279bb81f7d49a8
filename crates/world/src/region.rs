//! Biome region: seed samples over a world rectangle, with
//! distance-weighted attribute queries and an optional Voronoi partition
//! for edge blending.
//!
//! All weight math runs in the region's normalized [0, 1]^2 space;
//! integer world coordinates only ever enter through `normalize`.

use std::collections::HashSet;

use wildmere_core::{AttributeBounds, EnvSample, Point2f, Rect, WorldError, ATTRIBUTE_COUNT};

use crate::voronoi::{Side, VoronoiDiagram};

/// Fraction of full smoothing applied to squared sample distances.
pub const BLEND_FACTOR: f64 = 0.75;

/// Scale applied to normalized squared distances before clamping into a
/// weight. Together with [`BLEND_FACTOR`] this clamps samples beyond
/// ~0.41 normalized units out of the weighted result.
pub const BLEND_MAGNITUDE: f64 = 24.0;

/// Below this the weighted normalizer counts as numerically zero.
const ZERO_NORMALIZER: f64 = 1e-12;

/// Result of a nearest-edge query, distance in world units.
#[derive(Debug, Clone, Copy)]
pub struct RegionEdge {
    /// Edge index into the region's Voronoi partition.
    pub edge: usize,
    /// Unsigned distance from the query to the edge, denormalized by the
    /// region's area.
    pub distance: f64,
    /// Which side of the edge the query point falls on.
    pub side: Side,
}

/// A cached set of environmental seed samples covering a rectangle.
#[derive(Debug)]
pub struct BiomeRegion {
    bounds: Rect,
    seed: u32,
    samples: Vec<(Point2f, EnvSample)>,
    point_keys: HashSet<(u64, u64)>,
    normalized: Vec<Point2f>,
    inv_w: f64,
    inv_h: f64,
    voronoi: Option<VoronoiDiagram>,
}

impl BiomeRegion {
    /// Create an empty region over `bounds`, recording the stream seed
    /// that produces its samples.
    pub fn new(bounds: Rect, seed: u32) -> Self {
        Self {
            bounds,
            seed,
            samples: Vec::new(),
            point_keys: HashSet::new(),
            normalized: Vec::new(),
            inv_w: 1.0 / bounds.w as f64,
            inv_h: 1.0 / bounds.h as f64,
            voronoi: None,
        }
    }

    /// Region bounds in world space.
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// The 32-bit stream seed this region was generated from.
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// All `(point, sample)` pairs in insertion order.
    pub fn samples(&self) -> &[(Point2f, EnvSample)] {
        &self.samples
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the region holds no samples yet.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// The Voronoi partition, present once built with at least 3 samples.
    pub fn voronoi(&self) -> Option<&VoronoiDiagram> {
        self.voronoi.as_ref()
    }

    /// Map a world position into the region's normalized space.
    pub fn normalize(&self, x: f64, y: f64) -> Point2f {
        Point2f::new(
            (x - self.bounds.x as f64) * self.inv_w,
            (y - self.bounds.y as f64) * self.inv_h,
        )
    }

    /// Insert a sample. Sample points must be distinct; a duplicate is an
    /// invariant violation, not a soft failure.
    pub fn push_sample(&mut self, point: Point2f, sample: EnvSample) -> Result<(), WorldError> {
        let key = (point.x.to_bits(), point.y.to_bits());
        if !self.point_keys.insert(key) {
            return Err(WorldError::DuplicateSamplePoint {
                x: point.x,
                y: point.y,
            });
        }
        let normalized = self.normalize(point.x, point.y);
        self.normalized.push(normalized);
        self.samples.push((point, sample));
        // Any previously built partition no longer covers the point set.
        self.voronoi = None;
        Ok(())
    }

    /// Build the Voronoi partition over the current samples. Quietly a
    /// no-op below 3 samples; the raw point map answers queries either
    /// way.
    pub fn build_partition(&mut self) {
        if self.samples.len() >= 3 {
            self.voronoi = Some(VoronoiDiagram::build(self.normalized.clone()));
        }
    }

    /// Index and contents of the raw sample nearest to a world position
    /// (unsmoothed; the debug-display query). Ties keep insertion order.
    pub fn nearest_sample(&self, x: f64, y: f64) -> (usize, &Point2f, &EnvSample) {
        assert!(
            !self.samples.is_empty(),
            "nearest_sample on an empty biome region {}",
            self.bounds
        );
        let q = self.normalize(x, y);
        let mut best = 0;
        let mut best_dist = self.normalized[0].distance_sq(q);
        for (index, p) in self.normalized.iter().enumerate().skip(1) {
            let dist = p.distance_sq(q);
            if dist < best_dist {
                best = index;
                best_dist = dist;
            }
        }
        let (point, sample) = &self.samples[best];
        (best, point, sample)
    }

    /// Distance-weighted environmental sample at a world position.
    ///
    /// Every sample contributes `1 - clamp(scaled squared distance)`;
    /// when all contributions vanish the nearest raw sample answers
    /// instead, so the result is always in global bounds.
    pub fn weighted_sample(&self, x: f64, y: f64, bounds: &AttributeBounds) -> EnvSample {
        assert!(
            !self.samples.is_empty(),
            "weighted_sample on an empty biome region {}",
            self.bounds
        );
        let q = self.normalize(x, y);
        let mins = bounds.mins();
        let scale = (1.0 - BLEND_FACTOR) * BLEND_MAGNITUDE;

        let mut accumulated = [0.0f64; ATTRIBUTE_COUNT];
        let mut normalizer = 0.0f64;
        let mut nearest = 0usize;
        let mut nearest_dist = f64::INFINITY;

        for (index, (_, sample)) in self.samples.iter().enumerate() {
            let dist = self.normalized[index].distance_sq(q);
            if dist < nearest_dist {
                nearest = index;
                nearest_dist = dist;
            }
            let weight = (dist * scale).clamp(0.0, 1.0);
            let influence = 1.0 - weight;
            let values = sample.to_array();
            for (k, value) in values.iter().enumerate() {
                accumulated[k] += (value - mins[k]) * influence;
            }
            normalizer += influence;
        }

        if normalizer <= ZERO_NORMALIZER {
            // Every sample clamped out; the nearest one answers raw.
            return self.samples[nearest].1;
        }

        let mut values = [0.0f64; ATTRIBUTE_COUNT];
        for k in 0..ATTRIBUTE_COUNT {
            values[k] = accumulated[k] / normalizer + mins[k];
        }
        EnvSample::from_array(values).clamped(bounds)
    }

    /// Nearest Voronoi site to a world position, when a partition exists.
    pub fn nearest_site(&self, x: f64, y: f64) -> Option<usize> {
        let q = self.normalize(x, y);
        self.voronoi.as_ref().map(|v| v.nearest_site(q.x, q.y))
    }

    /// Nearest bounding edge of the given site's cell, distance
    /// denormalized by the region's area.
    pub fn nearest_edge_of_site(&self, site: usize, x: f64, y: f64) -> Option<RegionEdge> {
        let q = self.normalize(x, y);
        let voronoi = self.voronoi.as_ref()?;
        let near = voronoi.nearest_edge_of_site(site, q.x, q.y)?;
        let scale = ((self.bounds.w * self.bounds.h) as f64).sqrt();
        Some(RegionEdge {
            edge: near.edge,
            distance: near.distance * scale,
            side: near.side,
        })
    }
}
