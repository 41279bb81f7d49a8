//! Deterministic, lazily generated biome-region cache.
//!
//! The world is tiled into fixed influence rectangles. Each rectangle's
//! sample batch is a pure function of the world seed and the rectangle
//! origin, so regions can be generated in any order and always come out
//! identical. A chunk query merges the 3x3 window of rectangles around
//! the chunk into one stitched region and caches that too.

use std::collections::HashMap;
use std::sync::Arc;

use rand::Rng;
use tracing::debug;

use wildmere_core::{
    lattice_seed, seeded_rng, AttributeBounds, EnvSample, Point2, Point2f, Rect, WorldError,
    ATTRIBUTE_COUNT,
};

use crate::region::BiomeRegion;
use crate::spatial::BucketIndex;

/// Width and height of one influence rectangle in world units.
pub const INFLUENCE_RECT_SIZE: i64 = 64;

/// Seed samples generated per influence rectangle.
pub const SAMPLES_PER_RECT: usize = 6;

/// Influence rectangles per side of the scan window (odd).
pub const SCAN_WINDOW: i64 = 3;

/// Chance that a fresh sample copies a nearby sample outright.
const ADOPT_CHANCE: f64 = 0.25;

/// Chance that a fresh sample copies a nearby sample with perturbation.
const INFLUENCE_CHANCE: f64 = 0.30;

/// Perturbation amplitude as a fraction of each attribute's global span.
const INFLUENCE_JITTER: f64 = 0.05;

/// Cache of per-rectangle regions plus stitched scan-window regions.
pub struct RegionCache {
    world_seed: u64,
    bounds: AttributeBounds,
    rect_regions: BucketIndex<Arc<BiomeRegion>>,
    stitched: HashMap<Point2, Arc<BiomeRegion>>,
}

impl RegionCache {
    /// Create a cache for the given world seed and global bounds.
    pub fn new(world_seed: u64, bounds: AttributeBounds) -> Self {
        Self {
            world_seed,
            bounds,
            rect_regions: BucketIndex::new(INFLUENCE_RECT_SIZE, INFLUENCE_RECT_SIZE),
            stitched: HashMap::new(),
        }
    }

    /// Origin of the influence rectangle containing a world point.
    pub fn rect_origin(x: i64, y: i64) -> Point2 {
        Point2::new(
            wildmere_core::floor_div(x, INFLUENCE_RECT_SIZE) * INFLUENCE_RECT_SIZE,
            wildmere_core::floor_div(y, INFLUENCE_RECT_SIZE) * INFLUENCE_RECT_SIZE,
        )
    }

    /// Number of generated influence rectangles.
    pub fn rect_count(&self) -> usize {
        self.rect_regions.len()
    }

    /// Number of cached stitched regions.
    pub fn stitched_count(&self) -> usize {
        self.stitched.len()
    }

    /// Stitched region for the scan window around a world point,
    /// generating any missing influence rectangles first.
    pub fn stitched_for(&mut self, x: i64, y: i64) -> Arc<BiomeRegion> {
        let center = Self::rect_origin(x, y);
        let half = SCAN_WINDOW / 2;
        let origin = Point2::new(
            center.x - half * INFLUENCE_RECT_SIZE,
            center.y - half * INFLUENCE_RECT_SIZE,
        );
        if let Some(region) = self.stitched.get(&origin) {
            return Arc::clone(region);
        }

        let mut parts = Vec::with_capacity((SCAN_WINDOW * SCAN_WINDOW) as usize);
        for row in 0..SCAN_WINDOW {
            for col in 0..SCAN_WINDOW {
                let rect_origin = Point2::new(
                    origin.x + col * INFLUENCE_RECT_SIZE,
                    origin.y + row * INFLUENCE_RECT_SIZE,
                );
                parts.push(self.ensure_rect(rect_origin));
            }
        }

        let window = Rect::new(
            origin.x,
            origin.y,
            SCAN_WINDOW * INFLUENCE_RECT_SIZE,
            SCAN_WINDOW * INFLUENCE_RECT_SIZE,
        );
        let seed = lattice_seed(self.world_seed, origin.x, origin.y);
        let mut merged = BiomeRegion::new(window, seed);
        for part in &parts {
            for (point, sample) in part.samples() {
                merged
                    .push_sample(*point, *sample)
                    .expect("influence rectangles never share sample points");
            }
        }
        merged.build_partition();
        debug!(
            origin = %origin,
            samples = merged.len(),
            "stitched scan window"
        );

        let region = Arc::new(merged);
        self.stitched.insert(origin, Arc::clone(&region));
        region
    }

    /// Already-stitched region covering a world point, without
    /// generating. Querying a region that was never generated is a
    /// programming error and reports as such.
    pub fn cached_stitched(&self, x: i64, y: i64) -> Result<&Arc<BiomeRegion>, WorldError> {
        let center = Self::rect_origin(x, y);
        let half = SCAN_WINDOW / 2;
        let origin = Point2::new(
            center.x - half * INFLUENCE_RECT_SIZE,
            center.y - half * INFLUENCE_RECT_SIZE,
        );
        self.stitched
            .get(&origin)
            .ok_or(WorldError::RegionNotCached { x, y })
    }

    /// Per-rectangle region at an origin, generating on first touch.
    fn ensure_rect(&mut self, origin: Point2) -> Arc<BiomeRegion> {
        if let Some(region) = self.rect_regions.query_point(origin.x, origin.y).first() {
            // Cache hit: reuse, never regenerate.
            return Arc::clone(region);
        }
        let rect = Rect::new(origin.x, origin.y, INFLUENCE_RECT_SIZE, INFLUENCE_RECT_SIZE);
        let region = Arc::new(self.generate_rect(rect));
        self.rect_regions
            .insert(origin.x, origin.y, Arc::clone(&region));
        region
    }

    /// Generate one influence rectangle's region. The result is a pure
    /// function of (world seed, rectangle origin): donor material from
    /// neighboring rectangles is their base batch, itself derived only
    /// from seed and origin, never from cache state.
    fn generate_rect(&self, rect: Rect) -> BiomeRegion {
        let seed = lattice_seed(self.world_seed, rect.x, rect.y);
        let mut rng = seeded_rng(seed);
        let base = draw_base_batch(&mut rng, rect, &self.bounds);
        debug!(rect = %rect, seed, "generating influence rect");

        let mut neighbor_pool: Option<Vec<(Point2f, EnvSample)>> = None;
        let mut region = BiomeRegion::new(rect, seed);

        for (point, base_sample) in base {
            let roll: f64 = rng.gen();
            let sample = if roll < ADOPT_CHANCE + INFLUENCE_CHANCE {
                let donor = if region.is_empty() {
                    let pool = neighbor_pool
                        .get_or_insert_with(|| self.neighbor_base_samples(rect));
                    nearest_donor(pool, point)
                } else {
                    nearest_donor(region.samples(), point)
                };
                match donor {
                    Some(donor_sample) if roll < ADOPT_CHANCE => donor_sample,
                    Some(donor_sample) => perturb(donor_sample, &self.bounds, &mut rng),
                    None => base_sample,
                }
            } else {
                base_sample
            };
            region
                .push_sample(point, sample)
                .expect("per-rect stream emitted a duplicate sample point");
        }

        region.build_partition();
        region
    }

    /// Base batches of the eight neighboring rectangles, row-major.
    fn neighbor_base_samples(&self, rect: Rect) -> Vec<(Point2f, EnvSample)> {
        let mut pool = Vec::with_capacity(8 * SAMPLES_PER_RECT);
        for row in -1..=1 {
            for col in -1..=1 {
                if row == 0 && col == 0 {
                    continue;
                }
                let neighbor = Rect::new(
                    rect.x + col * INFLUENCE_RECT_SIZE,
                    rect.y + row * INFLUENCE_RECT_SIZE,
                    INFLUENCE_RECT_SIZE,
                    INFLUENCE_RECT_SIZE,
                );
                let seed = lattice_seed(self.world_seed, neighbor.x, neighbor.y);
                let mut rng = seeded_rng(seed);
                pool.extend(draw_base_batch(&mut rng, neighbor, &self.bounds));
            }
        }
        pool
    }
}

/// Draw the base sample batch for a rectangle: uniform positions inside
/// the rect, attributes uniform within global bounds.
fn draw_base_batch<R: Rng>(
    rng: &mut R,
    rect: Rect,
    bounds: &AttributeBounds,
) -> Vec<(Point2f, EnvSample)> {
    let ranges = bounds.ranges();
    let mut batch = Vec::with_capacity(SAMPLES_PER_RECT);
    for _ in 0..SAMPLES_PER_RECT {
        let x = rng.gen_range(rect.x as f64..rect.right() as f64);
        let y = rng.gen_range(rect.y as f64..rect.bottom() as f64);
        let mut values = [0.0f64; ATTRIBUTE_COUNT];
        for (k, range) in ranges.iter().enumerate() {
            values[k] = rng.gen_range(range.min..=range.max);
        }
        batch.push((Point2f::new(x, y), EnvSample::from_array(values)));
    }
    batch
}

/// The donor closest to `point`; ties keep the earliest sample.
fn nearest_donor(pool: &[(Point2f, EnvSample)], point: Point2f) -> Option<EnvSample> {
    let mut best: Option<(f64, EnvSample)> = None;
    for (p, sample) in pool {
        let dist = p.distance_sq(point);
        if best.map_or(true, |(d, _)| dist < d) {
            best = Some((dist, *sample));
        }
    }
    best.map(|(_, sample)| sample)
}

/// Copy a donor with a small seeded perturbation, clamped to bounds.
fn perturb<R: Rng>(sample: EnvSample, bounds: &AttributeBounds, rng: &mut R) -> EnvSample {
    let ranges = bounds.ranges();
    let mut values = sample.to_array();
    for (k, range) in ranges.iter().enumerate() {
        let jitter = (rng.gen::<f64>() * 2.0 - 1.0) * range.span() * INFLUENCE_JITTER;
        values[k] += jitter;
    }
    EnvSample::from_array(values).clamped(bounds)
}
