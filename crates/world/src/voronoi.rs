//! Planar Voronoi partition over normalized region space.
//!
//! Sites live in [0, 1]^2. Each cell is cut from a padded bounding box by
//! the perpendicular-bisector half-plane against every other site, which
//! stays exact for collinear and otherwise degenerate layouts. Every edge
//! records the two sites it separates, so callers can walk from a cell
//! boundary to the neighbor on either side.

use wildmere_core::Point2f;

/// Padding around the unit square used to bound outer cells.
const BOX_PAD: f64 = 0.25;

/// Tolerance for half-plane membership during clipping.
const CLIP_EPS: f64 = 1e-9;

/// Edges shorter than this are numerical slivers and are dropped.
const MIN_EDGE_LEN_SQ: f64 = 1e-18;

/// Which side of an edge a query point falls on.
///
/// A point exactly on the edge classifies `Left`, so ties are never
/// ambiguous.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Cross product of (b - a) and (p - a) is non-negative.
    Left,
    /// Cross product is negative.
    Right,
}

/// One finite Voronoi edge separating two sites.
#[derive(Debug, Clone, Copy)]
pub struct VoronoiEdge {
    /// First endpoint, normalized space.
    pub a: Point2f,
    /// Second endpoint, normalized space.
    pub b: Point2f,
    /// Site on the `Side::Left` side.
    pub site_left: usize,
    /// Site on the `Side::Right` side.
    pub site_right: usize,
}

impl VoronoiEdge {
    /// The site across the edge from `side`'s own site: left side maps to
    /// the left site, right side to the right site.
    pub fn site_on(&self, side: Side) -> usize {
        match side {
            Side::Left => self.site_left,
            Side::Right => self.site_right,
        }
    }
}

/// Result of a nearest-edge query, distance still in normalized units.
#[derive(Debug, Clone, Copy)]
pub struct NearestEdge {
    /// Index of the winning edge.
    pub edge: usize,
    /// Unsigned point-to-segment distance in normalized space.
    pub distance: f64,
    /// Which side of that edge the query point falls on.
    pub side: Side,
}

/// Voronoi partition of the normalized region square.
#[derive(Debug)]
pub struct VoronoiDiagram {
    sites: Vec<Point2f>,
    edges: Vec<VoronoiEdge>,
    cell_edges: Vec<Vec<usize>>,
}

impl VoronoiDiagram {
    /// Build the partition for at least three distinct sites.
    pub fn build(sites: Vec<Point2f>) -> Self {
        assert!(sites.len() >= 3, "a Voronoi partition needs at least 3 sites");

        let mut edges: Vec<VoronoiEdge> = Vec::new();
        let mut cell_edges: Vec<Vec<usize>> = vec![Vec::new(); sites.len()];
        let mut seen: std::collections::HashMap<(usize, usize), usize> =
            std::collections::HashMap::new();

        for i in 0..sites.len() {
            for (neighbor, seg_a, seg_b) in cell_segments(&sites, i) {
                let key = (i.min(neighbor), i.max(neighbor));
                let edge_index = match seen.get(&key) {
                    Some(&index) => index,
                    None => {
                        if seg_a.distance_sq(seg_b) < MIN_EDGE_LEN_SQ {
                            continue;
                        }
                        let index = edges.len();
                        edges.push(orient_edge(seg_a, seg_b, i, neighbor, &sites));
                        seen.insert(key, index);
                        index
                    }
                };
                cell_edges[i].push(edge_index);
            }
        }

        Self {
            sites,
            edges,
            cell_edges,
        }
    }

    /// Number of sites.
    pub fn site_count(&self) -> usize {
        self.sites.len()
    }

    /// Position of a site in normalized space.
    pub fn site(&self, index: usize) -> Point2f {
        self.sites[index]
    }

    /// All finite edges of the partition.
    pub fn edges(&self) -> &[VoronoiEdge] {
        &self.edges
    }

    /// Edge indices bounding one site's cell.
    pub fn cell_edges(&self, site: usize) -> &[usize] {
        &self.cell_edges[site]
    }

    /// Site with minimum squared distance to the query point. Ties keep
    /// the lowest index.
    pub fn nearest_site(&self, x: f64, y: f64) -> usize {
        let p = Point2f::new(x, y);
        let mut best = 0;
        let mut best_dist = self.sites[0].distance_sq(p);
        for (index, site) in self.sites.iter().enumerate().skip(1) {
            let dist = site.distance_sq(p);
            if dist < best_dist {
                best = index;
                best_dist = dist;
            }
        }
        best
    }

    /// Closest bounding edge of a site's cell to the query point. Ties
    /// keep the first edge in cell order. `None` only for a cell with no
    /// recorded edges, which cannot happen for distinct sites.
    pub fn nearest_edge_of_site(&self, site: usize, x: f64, y: f64) -> Option<NearestEdge> {
        let p = Point2f::new(x, y);
        let mut best: Option<NearestEdge> = None;
        for &edge_index in &self.cell_edges[site] {
            let edge = &self.edges[edge_index];
            let distance = point_segment_distance(p, edge.a, edge.b);
            if best.map_or(true, |b| distance < b.distance) {
                best = Some(NearestEdge {
                    edge: edge_index,
                    distance,
                    side: classify_side(p, edge.a, edge.b),
                });
            }
        }
        best
    }
}

/// Classify which side of segment `a -> b` the point falls on.
pub fn classify_side(p: Point2f, a: Point2f, b: Point2f) -> Side {
    let cross = (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x);
    if cross >= 0.0 {
        Side::Left
    } else {
        Side::Right
    }
}

/// Unsigned distance from a point to a segment.
pub fn point_segment_distance(p: Point2f, a: Point2f, b: Point2f) -> f64 {
    let len_sq = a.distance_sq(b);
    if len_sq == 0.0 {
        return p.distance_sq(a).sqrt();
    }
    let t = (((p.x - a.x) * (b.x - a.x) + (p.y - a.y) * (b.y - a.y)) / len_sq).clamp(0.0, 1.0);
    let proj = Point2f::new(a.x + t * (b.x - a.x), a.y + t * (b.y - a.y));
    p.distance_sq(proj).sqrt()
}

fn orient_edge(
    a: Point2f,
    b: Point2f,
    site: usize,
    neighbor: usize,
    sites: &[Point2f],
) -> VoronoiEdge {
    match classify_side(sites[site], a, b) {
        Side::Left => VoronoiEdge {
            a,
            b,
            site_left: site,
            site_right: neighbor,
        },
        Side::Right => VoronoiEdge {
            a,
            b,
            site_left: neighbor,
            site_right: site,
        },
    }
}

/// Segments of site `i`'s cell that were produced by a bisector cut,
/// each tagged with the neighbor site across it.
fn cell_segments(sites: &[Point2f], i: usize) -> Vec<(usize, Point2f, Point2f)> {
    let lo = -BOX_PAD;
    let hi = 1.0 + BOX_PAD;
    // Counter-clockwise box; edge k runs from vertex k to vertex k+1.
    let mut vertices = vec![
        Point2f::new(lo, lo),
        Point2f::new(hi, lo),
        Point2f::new(hi, hi),
        Point2f::new(lo, hi),
    ];
    // Neighbor tag for the edge leaving each vertex; None is box boundary.
    let mut tags: Vec<Option<usize>> = vec![None; 4];

    for j in 0..sites.len() {
        if j == i {
            continue;
        }
        clip_by_bisector(&mut vertices, &mut tags, sites[i], sites[j], j);
        if vertices.len() < 3 {
            break;
        }
    }

    let mut segments = Vec::new();
    for k in 0..vertices.len() {
        if let Some(neighbor) = tags[k] {
            let next = (k + 1) % vertices.len();
            segments.push((neighbor, vertices[k], vertices[next]));
        }
    }
    segments
}

/// Sutherland-Hodgman clip of a convex polygon by the half-plane of
/// points closer to `keep` than to `cut`. The freshly cut edge is tagged
/// with the cutting neighbor.
fn clip_by_bisector(
    vertices: &mut Vec<Point2f>,
    tags: &mut Vec<Option<usize>>,
    keep: Point2f,
    cut: Point2f,
    neighbor: usize,
) {
    // f(p) <= 0 inside: expands |p-keep|^2 - |p-cut|^2.
    let a = 2.0 * (cut.x - keep.x);
    let b = 2.0 * (cut.y - keep.y);
    let c = keep.x * keep.x + keep.y * keep.y - cut.x * cut.x - cut.y * cut.y;
    let eval = |p: Point2f| a * p.x + b * p.y + c;

    let n = vertices.len();
    let mut out_vertices: Vec<Point2f> = Vec::with_capacity(n + 1);
    let mut out_tags: Vec<Option<usize>> = Vec::with_capacity(n + 1);

    for k in 0..n {
        let current = vertices[k];
        let next = vertices[(k + 1) % n];
        let tag = tags[k];
        let d_current = eval(current);
        let d_next = eval(next);
        let current_in = d_current <= CLIP_EPS;
        let next_in = d_next <= CLIP_EPS;

        if current_in {
            out_vertices.push(current);
            if next_in {
                out_tags.push(tag);
            } else {
                // Leaving the half-plane: truncated edge keeps its tag,
                // then the cut line starts a new edge.
                let t = d_current / (d_current - d_next);
                let hit = Point2f::new(
                    current.x + t * (next.x - current.x),
                    current.y + t * (next.y - current.y),
                );
                out_tags.push(tag);
                out_vertices.push(hit);
                out_tags.push(Some(neighbor));
            }
        } else if next_in {
            // Re-entering: the edge resumes partway with its old tag.
            let t = d_current / (d_current - d_next);
            let hit = Point2f::new(
                current.x + t * (next.x - current.x),
                current.y + t * (next.y - current.y),
            );
            out_vertices.push(hit);
            out_tags.push(tag);
        }
    }

    *vertices = out_vertices;
    *tags = out_tags;
}
