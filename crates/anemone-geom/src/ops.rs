//! Polygon set operations: cascaded union, erosion, component hulls.

use geo::{BooleanOps, Contains, ConvexHull, LineString, MultiPolygon};

use crate::Point;
use crate::hull::segment_hull;

pub fn empty() -> MultiPolygon<f64> {
    MultiPolygon::new(Vec::new())
}

/// Union of many multipolygons via hierarchical pairwise merging. Merging a
/// balanced tree of intermediates keeps the summed boundary complexity near
/// O(n log n) instead of the quadratic cost of a sequential fold.
pub fn fast_union(mut parts: Vec<MultiPolygon<f64>>) -> MultiPolygon<f64> {
    parts.retain(|p| !p.0.is_empty());
    if parts.is_empty() {
        return empty();
    }

    while parts.len() > 1 {
        let mut merged = Vec::with_capacity(parts.len() / 2 + 1);
        let mut it = parts.into_iter();
        while let Some(a) = it.next() {
            match it.next() {
                Some(b) => merged.push(a.union(&b)),
                None => merged.push(a),
            }
        }
        parts = merged;
    }

    parts.pop().unwrap_or_else(empty)
}

/// Negative buffer: every point of the result keeps at least `radius`
/// clearance to the input boundary. Computed through the Minkowski identity
/// `P shrunk by r = P \ (boundary of P dilated by r)`, which only needs
/// segment hulls, union, and difference. Sampled caps are inscribed in the
/// true disc, so the result errs marginally on the large side.
pub fn erode(mp: &MultiPolygon<f64>, radius: f64, segments: usize) -> MultiPolygon<f64> {
    if mp.0.is_empty() || radius <= 0.0 {
        return mp.clone();
    }

    let mut rim: Vec<MultiPolygon<f64>> = Vec::new();
    for poly in &mp.0 {
        collect_ring_rim(poly.exterior(), radius, segments, &mut rim);
        for interior in poly.interiors() {
            collect_ring_rim(interior, radius, segments, &mut rim);
        }
    }

    mp.difference(&fast_union(rim))
}

fn collect_ring_rim(
    ring: &LineString<f64>,
    radius: f64,
    segments: usize,
    rim: &mut Vec<MultiPolygon<f64>>,
) {
    for line in ring.lines() {
        let hull = segment_hull(
            crate::point(line.start.x, line.start.y),
            crate::point(line.end.x, line.end.y),
            radius,
            segments,
        );
        rim.push(MultiPolygon::new(vec![hull]));
    }
}

/// Convex hull of each connected component, re-unioned. Turns a lumpy union
/// of many small hulls into smoothly connected regions.
pub fn convex_components(mp: &MultiPolygon<f64>) -> MultiPolygon<f64> {
    fast_union(
        mp.0.iter()
            .map(|poly| MultiPolygon::new(vec![poly.convex_hull()]))
            .collect(),
    )
}

pub fn contains_point(mp: &MultiPolygon<f64>, p: Point) -> bool {
    mp.contains(&geo::Point::new(p.x, p.y))
}
