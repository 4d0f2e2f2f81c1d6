//! Buffered hulls: line segments and polylines dilated by a radius.
//!
//! A dilated segment is a "stadium": the rectangle between the endpoints plus
//! a sampled semicircle cap at each end. `segments` is the number of sample
//! points per quarter circle, so caps stay polygonal and cheap to union.

use std::f64::consts::{PI, TAU};

use geo::{LineString, MultiPolygon, Polygon};

use crate::arc::{heading, unit_circle_point};
use crate::{Point, ops};

/// Stadium polygon around the segment `a..b`, dilated by `radius`. A
/// zero-length segment degenerates to a sampled circle around `a`.
pub fn segment_hull(a: Point, b: Point, radius: f64, segments: usize) -> Polygon<f64> {
    let segments = segments.max(1);
    let dir = b - a;

    let mut ring: Vec<(f64, f64)> = Vec::with_capacity(4 * segments + 2);
    if dir.square_length() < f64::EPSILON {
        for i in 0..(4 * segments) {
            let angle = TAU * i as f64 / (4 * segments) as f64;
            let p = a + unit_circle_point(angle) * radius;
            ring.push((p.x, p.y));
        }
    } else {
        let theta = heading(dir);
        // Cap around b: left normal, through the outward tip, to right normal.
        for i in 0..=(2 * segments) {
            let angle = theta + PI / 2.0 - PI * i as f64 / (2 * segments) as f64;
            let p = b + unit_circle_point(angle) * radius;
            ring.push((p.x, p.y));
        }
        // Cap around a, continuing in the same rotational direction.
        for i in 0..=(2 * segments) {
            let angle = theta - PI / 2.0 - PI * i as f64 / (2 * segments) as f64;
            let p = a + unit_circle_point(angle) * radius;
            ring.push((p.x, p.y));
        }
    }

    Polygon::new(LineString::from(ring), Vec::new())
}

/// Buffered hull of an open polyline: the cascaded union of per-segment
/// stadium hulls. Single points buffer to a circle; empty input yields an
/// empty multipolygon.
pub fn polyline_hull(points: &[Point], radius: f64, segments: usize) -> MultiPolygon<f64> {
    match points {
        [] => ops::empty(),
        [p] => MultiPolygon::new(vec![segment_hull(*p, *p, radius, segments)]),
        _ => ops::fast_union(
            points
                .windows(2)
                .map(|w| MultiPolygon::new(vec![segment_hull(w[0], w[1], radius, segments)]))
                .collect(),
        ),
    }
}
