//! Polygon boundaries to renderable paths, with optional arc refitting.

use geo::{LineString, MultiPolygon};

use crate::arc::{Arc, arc_through, heading};
use crate::{Point, point};

/// A renderer-agnostic path command. `ArcTo` follows the SVG elliptical-arc
/// convention with equal radii.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo(Point),
    LineTo(Point),
    ArcTo {
        radius: f64,
        to: Point,
        large_arc: bool,
        sweep: bool,
    },
    Close,
}

/// Convert a multipolygon into path commands. With `arc_tolerance > 0`
/// (radians), runs of near-constant curvature along each ring are refitted
/// into three-point arcs; otherwise the sampled boundary is emitted as a
/// polyline. Every ring is closed with [`PathCommand::Close`].
pub fn to_path(mp: &MultiPolygon<f64>, arc_tolerance: f64) -> Vec<PathCommand> {
    let mut out = Vec::new();
    for poly in &mp.0 {
        ring_to_path(poly.exterior(), arc_tolerance, &mut out);
        for interior in poly.interiors() {
            ring_to_path(interior, arc_tolerance, &mut out);
        }
    }
    out
}

fn ring_to_path(ring: &LineString<f64>, arc_tolerance: f64, out: &mut Vec<PathCommand>) {
    let coords: Vec<Point> = ring.coords().map(|c| point(c.x, c.y)).collect();
    if coords.len() < 2 {
        return;
    }

    if arc_tolerance > 0.0 && refit_arcs(&coords, arc_tolerance, out) {
        return;
    }

    out.push(PathCommand::MoveTo(coords[0]));
    for p in &coords[1..coords.len() - 1] {
        out.push(PathCommand::LineTo(*p));
    }
    out.push(PathCommand::Close);
}

/// Detect boundary regions of near-constant turn angle and refit a 3-point
/// arc over each. Returns false when the ring is too small or too uniform to
/// segment, in which case the caller falls back to a polyline.
fn refit_arcs(coords: &[Point], arc_tolerance: f64, out: &mut Vec<PathCommand>) -> bool {
    // Closed ring: the final coordinate duplicates the first.
    let n = coords.len() - 1;
    if n < 4 {
        return false;
    }

    // A break point sits where the turn angle changes faster than the
    // tolerance, i.e. where the local curvature stops being constant.
    let mut breaks: Vec<usize> = Vec::new();
    for i in 0..n {
        let l = coords[i];
        let m1 = coords[(i + 1) % n];
        let m2 = coords[(i + 2) % n];
        let r = coords[(i + 3) % n];

        let turn_in = wrap_angle(heading(m2 - m1) - heading(m1 - l));
        let turn_out = wrap_angle(heading(r - m2) - heading(m2 - m1));
        if (turn_in - turn_out).abs() > arc_tolerance {
            breaks.push((i + 1) % n);
        }
    }

    if breaks.len() < 2 {
        return false;
    }

    out.push(PathCommand::MoveTo(coords[breaks[0]]));
    for bi in 0..breaks.len() {
        let begin = breaks[bi];
        let end = breaks[(bi + 1) % breaks.len()];

        // Steps along the ring from this break point to the next; the region
        // midpoint anchors the refitted arc.
        let mut steps = 0;
        while (begin + steps) % n != end {
            steps += 1;
        }
        let mid = coords[(begin + steps / 2) % n];

        match arc_through(coords[begin], mid, coords[end]) {
            Arc::Circular { radius, sweep, .. } => out.push(PathCommand::ArcTo {
                radius,
                to: coords[end],
                large_arc: false,
                sweep,
            }),
            Arc::Segment { to, .. } => out.push(PathCommand::LineTo(to)),
        }
    }
    out.push(PathCommand::Close);

    true
}

/// Normalize an angle difference into `(-PI, PI]`.
fn wrap_angle(a: f64) -> f64 {
    let mut a = a % std::f64::consts::TAU;
    if a > std::f64::consts::PI {
        a -= std::f64::consts::TAU;
    } else if a <= -std::f64::consts::PI {
        a += std::f64::consts::TAU;
    }
    a
}
