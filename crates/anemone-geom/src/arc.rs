//! Circular arcs through three points, with straight-segment fallbacks.

use crate::{Point, Vector, point};

/// Cross products below this magnitude are treated as collinear.
const COLLINEAR_EPS: f64 = 1e-3;

/// Whether contour edge hulls are buffered around the sampled arc instead of
/// the straight source-target chord. Disabled: the straight chord tracks the
/// rendered link closely enough and keeps hull sampling cheap. See DESIGN.md.
const ARC_EDGE_HULLS: bool = false;

/// A circular arc through three points, or a straight chord when the points
/// are collinear or otherwise do not describe a well-formed circle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Arc {
    Segment {
        from: Point,
        to: Point,
    },
    Circular {
        from: Point,
        to: Point,
        center: Point,
        radius: f64,
        /// True when the arc bends counter-clockwise from `from` to `to`.
        sweep: bool,
    },
}

/// Construct the arc that starts at `p1`, passes through `p2` and ends at
/// `p3`. Falls back to a straight segment when `p2` does not lie between the
/// endpoints or the three points are collinear, so the result never carries
/// NaN or infinite coordinates.
pub fn arc_through(p1: Point, p2: Point, p3: Point) -> Arc {
    let v21 = p2 - p1;
    let d21 = v21.dot(v21);
    let v31 = p3 - p1;
    let d31 = v31.dot(v31);
    let a4 = 2.0 * v21.cross(v31);

    let d13 = p1.distance_to(p3);
    let well_formed = p1.distance_to(p2) < d13 && p2.distance_to(p3) < d13;

    if !well_formed || a4.abs() <= COLLINEAR_EPS {
        return Arc::Segment { from: p1, to: p3 };
    }

    let center = point(
        p1.x + (v31.y * d21 - v21.y * d31) / a4,
        p1.y + (v21.x * d31 - v31.x * d21) / a4,
    );
    let d32 = (p3 - p2).square_length();
    let radius = (d21 * d31 * d32).sqrt() / a4.abs();
    let sweep = (p2 - p1).cross(p3 - p2) > 0.0;

    Arc::Circular {
        from: p1,
        to: p3,
        center,
        radius,
        sweep,
    }
}

/// Sampled polyline for the visual path of an edge bent through its midpoint
/// control point. Used to seed buffered edge hulls during contour
/// construction; callers get at least two points back.
pub fn circle_piece(p1: Point, p2: Point, p3: Point, segments: usize) -> Vec<Point> {
    if ARC_EDGE_HULLS && segments >= 2 {
        if let Arc::Circular { center, radius, .. } = arc_through(p1, p2, p3) {
            let mut a1 = heading(p1 - center);
            let a2 = heading(p2 - center);
            let mut a3 = heading(p3 - center);

            // Sweep through the angle of the middle point, not around the
            // far side of the circle.
            if (a2 < a1 && a2 < a3) || (a2 > a1 && a2 > a3) {
                if a1 < a3 {
                    a3 -= std::f64::consts::TAU;
                } else {
                    a1 -= std::f64::consts::TAU;
                }
            }

            return (0..segments)
                .map(|i| {
                    let f = i as f64 / (segments - 1) as f64;
                    let a = (1.0 - f) * a1 + f * a3;
                    center + unit_circle_point(a) * radius
                })
                .collect();
        }
    }

    vec![p1, p3]
}

/// Angle of a direction vector, in radians.
pub(crate) fn heading(v: Vector) -> f64 {
    v.y.atan2(v.x)
}

pub(crate) fn unit_circle_point(angle: f64) -> Vector {
    crate::vector(angle.cos(), angle.sin())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collinear_points_fall_back_to_a_segment() {
        let arc = arc_through(point(0.0, 0.0), point(5.0, 0.0), point(10.0, 0.0));
        assert_eq!(
            arc,
            Arc::Segment {
                from: point(0.0, 0.0),
                to: point(10.0, 0.0),
            }
        );
    }

    #[test]
    fn midpoint_outside_the_endpoints_falls_back_to_a_segment() {
        // p2 is further from p1 than p3 is, so no sensible arc exists.
        let arc = arc_through(point(0.0, 0.0), point(30.0, 1.0), point(10.0, 0.0));
        assert!(matches!(arc, Arc::Segment { .. }));
    }

    #[test]
    fn semicircle_recovers_center_and_radius() {
        let arc = arc_through(point(-10.0, 0.0), point(0.0, 10.0), point(10.0, 0.0));
        match arc {
            Arc::Circular { center, radius, .. } => {
                assert!(center.distance_to(point(0.0, 0.0)) < 1e-9);
                assert!((radius - 10.0).abs() < 1e-9);
            }
            Arc::Segment { .. } => panic!("expected a circular arc"),
        }
    }

    #[test]
    fn circle_piece_yields_the_straight_chord() {
        let pts = circle_piece(point(0.0, 0.0), point(5.0, 3.0), point(10.0, 0.0), 10);
        assert_eq!(pts, vec![point(0.0, 0.0), point(10.0, 0.0)]);
    }

    #[test]
    fn coincident_points_never_produce_nan() {
        let p = point(3.0, 4.0);
        match arc_through(p, p, p) {
            Arc::Segment { from, to } => {
                assert!(from.x.is_finite() && to.y.is_finite());
            }
            Arc::Circular { .. } => panic!("degenerate input must not form a circle"),
        }
    }
}
