#![forbid(unsafe_code)]

//! Stateless 2D geometry kernel for node-link contour extraction.
//!
//! `anemone-geom` provides the polygon primitives the `anemone` layout engine
//! builds group contours from: arc construction, buffered segment/polyline
//! hulls, cascaded union, erosion, and polygon-to-path conversion.

pub mod arc;
pub mod hull;
pub mod ops;
pub mod path;

pub type Unit = euclid::UnknownUnit;

pub type Point = euclid::Point2D<f64, Unit>;
pub type Vector = euclid::Vector2D<f64, Unit>;
pub type Size = euclid::Size2D<f64, Unit>;

pub fn point(x: f64, y: f64) -> Point {
    euclid::point2(x, y)
}

pub fn vector(x: f64, y: f64) -> Vector {
    euclid::vec2(x, y)
}

pub fn size(width: f64, height: f64) -> Size {
    euclid::size2(width, height)
}

pub use geo::{MultiPolygon, Polygon};

pub use arc::{Arc, arc_through, circle_piece};
pub use hull::{polyline_hull, segment_hull};
pub use ops::{contains_point, convex_components, empty, erode, fast_union};
pub use path::{PathCommand, to_path};
