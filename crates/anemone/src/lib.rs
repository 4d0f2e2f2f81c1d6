#![forbid(unsafe_code)]

//! Constrained node-link layout with group contour extraction (headless).
//!
//! Given a network whose nodes may belong to overlapping groups, this crate
//! computes:
//! - node positions via stress majorization with a hard non-overlap
//!   projection over label boxes,
//! - three control points per link, for drawing links as circular arcs,
//! - per selected group, a closed "ribbon" band and a solid outline polygon
//!   hugging the group's members.
//!
//! The crate is renderer-agnostic: text metrics come in through
//! [`graph::TextMeasure`] and geometry goes out as plain polygons and path
//! commands from [`anemone_geom`].

pub mod contour;
pub mod error;
pub mod graph;
pub mod layout;
pub mod rich;

pub use contour::Contours;
pub use error::{Error, Result};
pub use graph::{Annotation, ApproxTextMeasure, Link, Network, Node, TextMeasure};
pub use layout::Layout;
pub use rich::RichGraph;

pub use anemone_geom::{MultiPolygon, PathCommand, Point, Polygon, Size, to_path};
