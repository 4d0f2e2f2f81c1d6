//! Contour extraction: per selected group, a solid outline polygon and the
//! thin ribbon band a renderer actually draws.
//!
//! Member labels and member edges are buffered into hulls whose radius grows
//! with the group's band index, so nested groups produce concentric bands.
//! The union of those hulls is eroded by a large smoothing radius to round
//! the shape off, non-member labels are punched out, and the ribbon is the
//! outline minus its erosion by the ribbon width.

use indexmap::IndexMap;

use crate::layout::{
    BUFFER_SEGMENTS, LINK_SEGMENTS, LINK_WIDTH, NODE_MARGIN, NODE_OUTLINE, RIBBON_EXTENT,
    RIBBON_SPACE, RIBBON_WIDTH, Layout,
};

use anemone_geom::{
    MultiPolygon, Point, circle_piece, convex_components, empty, erode, fast_union, point,
    polyline_hull, segment_hull,
};

/// Hull erosion radius that rounds off the raw union of member hulls.
const SMOOTH_RADIUS: f64 = 4.0 * RIBBON_EXTENT;

#[derive(Debug, Clone)]
pub struct Contours {
    /// The visible band.
    pub ribbon: MultiPolygon<f64>,
    /// Solid region; containment tests and stacking subtraction use this.
    pub outline: MultiPolygon<f64>,
}

impl Contours {
    pub fn empty() -> Contours {
        Contours {
            ribbon: empty(),
            outline: empty(),
        }
    }
}

/// Contours for every selected group, in selection order (smallest group
/// first, so nested bands stack from the inside out).
pub fn build_all(layout: &Layout) -> IndexMap<String, Contours> {
    let mut out = IndexMap::new();
    for si in 0..layout.rich.selection.len() {
        out.insert(
            layout.rich.selection[si].id.clone(),
            build_one(layout, si),
        );
    }
    out
}

fn build_one(layout: &Layout, si: usize) -> Contours {
    let rich = &layout.rich;
    let sel = &rich.selection[si];
    if sel.members.is_empty() {
        return Contours::empty();
    }

    // Member label hulls; the band index inside each node's membership list
    // pushes outer groups further out.
    let mut vertex_hulls: Vec<MultiPolygon<f64>> = Vec::with_capacity(sel.members.len());
    for &v in &sel.members {
        let band = rich.node_memberships[v]
            .iter()
            .position(|&s| s == si)
            .unwrap_or(0);
        let edge_radius = (1.01 + band as f64) * RIBBON_EXTENT + SMOOTH_RADIUS;
        let bounds = rich.label_sizes[v];
        let vertex_radius = 0.5 * bounds.height + NODE_MARGIN;
        let (a, b) = label_segment(layout.rich_position(v), bounds.width);
        vertex_hulls.push(MultiPolygon(vec![segment_hull(
            a,
            b,
            vertex_radius + edge_radius,
            BUFFER_SEGMENTS,
        )]));
    }

    // Member edge hulls along each edge's control polyline.
    let mut link_hulls: Vec<MultiPolygon<f64>> = Vec::new();
    for e in &rich.edges {
        let Some(band) = e.memberships.iter().position(|&s| s == si) else {
            continue;
        };
        // Widen around edges that carry a drawn link.
        let link_slack = if e.core {
            LINK_WIDTH + RIBBON_SPACE
        } else {
            0.0
        };
        let edge_radius = (0.51 + band as f64) * RIBBON_EXTENT + SMOOTH_RADIUS + link_slack;
        let line = circle_piece(
            layout.rich_position(e.a),
            layout.rich_position(e.midpoint),
            layout.rich_position(e.b),
            LINK_SEGMENTS,
        );
        link_hulls.push(polyline_hull(&line, edge_radius, BUFFER_SEGMENTS));
    }

    // Non-member labels punch holes so the band never overlaps them.
    let mut anti_hulls: Vec<MultiPolygon<f64>> = Vec::new();
    for v in 0..rich.core_count() {
        if sel.member_set.contains(&v) {
            continue;
        }
        let bounds = rich.label_sizes[v];
        let radius = 0.5 * bounds.height + NODE_OUTLINE;
        let (a, b) = label_segment(layout.rich_position(v), bounds.width);
        anti_hulls.push(MultiPolygon(vec![segment_hull(
            a,
            b,
            radius,
            BUFFER_SEGMENTS,
        )]));
    }

    let vertex_contour = convex_components(&fast_union(vertex_hulls));
    let link_contour = fast_union(link_hulls);

    use geo::BooleanOps;
    let full_contour = vertex_contour.union(&link_contour);
    let mut smoothened = erode(&full_contour, SMOOTH_RADIUS, BUFFER_SEGMENTS);

    if !anti_hulls.is_empty() {
        let anti_contour = fast_union(anti_hulls);
        smoothened = smoothened.difference(&anti_contour);
        // The subtraction may sever a band along an edge that merely passes
        // near a non-member label; re-adding the eroded link hulls keeps
        // member edges covered.
        smoothened = smoothened.union(&erode(&link_contour, SMOOTH_RADIUS, BUFFER_SEGMENTS));
    }

    let inner = erode(&smoothened, RIBBON_WIDTH, BUFFER_SEGMENTS);
    Contours {
        ribbon: smoothened.difference(&inner),
        outline: smoothened,
    }
}

/// Horizontal line segment spanning a label box.
fn label_segment(center: Point, width: f64) -> (Point, Point) {
    (
        point(center.x - 0.5 * width, center.y),
        point(center.x + 0.5 * width, center.y),
    )
}
