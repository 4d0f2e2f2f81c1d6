//! Constrained stress layout: places network nodes and edge control points
//! so that pairwise distances approximate graph-theoretic distances while
//! label boxes keep a hard minimum separation.
//!
//! The schedule has two phases. A fresh layout first runs a long unweighted,
//! unconstrained batch from its warm start to find the global arrangement,
//! then installs the pair weights and the non-overlap projection and refines.
//! Subsequent [`Layout::run`] calls continue refinement in bounded batches
//! so a host can interleave redraws.

use indexmap::IndexMap;

use crate::contour::{self, Contours};
use crate::graph::{Network, TextMeasure};
use crate::rich::RichGraph;
use crate::Result;

use anemone_geom::{Point, Size, point, size};

mod descent;
mod project;
mod vpsc;

use descent::Descent;
use project::BoundProjection;

pub use descent::CONVERGENCE_THRESHOLD;

pub const RIBBON_WIDTH: f64 = 8.0;
pub const RIBBON_SPACE: f64 = 2.0;
pub const RIBBON_EXTENT: f64 = RIBBON_WIDTH + RIBBON_SPACE;
pub const LINK_WIDTH: f64 = 3.0;
pub const NODE_OUTLINE: f64 = 4.0;
pub const NODE_SPACE: f64 = 2.0;
pub const NODE_MARGIN: f64 = 0.5 * NODE_OUTLINE + NODE_SPACE;
pub const BUFFER_SEGMENTS: usize = 5;
pub const LINK_SEGMENTS: usize = 10;

pub(crate) const EDGE_SPACE: f64 = 50.0;
pub(crate) const SET_EDGE_CONTRACTION: f64 = 0.5;

/// Iteration budget for the initial rough arrangement of a fresh layout.
pub const INITIAL_ITERATIONS: usize = 100_000;
/// Iteration budget per refinement batch.
pub const PHASE_ITERATIONS: usize = 10_000;

/// Extent of a drawn node label in the active font, including the outline
/// stroke; `padding` additionally reserves one line height of horizontal
/// slack for the rounded label ends.
pub fn label_dimensions(measure: &dyn TextMeasure, label: &str, padding: bool) -> Size {
    let bounds = measure.measure(label);
    size(
        bounds.width + if padding { bounds.height } else { 0.0 },
        bounds.height + NODE_OUTLINE,
    )
}

/// Padded label extent plus the free space each node claims around itself.
pub fn label_spaced_dimensions(measure: &dyn TextMeasure, label: &str) -> Size {
    let padded = label_dimensions(measure, label, true);
    size(
        padded.width + NODE_OUTLINE + NODE_SPACE,
        padded.height + NODE_OUTLINE + NODE_SPACE,
    )
}

/// A layout snapshot over a network and group selection. Positions refine
/// in place through [`Layout::run`]; everything derived (link control
/// points, contours) is computed from the current positions on demand.
pub struct Layout {
    pub network: Network,
    pub rich: RichGraph,
    descent: Descent,
}

impl Layout {
    /// Build a layout for `network` with the given annotations selected.
    /// Core node positions warm-start from `previous` when the node also
    /// appears there; dummy midpoints always start fresh.
    pub fn build(
        network: &Network,
        selected: &[&str],
        measure: &dyn TextMeasure,
        previous: Option<&Layout>,
    ) -> Result<Layout> {
        network.validate()?;
        let rich = RichGraph::build(network, selected, measure);

        let total = rich.nodes.len();
        let mut x = vec![0.0; total];
        let mut y = vec![0.0; total];
        if let Some(old) = previous {
            for (i, id) in rich.node_ids.iter().enumerate() {
                let p = old.position(id);
                x[i] = p.x;
                y[i] = p.y;
            }
        }

        let mut descent = Descent::new(x, y, rich.targets.clone());

        // Rough global arrangement: uniform weighting, no overlap handling.
        descent.run(INITIAL_ITERATIONS);

        // Refinement: de-emphasize indirect pairs (p-stress) and enforce
        // label separation after every iteration.
        descent.weights = Some(rich.weights.clone());
        descent.project = Some(BoundProjection::new(rich.radii.clone(), rich.m_d.clone()));
        descent.run(PHASE_ITERATIONS);

        let mut layout = Layout {
            network: network.clone(),
            rich,
            descent,
        };
        layout.normalize();
        Ok(layout)
    }

    /// One refinement batch. Returns true when the layout has settled and
    /// further batches would not move it.
    pub fn run(&mut self) -> bool {
        let converged = self.descent.run(PHASE_ITERATIONS);
        self.normalize();
        converged
    }

    /// Shift all positions so the bounding box rests at the origin.
    fn normalize(&mut self) {
        let min_x = self.descent.x.iter().copied().fold(f64::INFINITY, f64::min);
        let min_y = self.descent.y.iter().copied().fold(f64::INFINITY, f64::min);
        if !min_x.is_finite() || !min_y.is_finite() {
            return;
        }
        for v in &mut self.descent.x {
            *v -= min_x;
        }
        for v in &mut self.descent.y {
            *v -= min_y;
        }
    }

    /// Position of the named node; the origin for unknown ids.
    pub fn position(&self, id: &str) -> Point {
        match self.rich.id_to_idx.get(id) {
            Some(&i) => self.rich_position(i),
            None => point(0.0, 0.0),
        }
    }

    /// Position of any extended-rich-graph node by index.
    pub(crate) fn rich_position(&self, i: usize) -> Point {
        point(self.descent.x[i], self.descent.y[i])
    }

    /// Control points per rendered link: source, edge midpoint, target. A
    /// renderer draws each link as an arc through its three points.
    pub fn link_positions(&self) -> IndexMap<String, [Point; 3]> {
        let mut out = IndexMap::new();
        for edge in &self.rich.edges {
            let Some(link) = edge.link else {
                continue;
            };
            out.insert(
                self.network.links[link].id.clone(),
                [
                    self.rich_position(edge.a),
                    self.rich_position(edge.midpoint),
                    self.rich_position(edge.b),
                ],
            );
        }
        out
    }

    /// Ribbon and outline polygons per selected annotation, in selection
    /// order (smallest group first).
    pub fn contours(&self) -> IndexMap<String, Contours> {
        contour::build_all(self)
    }

    /// Extent of the normalized layout's bounding box.
    pub fn bounds(&self) -> Size {
        let max_x = self
            .descent
            .x
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);
        let max_y = self
            .descent
            .y
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);
        if max_x.is_finite() && max_y.is_finite() {
            size(max_x, max_y)
        } else {
            size(0.0, 0.0)
        }
    }
}
