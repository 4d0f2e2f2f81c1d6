//! Rich-graph construction: the base network extended with one synthetic
//! midpoint node per rendered edge and per-group minimum-spanning edges,
//! plus the distance/weight matrices the stress solver targets.

use std::collections::hash_map::Entry;

use nalgebra::DMatrix;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::graph::{Network, TextMeasure};
use crate::layout::{
    EDGE_SPACE, NODE_SPACE, RIBBON_EXTENT, SET_EDGE_CONTRACTION, label_dimensions,
    label_spaced_dimensions,
};

pub use anemone_geom::Size;

/// A node of the rich graph. `Core` wraps a real network node; `Dummy` is
/// the midpoint control point of one rich edge and is never aliased.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RichNodeKind {
    Core { node: usize },
    Dummy { edge: usize },
}

#[derive(Debug, Clone)]
pub struct RichNode {
    pub kind: RichNodeKind,
    /// Selection indices of the groups the underlying node belongs to, in
    /// ascending group-size order. Empty for `Dummy`.
    pub memberships: Vec<usize>,
}

#[derive(Debug, Clone)]
pub struct RichEdge {
    /// Core node indices of the endpoints.
    pub a: usize,
    pub b: usize,
    /// Target graph distance between the endpoints.
    pub weight: f64,
    /// True iff this edge mirrors a base network link.
    pub core: bool,
    /// Index of the mirrored link, present iff `core`.
    pub link: Option<usize>,
    /// Selection indices shared by both endpoints.
    pub memberships: Vec<usize>,
    /// Extended-graph index of this edge's dummy midpoint node.
    pub midpoint: usize,
}

/// One selected annotation, resolved to node indices. Members referencing
/// nodes absent from the network have already been logged and excluded.
#[derive(Debug, Clone)]
pub struct Selected {
    pub annotation: usize,
    pub id: String,
    pub members: Vec<usize>,
    pub member_set: FxHashSet<usize>,
}

#[derive(Debug, Clone)]
pub struct RichGraph {
    pub node_ids: Vec<String>,
    pub id_to_idx: FxHashMap<String, usize>,
    /// Selected annotations, sorted ascending by member count.
    pub selection: Vec<Selected>,
    /// Per core node, selection indices in selection order.
    pub node_memberships: Vec<Vec<usize>>,
    pub nodes: Vec<RichNode>,
    pub edges: Vec<RichEdge>,
    /// Deduplicated base link pairs `(min, max)` -> first link index.
    pub base_pairs: FxHashMap<(usize, usize), usize>,
    /// Half spaced label widths per core node (the label line radius).
    pub radii: Vec<f64>,
    /// Half spaced label heights per core node.
    pub dilations: Vec<f64>,
    /// Unpadded label boxes, for contour hulls.
    pub label_sizes: Vec<Size>,
    /// Pairwise minimum separation over core nodes.
    pub m_d: DMatrix<f64>,
    /// Shortest-path target distances over the extended rich graph.
    pub targets: DMatrix<f64>,
    /// Solver pair weights over the extended rich graph: 1 for direct
    /// neighbors (extended or base adjacency), 2 otherwise.
    pub weights: DMatrix<f64>,
}

impl RichGraph {
    pub fn build(network: &Network, selected: &[&str], measure: &dyn TextMeasure) -> RichGraph {
        let n = network.nodes.len();

        let node_ids: Vec<String> = network.nodes.iter().map(|n| n.id.clone()).collect();
        let id_to_idx: FxHashMap<String, usize> = node_ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), i))
            .collect();

        // Deduplicate links to one rendered instance per unordered pair.
        let mut base_pairs: FxHashMap<(usize, usize), usize> = FxHashMap::default();
        let mut base_pair_order: Vec<(usize, usize)> = Vec::new();
        for (li, link) in network.links.iter().enumerate() {
            let (Some(&s), Some(&t)) = (id_to_idx.get(&link.source), id_to_idx.get(&link.target))
            else {
                tracing::warn!(link = %link.id, "link references a node absent from the network; skipping");
                continue;
            };
            if s == t {
                continue;
            }
            let key = (s.min(t), s.max(t));
            if let Entry::Vacant(slot) = base_pairs.entry(key) {
                slot.insert(li);
                base_pair_order.push(key);
            }
        }

        // Resolve the selection; unknown annotations and unknown members are
        // logged and excluded, never fatal.
        let mut selection: Vec<Selected> = Vec::new();
        for id in selected {
            let Some(ai) = network.annotations.iter().position(|a| a.id == *id) else {
                tracing::warn!(
                    annotation = *id,
                    "selected annotation not present in network; skipping"
                );
                continue;
            };
            let mut members: Vec<usize> = Vec::new();
            let mut member_set: FxHashSet<usize> = FxHashSet::default();
            for m in &network.annotations[ai].members {
                match id_to_idx.get(m) {
                    Some(&v) => {
                        if member_set.insert(v) {
                            members.push(v);
                        }
                    }
                    None => tracing::warn!(
                        annotation = *id,
                        node = %m,
                        "annotation references a node absent from the network; excluding"
                    ),
                }
            }
            selection.push(Selected {
                annotation: ai,
                id: (*id).to_string(),
                members,
                member_set,
            });
        }
        // Smallest groups first, so nested ribbon bands draw from the most
        // nested group outward.
        selection.sort_by_key(|s| s.members.len());

        let mut node_memberships: Vec<Vec<usize>> = vec![Vec::new(); n];
        for (si, sel) in selection.iter().enumerate() {
            for &v in &sel.members {
                node_memberships[v].push(si);
            }
        }

        // Label extents: line radius (half width) and dilation (half height).
        let mut radii = vec![0.0; n];
        let mut dilations = vec![0.0; n];
        let mut label_sizes = Vec::with_capacity(n);
        for (i, node) in network.nodes.iter().enumerate() {
            let spaced = label_spaced_dimensions(measure, &node.label);
            radii[i] = 0.5 * spaced.width;
            dilations[i] = 0.5 * spaced.height;
            label_sizes.push(label_dimensions(measure, &node.label, false));
        }

        // Minimum pairwise separation from label boxes and group-membership
        // discrepancy.
        let mut m_d = DMatrix::zeros(n, n);
        for i in 0..n {
            for j in (i + 1)..n {
                let disc = discrepancy(&selection, &node_memberships, i, j);
                let sep =
                    dilations[i] + dilations[j] + 2.0 * NODE_SPACE + RIBBON_EXTENT * disc as f64;
                m_d[(i, j)] = sep;
                m_d[(j, i)] = sep;
            }
        }

        // Base distance matrix: shortest paths over links weighted by the
        // required edge spacing.
        let mut d = DMatrix::from_element(n, n, f64::INFINITY);
        for i in 0..n {
            d[(i, i)] = 0.0;
        }
        for &(s, t) in &base_pair_order {
            let w = EDGE_SPACE + m_d[(s, t)];
            d[(s, t)] = w;
            d[(t, s)] = w;
        }
        floyd_warshall(&mut d);

        // Per-group spanning edges: MST over the complete member subgraph
        // (zero weight where a base link already exists, forcing it in),
        // unioned with the base links among members.
        let mut span_sets: Vec<Vec<(usize, usize)>> = Vec::new();
        for sel in &selection {
            let mut span: Vec<(usize, usize)> = Vec::new();
            let mut span_seen: FxHashSet<(usize, usize)> = FxHashSet::default();
            for (ai, &u) in sel.members.iter().enumerate() {
                for &v in &sel.members[(ai + 1)..] {
                    let key = (u.min(v), u.max(v));
                    if base_pairs.contains_key(&key) && span_seen.insert(key) {
                        span.push(key);
                    }
                }
            }
            for key in prim_mst(&sel.members, |u, v| {
                if base_pairs.contains_key(&(u.min(v), u.max(v))) {
                    0.0
                } else {
                    d[(u, v)]
                }
            }) {
                if span_seen.insert(key) {
                    span.push(key);
                }
            }
            span_sets.push(span);
        }

        // Rich graph: all base edges, then group spanning edges. Duplicates
        // keep the already-present edge.
        let mut edges: Vec<RichEdge> = Vec::new();
        let mut pair_to_edge: FxHashMap<(usize, usize), usize> = FxHashMap::default();
        for &key in &base_pair_order {
            pair_to_edge.insert(key, edges.len());
            edges.push(RichEdge {
                a: key.0,
                b: key.1,
                weight: d[key],
                core: true,
                link: Some(base_pairs[&key]),
                memberships: Vec::new(),
                midpoint: 0,
            });
        }
        for span in &span_sets {
            for &key in span {
                if pair_to_edge.contains_key(&key) {
                    continue;
                }
                let base = d[key];
                let contraction = if base.is_finite() && base > 0.0 {
                    SET_EDGE_CONTRACTION / base
                } else {
                    0.0
                };
                // Never below the minimum vertex separation, so the solver
                // cannot collapse the endpoints onto each other.
                let weight = m_d[key].max(contraction);
                pair_to_edge.insert(key, edges.len());
                edges.push(RichEdge {
                    a: key.0,
                    b: key.1,
                    weight,
                    core: false,
                    link: None,
                    memberships: Vec::new(),
                    midpoint: 0,
                });
            }
        }
        for e in &mut edges {
            e.memberships = node_memberships[e.a]
                .iter()
                .copied()
                .filter(|&si| selection[si].member_set.contains(&e.b))
                .collect();
        }

        // Extended rich graph: one dummy midpoint per edge, each edge split
        // into two half-weight halves.
        let m = edges.len();
        let total = n + m;
        let mut nodes: Vec<RichNode> = Vec::with_capacity(total);
        for (i, ms) in node_memberships.iter().enumerate() {
            nodes.push(RichNode {
                kind: RichNodeKind::Core { node: i },
                memberships: ms.clone(),
            });
        }
        for (ei, e) in edges.iter_mut().enumerate() {
            e.midpoint = n + ei;
            nodes.push(RichNode {
                kind: RichNodeKind::Dummy { edge: ei },
                memberships: Vec::new(),
            });
        }

        let mut targets = DMatrix::from_element(total, total, f64::INFINITY);
        for i in 0..total {
            targets[(i, i)] = 0.0;
        }
        for e in &edges {
            let hw = 0.5 * e.weight;
            for (u, v) in [(e.a, e.midpoint), (e.midpoint, e.b)] {
                if hw < targets[(u, v)] {
                    targets[(u, v)] = hw;
                    targets[(v, u)] = hw;
                }
            }
        }
        floyd_warshall(&mut targets);

        // Pair weights: direct neighbors (extended or base adjacency) pull
        // at full strength, everything else is de-emphasized.
        let mut weights = DMatrix::from_element(total, total, 2.0);
        for i in 0..total {
            weights[(i, i)] = 0.0;
        }
        for e in &edges {
            for (u, v) in [(e.a, e.midpoint), (e.midpoint, e.b)] {
                weights[(u, v)] = 1.0;
                weights[(v, u)] = 1.0;
            }
        }
        for &(s, t) in &base_pair_order {
            weights[(s, t)] = 1.0;
            weights[(t, s)] = 1.0;
        }

        RichGraph {
            node_ids,
            id_to_idx,
            selection,
            node_memberships,
            nodes,
            edges,
            base_pairs,
            radii,
            dilations,
            label_sizes,
            m_d,
            targets,
            weights,
        }
    }

    /// Number of core (real) nodes; extended indices at or past this count
    /// are dummy midpoints.
    pub fn core_count(&self) -> usize {
        self.node_ids.len()
    }

    /// Count of selected groups containing exactly one of the two nodes.
    pub fn membership_discrepancy(&self, i: usize, j: usize) -> usize {
        discrepancy(&self.selection, &self.node_memberships, i, j)
    }
}

fn discrepancy(
    selection: &[Selected],
    node_memberships: &[Vec<usize>],
    i: usize,
    j: usize,
) -> usize {
    let mut disc = 0;
    for &si in &node_memberships[i] {
        if !selection[si].member_set.contains(&j) {
            disc += 1;
        }
    }
    for &si in &node_memberships[j] {
        if !selection[si].member_set.contains(&i) {
            disc += 1;
        }
    }
    disc
}

/// In-place Floyd-Warshall over a symmetric distance matrix.
fn floyd_warshall(d: &mut DMatrix<f64>) {
    let n = d.nrows();
    for k in 0..n {
        for i in 0..n {
            let dik = d[(i, k)];
            if !dik.is_finite() {
                continue;
            }
            for j in 0..n {
                let alt = dik + d[(k, j)];
                if alt < d[(i, j)] {
                    d[(i, j)] = alt;
                }
            }
        }
    }
}

/// Prim minimum spanning tree over a complete graph on `members`, returning
/// normalized `(min, max)` node pairs. Disconnected members (infinite
/// weights everywhere) yield a forest rather than an error.
fn prim_mst(members: &[usize], weight: impl Fn(usize, usize) -> f64) -> Vec<(usize, usize)> {
    let k = members.len();
    if k < 2 {
        return Vec::new();
    }

    let mut in_tree = vec![false; k];
    let mut cost = vec![f64::INFINITY; k];
    let mut parent = vec![usize::MAX; k];
    cost[0] = 0.0;

    let mut out = Vec::with_capacity(k - 1);
    for _ in 0..k {
        let mut u = usize::MAX;
        for v in 0..k {
            if !in_tree[v] && (u == usize::MAX || cost[v] < cost[u]) {
                u = v;
            }
        }
        in_tree[u] = true;
        if parent[u] != usize::MAX {
            let (a, b) = (members[parent[u]], members[u]);
            out.push((a.min(b), a.max(b)));
        }
        for v in 0..k {
            if !in_tree[v] {
                // Clamp infinite weights so members in other graph
                // components still get spanned (at maximal cost) instead of
                // being dropped from the tree.
                let w = weight(members[u], members[v]).min(1e18);
                if w < cost[v] {
                    cost[v] = w;
                    parent[v] = u;
                }
            }
        }
    }
    out
}
