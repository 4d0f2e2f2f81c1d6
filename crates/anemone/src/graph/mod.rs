//! Input network model: nodes, undirected links, and overlapping node
//! groups ("annotations"), plus the label-size oracle the host supplies.

use rustc_hash::FxHashSet;

use crate::error::{Error, Result};

pub use anemone_geom::Size;

#[derive(Debug, Clone)]
pub struct Node {
    pub id: String,
    pub label: String,
    pub score: f64,
}

/// Undirected link between two nodes. Links whose endpoint pair duplicates
/// an earlier link collapse to the first rendered instance.
#[derive(Debug, Clone)]
pub struct Link {
    pub id: String,
    pub source: String,
    pub target: String,
}

/// A node group. Groups may overlap arbitrarily; a node can belong to zero
/// or more of them.
#[derive(Debug, Clone)]
pub struct Annotation {
    pub id: String,
    pub members: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Network {
    pub nodes: Vec<Node>,
    pub links: Vec<Link>,
    pub annotations: Vec<Annotation>,
}

impl Network {
    /// Reject links whose endpoints are not in the node set. Annotations
    /// referencing unknown nodes are deliberately not an error here; the
    /// layout logs and skips those entries.
    pub fn validate(&self) -> Result<()> {
        let node_exists: FxHashSet<&str> = self.nodes.iter().map(|n| n.id.as_str()).collect();
        for link in &self.links {
            if !node_exists.contains(link.source.as_str())
                || !node_exists.contains(link.target.as_str())
            {
                return Err(Error::MissingEndpoint {
                    link_id: link.id.clone(),
                });
            }
        }
        Ok(())
    }

    /// Sub-network over the given nodes: keeps links with both endpoints
    /// retained and annotations intersecting the retained set (with their
    /// member lists filtered down).
    pub fn induce_from_nodes(&self, keep: &[&str]) -> Network {
        let kept: FxHashSet<&str> = keep.iter().copied().collect();
        Network {
            nodes: self
                .nodes
                .iter()
                .filter(|n| kept.contains(n.id.as_str()))
                .cloned()
                .collect(),
            links: self
                .links
                .iter()
                .filter(|l| kept.contains(l.source.as_str()) && kept.contains(l.target.as_str()))
                .cloned()
                .collect(),
            annotations: self
                .annotations
                .iter()
                .filter(|a| a.members.iter().any(|m| kept.contains(m.as_str())))
                .map(|a| Annotation {
                    id: a.id.clone(),
                    members: a
                        .members
                        .iter()
                        .filter(|m| kept.contains(m.as_str()))
                        .cloned()
                        .collect(),
                })
                .collect(),
        }
    }

    /// Sub-network spanned by the members of the given annotations.
    pub fn induce_from_annotations(&self, keep: &[&str]) -> Network {
        let wanted: FxHashSet<&str> = keep.iter().copied().collect();
        let mut seen: FxHashSet<&str> = FxHashSet::default();
        let mut nodes: Vec<&str> = Vec::new();
        for a in &self.annotations {
            if !wanted.contains(a.id.as_str()) {
                continue;
            }
            for m in &a.members {
                if seen.insert(m.as_str()) {
                    nodes.push(m.as_str());
                }
            }
        }
        self.induce_from_nodes(&nodes)
    }
}

/// Label-size oracle: maps a label string to its rendered extent in the
/// active font. Text metrics are a UI-toolkit concern, so the host supplies
/// this at the engine boundary.
pub trait TextMeasure {
    fn measure(&self, label: &str) -> Size;
}

/// Headless fallback measure with a constant per-character advance. Good
/// enough for tests and for hosts without font access.
#[derive(Debug, Clone, Copy)]
pub struct ApproxTextMeasure {
    pub char_width: f64,
    pub line_height: f64,
}

impl Default for ApproxTextMeasure {
    fn default() -> Self {
        Self {
            char_width: 7.2,
            line_height: 16.0,
        }
    }
}

impl TextMeasure for ApproxTextMeasure {
    fn measure(&self, label: &str) -> Size {
        anemone_geom::size(
            label.chars().count() as f64 * self.char_width,
            self.line_height,
        )
    }
}
