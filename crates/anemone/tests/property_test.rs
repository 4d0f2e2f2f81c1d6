//! Property tests over randomly generated small networks.

use anemone::{Annotation, ApproxTextMeasure, Layout, Link, Network, Node, RichGraph};
use proptest::prelude::*;

#[derive(Clone, Debug)]
struct SmallNetwork {
    nodes: usize,
    links: Vec<(usize, usize)>,
    group: Vec<usize>,
}

fn small_network_strategy() -> impl Strategy<Value = SmallNetwork> {
    (2usize..=8)
        .prop_flat_map(|nodes| {
            (
                Just(nodes),
                proptest::collection::vec((0..nodes, 0..nodes), 0..12),
                proptest::collection::vec(0..nodes, 0..nodes),
            )
        })
        .prop_map(|(nodes, links, group)| SmallNetwork {
            nodes,
            links: links.into_iter().filter(|(a, b)| a != b).collect(),
            group,
        })
}

fn materialize(shape: &SmallNetwork) -> Network {
    Network {
        nodes: (0..shape.nodes)
            .map(|i| Node {
                id: format!("n{i}"),
                label: format!("n{i}"),
                score: 0.0,
            })
            .collect(),
        links: shape
            .links
            .iter()
            .enumerate()
            .map(|(i, (a, b))| Link {
                id: format!("e{i}"),
                source: format!("n{a}"),
                target: format!("n{b}"),
            })
            .collect(),
        annotations: vec![Annotation {
            id: "g".to_string(),
            members: shape.group.iter().map(|i| format!("n{i}")).collect(),
        }],
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    #[test]
    fn distance_and_weight_matrices_are_symmetric(shape in small_network_strategy()) {
        let net = materialize(&shape);
        let rich = RichGraph::build(&net, &["g"], &ApproxTextMeasure::default());

        let total = rich.nodes.len();
        for i in 0..total {
            prop_assert_eq!(rich.targets[(i, i)], 0.0);
            for j in 0..total {
                prop_assert_eq!(rich.targets[(i, j)], rich.targets[(j, i)]);
                prop_assert_eq!(rich.weights[(i, j)], rich.weights[(j, i)]);
            }
        }
        for i in 0..rich.core_count() {
            for j in 0..rich.core_count() {
                prop_assert_eq!(rich.m_d[(i, j)], rich.m_d[(j, i)]);
            }
        }
    }

    #[test]
    fn discrepancy_is_unchanged_by_duplicate_groups(shape in small_network_strategy()) {
        let mut net = materialize(&shape);
        net.annotations.push(Annotation {
            id: "g2".to_string(),
            members: net.annotations[0].members.clone(),
        });
        let measure = ApproxTextMeasure::default();
        let one = RichGraph::build(&net, &["g"], &measure);
        let two = RichGraph::build(&net, &["g2"], &measure);
        for i in 0..one.core_count() {
            for j in 0..one.core_count() {
                prop_assert_eq!(
                    one.membership_discrepancy(i, j),
                    two.membership_discrepancy(i, j)
                );
            }
        }
    }

    #[test]
    fn settled_layouts_keep_labels_apart(shape in small_network_strategy()) {
        let net = materialize(&shape);
        let measure = ApproxTextMeasure::default();
        let mut layout = Layout::build(&net, &["g"], &measure, None).unwrap();
        for _ in 0..10 {
            if layout.run() {
                break;
            }
        }

        // Nearest distance between label line segments must respect the
        // required separation, modulo projection slack for arrangements the
        // axis-decoupled solver cannot fully untangle in one pass.
        let rich = &layout.rich;
        for i in 0..rich.core_count() {
            let pi = layout.position(&net.nodes[i].id);
            for j in (i + 1)..rich.core_count() {
                let pj = layout.position(&net.nodes[j].id);
                let gap = segment_distance(
                    (pi.x - rich.radii[i], pi.x + rich.radii[i], pi.y),
                    (pj.x - rich.radii[j], pj.x + rich.radii[j], pj.y),
                );
                prop_assert!(
                    gap > 0.25 * rich.m_d[(i, j)],
                    "labels {i} and {j} collapsed: gap {} required {}",
                    gap,
                    rich.m_d[(i, j)]
                );
            }
        }
    }
}

/// Distance between two horizontal segments `(x_min, x_max, y)`.
fn segment_distance(a: (f64, f64, f64), b: (f64, f64, f64)) -> f64 {
    let dx = (a.0 - b.1).max(b.0 - a.1).max(0.0);
    let dy = (a.2 - b.2).abs();
    (dx * dx + dy * dy).sqrt()
}
