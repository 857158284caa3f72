//! Render-agnostic graph description for a triple set: node roles, a
//! deterministic spring layout, and summary statistics.

pub mod error;
pub mod graph;
pub mod render;
pub mod spring;

pub use error::{LayoutError, Result};
pub use graph::{NodeRole, TripleGraph};
pub use render::{RenderOptions, render_png};
pub use spring::{LayoutConfig, spring_layout};

use extract::Triple;
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphNode {
    pub id: String,
    pub role: NodeRole,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NodeGroups {
    pub predicates: usize,
    pub subjects: usize,
    pub objects: usize,
    pub shared: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayoutStats {
    pub total_nodes: usize,
    pub total_edges: usize,
    pub node_groups: NodeGroups,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphLayout {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub stats: LayoutStats,
}

/// Lay out a triple set. Fails fast on an empty set or one whose node
/// count exceeds `config.max_nodes`.
pub fn layout(triples: &[Triple], config: &LayoutConfig) -> Result<GraphLayout> {
    if triples.is_empty() {
        return Err(LayoutError::Empty);
    }

    let graph = TripleGraph::from_triples(triples);
    if graph.node_count() > config.max_nodes {
        return Err(LayoutError::TooLarge {
            nodes: graph.node_count(),
            limit: config.max_nodes,
        });
    }

    let edge_idx: Vec<(usize, usize)> = graph.edges().collect();
    let positions = spring_layout(graph.node_count(), &edge_idx, config);

    let mut groups = NodeGroups::default();
    let nodes = graph
        .nodes
        .iter()
        .zip(&graph.roles)
        .zip(positions)
        .map(|((id, &role), (x, y))| {
            match role {
                NodeRole::Predicate => groups.predicates += 1,
                NodeRole::Subject => groups.subjects += 1,
                NodeRole::Object => groups.objects += 1,
                NodeRole::Shared => groups.shared += 1,
            }
            GraphNode {
                id: id.clone(),
                role,
                position: Position { x, y },
            }
        })
        .collect::<Vec<_>>();

    let edges: Vec<GraphEdge> = edge_idx
        .iter()
        .map(|&(a, b)| GraphEdge {
            source: graph.nodes[a].clone(),
            target: graph.nodes[b].clone(),
        })
        .collect();

    debug!(nodes = nodes.len(), edges = edges.len(), "Computed graph layout");

    Ok(GraphLayout {
        stats: LayoutStats {
            total_nodes: nodes.len(),
            total_edges: edges.len(),
            node_groups: groups,
        },
        nodes,
        edges,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str, p: &str, o: &str) -> Triple {
        Triple::new(s, p, o).unwrap()
    }

    #[test]
    fn single_triple() {
        let result = layout(&[t("WD-40", "is a", "Product")], &LayoutConfig::default()).unwrap();
        assert_eq!(result.stats.total_nodes, 3);
        assert_eq!(result.stats.total_edges, 2);
        assert_eq!(
            result.stats.node_groups,
            NodeGroups { predicates: 1, subjects: 1, objects: 1, shared: 0 }
        );
        assert!(result.nodes.iter().all(|n| n.position.x.is_finite() && n.position.y.is_finite()));
        assert_eq!(
            result.edges,
            vec![
                GraphEdge { source: "WD-40".into(), target: "is a".into() },
                GraphEdge { source: "is a".into(), target: "Product".into() },
            ]
        );
    }

    #[test]
    fn empty_and_oversized_inputs_fail_fast() {
        assert!(matches!(layout(&[], &LayoutConfig::default()), Err(LayoutError::Empty)));

        let triples: Vec<Triple> = (0..10).map(|i| t(&format!("s{i}"), "has", &format!("o{i}"))).collect();
        let config = LayoutConfig { max_nodes: 5, ..LayoutConfig::default() };
        assert!(matches!(
            layout(&triples, &config),
            Err(LayoutError::TooLarge { nodes: 21, limit: 5 })
        ));
    }

    #[test]
    fn repeated_calls_give_identical_coordinates() {
        let triples = vec![
            t("WD-40", "is a", "Product"),
            t("WD-40", "includes", "LVP"),
            t("LVP", "has", "CAS# 64742-47-8"),
            t("Isolated", "is located at", "Elsewhere"),
        ];
        let config = LayoutConfig::default();
        assert_eq!(layout(&triples, &config).unwrap(), layout(&triples, &config).unwrap());
    }

    #[test]
    fn serializes_roles_lowercase() {
        let result = layout(&[t("A", "has", "B")], &LayoutConfig::default()).unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["nodes"][1]["role"], "predicate");
        assert_eq!(json["stats"]["node_groups"]["subjects"], 1);
    }
}
