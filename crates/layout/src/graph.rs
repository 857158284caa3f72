use extract::Triple;
use petgraph::graphmap::DiGraphMap;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeRole {
    Subject,
    Predicate,
    Object,
    Shared,
}

impl NodeRole {
    /// Fill color used by the image renderer.
    pub fn fill(self) -> (u8, u8, u8) {
        match self {
            NodeRole::Predicate => (0xE6, 0xE6, 0xFA),
            NodeRole::Subject => (0x98, 0xFB, 0x98),
            NodeRole::Object => (0xFF, 0xB6, 0xC1),
            NodeRole::Shared => (0xDD, 0xA0, 0xDD),
        }
    }

    pub fn border(self) -> (u8, u8, u8) {
        match self {
            NodeRole::Predicate => (0x94, 0x00, 0xD3),
            NodeRole::Subject => (0x00, 0x64, 0x00),
            NodeRole::Object => (0xDC, 0x14, 0x3C),
            NodeRole::Shared => (0x80, 0x00, 0x80),
        }
    }
}

/// Directed graph over node texts. For every triple `(s, p, o)` it holds
/// the edges `s -> p` and `p -> o`; repeated edges collapse.
#[derive(Debug, Clone)]
pub struct TripleGraph {
    pub nodes: Vec<String>,
    pub node_to_idx: HashMap<String, usize>,
    pub roles: Vec<NodeRole>,
    pub graph: DiGraphMap<usize, ()>,
}

impl TripleGraph {
    pub fn from_triples(triples: &[Triple]) -> Self {
        let mut graph = Self {
            nodes: Vec::new(),
            node_to_idx: HashMap::new(),
            roles: Vec::new(),
            graph: DiGraphMap::new(),
        };

        let mut subjects = HashSet::new();
        let mut predicates = HashSet::new();
        let mut objects = HashSet::new();

        for triple in triples {
            let s = graph.add_node(&triple.subject);
            let p = graph.add_node(&triple.predicate);
            let o = graph.add_node(&triple.object);
            graph.graph.add_edge(s, p, ());
            graph.graph.add_edge(p, o, ());

            subjects.insert(s);
            predicates.insert(p);
            objects.insert(o);
        }

        graph.roles = (0..graph.nodes.len())
            .map(|idx| {
                if predicates.contains(&idx) {
                    NodeRole::Predicate
                } else if subjects.contains(&idx) && objects.contains(&idx) {
                    NodeRole::Shared
                } else if subjects.contains(&idx) {
                    NodeRole::Subject
                } else {
                    NodeRole::Object
                }
            })
            .collect();

        graph
    }

    fn add_node(&mut self, id: &str) -> usize {
        if let Some(&idx) = self.node_to_idx.get(id) {
            return idx;
        }
        let idx = self.nodes.len();
        self.nodes.push(id.to_string());
        self.node_to_idx.insert(id.to_string(), idx);
        self.graph.add_node(idx);
        idx
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Edges in insertion order, as node indices.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.graph.all_edges().map(|(a, b, _)| (a, b))
    }

    pub fn role_of(&self, id: &str) -> Option<NodeRole> {
        self.node_to_idx.get(id).map(|&idx| self.roles[idx])
    }
}
