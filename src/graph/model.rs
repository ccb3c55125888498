//! GraphModel - validated topology for one layout run.
//!
//! The model stores the graph via petgraph's StableGraph and keeps an
//! id -> index map so edge endpoints resolve in O(1). Node indices are dense
//! (`0..node_count`) and double as slots in the simulation's SoA buffers.

use std::collections::HashMap;

use log::debug;
use petgraph::stable_graph::{NodeIndex, StableGraph};
use petgraph::{Directed, Direction};

use super::edge::{Edge, EdgeEnd};
use super::node::{NodeSpec, Position};
use crate::error::ValidationError;

/// The validated graph of one layout run.
///
/// This struct holds:
/// - Graph topology via petgraph (node weights are the caller's ids)
/// - The id -> index map built once at construction
/// - Resolved edge endpoints in input order
/// - Caller-supplied initial positions and fixed flags
#[derive(Debug, Clone)]
pub struct GraphModel {
    graph: StableGraph<String, (), Directed>,

    /// Map from caller id to petgraph NodeIndex
    index_of: HashMap<String, NodeIndex>,

    /// Resolved (source, target) slots, one per input edge
    edges: Vec<(usize, usize)>,

    /// Supplied initial positions, by slot
    initial: Vec<Option<Position>>,

    /// Fixed flags, by slot
    fixed: Vec<bool>,
}

impl GraphModel {
    /// Validate nodes and edges and build the model.
    ///
    /// No partial model is returned: the first violation aborts the build.
    pub fn build<I, N>(nodes: I, edges: &[Edge]) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = N>,
        N: Into<NodeSpec>,
    {
        let nodes = nodes.into_iter();
        let (lower, _) = nodes.size_hint();

        let mut graph = StableGraph::with_capacity(lower, edges.len());
        let mut index_of = HashMap::with_capacity(lower);
        let mut initial = Vec::with_capacity(lower);
        let mut fixed = Vec::with_capacity(lower);

        for spec in nodes {
            let spec: NodeSpec = spec.into();
            if index_of.contains_key(&spec.id) {
                return Err(ValidationError::DuplicateNode(spec.id));
            }
            match spec.position {
                Some(position) if !position.is_finite() => {
                    return Err(ValidationError::NonFinitePosition(spec.id));
                }
                None if spec.fixed => {
                    return Err(ValidationError::FixedWithoutPosition(spec.id));
                }
                _ => {}
            }

            let index = graph.add_node(spec.id.clone());
            index_of.insert(spec.id, index);
            initial.push(spec.position);
            fixed.push(spec.fixed);
        }

        let mut resolved = Vec::with_capacity(edges.len());
        for (i, edge) in edges.iter().enumerate() {
            let lookup = |id: &String, end: EdgeEnd| {
                index_of
                    .get(id)
                    .copied()
                    .ok_or_else(|| ValidationError::UnknownNode {
                        edge: i,
                        id: id.clone(),
                        end,
                    })
            };
            let source = lookup(&edge.source, EdgeEnd::Source)?;
            let target = lookup(&edge.target, EdgeEnd::Target)?;

            graph.add_edge(source, target, ());
            resolved.push((source.index(), target.index()));
        }

        debug!(
            node_count = graph.node_count(),
            edge_count = resolved.len();
            "Graph model built"
        );

        Ok(Self {
            graph,
            index_of,
            edges: resolved,
            initial,
            fixed,
        })
    }

    /// Get the number of nodes.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Get the number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Look up the slot of a node id.
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index_of.get(id).map(|index| index.index())
    }

    /// Get the id stored at a slot.
    pub fn id(&self, slot: usize) -> Option<&str> {
        self.graph
            .node_weight(NodeIndex::new(slot))
            .map(String::as_str)
    }

    /// Iterate over node ids in slot order.
    pub fn ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.graph.node_weights().map(String::as_str)
    }

    /// Resolve an edge's endpoints to slots.
    pub fn resolve(&self, edge: &Edge) -> Option<(usize, usize)> {
        Some((self.index_of(&edge.source)?, self.index_of(&edge.target)?))
    }

    /// Resolved (source, target) slots for every edge, in input order.
    pub fn edge_slots(&self) -> &[(usize, usize)] {
        &self.edges
    }

    /// Number of edge ends attached to a node (in + out).
    ///
    /// Self-loops count twice.
    pub fn degree(&self, slot: usize) -> usize {
        let index = NodeIndex::new(slot);
        self.graph.edges_directed(index, Direction::Outgoing).count()
            + self.graph.edges_directed(index, Direction::Incoming).count()
    }

    /// Degree of every node, in slot order.
    pub fn degrees(&self) -> Vec<usize> {
        let mut degrees = vec![0; self.node_count()];
        for &(source, target) in &self.edges {
            degrees[source] += 1;
            degrees[target] += 1;
        }
        degrees
    }

    /// Get neighbor ids of a node, ignoring edge direction.
    pub fn neighbors(&self, id: &str) -> Vec<&str> {
        self.index_of
            .get(id)
            .map(|&index| {
                self.graph
                    .neighbors_undirected(index)
                    .filter_map(|n| self.graph.node_weight(n).map(String::as_str))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Caller-supplied initial position of a slot.
    pub fn initial_position(&self, slot: usize) -> Option<Position> {
        self.initial.get(slot).copied().flatten()
    }

    /// Whether a slot is fixed in place.
    pub fn is_fixed(&self, slot: usize) -> bool {
        self.fixed.get(slot).copied().unwrap_or(false)
    }
}
