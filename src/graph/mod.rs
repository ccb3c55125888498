//! Graph data structures.
//!
//! This module provides the validated graph model using petgraph's
//! StableGraph, with an explicit id -> index map so forces can resolve edge
//! endpoints without scanning the node set.

mod edge;
mod model;
mod node;

pub use edge::{Edge, EdgeEnd};
pub use model::GraphModel;
pub use node::{Node, NodeSpec, Position};
