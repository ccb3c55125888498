//! Edge type and related structures.
//!
//! Edges are directed connections between nodes, referenced by node id.
//! An edge never owns its endpoints; the graph model resolves them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A directed edge, e.g. prerequisite -> course.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    /// Id of the source node.
    #[serde(alias = "sourceId")]
    pub source: String,
    /// Id of the target node.
    #[serde(alias = "targetId")]
    pub target: String,
}

impl Edge {
    /// Create a new edge between two node ids.
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }

    /// Whether both ends reference the same node.
    #[inline]
    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source, self.target)
    }
}

impl<S: Into<String>, T: Into<String>> From<(S, T)> for Edge {
    fn from((source, target): (S, T)) -> Self {
        Self::new(source, target)
    }
}

/// Which end of an edge a reference points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeEnd {
    Source,
    Target,
}

impl fmt::Display for EdgeEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source => f.write_str("source"),
            Self::Target => f.write_str("target"),
        }
    }
}
