//! Error types for layout runs.
//!
//! [`ValidationError`] covers malformed graph input and is raised before any
//! simulation state exists. [`LayoutError`] is what the layout facade returns.

use thiserror::Error;

use crate::graph::EdgeEnd;

/// Graph input rejected while building the graph model.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("duplicate node id `{0}`")]
    DuplicateNode(String),

    #[error("edge #{edge} references unknown {end} node `{id}`")]
    UnknownNode { edge: usize, id: String, end: EdgeEnd },

    #[error("node `{0}` is fixed but has no position")]
    FixedWithoutPosition(String),

    #[error("node `{0}` has a non-finite position")]
    NonFinitePosition(String),

    #[error("node `{0}` has only one of `x` and `y`")]
    PartialPosition(String),
}

/// The error type returned by the layout facade.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("invalid layout configuration: {0}")]
    InvalidConfig(String),

    /// The run was abandoned between steps. No positions are produced.
    #[error("layout run was cancelled")]
    Cancelled,
}
