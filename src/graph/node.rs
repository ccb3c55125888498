//! Node input and snapshot types.
//!
//! Nodes are the vertices of the layout graph. Each node has:
//! - A caller-supplied string identifier, unique within one run
//! - An optional initial position
//! - A fixed flag (excluded from integration when true)

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A point in layout space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Position {
    /// Create a new position.
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another position.
    #[inline]
    pub fn distance_to(self, other: Position) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Whether both coordinates are finite.
    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}

impl From<(f64, f64)> for Position {
    #[inline]
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// Caller-side description of a node.
///
/// A node without a position is placed pseudo-randomly before the
/// simulation starts. Only positioned nodes may be fixed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "NodeRecord", into = "NodeRecord")]
pub struct NodeSpec {
    /// Unique node identifier.
    pub id: String,
    /// Initial position, if known.
    pub position: Option<Position>,
    /// Keep the node at its initial position.
    pub fixed: bool,
}

impl NodeSpec {
    /// Create an unplaced, free node.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            position: None,
            fixed: false,
        }
    }

    /// Set the initial position.
    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.position = Some(Position::new(x, y));
        self
    }

    /// Mark the node as fixed.
    pub fn fixed(mut self) -> Self {
        self.fixed = true;
        self
    }
}

impl From<&str> for NodeSpec {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for NodeSpec {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}

/// Row view of a single node's simulation state.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub fixed: bool,
}

impl Node {
    /// Current position.
    #[inline]
    pub fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }
}

/// Wire shape of a node: `{ id, x?, y?, fixed? }`.
///
/// `x` and `y` come together or not at all.
#[derive(Clone, Serialize, Deserialize)]
struct NodeRecord {
    id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    y: Option<f64>,
    #[serde(default)]
    fixed: bool,
}

impl TryFrom<NodeRecord> for NodeSpec {
    type Error = ValidationError;

    fn try_from(record: NodeRecord) -> Result<Self, Self::Error> {
        let position = match (record.x, record.y) {
            (Some(x), Some(y)) => Some(Position::new(x, y)),
            (None, None) => None,
            _ => return Err(ValidationError::PartialPosition(record.id)),
        };
        Ok(Self {
            id: record.id,
            position,
            fixed: record.fixed,
        })
    }
}

impl From<NodeSpec> for NodeRecord {
    fn from(spec: NodeSpec) -> Self {
        Self {
            id: spec.id,
            x: spec.position.map(|p| p.x),
            y: spec.position.map(|p| p.y),
            fixed: spec.fixed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_distance() {
        let a = Position::new(0.0, 0.0);
        let b = Position::new(3.0, 4.0);
        assert_eq!(a.distance_to(b), 5.0);
        assert_eq!(b.distance_to(a), 5.0);
    }

    #[test]
    fn test_position_display() {
        assert_eq!(format!("{}", Position::new(1.0, 2.5)), "(1.00, 2.50)");
    }

    #[test]
    fn test_position_finite() {
        assert!(Position::new(1.0, 2.0).is_finite());
        assert!(!Position::new(f64::NAN, 2.0).is_finite());
        assert!(!Position::new(0.0, f64::INFINITY).is_finite());
    }

    #[test]
    fn test_node_spec_builder() {
        let spec = NodeSpec::new("CS116").at(100.0, 50.0).fixed();
        assert_eq!(spec.id, "CS116");
        assert_eq!(spec.position, Some(Position::new(100.0, 50.0)));
        assert!(spec.fixed);

        let spec: NodeSpec = "CS117".into();
        assert_eq!(spec.position, None);
        assert!(!spec.fixed);
    }

    fn record(x: Option<f64>, y: Option<f64>) -> NodeRecord {
        NodeRecord {
            id: "CS116".to_string(),
            x,
            y,
            fixed: false,
        }
    }

    #[test]
    fn test_record_needs_both_coordinates() {
        let spec = NodeSpec::try_from(record(Some(1.0), Some(2.0))).unwrap();
        assert_eq!(spec.position, Some(Position::new(1.0, 2.0)));
        assert_eq!(NodeSpec::try_from(record(None, None)).unwrap().position, None);

        for half in [record(Some(1.0), None), record(None, Some(2.0))] {
            assert_eq!(
                NodeSpec::try_from(half).unwrap_err(),
                ValidationError::PartialPosition("CS116".to_string())
            );
        }
    }

    #[test]
    fn test_zero_is_a_position() {
        let spec = NodeSpec::try_from(record(Some(0.0), Some(0.0))).unwrap();
        assert_eq!(spec.position, Some(Position::new(0.0, 0.0)));
    }
}
