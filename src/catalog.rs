//! Course catalog adapter.
//!
//! A catalog lists courses with their prerequisites. Every prerequisite
//! becomes an edge from the prerequisite to the course that requires it.

use serde::{Deserialize, Serialize};

use crate::error::LayoutError;
use crate::graph::{Edge, NodeSpec, Position};
use crate::layout::{self, LayoutConfig, Positions};

/// A course and the courses that must be taken before it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    /// Starting position. Courses without one are placed randomly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(default)]
    pub prerequisites: Vec<String>,
}

impl Course {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            position: None,
            prerequisites: Vec::new(),
        }
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.position = Some(Position::new(x, y));
        self
    }

    pub fn requires(mut self, prerequisite: impl Into<String>) -> Self {
        self.prerequisites.push(prerequisite.into());
        self
    }

    fn node(&self) -> NodeSpec {
        NodeSpec {
            id: self.id.clone(),
            position: self.position,
            fixed: false,
        }
    }

    fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.prerequisites
            .iter()
            .map(|prerequisite| Edge::new(prerequisite.as_str(), self.id.as_str()))
    }
}

/// Split a catalog into layout nodes and prerequisite edges.
///
/// Edges are listed course by course, in prerequisite order.
pub fn to_graph(courses: &[Course]) -> (Vec<NodeSpec>, Vec<Edge>) {
    let nodes = courses.iter().map(Course::node).collect();
    let edges = courses.iter().flat_map(Course::edges).collect();
    (nodes, edges)
}

/// Lay out a course catalog.
///
/// A prerequisite naming a course missing from the catalog is rejected as an
/// unknown edge endpoint.
pub fn layout_courses(courses: &[Course], config: &LayoutConfig) -> Result<Positions, LayoutError> {
    let (nodes, edges) = to_graph(courses);
    layout::layout(nodes, &edges, config)
}
