//! Centering force.
//!
//! Steers the centroid of all nodes toward a target point without changing
//! the layout's internal shape: every node receives the same velocity delta.

use super::Force;
use crate::graph::Position;
use crate::simulation::NodeBuffer;

/// Uniform pull of the layout's centroid toward `target`.
#[derive(Debug, Clone, Copy)]
pub struct Center {
    target: Position,
    strength: f64,
}

impl Center {
    pub fn new(target: Position) -> Self {
        Self {
            target,
            strength: 1.0,
        }
    }

    /// Scale the correction.
    pub fn strength(mut self, strength: f64) -> Self {
        self.strength = strength;
        self
    }

    pub fn target(&self) -> Position {
        self.target
    }
}

impl Force for Center {
    fn apply(&mut self, nodes: &mut NodeBuffer, alpha: f64) {
        let Some(centroid) = nodes.centroid() else {
            return;
        };
        let k = self.strength * alpha;
        let dx = (self.target.x - centroid.x) * k;
        let dy = (self.target.y - centroid.y) * k;
        for i in 0..nodes.len() {
            nodes.add_velocity(i, dx, dy);
        }
    }
}
