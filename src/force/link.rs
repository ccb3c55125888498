//! Link (spring) force.
//!
//! Pulls or pushes the endpoints of every edge toward a target separation.
//! Each correction is split between the two endpoints by degree, so a hub
//! moves less per shared edge than the leaves attached to it.

use super::{Force, nudge};
use crate::graph::GraphModel;
use crate::simulation::NodeBuffer;

/// Default target separation between linked nodes.
pub const DEFAULT_DISTANCE: f64 = 150.0;

#[derive(Debug, Clone, Copy)]
struct LinkSpring {
    source: usize,
    target: usize,
    /// Share of the correction applied to the target.
    bias: f64,
    /// `1 / min(deg(source), deg(target))`.
    default_strength: f64,
}

/// Spring force along graph edges.
#[derive(Debug, Clone)]
pub struct Link {
    springs: Vec<LinkSpring>,
    distance: f64,
    strength: Option<f64>,
    iterations: usize,
}

impl Link {
    /// Build springs for every edge of the model.
    ///
    /// Self-loops are skipped: a node cannot be displaced from itself.
    pub fn new(model: &GraphModel) -> Self {
        let degrees = model.degrees();
        let springs = model
            .edge_slots()
            .iter()
            .filter(|(source, target)| source != target)
            .map(|&(source, target)| {
                let ds = degrees[source] as f64;
                let dt = degrees[target] as f64;
                LinkSpring {
                    source,
                    target,
                    bias: ds / (ds + dt),
                    default_strength: 1.0 / ds.min(dt),
                }
            })
            .collect();

        Self {
            springs,
            distance: DEFAULT_DISTANCE,
            strength: None,
            iterations: 1,
        }
    }

    /// Set the target separation.
    pub fn distance(mut self, distance: f64) -> Self {
        self.distance = distance;
        self
    }

    /// Override the degree-based strength of every spring.
    pub fn strength(mut self, strength: f64) -> Self {
        self.strength = Some(strength);
        self
    }

    /// Number of relaxation passes per step.
    pub fn iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations.max(1);
        self
    }

    /// Number of springs (non-self-loop edges).
    pub fn len(&self) -> usize {
        self.springs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.springs.is_empty()
    }
}

impl Force for Link {
    fn apply(&mut self, nodes: &mut NodeBuffer, alpha: f64) {
        for _ in 0..self.iterations {
            for (k, spring) in self.springs.iter().enumerate() {
                let source = nodes.predicted(spring.source);
                let target = nodes.predicted(spring.target);

                let mut dx = target.x - source.x;
                let mut dy = target.y - source.y;
                if dx == 0.0 && dy == 0.0 {
                    (dx, dy) = nudge(k);
                }

                let length = dx.hypot(dy);
                let strength = self.strength.unwrap_or(spring.default_strength);
                let scale = (length - self.distance) / length * alpha * strength;
                dx *= scale;
                dy *= scale;

                let bias = spring.bias;
                nodes.add_velocity(spring.target, -dx * bias, -dy * bias);
                nodes.add_velocity(spring.source, dx * (1.0 - bias), dy * (1.0 - bias));
            }
        }
    }
}
