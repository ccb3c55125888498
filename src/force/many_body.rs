//! Many-body (charge) force.
//!
//! Every pair of nodes interacts with an inverse-square weighting of their
//! offset: the velocity delta applied to a node is
//! `-(other - node) * strength * alpha / distance²`, so a positive strength
//! pushes nodes apart and a negative one pulls them together.
//!
//! Small graphs are computed exactly. Above `approximation_threshold` nodes a
//! Barnes-Hut quadtree summarizes distant groups by their center of mass.

use super::{Force, nudge};
use crate::simulation::NodeBuffer;
use crate::spatial::{Interaction, QuadTree};

/// Default repulsion strength (the facade's `charge_strength` of -300).
pub const DEFAULT_STRENGTH: f64 = 300.0;

/// Default Barnes-Hut opening threshold.
pub const DEFAULT_THETA: f64 = 0.9;

/// Default node count above which the quadtree approximation is used.
pub const DEFAULT_APPROXIMATION_THRESHOLD: usize = 200;

/// Pairwise repulsion (or attraction) between all nodes.
#[derive(Debug, Clone)]
pub struct ManyBody {
    strength: f64,
    min_distance: f64,
    max_distance: Option<f64>,
    theta: f64,
    approximation_threshold: usize,
}

impl Default for ManyBody {
    fn default() -> Self {
        Self {
            strength: DEFAULT_STRENGTH,
            min_distance: 1.0,
            max_distance: None,
            theta: DEFAULT_THETA,
            approximation_threshold: DEFAULT_APPROXIMATION_THRESHOLD,
        }
    }
}

impl ManyBody {
    /// Create a many-body force with the given strength; positive repels.
    pub fn new(strength: f64) -> Self {
        Self {
            strength,
            ..Self::default()
        }
    }

    /// Distance floor below which the force stops growing.
    pub fn min_distance(mut self, distance: f64) -> Self {
        self.min_distance = distance.max(f64::MIN_POSITIVE);
        self
    }

    /// Ignore pairs at or beyond this distance.
    pub fn max_distance(mut self, distance: f64) -> Self {
        self.max_distance = Some(distance);
        self
    }

    /// Barnes-Hut opening threshold.
    pub fn theta(mut self, theta: f64) -> Self {
        self.theta = theta;
        self
    }

    /// Node count above which the quadtree approximation kicks in.
    pub fn approximation_threshold(mut self, threshold: usize) -> Self {
        self.approximation_threshold = threshold;
        self
    }

    /// Weighted offset `mass * delta / distance²` for one interaction.
    ///
    /// Zero offsets between two distinct bodies are replaced by an
    /// antisymmetric nudge; the squared distance is floored so nearby pairs
    /// get a bounded push instead of diverging.
    fn weigh(&self, node: usize, hit: Interaction) -> Option<(f64, f64)> {
        let Interaction { mut dx, mut dy, mass, other } = hit;
        let mut distance2 = dx * dx + dy * dy;

        if let Some(max) = self.max_distance {
            if distance2 >= max * max {
                return None;
            }
        }

        if distance2 == 0.0 {
            let other = other?;
            let (lo, hi) = if node < other { (node, other) } else { (other, node) };
            let (nx, ny) = nudge(lo.wrapping_mul(0x9E37_79B9).wrapping_add(hi));
            let sign = if node < other { 1.0 } else { -1.0 };
            dx = nx * sign;
            dy = ny * sign;
            distance2 = dx * dx + dy * dy;
        }

        let min2 = self.min_distance * self.min_distance;
        if distance2 < min2 {
            distance2 = (min2 * distance2).sqrt();
        }

        Some((dx * mass / distance2, dy * mass / distance2))
    }

    fn apply_exact(&self, nodes: &mut NodeBuffer, scale: f64) {
        let n = nodes.len();
        let xs = nodes.positions_x().to_vec();
        let ys = nodes.positions_y().to_vec();

        for i in 0..n {
            let (mut ax, mut ay) = (0.0, 0.0);
            for j in 0..n {
                if i == j {
                    continue;
                }
                let hit = Interaction {
                    dx: xs[j] - xs[i],
                    dy: ys[j] - ys[i],
                    mass: 1.0,
                    other: Some(j),
                };
                if let Some((wx, wy)) = self.weigh(i, hit) {
                    ax += wx;
                    ay += wy;
                }
            }
            nodes.add_velocity(i, -ax * scale, -ay * scale);
        }
    }

    fn apply_approximate(&self, nodes: &mut NodeBuffer, scale: f64) {
        let tree = QuadTree::build(nodes.positions_x(), nodes.positions_y());
        let xs = nodes.positions_x().to_vec();
        let ys = nodes.positions_y().to_vec();

        for i in 0..nodes.len() {
            let (mut ax, mut ay) = (0.0, 0.0);
            tree.visit(i, xs[i], ys[i], self.theta, |hit| {
                if let Some((wx, wy)) = self.weigh(i, hit) {
                    ax += wx;
                    ay += wy;
                }
            });
            nodes.add_velocity(i, -ax * scale, -ay * scale);
        }
    }
}

impl Force for ManyBody {
    fn apply(&mut self, nodes: &mut NodeBuffer, alpha: f64) {
        if nodes.len() < 2 || self.strength == 0.0 {
            return;
        }
        let scale = self.strength * alpha;
        if nodes.len() > self.approximation_threshold {
            self.apply_approximate(nodes, scale);
        } else {
            self.apply_exact(nodes, scale);
        }
    }
}
