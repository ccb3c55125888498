//! Structure of Arrays node state for the simulation.
//!
//! Positions, velocities and fixed flags live in parallel vectors indexed by
//! the graph model's slots, so force loops stay cache-friendly.

use crate::graph::{Node, Position};

/// Mutable node state of one simulation run.
#[derive(Debug, Clone, Default)]
pub struct NodeBuffer {
    ids: Vec<String>,

    /// X positions (SoA layout)
    pos_x: Vec<f64>,

    /// Y positions (SoA layout)
    pos_y: Vec<f64>,

    /// X velocities (SoA layout)
    vel_x: Vec<f64>,

    /// Y velocities (SoA layout)
    vel_y: Vec<f64>,

    fixed: Vec<bool>,
}

impl NodeBuffer {
    /// Create an empty buffer with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            ids: Vec::with_capacity(capacity),
            pos_x: Vec::with_capacity(capacity),
            pos_y: Vec::with_capacity(capacity),
            vel_x: Vec::with_capacity(capacity),
            vel_y: Vec::with_capacity(capacity),
            fixed: Vec::with_capacity(capacity),
        }
    }

    /// Append a node at rest. Returns its slot.
    pub fn push(&mut self, id: impl Into<String>, position: Position, fixed: bool) -> usize {
        let slot = self.ids.len();
        self.ids.push(id.into());
        self.pos_x.push(position.x);
        self.pos_y.push(position.y);
        self.vel_x.push(0.0);
        self.vel_y.push(0.0);
        self.fixed.push(fixed);
        slot
    }

    /// Get the number of nodes.
    #[inline]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Check if the buffer holds no nodes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    #[inline]
    pub fn id(&self, slot: usize) -> &str {
        &self.ids[slot]
    }

    #[inline]
    pub fn position(&self, slot: usize) -> Position {
        Position::new(self.pos_x[slot], self.pos_y[slot])
    }

    #[inline]
    pub fn velocity(&self, slot: usize) -> (f64, f64) {
        (self.vel_x[slot], self.vel_y[slot])
    }

    /// Position extrapolated by the current velocity.
    #[inline]
    pub fn predicted(&self, slot: usize) -> Position {
        Position::new(
            self.pos_x[slot] + self.vel_x[slot],
            self.pos_y[slot] + self.vel_y[slot],
        )
    }

    #[inline]
    pub fn is_fixed(&self, slot: usize) -> bool {
        self.fixed[slot]
    }

    /// Accumulate a velocity delta.
    #[inline]
    pub fn add_velocity(&mut self, slot: usize, dx: f64, dy: f64) {
        self.vel_x[slot] += dx;
        self.vel_y[slot] += dy;
    }

    /// Overwrite a node's position.
    pub fn set_position(&mut self, slot: usize, position: Position) {
        self.pos_x[slot] = position.x;
        self.pos_y[slot] = position.y;
    }

    /// Get X positions slice.
    pub fn positions_x(&self) -> &[f64] {
        &self.pos_x
    }

    /// Get Y positions slice.
    pub fn positions_y(&self) -> &[f64] {
        &self.pos_y
    }

    /// Row snapshot of one node.
    pub fn node(&self, slot: usize) -> Node {
        Node {
            id: self.ids[slot].clone(),
            x: self.pos_x[slot],
            y: self.pos_y[slot],
            vx: self.vel_x[slot],
            vy: self.vel_y[slot],
            fixed: self.fixed[slot],
        }
    }

    /// Iterate over (id, position) pairs in slot order.
    pub fn iter_positions(&self) -> impl Iterator<Item = (&str, Position)> + '_ {
        self.ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.as_str(), Position::new(self.pos_x[i], self.pos_y[i])))
    }

    /// Mean position of all nodes, or None when empty.
    pub fn centroid(&self) -> Option<Position> {
        if self.is_empty() {
            return None;
        }
        let n = self.len() as f64;
        let sx: f64 = self.pos_x.iter().sum();
        let sy: f64 = self.pos_y.iter().sum();
        Some(Position::new(sx / n, sy / n))
    }

    /// Damp velocities and move free nodes; fixed nodes are brought to rest.
    pub fn integrate(&mut self, velocity_decay: f64) {
        for i in 0..self.ids.len() {
            if self.fixed[i] {
                self.vel_x[i] = 0.0;
                self.vel_y[i] = 0.0;
                continue;
            }
            self.vel_x[i] *= velocity_decay;
            self.vel_y[i] *= velocity_decay;
            self.pos_x[i] += self.vel_x[i];
            self.pos_y[i] += self.vel_y[i];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_snapshot() {
        let mut nodes = NodeBuffer::with_capacity(2);
        let a = nodes.push("A", Position::new(1.0, 2.0), false);
        let b = nodes.push("B", Position::new(3.0, 4.0), true);

        assert_eq!((a, b), (0, 1));
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes.id(1), "B");
        assert_eq!(nodes.positions_x(), &[1.0, 3.0]);
        assert_eq!(
            nodes.node(1),
            Node {
                id: "B".to_string(),
                x: 3.0,
                y: 4.0,
                vx: 0.0,
                vy: 0.0,
                fixed: true,
            }
        );
    }

    #[test]
    fn test_integrate_damps_and_moves() {
        let mut nodes = NodeBuffer::default();
        nodes.push("A", Position::new(0.0, 0.0), false);
        nodes.add_velocity(0, 10.0, -5.0);
        assert_eq!(nodes.predicted(0), Position::new(10.0, -5.0));

        nodes.integrate(0.5);
        assert_eq!(nodes.velocity(0), (5.0, -2.5));
        assert_eq!(nodes.position(0), Position::new(5.0, -2.5));
    }

    #[test]
    fn test_integrate_skips_fixed() {
        let mut nodes = NodeBuffer::default();
        nodes.push("A", Position::new(7.0, 7.0), true);
        nodes.add_velocity(0, 10.0, 10.0);

        nodes.integrate(0.6);
        assert_eq!(nodes.position(0), Position::new(7.0, 7.0));
        assert_eq!(nodes.velocity(0), (0.0, 0.0));
    }

    #[test]
    fn test_centroid() {
        let mut nodes = NodeBuffer::default();
        assert_eq!(nodes.centroid(), None);

        nodes.push("A", Position::new(0.0, 0.0), false);
        nodes.push("B", Position::new(4.0, 2.0), false);
        assert_eq!(nodes.centroid(), Some(Position::new(2.0, 1.0)));
    }
}
