//! Forces and the force registry.
//!
//! A force is a step function over the node buffer: given the current alpha
//! it accumulates velocity deltas and returns. Forces never move nodes
//! directly; the simulation driver integrates velocities after every force
//! has run.
//!
//! The registry keeps forces in insertion order so each step applies them in
//! the same sequence.

pub mod center;
pub mod link;
pub mod many_body;

pub use center::Center;
pub use link::Link;
pub use many_body::ManyBody;

use std::fmt;

use indexmap::IndexMap;

use crate::simulation::NodeBuffer;

/// Length of the displacement substituted for a zero-length separation.
pub(crate) const NUDGE: f64 = 1e-6;

/// A simulation force.
pub trait Force: Send {
    /// Accumulate this force's velocity deltas for one step.
    fn apply(&mut self, nodes: &mut NodeBuffer, alpha: f64);
}

impl<F> Force for F
where
    F: FnMut(&mut NodeBuffer, f64) + Send,
{
    fn apply(&mut self, nodes: &mut NodeBuffer, alpha: f64) {
        self(nodes, alpha)
    }
}

/// Deterministic tiny displacement used when two points coincide.
///
/// Successive keys are spread around the circle by the golden angle.
pub(crate) fn nudge(key: usize) -> (f64, f64) {
    const GOLDEN_ANGLE: f64 = 2.399_963_229_728_653;
    let angle = key as f64 * GOLDEN_ANGLE;
    (angle.cos() * NUDGE, angle.sin() * NUDGE)
}

/// Ordered mapping from force name to force.
#[derive(Default)]
pub struct ForceRegistry {
    forces: IndexMap<String, Box<dyn Force>>,
}

impl ForceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a force under `name`.
    ///
    /// Replacing an existing name keeps its position in the application
    /// order. Returns the replaced force, if any.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        force: impl Force + 'static,
    ) -> Option<Box<dyn Force>> {
        self.forces.insert(name.into(), Box::new(force))
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, name: impl Into<String>, force: impl Force + 'static) -> Self {
        self.insert(name, force);
        self
    }

    /// Unregister a force, preserving the order of the rest.
    pub fn remove(&mut self, name: &str) -> Option<Box<dyn Force>> {
        self.forces.shift_remove(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut (dyn Force + 'static)> {
        self.forces.get_mut(name).map(|force| force.as_mut())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.forces.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.forces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forces.is_empty()
    }

    /// Force names in application order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.forces.keys().map(String::as_str)
    }

    /// Apply every registered force once, in registration order.
    pub fn apply_all(&mut self, nodes: &mut NodeBuffer, alpha: f64) {
        for force in self.forces.values_mut() {
            force.apply(nodes, alpha);
        }
    }
}

impl fmt::Debug for ForceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Position;

    fn single_node() -> NodeBuffer {
        let mut nodes = NodeBuffer::default();
        nodes.push("A", Position::new(0.0, 0.0), false);
        nodes
    }

    #[test]
    fn test_registry_order() {
        let mut registry = ForceRegistry::new()
            .with("first", |nodes: &mut NodeBuffer, _alpha: f64| {
                nodes.add_velocity(0, 1.0, 0.0)
            })
            .with("second", |nodes: &mut NodeBuffer, _alpha: f64| {
                // Doubles whatever "first" produced this step.
                let (vx, _) = nodes.velocity(0);
                nodes.add_velocity(0, vx, 0.0)
            });

        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["first", "second"]);

        let mut nodes = single_node();
        registry.apply_all(&mut nodes, 1.0);
        assert_eq!(nodes.velocity(0), (2.0, 0.0));
    }

    #[test]
    fn test_replace_keeps_slot() {
        let noop = |_: &mut NodeBuffer, _: f64| {};
        let mut registry = ForceRegistry::new()
            .with("a", noop)
            .with("b", noop)
            .with("c", noop);

        assert!(registry.insert("a", noop).is_some());
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["a", "b", "c"]);

        assert!(registry.remove("b").is_some());
        assert!(registry.remove("b").is_none());
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["a", "c"]);
        assert_eq!(registry.len(), 2);
        assert!(registry.contains("c"));
        assert!(registry.get_mut("a").is_some());
    }

    #[test]
    fn test_alpha_passed_through() {
        let mut registry = ForceRegistry::new().with("scaled", |nodes: &mut NodeBuffer, alpha: f64| {
            nodes.add_velocity(0, alpha, alpha)
        });
        let mut nodes = single_node();
        registry.apply_all(&mut nodes, 0.25);
        assert_eq!(nodes.velocity(0), (0.25, 0.25));
    }

    #[test]
    fn test_nudge_is_tiny_and_deterministic() {
        for key in 0..16 {
            let (dx, dy) = nudge(key);
            assert!((dx.hypot(dy) - NUDGE).abs() < 1e-12);
            assert_eq!(nudge(key), (dx, dy));
        }
        assert_ne!(nudge(1), nudge(2));
    }
}
