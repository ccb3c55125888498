//! Layout configuration.
//!
//! Every field has a default, so callers (and JavaScript objects arriving
//! through serde) only spell out what they change.

use serde::{Deserialize, Serialize};

use crate::error::LayoutError;
use crate::force::link::DEFAULT_DISTANCE;
use crate::force::many_body::{DEFAULT_APPROXIMATION_THRESHOLD, DEFAULT_THETA};
use crate::graph::Position;
use crate::simulation::{
    DEFAULT_ALPHA_MIN, DEFAULT_ITERATIONS, DEFAULT_VELOCITY_DECAY, SimulationState,
    alpha_decay_for,
};

/// Size of the area positions are rendered into.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 960.0,
            height: 600.0,
        }
    }
}

impl Viewport {
    pub fn center(&self) -> Position {
        Position::new(self.width / 2.0, self.height / 2.0)
    }
}

/// Configuration for one layout run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    /// Target separation of linked nodes (default: 150).
    pub link_distance: f64,
    /// Spring strength; degree-based when unset.
    pub link_strength: Option<f64>,
    /// Link relaxation passes per step (default: 1).
    pub link_iterations: usize,
    /// Node charge; negative repels (default: -300).
    pub charge_strength: f64,
    /// Layout center; the viewport center when unset.
    pub center: Option<Position>,
    pub viewport: Viewport,
    /// Centering strength (default: 1.0).
    pub center_strength: f64,
    /// Energy below which the run is converged (default: 0.001).
    pub alpha_min: f64,
    /// Per-step energy decay; derived from `iterations` when unset.
    pub alpha_decay: Option<f64>,
    /// Target step count used to derive the default `alpha_decay` (default: 300).
    pub iterations: u32,
    /// Fraction of velocity kept each step (default: 0.6).
    pub velocity_decay: f64,
    /// Barnes-Hut opening threshold (default: 0.9).
    pub theta: f64,
    /// Node count above which repulsion is approximated (default: 200).
    pub approximation_threshold: usize,
    /// Caller-imposed cap on the number of steps.
    pub max_steps: Option<usize>,
    /// Seed for initial placement; fresh entropy when unset.
    pub seed: Option<u64>,
    /// Scale of the random initial placement (default: 10).
    pub initial_radius: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            link_distance: DEFAULT_DISTANCE,
            link_strength: None,
            link_iterations: 1,
            charge_strength: -300.0,
            center: None,
            viewport: Viewport::default(),
            center_strength: 1.0,
            alpha_min: DEFAULT_ALPHA_MIN,
            alpha_decay: None,
            iterations: DEFAULT_ITERATIONS,
            velocity_decay: DEFAULT_VELOCITY_DECAY,
            theta: DEFAULT_THETA,
            approximation_threshold: DEFAULT_APPROXIMATION_THRESHOLD,
            max_steps: None,
            seed: None,
            initial_radius: 10.0,
        }
    }
}

impl LayoutConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_link_distance(mut self, distance: f64) -> Self {
        self.link_distance = distance;
        self
    }

    pub fn with_charge_strength(mut self, strength: f64) -> Self {
        self.charge_strength = strength;
        self
    }

    pub fn with_center(mut self, center: Position) -> Self {
        self.center = Some(center);
        self
    }

    pub fn with_alpha_min(mut self, alpha_min: f64) -> Self {
        self.alpha_min = alpha_min;
        self
    }

    pub fn with_alpha_decay(mut self, alpha_decay: f64) -> Self {
        self.alpha_decay = Some(alpha_decay);
        self
    }

    pub fn with_velocity_decay(mut self, velocity_decay: f64) -> Self {
        self.velocity_decay = velocity_decay;
        self
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = Some(max_steps);
        self
    }

    /// Effective layout center.
    pub fn center_point(&self) -> Position {
        self.center.unwrap_or_else(|| self.viewport.center())
    }

    /// Effective alpha decay.
    pub fn alpha_decay(&self) -> f64 {
        self.alpha_decay
            .unwrap_or_else(|| alpha_decay_for(self.alpha_min, self.iterations))
    }

    /// Initial simulation state, validating the energy parameters.
    pub fn simulation_state(&self) -> Result<SimulationState, LayoutError> {
        SimulationState::new(self.alpha_min, self.alpha_decay(), self.velocity_decay)
    }

    /// Half-width of the square unpositioned nodes are scattered in, for a
    /// graph of `node_count` nodes.
    ///
    /// The radius grows with `sqrt(node_count)` so the initial density does
    /// not depend on graph size. Fails when the square is too large to
    /// sample or leaves the finite plane.
    pub fn placement_radius(&self, node_count: usize) -> Result<f64, LayoutError> {
        let radius = self.initial_radius * (node_count as f64).sqrt();
        let center = self.center_point();
        let reach = center.x.abs().max(center.y.abs()) + radius;
        if !(2.0 * radius).is_finite() || !reach.is_finite() {
            return Err(LayoutError::InvalidConfig(format!(
                "initial_radius {} is too large for {node_count} nodes",
                self.initial_radius
            )));
        }
        Ok(radius)
    }

    /// Check every numeric option.
    pub fn validate(&self) -> Result<(), LayoutError> {
        let invalid = |message: String| Err(LayoutError::InvalidConfig(message));

        if !self.link_distance.is_finite() || self.link_distance < 0.0 {
            return invalid(format!(
                "link_distance must be finite and >= 0, got {}",
                self.link_distance
            ));
        }
        if self.link_strength.is_some_and(|s| !s.is_finite()) {
            return invalid("link_strength must be finite".to_string());
        }
        for (name, value) in [
            ("charge_strength", self.charge_strength),
            ("center_strength", self.center_strength),
            ("initial_radius", self.initial_radius),
        ] {
            if !value.is_finite() {
                return invalid(format!("{name} must be finite, got {value}"));
            }
        }
        if self.initial_radius < 0.0 {
            return invalid(format!(
                "initial_radius must be >= 0, got {}",
                self.initial_radius
            ));
        }
        if !self.center_point().is_finite() {
            return invalid("center must be finite".to_string());
        }
        if !(self.theta > 0.0 && self.theta.is_finite()) {
            return invalid(format!("theta must be > 0, got {}", self.theta));
        }
        if self.iterations == 0 && self.alpha_decay.is_none() {
            return invalid("iterations must be > 0".to_string());
        }
        self.simulation_state().map(|_| ())
    }
}
