//! Simulation driver.
//!
//! The driver owns the node buffer and the force registry for one run and
//! advances them step by step:
//!
//! 1. Apply every registered force (registration order).
//! 2. Damp velocities and move every non-fixed node.
//! 3. Decay alpha toward `alpha_min`.
//!
//! The number of steps is bounded up front by [`step_bound`], so a run
//! always terminates no matter how the floating-point alpha behaves.

mod nodes;

pub use nodes::NodeBuffer;

use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, trace};

use crate::error::LayoutError;
use crate::force::ForceRegistry;

/// Default `alpha_min`.
pub const DEFAULT_ALPHA_MIN: f64 = 0.001;

/// Default number of steps to decay from 1.0 to `alpha_min`.
pub const DEFAULT_ITERATIONS: u32 = 300;

/// Default velocity retained per step.
pub const DEFAULT_VELOCITY_DECAY: f64 = 0.6;

/// Alpha decay that reaches `alpha_min` after `iterations` steps.
pub fn alpha_decay_for(alpha_min: f64, iterations: u32) -> f64 {
    1.0 - alpha_min.powf(1.0 / f64::from(iterations.max(1)))
}

/// Largest step bound a simulation accepts.
///
/// Parameters whose bound exceeds this (an `alpha_decay` around 1e-6 or
/// smaller) are rejected as invalid configuration.
pub const MAX_STEP_BOUND: usize = 1_000_000;

/// Number of steps for alpha to decay from 1.0 to `alpha_min`:
/// `ceil(ln(alpha_min) / ln(1 - alpha_decay))`.
///
/// Both arguments must lie in (0, 1). The result saturates at `usize::MAX`.
pub fn step_bound(alpha_min: f64, alpha_decay: f64) -> usize {
    steps_to_cool(alpha_min, alpha_decay) as usize
}

fn steps_to_cool(alpha_min: f64, alpha_decay: f64) -> f64 {
    // ln_1p keeps tiny decays from rounding 1 - alpha_decay to 1.
    let steps = alpha_min.ln() / (-alpha_decay).ln_1p();
    // Shave rounding noise so an exact 300.0000000001 still means 300.
    (steps - 1e-9).ceil().max(0.0)
}

/// Lifecycle of a simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Running,
    /// Alpha fell below `alpha_min` or the step bound was exhausted.
    Converged,
    /// A caller-imposed step cap ended the run first.
    StepLimitReached,
    Cancelled,
}

impl Status {
    /// Whether no further steps will be taken.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Running)
    }
}

/// Global simulation parameters and the current energy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationState {
    /// Current energy; starts at 1.0 and never increases.
    pub alpha: f64,
    pub alpha_min: f64,
    pub alpha_decay: f64,
    /// Fraction of velocity kept each step.
    pub velocity_decay: f64,
}

impl Default for SimulationState {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            alpha_min: DEFAULT_ALPHA_MIN,
            alpha_decay: alpha_decay_for(DEFAULT_ALPHA_MIN, DEFAULT_ITERATIONS),
            velocity_decay: DEFAULT_VELOCITY_DECAY,
        }
    }
}

impl SimulationState {
    /// Validate parameters and start at alpha = 1.0.
    pub fn new(alpha_min: f64, alpha_decay: f64, velocity_decay: f64) -> Result<Self, LayoutError> {
        let open_unit = |value: f64| value > 0.0 && value < 1.0;
        if !open_unit(alpha_min) {
            return Err(LayoutError::InvalidConfig(format!(
                "alpha_min must be in (0, 1), got {alpha_min}"
            )));
        }
        if !open_unit(alpha_decay) {
            return Err(LayoutError::InvalidConfig(format!(
                "alpha_decay must be in (0, 1), got {alpha_decay}"
            )));
        }
        if !(0.0..=1.0).contains(&velocity_decay) {
            return Err(LayoutError::InvalidConfig(format!(
                "velocity_decay must be in [0, 1], got {velocity_decay}"
            )));
        }
        let bound = steps_to_cool(alpha_min, alpha_decay);
        if !bound.is_finite() || bound > MAX_STEP_BOUND as f64 {
            return Err(LayoutError::InvalidConfig(format!(
                "alpha_decay {alpha_decay} needs {bound} steps to reach alpha_min {alpha_min}, \
                 more than {MAX_STEP_BOUND}"
            )));
        }
        Ok(Self {
            alpha: 1.0,
            alpha_min,
            alpha_decay,
            velocity_decay,
        })
    }

    /// Steps needed to decay from 1.0 to `alpha_min`.
    pub fn step_bound(&self) -> usize {
        step_bound(self.alpha_min, self.alpha_decay)
    }

    /// Move alpha one step toward `alpha_min`.
    fn decay(&mut self) {
        self.alpha += (self.alpha_min - self.alpha) * self.alpha_decay;
    }

    pub fn is_cold(&self) -> bool {
        self.alpha < self.alpha_min
    }
}

/// The simulation context of one layout run.
///
/// Owns the node buffer and the forces exclusively; forces borrow the buffer
/// mutably for the duration of their `apply` call only.
pub struct Simulation {
    nodes: NodeBuffer,
    forces: ForceRegistry,
    state: SimulationState,
    bound: usize,
    max_steps: Option<usize>,
    steps: usize,
    status: Status,
}

impl Simulation {
    /// Create a simulation over `nodes` driven by `forces`.
    pub fn new(nodes: NodeBuffer, forces: ForceRegistry, state: SimulationState) -> Self {
        let bound = state.step_bound();
        Self {
            nodes,
            forces,
            state,
            bound,
            max_steps: None,
            steps: 0,
            status: Status::Running,
        }
    }

    /// Cap the run at `max_steps`, ending in [`Status::StepLimitReached`]
    /// if the cap comes before the step bound.
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = Some(max_steps);
        self
    }

    pub fn nodes(&self) -> &NodeBuffer {
        &self.nodes
    }

    pub fn forces_mut(&mut self) -> &mut ForceRegistry {
        &mut self.forces
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn status(&self) -> Status {
        self.status
    }

    /// Steps taken so far.
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Precomputed number of steps to convergence.
    pub fn step_bound(&self) -> usize {
        self.bound
    }

    /// Advance one step. Does nothing once the run is terminal.
    pub fn step(&mut self) -> Status {
        if self.status.is_terminal() {
            return self.status;
        }
        if self.steps >= self.bound {
            self.status = Status::Converged;
            return self.status;
        }
        if self.max_steps.is_some_and(|cap| self.steps >= cap) {
            self.status = Status::StepLimitReached;
            return self.status;
        }

        self.forces.apply_all(&mut self.nodes, self.state.alpha);
        self.nodes.integrate(self.state.velocity_decay);
        self.state.decay();
        self.steps += 1;

        trace!(step = self.steps, alpha = self.state.alpha; "Simulation step");

        if self.state.is_cold() || self.steps >= self.bound {
            self.status = Status::Converged;
        } else if self.max_steps.is_some_and(|cap| self.steps >= cap) {
            self.status = Status::StepLimitReached;
        }
        self.status
    }

    /// Run synchronously until a terminal status.
    pub fn run(&mut self) -> Status {
        while !self.step().is_terminal() {}
        self.finish();
        self.status
    }

    /// Run like [`run`](Self::run), checking `cancel` once before each step.
    ///
    /// A cancelled run returns [`LayoutError::Cancelled`]; its node state
    /// must not be used.
    pub fn run_with_cancel(&mut self, cancel: &AtomicBool) -> Result<Status, LayoutError> {
        loop {
            if cancel.load(Ordering::Relaxed) {
                self.status = Status::Cancelled;
                debug!(steps = self.steps; "Simulation cancelled");
                return Err(LayoutError::Cancelled);
            }
            if self.step().is_terminal() {
                break;
            }
        }
        self.finish();
        Ok(self.status)
    }

    /// Consume a finished simulation, yielding its nodes.
    ///
    /// Returns None unless the run reached a terminal, non-cancelled status.
    pub fn into_nodes(self) -> Option<NodeBuffer> {
        match self.status {
            Status::Converged | Status::StepLimitReached => Some(self.nodes),
            Status::Running | Status::Cancelled => None,
        }
    }

    fn finish(&self) {
        debug!(
            steps = self.steps,
            bound = self.bound,
            alpha = self.state.alpha,
            status:? = self.status;
            "Simulation finished"
        );
    }
}
