//! Course Graph - WASM Module
//!
//! Force-directed layout for course prerequisite graphs. Compiled to
//! WebAssembly and exposed to JavaScript via wasm-bindgen; the same API is
//! usable directly from Rust.
//!
//! # Architecture
//!
//! - `graph`: validated graph model on petgraph's StableGraph
//! - `spatial`: Barnes-Hut quadtree for the many-body approximation
//! - `force`: the `Force` trait, the ordered force registry and the
//!   link, many-body and center forces
//! - `simulation`: SoA node buffers, alpha decay and the step loop
//! - `layout`: configuration, initial placement and the layout facade
//! - `catalog`: course records to nodes and prerequisite edges

use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

pub mod catalog;
pub mod console;
pub mod error;
pub mod force;
pub mod graph;
pub mod layout;
pub mod simulation;
pub mod spatial;

pub use catalog::{Course, layout_courses};
pub use error::{LayoutError, ValidationError};
pub use graph::{Edge, NodeSpec, Position};
pub use layout::{LayoutConfig, Positions, layout, layout_with_cancel};

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    // A second start (e.g. module re-instantiation) keeps the first logger.
    let _ = console::install(level);
}

/// A node as JavaScript passes it: a bare id or `{ id, x?, y?, fixed? }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum NodeInput {
    Id(String),
    Spec(NodeSpec),
}

impl From<NodeInput> for NodeSpec {
    fn from(input: NodeInput) -> Self {
        match input {
            NodeInput::Id(id) => NodeSpec::new(id),
            NodeInput::Spec(spec) => spec,
        }
    }
}

fn from_js<T: for<'de> Deserialize<'de>>(value: JsValue, what: &str) -> Result<T, JsError> {
    serde_wasm_bindgen::from_value(value).map_err(|err| JsError::new(&format!("invalid {what}: {err}")))
}

fn config_from_js(config: JsValue) -> Result<LayoutConfig, JsError> {
    let config: Option<LayoutConfig> = from_js(config, "config")?;
    Ok(config.unwrap_or_default())
}

fn positions_to_js(positions: &Positions) -> Result<JsValue, JsError> {
    let serializer = serde_wasm_bindgen::Serializer::json_compatible();
    positions
        .serialize(&serializer)
        .map_err(|err| JsError::new(&err.to_string()))
}

/// Compute a force-directed layout.
///
/// `nodes` is an array of ids or `{ id, x?, y?, fixed? }` objects, `edges`
/// an array of `{ source, target }`. Returns `{ [id]: { x, y } }`.
///
/// # Errors
///
/// Throws on malformed input, duplicate ids, dangling edges or an invalid
/// configuration.
#[wasm_bindgen(js_name = computeLayout)]
pub fn compute_layout(nodes: JsValue, edges: JsValue, config: JsValue) -> Result<JsValue, JsError> {
    let nodes: Vec<NodeInput> = from_js(nodes, "nodes")?;
    let edges: Vec<Edge> = from_js(edges, "edges")?;
    let config = config_from_js(config)?;

    let positions = layout::layout(nodes, &edges, &config)?;
    positions_to_js(&positions)
}

/// Lay out a course catalog.
///
/// `courses` is an array of `{ id, position?, prerequisites }`.
#[wasm_bindgen(js_name = layoutCourses)]
pub fn layout_courses_js(courses: JsValue, config: JsValue) -> Result<JsValue, JsError> {
    let courses: Vec<Course> = from_js(courses, "courses")?;
    let config = config_from_js(config)?;

    let positions = catalog::layout_courses(&courses, &config)?;
    positions_to_js(&positions)
}

/// Upper bound on simulation steps for the given alpha parameters.
#[wasm_bindgen(js_name = stepBound)]
pub fn step_bound_js(alpha_min: f64, alpha_decay: f64) -> Result<usize, JsError> {
    let state = simulation::SimulationState::new(
        alpha_min,
        alpha_decay,
        simulation::DEFAULT_VELOCITY_DECAY,
    )?;
    Ok(state.step_bound())
}
