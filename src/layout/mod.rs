//! Layout facade.
//!
//! Turns caller-supplied nodes and edges into final positions: validates the
//! graph, places unpositioned nodes, registers the default forces (link,
//! charge, center), runs the simulation to convergence and exports the
//! result. Each call is independent; nothing is cached between runs.

mod config;
mod positions;

pub use config::{LayoutConfig, Viewport};
pub use positions::Positions;

use std::sync::atomic::AtomicBool;

use log::{debug, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::LayoutError;
use crate::force::{Center, ForceRegistry, Link, ManyBody};
use crate::graph::{Edge, GraphModel, NodeSpec, Position};
use crate::simulation::{NodeBuffer, Simulation};

/// Registry name of the link force.
pub const LINK_FORCE: &str = "link";
/// Registry name of the many-body force.
pub const CHARGE_FORCE: &str = "charge";
/// Registry name of the centering force.
pub const CENTER_FORCE: &str = "center";

/// Compute a layout.
///
/// Pure apart from seed selection: identical inputs with the same
/// `config.seed` produce identical positions.
pub fn layout<I, N>(nodes: I, edges: &[Edge], config: &LayoutConfig) -> Result<Positions, LayoutError>
where
    I: IntoIterator<Item = N>,
    N: Into<NodeSpec>,
{
    let mut simulation = prepare(nodes, edges, config)?;
    simulation.run();
    export(simulation)
}

/// Compute a layout, abandoning it if `cancel` becomes true between steps.
///
/// A cancelled run returns [`LayoutError::Cancelled`] and no positions.
pub fn layout_with_cancel<I, N>(
    nodes: I,
    edges: &[Edge],
    config: &LayoutConfig,
    cancel: &AtomicBool,
) -> Result<Positions, LayoutError>
where
    I: IntoIterator<Item = N>,
    N: Into<NodeSpec>,
{
    let mut simulation = prepare(nodes, edges, config)?;
    simulation.run_with_cancel(cancel)?;
    export(simulation)
}

/// Validate input and assemble a ready-to-run simulation.
pub fn prepare<I, N>(nodes: I, edges: &[Edge], config: &LayoutConfig) -> Result<Simulation, LayoutError>
where
    I: IntoIterator<Item = N>,
    N: Into<NodeSpec>,
{
    config.validate()?;
    let model = GraphModel::build(nodes, edges).inspect_err(|err| {
        warn!(error:% = err; "Rejected layout input");
    })?;

    let seed = config.seed.unwrap_or_else(fresh_seed);
    debug!(
        node_count = model.node_count(),
        edge_count = model.edge_count(),
        seed = seed;
        "Starting layout run"
    );

    let mut rng = StdRng::seed_from_u64(seed);
    let nodes = place_nodes(&model, config, &mut rng)?;
    let forces = default_forces(&model, config);

    let mut simulation = Simulation::new(nodes, forces, config.simulation_state()?);
    if let Some(max_steps) = config.max_steps {
        simulation = simulation.with_max_steps(max_steps);
    }
    Ok(simulation)
}

/// The standard forces, in application order: link, charge, center.
pub fn default_forces(model: &GraphModel, config: &LayoutConfig) -> ForceRegistry {
    let mut link = Link::new(model)
        .distance(config.link_distance)
        .iterations(config.link_iterations);
    if let Some(strength) = config.link_strength {
        link = link.strength(strength);
    }

    // Config charge follows the negative-repels convention; ManyBody's
    // strength is positive for repulsion.
    let charge = ManyBody::new(-config.charge_strength)
        .theta(config.theta)
        .approximation_threshold(config.approximation_threshold);

    let center = Center::new(config.center_point()).strength(config.center_strength);

    ForceRegistry::new()
        .with(LINK_FORCE, link)
        .with(CHARGE_FORCE, charge)
        .with(CENTER_FORCE, center)
}

/// Fill a node buffer, placing nodes without a supplied position uniformly
/// at random in a square around the layout center.
///
/// See [`LayoutConfig::placement_radius`] for the size of the square. With a
/// zero radius every such node starts on the center.
pub fn place_nodes(
    model: &GraphModel,
    config: &LayoutConfig,
    rng: &mut StdRng,
) -> Result<NodeBuffer, LayoutError> {
    let n = model.node_count();
    let center = config.center_point();
    let radius = config.placement_radius(n)?;

    let mut nodes = NodeBuffer::with_capacity(n);
    for (slot, id) in model.ids().enumerate() {
        let position = model.initial_position(slot).unwrap_or_else(|| {
            if radius > 0.0 {
                Position::new(
                    center.x + rng.random_range(-radius..radius),
                    center.y + rng.random_range(-radius..radius),
                )
            } else {
                center
            }
        });
        nodes.push(id, position, model.is_fixed(slot));
    }
    Ok(nodes)
}

fn export(simulation: Simulation) -> Result<Positions, LayoutError> {
    let nodes = simulation.into_nodes().ok_or(LayoutError::Cancelled)?;
    Ok(nodes
        .iter_positions()
        .map(|(id, position)| (id.to_string(), position))
        .collect())
}

#[cfg(target_arch = "wasm32")]
fn fresh_seed() -> u64 {
    (js_sys::Math::random() * 9_007_199_254_740_992.0) as u64
}

#[cfg(not(target_arch = "wasm32"))]
fn fresh_seed() -> u64 {
    rand::random()
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicBool;

    use proptest::prelude::*;

    use super::*;
    use crate::error::ValidationError;

    fn path_edges() -> Vec<Edge> {
        vec![Edge::new("A", "B"), Edge::new("B", "C")]
    }

    fn seeded() -> LayoutConfig {
        LayoutConfig::default().with_seed(42)
    }

    fn distance(positions: &Positions, a: &str, b: &str) -> f64 {
        positions.get(a).unwrap().distance_to(positions.get(b).unwrap())
    }

    #[test]
    fn test_path_scenario() {
        let positions = layout(["A", "B", "C"], &path_edges(), &seeded()).unwrap();

        let ab = distance(&positions, "A", "B");
        let bc = distance(&positions, "B", "C");
        let ac = distance(&positions, "A", "C");
        assert!((120.0..=180.0).contains(&ab), "A-B = {ab}");
        assert!((120.0..=180.0).contains(&bc), "B-C = {bc}");
        assert!(ac > ab, "path folded: A-C = {ac}, A-B = {ab}");
    }

    #[test]
    fn test_unknown_edge_endpoint() {
        let err = layout(["A", "B"], &[Edge::new("A", "C")], &seeded()).unwrap_err();
        assert!(matches!(
            err,
            LayoutError::Validation(ValidationError::UnknownNode { ref id, .. }) if id == "C"
        ));
    }

    #[test]
    fn test_invalid_config_rejected_before_validation() {
        let config = seeded().with_alpha_decay(0.0);
        let err = layout(["A", "A"], &[], &config).unwrap_err();
        assert!(matches!(err, LayoutError::InvalidConfig(_)));
    }

    #[test]
    fn test_deterministic_with_seed() {
        let first = layout(["A", "B", "C"], &path_edges(), &seeded()).unwrap();
        let second = layout(["A", "B", "C"], &path_edges(), &seeded()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_seed_changes_only_placement() {
        let a = layout(["A", "B", "C"], &path_edges(), &seeded()).unwrap();
        let b = layout(["A", "B", "C"], &path_edges(), &LayoutConfig::default().with_seed(7)).unwrap();
        assert_ne!(a, b);
        // Both are still valid paths.
        for positions in [&a, &b] {
            let ab = distance(positions, "A", "B");
            assert!((120.0..=180.0).contains(&ab));
        }
    }

    #[test]
    fn test_empty_graph() {
        let positions = layout(Vec::<NodeSpec>::new(), &[], &seeded()).unwrap();
        assert!(positions.is_empty());
    }

    #[test]
    fn test_single_node_settles_at_center() {
        let positions = layout(["solo"], &[], &seeded()).unwrap();
        let p = positions.get("solo").unwrap();
        assert!(p.distance_to(Position::new(480.0, 300.0)) < 1.0, "{p}");
    }

    #[test]
    fn test_fixed_node_stays_put() {
        let nodes = vec![
            NodeSpec::new("A").at(100.0, 50.0).fixed(),
            NodeSpec::new("B"),
            NodeSpec::new("C"),
        ];
        // Centering would fight the pinned node for the centroid.
        let config = LayoutConfig {
            center_strength: 0.0,
            ..seeded()
        };
        let positions = layout(nodes, &path_edges(), &config).unwrap();
        assert_eq!(positions.get("A"), Some(Position::new(100.0, 50.0)));
        let ab = distance(&positions, "A", "B");
        assert!((120.0..=180.0).contains(&ab), "A-B = {ab}");
    }

    /// Lay out again from `previous`, returning the new positions and the
    /// summed movement of every node.
    fn relayout(previous: &Positions, edges: &[Edge]) -> (Positions, f64) {
        let placed: Vec<NodeSpec> = previous
            .iter()
            .map(|(id, p)| NodeSpec::new(id.as_str()).at(p.x, p.y))
            .collect();
        let next = layout(placed, edges, &seeded()).unwrap();
        let moved = previous
            .iter()
            .map(|(id, p)| p.distance_to(next.get(id).unwrap()))
            .sum();
        (next, moved)
    }

    #[test]
    fn test_relayout_is_stable() {
        let pair_edges = [Edge::new("A", "B")];
        let pair = layout(["A", "B"], &pair_edges, &seeded()).unwrap();
        let (_, moved) = relayout(&pair, &pair_edges);
        assert!(moved < 1e-6, "pair moved {moved}");

        let triangle_edges = [Edge::new("A", "B"), Edge::new("B", "C"), Edge::new("C", "A")];
        let triangle = layout(["A", "B", "C"], &triangle_edges, &seeded()).unwrap();
        let (_, moved) = relayout(&triangle, &triangle_edges);
        assert!(moved < 2.0, "triangle moved {moved}");
    }

    /// A path's bend is a soft mode: each re-layout straightens it a little
    /// more while link lengths hold and the ends never fold back.
    #[test]
    fn test_path_relayout_straightens() {
        let edges = path_edges();
        let mut current = layout(["A", "B", "C"], &edges, &seeded()).unwrap();
        let mut moves = Vec::new();

        for _ in 0..4 {
            let (next, moved) = relayout(&current, &edges);
            for (a, b) in [("A", "B"), ("B", "C")] {
                let d = distance(&next, a, b);
                assert!((120.0..=180.0).contains(&d), "{a}-{b} = {d}");
            }
            let (before, after) = (distance(&current, "A", "C"), distance(&next, "A", "C"));
            assert!(after > before - 0.5, "A-C shrank from {before} to {after}");
            moves.push(moved);
            current = next;
        }

        assert!(moves[0] < 100.0, "first re-layout moved {}", moves[0]);
        assert!(moves[3] < 20.0, "fourth re-layout moved {}", moves[3]);
        assert!(distance(&current, "A", "C") > 270.0);
    }

    #[test]
    fn test_coincident_start_does_not_collapse() {
        let ids: Vec<String> = (0..8).map(|i| format!("n{i}")).collect();
        let nodes: Vec<NodeSpec> = ids.iter().map(|id| NodeSpec::new(id.as_str()).at(480.0, 300.0)).collect();
        let edges: Vec<Edge> = ids[1..].iter().map(|id| Edge::new("n0", id.as_str())).collect();

        let positions = layout(nodes, &edges, &seeded()).unwrap();
        for (i, a) in ids.iter().enumerate() {
            for b in &ids[i + 1..] {
                let d = distance(&positions, a, b);
                assert!(d > 50.0, "{a} and {b} collapsed to {d}");
            }
        }
    }

    #[test]
    fn test_oversized_placement_rejected() {
        let config = LayoutConfig {
            initial_radius: 1e308,
            ..seeded()
        };
        let err = layout(["A", "B"], &[], &config).unwrap_err();
        assert!(matches!(err, LayoutError::InvalidConfig(_)));

        // Fully positioned graphs still scatter nothing, but the square is
        // checked all the same.
        let placed = [NodeSpec::new("A").at(0.0, 0.0), NodeSpec::new("B").at(10.0, 0.0)];
        assert!(layout(placed, &[], &config).is_err());
    }

    #[test]
    fn test_zero_radius_starts_on_center() {
        let model = GraphModel::build(["A", "B"], &[]).unwrap();
        let config = LayoutConfig {
            initial_radius: 0.0,
            ..seeded()
        };
        let mut rng = StdRng::seed_from_u64(3);
        let nodes = place_nodes(&model, &config, &mut rng).unwrap();
        assert_eq!(nodes.position(0), config.center_point());
        assert_eq!(nodes.position(1), config.center_point());

        // Coincident starts are separated by the forces.
        let positions = layout(["A", "B"], &[Edge::new("A", "B")], &config).unwrap();
        assert!(distance(&positions, "A", "B") > 100.0);
    }

    #[test]
    fn test_cancelled_run_has_no_result() {
        let cancel = AtomicBool::new(true);
        let result = layout_with_cancel(["A", "B"], &[Edge::new("A", "B")], &seeded(), &cancel);
        assert_eq!(result, Err(LayoutError::Cancelled));
    }

    #[test]
    fn test_step_cap() {
        let config = seeded().with_max_steps(5);
        let mut simulation = prepare(["A", "B"], &[Edge::new("A", "B")], &config).unwrap();
        simulation.run();
        assert_eq!(simulation.steps(), 5);
    }

    #[test]
    fn test_default_force_order() {
        let model = GraphModel::build(["A"], &[]).unwrap();
        let forces = default_forces(&model, &LayoutConfig::default());
        assert_eq!(
            forces.names().collect::<Vec<_>>(),
            vec![LINK_FORCE, CHARGE_FORCE, CENTER_FORCE]
        );
    }

    #[test]
    fn test_placement_around_center() {
        let model = GraphModel::build(["A", "B", "C", "D"], &[]).unwrap();
        let config = LayoutConfig::default().with_center(Position::new(0.0, 0.0));
        let mut rng = StdRng::seed_from_u64(1);
        let nodes = place_nodes(&model, &config, &mut rng).unwrap();

        assert_eq!(nodes.len(), 4);
        for i in 0..nodes.len() {
            let p = nodes.position(i);
            assert!(p.x.abs() <= 20.0 && p.y.abs() <= 20.0, "{p}");
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn same_seed_same_layout(
            seed in any::<u64>(),
            node_count in 1usize..7,
            raw_edges in prop::collection::vec((0usize..7, 0usize..7), 0..10),
        ) {
            let ids: Vec<String> = (0..node_count).map(|i| format!("n{i}")).collect();
            let edges: Vec<Edge> = raw_edges
                .iter()
                .map(|&(s, t)| Edge::new(ids[s % node_count].as_str(), ids[t % node_count].as_str()))
                .collect();
            let config = LayoutConfig::default().with_seed(seed);

            let first = layout(ids.iter().map(String::as_str), &edges, &config).unwrap();
            let second = layout(ids.iter().map(String::as_str), &edges, &config).unwrap();
            prop_assert_eq!(&first, &second);
            prop_assert_eq!(first.len(), node_count);
            for (_, position) in &first {
                prop_assert!(position.is_finite());
            }
        }
    }
}
