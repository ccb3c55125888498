//! Spatial partitioning for approximate n-body forces.
//!
//! This module provides a Barnes-Hut quadtree: far-away groups of nodes are
//! summarized by their center of mass so the many-body force runs in
//! O(n log n) instead of O(n²).

mod quadtree;

pub use quadtree::{Interaction, QuadTree};
