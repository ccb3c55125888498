//! Layout result.
//!
//! A [`Positions`] map holds one entry per laid-out node. A missing id means
//! "not laid out": renderers must skip such nodes and any edge touching them
//! rather than drawing them at the origin.

use indexmap::IndexMap;
use indexmap::map::Iter;
use serde::{Deserialize, Serialize};

use crate::graph::{Edge, Position};

/// Final node positions, in node input order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Positions {
    inner: IndexMap<String, Position>,
}

impl Positions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<String>, position: Position) {
        self.inner.insert(id.into(), position);
    }

    /// Position of a node, or None if it was not laid out.
    pub fn get(&self, id: &str) -> Option<Position> {
        self.inner.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.inner.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> Iter<'_, String, Position> {
        self.inner.iter()
    }

    /// Endpoints of an edge, if both are laid out.
    pub fn segment(&self, edge: &Edge) -> Option<(Position, Position)> {
        Some((self.get(&edge.source)?, self.get(&edge.target)?))
    }

    /// Mean of all positions.
    pub fn centroid(&self) -> Option<Position> {
        if self.inner.is_empty() {
            return None;
        }
        let n = self.inner.len() as f64;
        let (sx, sy) = self
            .inner
            .values()
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
        Some(Position::new(sx / n, sy / n))
    }

    /// Bounding box as (min, max) corners.
    pub fn bounds(&self) -> Option<(Position, Position)> {
        let mut values = self.inner.values();
        let first = *values.next()?;
        Some(values.fold((first, first), |(min, max), p| {
            (
                Position::new(min.x.min(p.x), min.y.min(p.y)),
                Position::new(max.x.max(p.x), max.y.max(p.y)),
            )
        }))
    }

    pub fn into_inner(self) -> IndexMap<String, Position> {
        self.inner
    }
}

impl<'a> IntoIterator for &'a Positions {
    type Item = (&'a String, &'a Position);
    type IntoIter = Iter<'a, String, Position>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.iter()
    }
}

impl FromIterator<(String, Position)> for Positions {
    fn from_iter<T: IntoIterator<Item = (String, Position)>>(iter: T) -> Self {
        Self {
            inner: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Positions {
        [
            ("A".to_string(), Position::new(0.0, 0.0)),
            ("B".to_string(), Position::new(10.0, 20.0)),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_missing_id_is_absent() {
        let positions = sample();
        assert_eq!(positions.get("A"), Some(Position::new(0.0, 0.0)));
        assert_eq!(positions.get("Z"), None);
        assert!(positions.contains("A"));
        assert!(!positions.contains("Z"));
    }

    #[test]
    fn test_segment_requires_both_ends() {
        let positions = sample();
        assert_eq!(
            positions.segment(&Edge::new("A", "B")),
            Some((Position::new(0.0, 0.0), Position::new(10.0, 20.0)))
        );
        assert_eq!(positions.segment(&Edge::new("A", "Z")), None);
    }

    #[test]
    fn test_centroid_and_bounds() {
        let positions = sample();
        assert_eq!(positions.centroid(), Some(Position::new(5.0, 10.0)));
        assert_eq!(
            positions.bounds(),
            Some((Position::new(0.0, 0.0), Position::new(10.0, 20.0)))
        );
        assert_eq!(Positions::new().centroid(), None);
        assert_eq!(Positions::new().bounds(), None);
    }

    #[test]
    fn test_keeps_input_order() {
        let mut positions = Positions::new();
        positions.insert("Z", Position::default());
        positions.insert("A", Position::default());
        let ids: Vec<_> = positions.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["Z", "A"]);
    }
}
