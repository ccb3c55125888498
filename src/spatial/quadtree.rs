//! Arena-backed Barnes-Hut quadtree.
//!
//! Cells are stored in a flat vector and refer to their children by index.
//! Each cell records the number of bodies beneath it and their mean
//! position. Leaves keep the body indices themselves so that nearby
//! interactions are computed exactly.

/// Subdivision stops at this depth; deeper bodies share a leaf.
const MAX_DEPTH: u32 = 32;

const NO_CHILD: u32 = u32::MAX;

#[derive(Debug, Clone)]
struct Cell {
    /// Lower-left corner.
    x0: f64,
    y0: f64,
    /// Side length (cells are square).
    size: f64,
    /// Number of bodies in this subtree.
    mass: f64,
    /// Center of mass.
    cx: f64,
    cy: f64,
    children: [u32; 4],
    /// Bodies with their coordinates, leaves only.
    bodies: Vec<(usize, f64, f64)>,
}

impl Cell {
    fn is_leaf(&self) -> bool {
        self.children.iter().all(|&c| c == NO_CHILD)
    }

    fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x0 && x <= self.x0 + self.size && y >= self.y0 && y <= self.y0 + self.size
    }
}

/// One interaction seen from a body during traversal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interaction {
    /// Offset from the body to the other body or center of mass.
    pub dx: f64,
    pub dy: f64,
    /// Number of bodies represented (1 for an exact pair).
    pub mass: f64,
    /// The other body, for exact pairs.
    pub other: Option<usize>,
}

/// Barnes-Hut quadtree over a set of points.
#[derive(Debug, Clone, Default)]
pub struct QuadTree {
    cells: Vec<Cell>,
}

impl QuadTree {
    /// Build a tree over parallel coordinate slices.
    pub fn build(xs: &[f64], ys: &[f64]) -> Self {
        let count = xs.len().min(ys.len());
        if count == 0 {
            return Self::default();
        }

        let mut min_x = f64::INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        for i in 0..count {
            min_x = min_x.min(xs[i]);
            min_y = min_y.min(ys[i]);
            max_x = max_x.max(xs[i]);
            max_y = max_y.max(ys[i]);
        }
        let size = (max_x - min_x).max(max_y - min_y).max(1.0);

        let mut tree = Self {
            cells: Vec::with_capacity(count * 2),
        };
        let indices: Vec<usize> = (0..count).collect();
        tree.build_cell(xs, ys, indices, min_x, min_y, size, 0);
        tree
    }

    /// Number of cells in the arena.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Total number of bodies in the tree.
    pub fn mass(&self) -> f64 {
        self.cells.first().map_or(0.0, |root| root.mass)
    }

    #[allow(clippy::too_many_arguments)]
    fn build_cell(
        &mut self,
        xs: &[f64],
        ys: &[f64],
        bodies: Vec<usize>,
        x0: f64,
        y0: f64,
        size: f64,
        depth: u32,
    ) -> u32 {
        let mass = bodies.len() as f64;
        let cx = bodies.iter().map(|&i| xs[i]).sum::<f64>() / mass;
        let cy = bodies.iter().map(|&i| ys[i]).sum::<f64>() / mass;

        let slot = self.cells.len() as u32;
        self.cells.push(Cell {
            x0,
            y0,
            size,
            mass,
            cx,
            cy,
            children: [NO_CHILD; 4],
            bodies: Vec::new(),
        });

        let first = bodies[0];
        let coincident = bodies
            .iter()
            .all(|&i| xs[i] == xs[first] && ys[i] == ys[first]);
        if bodies.len() == 1 || coincident || depth >= MAX_DEPTH {
            self.cells[slot as usize].bodies =
                bodies.into_iter().map(|i| (i, xs[i], ys[i])).collect();
            return slot;
        }

        let half = size / 2.0;
        let mid_x = x0 + half;
        let mid_y = y0 + half;
        let mut quadrants: [Vec<usize>; 4] = Default::default();
        for i in bodies {
            let q = usize::from(xs[i] >= mid_x) | (usize::from(ys[i] >= mid_y) << 1);
            quadrants[q].push(i);
        }

        for (q, members) in quadrants.into_iter().enumerate() {
            if members.is_empty() {
                continue;
            }
            let qx = if q & 1 == 0 { x0 } else { mid_x };
            let qy = if q & 2 == 0 { y0 } else { mid_y };
            let child = self.build_cell(xs, ys, members, qx, qy, half, depth + 1);
            self.cells[slot as usize].children[q] = child;
        }
        slot
    }

    /// Visit every interaction of body `index` located at `(x, y)`.
    ///
    /// A cell not containing the body is summarized by its center of mass
    /// when `size / distance < theta`; otherwise it is opened. Leaves yield
    /// one exact interaction per body, excluding `index` itself. With
    /// `theta == 0` every interaction is exact.
    pub fn visit<F>(&self, index: usize, x: f64, y: f64, theta: f64, mut visitor: F)
    where
        F: FnMut(Interaction),
    {
        if self.cells.is_empty() {
            return;
        }
        let theta2 = theta * theta;
        let mut stack = vec![0u32];

        while let Some(slot) = stack.pop() {
            let cell = &self.cells[slot as usize];

            if cell.is_leaf() {
                for &(other, ox, oy) in &cell.bodies {
                    if other == index {
                        continue;
                    }
                    visitor(Interaction {
                        dx: ox - x,
                        dy: oy - y,
                        mass: 1.0,
                        other: Some(other),
                    });
                }
                continue;
            }

            let dx = cell.cx - x;
            let dy = cell.cy - y;
            let distance2 = dx * dx + dy * dy;
            if !cell.contains(x, y) && cell.size * cell.size < theta2 * distance2 {
                visitor(Interaction {
                    dx,
                    dy,
                    mass: cell.mass,
                    other: None,
                });
                continue;
            }

            stack.extend(cell.children.iter().rev().filter(|&&c| c != NO_CHILD));
        }
    }
}
