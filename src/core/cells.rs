//! Sparse set of active world coordinates.

use std::collections::{HashMap, HashSet};

/// World coordinate `(x, y)`. The world is unbounded in every direction.
pub type Coord = (i64, i64);

/// The set of cells currently "on".
///
/// Only membership matters. The producer hands over a whole new set on every
/// update; nothing is merged or diffed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveCellSet {
    cells: HashSet<Coord>,
}

impl ActiveCellSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from the keys of a coordinate map, ignoring the values.
    pub fn from_keys<V>(map: &HashMap<Coord, V>) -> Self {
        map.keys().copied().collect()
    }

    pub fn insert(&mut self, coord: Coord) -> bool {
        self.cells.insert(coord)
    }

    pub fn contains(&self, coord: Coord) -> bool {
        self.cells.contains(&coord)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Coord> + '_ {
        self.cells.iter().copied()
    }

    /// Copy of the set with every coordinate shifted by `(dx, dy)`.
    pub fn translated(&self, dx: i64, dy: i64) -> Self {
        self.iter().map(|(x, y)| (x + dx, y + dy)).collect()
    }
}

impl FromIterator<Coord> for ActiveCellSet {
    fn from_iter<I: IntoIterator<Item = Coord>>(iter: I) -> Self {
        Self {
            cells: iter.into_iter().collect(),
        }
    }
}

impl From<HashSet<Coord>> for ActiveCellSet {
    fn from(cells: HashSet<Coord>) -> Self {
        Self { cells }
    }
}

impl Extend<Coord> for ActiveCellSet {
    fn extend<I: IntoIterator<Item = Coord>>(&mut self, iter: I) {
        self.cells.extend(iter);
    }
}
