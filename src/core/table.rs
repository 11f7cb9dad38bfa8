//! Fixed-size tables indexed by the closed region and target enumerations.
//!
//! Grouped forecast data used to live in nested maps keyed by strings; these
//! tables replace that with arrays indexed by [`RegionId`] and [`TargetId`],
//! so a missing cell is unrepresentable.

use crate::core::domain::{RegionId, TargetId, REGION_COUNT, TARGET_COUNT};

/// One value per region.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionTable<T> {
    cells: [T; REGION_COUNT],
}

impl<T: Default> Default for RegionTable<T> {
    fn default() -> Self {
        RegionTable { cells: std::array::from_fn(|_| T::default()) }
    }
}

impl<T: Default> RegionTable<T> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<T> RegionTable<T> {
    /// Build a table by evaluating `f` for every region.
    pub fn from_fn(mut f: impl FnMut(RegionId) -> T) -> Self {
        RegionTable { cells: std::array::from_fn(|i| f(RegionId::ALL[i])) }
    }

    pub fn get(&self, region: RegionId) -> &T {
        &self.cells[region.index()]
    }

    pub fn get_mut(&mut self, region: RegionId) -> &mut T {
        &mut self.cells[region.index()]
    }

    pub fn set(&mut self, region: RegionId, value: T) {
        self.cells[region.index()] = value;
    }

    pub fn iter(&self) -> impl Iterator<Item = (RegionId, &T)> {
        RegionId::ALL.into_iter().zip(self.cells.iter())
    }
}

/// One value per (region, target) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionTargetTable<T> {
    rows: [[T; TARGET_COUNT]; REGION_COUNT],
}

impl<T: Default> Default for RegionTargetTable<T> {
    fn default() -> Self {
        RegionTargetTable {
            rows: std::array::from_fn(|_| std::array::from_fn(|_| T::default())),
        }
    }
}

impl<T: Default> RegionTargetTable<T> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<T> RegionTargetTable<T> {
    /// Build a table by evaluating `f` for every (region, target) cell.
    pub fn from_fn(mut f: impl FnMut(RegionId, TargetId) -> T) -> Self {
        RegionTargetTable {
            rows: std::array::from_fn(|r| {
                std::array::from_fn(|t| f(RegionId::ALL[r], TargetId::ALL[t]))
            }),
        }
    }

    pub fn get(&self, region: RegionId, target: TargetId) -> &T {
        &self.rows[region.index()][target.index()]
    }

    pub fn get_mut(&mut self, region: RegionId, target: TargetId) -> &mut T {
        &mut self.rows[region.index()][target.index()]
    }

    pub fn set(&mut self, region: RegionId, target: TargetId, value: T) {
        self.rows[region.index()][target.index()] = value;
    }

    /// Iterate all cells in (region, target) canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (RegionId, TargetId, &T)> {
        RegionId::ALL.into_iter().zip(self.rows.iter()).flat_map(|(region, row)| {
            TargetId::ALL
                .into_iter()
                .zip(row.iter())
                .map(move |(target, cell)| (region, target, cell))
        })
    }
}
