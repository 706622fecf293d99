use crate::Cell;
use itertools::Itertools;
use std::collections::BTreeSet;

/// A logical statement about the board: exactly `count` of `cells` are mines.
///
/// Cells are kept in an ordered set, so two constraints over the same cells
/// with the same count compare, hash and order identically. The value doubles
/// as its own normalized key for deduplication.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Constraint {
    cells: BTreeSet<Cell>,
    count: usize,
}

impl Constraint {
    /// Builds a constraint. Duplicate cells collapse; order is irrelevant.
    pub fn new(cells: impl IntoIterator<Item = Cell>, count: usize) -> anyhow::Result<Self> {
        let cells: BTreeSet<Cell> = cells.into_iter().collect();
        if count > cells.len() {
            anyhow::bail!(
                "constraint claims {} mines among only {} cells",
                count,
                cells.len()
            );
        }
        Ok(Constraint { cells, count })
    }

    pub fn cells(&self) -> &BTreeSet<Cell> {
        &self.cells
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Every cell is a mine when the count covers all of them.
    pub fn known_mines(&self) -> BTreeSet<Cell> {
        if self.count > 0 && self.count == self.cells.len() {
            self.cells.clone()
        } else {
            BTreeSet::new()
        }
    }

    /// Every cell is safe when no mines remain to be placed.
    pub fn known_safes(&self) -> BTreeSet<Cell> {
        if self.count == 0 && !self.cells.is_empty() {
            self.cells.clone()
        } else {
            BTreeSet::new()
        }
    }

    /// Removes a cell known to be a mine; it accounted for one of the counted mines.
    pub fn mark_mine(&mut self, cell: Cell) -> anyhow::Result<()> {
        if !self.cells.contains(&cell) {
            return Ok(());
        }
        if self.count == 0 {
            anyhow::bail!("{} marked as a mine but {} allows no mines", cell, self);
        }
        self.cells.remove(&cell);
        self.count -= 1;
        Ok(())
    }

    /// Removes a cell known to be safe; the count is unaffected.
    pub fn mark_safe(&mut self, cell: Cell) -> anyhow::Result<()> {
        if !self.cells.contains(&cell) {
            return Ok(());
        }
        if self.count == self.cells.len() {
            anyhow::bail!("{} marked as safe but {} requires every cell to be a mine", cell, self);
        }
        self.cells.remove(&cell);
        Ok(())
    }

    pub fn is_strict_subset_of(&self, other: &Constraint) -> bool {
        self.cells.len() < other.cells.len() && self.cells.is_subset(&other.cells)
    }

    /// If `self` covers a strict subset of `other`, the mines outside that
    /// subset form a constraint of their own: `other - self = other.count - self.count`.
    ///
    /// Returns `None` when `self` is not a strict subset, or when the difference
    /// has a count outside `[0, |cells|]`.
    pub fn difference_from(&self, other: &Constraint) -> Option<Constraint> {
        if !self.is_strict_subset_of(other) {
            return None;
        }
        let count = other.count.checked_sub(self.count)?;
        let cells: BTreeSet<Cell> = other.cells.difference(&self.cells).copied().collect();
        if cells.is_empty() || count > cells.len() {
            return None;
        }
        Some(Constraint { cells, count })
    }
}

impl std::fmt::Display for Constraint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{{}}} = {}", self.cells.iter().join(", "), self.count)
    }
}
