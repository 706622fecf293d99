use crate::{Cell, Constraint};
use itertools::Itertools;
use log::{debug, trace, warn};
use rand::Rng;
use rand::seq::IndexedRandom;
use std::collections::{BTreeSet, HashSet};

/// Everything the player has learned about a board so far.
///
/// Holds the cells already probed, the cells proven safe or mined, and the
/// constraints still relating undetermined cells. Each new observation is
/// folded in and propagated to a fixpoint before control returns, so the
/// safe and mine sets are always as complete as the two inference rules
/// (direct extraction and subset difference) allow.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct KnowledgeBase {
    height: usize,
    width: usize,
    moves_made: BTreeSet<Cell>,
    safes: BTreeSet<Cell>,
    mines: BTreeSet<Cell>,
    constraints: Vec<Constraint>,
}

impl KnowledgeBase {
    pub fn new(height: usize, width: usize) -> Self {
        KnowledgeBase {
            height,
            width,
            moves_made: BTreeSet::new(),
            safes: BTreeSet::new(),
            mines: BTreeSet::new(),
            constraints: Vec::new(),
        }
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn moves_made(&self) -> &BTreeSet<Cell> {
        &self.moves_made
    }

    pub fn safes(&self) -> &BTreeSet<Cell> {
        &self.safes
    }

    pub fn mines(&self) -> &BTreeSet<Cell> {
        &self.mines
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Records `cell` as a mine and removes it from every constraint.
    pub fn mark_mine(&mut self, cell: Cell) -> anyhow::Result<()> {
        if self.safes.contains(&cell) {
            anyhow::bail!("{} is already known to be safe and cannot be a mine", cell);
        }
        if self.mines.insert(cell) {
            debug!("deduced mine at {}", cell);
        }
        for constraint in self.constraints.iter_mut() {
            constraint.mark_mine(cell)?;
        }
        Ok(())
    }

    /// Records `cell` as safe and removes it from every constraint.
    pub fn mark_safe(&mut self, cell: Cell) -> anyhow::Result<()> {
        if self.mines.contains(&cell) {
            anyhow::bail!("{} is already known to be a mine and cannot be safe", cell);
        }
        if self.safes.insert(cell) {
            debug!("deduced safe cell at {}", cell);
        }
        for constraint in self.constraints.iter_mut() {
            constraint.mark_safe(cell)?;
        }
        Ok(())
    }

    /// Folds in the report that the probed `cell` has `count` mined neighbours.
    ///
    /// 1. Marks the cell as a move made and as safe.
    /// 2. Builds a constraint over its undetermined neighbours, discounting
    ///    neighbours already known to be mines.
    /// 3. Propagates to a fixpoint.
    pub fn add_observation(&mut self, cell: Cell, count: usize) -> anyhow::Result<()> {
        if !cell.in_bounds(self.height, self.width) {
            anyhow::bail!(
                "observation at {} lies outside the {}x{} board",
                cell,
                self.height,
                self.width
            );
        }
        debug!("observed {} with {} neighbouring mines", cell, count);

        self.moves_made.insert(cell);
        self.mark_safe(cell)?;

        let mut remaining = count;
        let mut undetermined = BTreeSet::new();
        for neighbor in cell.neighbors(self.height, self.width) {
            if self.mines.contains(&neighbor) {
                remaining = remaining.checked_sub(1).ok_or_else(|| {
                    anyhow::anyhow!(
                        "{} reports {} mines but has more known mined neighbours",
                        cell,
                        count
                    )
                })?;
            } else if !self.safes.contains(&neighbor) && !self.moves_made.contains(&neighbor) {
                undetermined.insert(neighbor);
            }
        }

        self.add_constraint(Constraint::new(undetermined, remaining)?)
    }

    /// Adds a constraint from any source, reduced against what is already
    /// known, then propagates to a fixpoint.
    pub fn add_constraint(&mut self, mut constraint: Constraint) -> anyhow::Result<()> {
        let classified: Vec<Cell> = constraint
            .cells()
            .iter()
            .filter(|&&cell| self.mines.contains(&cell) || self.safes.contains(&cell))
            .copied()
            .collect();
        for cell in classified {
            if self.mines.contains(&cell) {
                constraint.mark_mine(cell)?;
            } else {
                constraint.mark_safe(cell)?;
            }
        }

        if constraint.is_empty() {
            if constraint.count() != 0 {
                anyhow::bail!(
                    "constraint expects {} mines among cells already resolved",
                    constraint.count()
                );
            }
        } else if !self.constraints.contains(&constraint) {
            trace!("adding constraint {}", constraint);
            self.constraints.push(constraint);
        }

        self.infer()
    }

    /// Applies extraction, pruning and subset inference until a full pass
    /// leaves the mines, safes and constraints untouched.
    pub fn infer(&mut self) -> anyhow::Result<()> {
        for pass in 1.. {
            let mines_before = self.mines.len();
            let safes_before = self.safes.len();
            let constraints_before = self.constraints.clone();

            self.apply_known_cells()?;
            self.prune()?;
            self.derive_from_subsets();

            trace!(
                "pass {}: {} mines, {} safes, {} constraints",
                pass,
                self.mines.len(),
                self.safes.len(),
                self.constraints.len()
            );

            if self.mines.len() == mines_before
                && self.safes.len() == safes_before
                && self.constraints == constraints_before
            {
                break;
            }
        }
        Ok(())
    }

    /// Returns a known-safe cell that has not been probed yet.
    pub fn safe_move(&self) -> Option<Cell> {
        self.safes.difference(&self.moves_made).next().copied()
    }

    /// Picks uniformly among cells that are neither probed nor known mines.
    pub fn random_move<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Cell> {
        let candidates: Vec<Cell> = Cell::all(self.height, self.width)
            .filter(|cell| !self.moves_made.contains(cell) && !self.mines.contains(cell))
            .collect();
        candidates.choose(rng).copied()
    }

    fn apply_known_cells(&mut self) -> anyhow::Result<()> {
        let mut new_mines = BTreeSet::new();
        let mut new_safes = BTreeSet::new();
        for constraint in &self.constraints {
            new_mines.extend(constraint.known_mines());
            new_safes.extend(constraint.known_safes());
        }

        for mine in new_mines {
            if !self.mines.contains(&mine) {
                self.mark_mine(mine)?;
            }
        }
        for safe in new_safes {
            if !self.safes.contains(&safe) {
                self.mark_safe(safe)?;
            }
        }
        Ok(())
    }

    /// Drops resolved constraints and duplicates left behind by reduction.
    fn prune(&mut self) -> anyhow::Result<()> {
        if let Some(broken) = self
            .constraints
            .iter()
            .find(|constraint| constraint.is_empty() && constraint.count() != 0)
        {
            anyhow::bail!(
                "every cell of a constraint was resolved but {} mines are unaccounted for",
                broken.count()
            );
        }

        let mut seen = HashSet::new();
        self.constraints
            .retain(|constraint| !constraint.is_empty() && seen.insert(constraint.clone()));
        Ok(())
    }

    fn derive_from_subsets(&mut self) {
        let existing: HashSet<&Constraint> = self.constraints.iter().collect();
        let mut derived = Vec::new();
        let mut derived_seen = HashSet::new();

        for (first, second) in self.constraints.iter().tuple_combinations() {
            for (subset, superset) in [(first, second), (second, first)] {
                if !subset.is_strict_subset_of(superset) {
                    continue;
                }
                match subset.difference_from(superset) {
                    Some(inferred) => {
                        if !existing.contains(&inferred) && derived_seen.insert(inferred.clone()) {
                            trace!("inferred {} from {} and {}", inferred, subset, superset);
                            derived.push(inferred);
                        }
                    }
                    None => warn!(
                        "skipping inconsistent inference from {} and {}",
                        subset, superset
                    ),
                }
            }
        }

        self.constraints.extend(derived);
    }
}
