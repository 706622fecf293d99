//! Exhaustive cross-check for the knowledge base.
//!
//! Encodes the revealed numbers as a SAT problem and asks, cell by cell,
//! whether each polarity is still possible. This is far more expensive than
//! the knowledge base's propagation and is only used to verify its claims.

use crate::Cell;
use itertools::Itertools;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use varisat::{CnfFormula, ExtendFormula, Lit, Solver, Var};

/// What every consistent mine layout agrees on for a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeducedState {
    ForcedMine,   // Every consistent layout has a mine here.
    ForcedSafe,   // No consistent layout has a mine here.
    Undetermined, // Layouts disagree.
}

/// Classifies every unrevealed cell bordering an observation.
///
/// `observations` maps each probed cell to its reported neighbour mine count.
/// Cells away from the frontier are absent from the result: nothing is known
/// about them.
pub fn analyze_observations(
    height: usize,
    width: usize,
    observations: &BTreeMap<Cell, usize>,
) -> anyhow::Result<BTreeMap<Cell, DeducedState>> {
    let mut solver = Solver::new();
    let mut var_map: HashMap<Cell, Var> = HashMap::new();
    let mut formula = CnfFormula::new();

    for (&cell, &count) in observations {
        let hidden: BTreeSet<Cell> = cell
            .neighbors(height, width)
            .filter(|neighbor| !observations.contains_key(neighbor))
            .collect();
        let lits: Vec<Lit> = hidden
            .iter()
            .map(|&neighbor| {
                let var = *var_map.entry(neighbor).or_insert_with(|| solver.new_var());
                Lit::from_var(var, true)
            })
            .collect();
        encode_exactly_k(&mut formula, &lits, count);
    }

    solver.add_formula(&formula);

    if !solver.solve()? {
        anyhow::bail!("observations admit no consistent mine layout");
    }

    let mut deductions = BTreeMap::new();
    for (&cell, &var) in &var_map {
        let mine_possible = solve_assuming(&mut solver, Lit::from_var(var, true));
        let safe_possible = solve_assuming(&mut solver, Lit::from_var(var, false));

        let state = match (mine_possible, safe_possible) {
            (true, true) => DeducedState::Undetermined,
            (true, false) => DeducedState::ForcedMine,
            (false, true) => DeducedState::ForcedSafe,
            (false, false) => anyhow::bail!("{} can be neither mine nor safe", cell),
        };
        deductions.insert(cell, state);
    }

    Ok(deductions)
}

fn solve_assuming(solver: &mut Solver, lit: Lit) -> bool {
    solver.assume(&[lit]);
    let result = solver.solve().unwrap_or(false);
    solver.assume(&[]);
    result
}

/// Exactly `k` of `lits` are true. Neighbourhoods have at most eight cells,
/// so the direct combination encoding stays small.
fn encode_exactly_k(formula: &mut CnfFormula, lits: &[Lit], k: usize) {
    if k > lits.len() {
        formula.add_clause(&[]);
        return;
    }

    // At most k: no k + 1 of them are all true.
    if k < lits.len() {
        for combo in lits.iter().copied().combinations(k + 1) {
            let clause: Vec<Lit> = combo.iter().map(|&lit| !lit).collect();
            formula.add_clause(&clause);
        }
    }

    // At least k: any n - k + 1 of them contain a true one.
    if k > 0 {
        for combo in lits.iter().copied().combinations(lits.len() - k + 1) {
            formula.add_clause(&combo);
        }
    }
}
