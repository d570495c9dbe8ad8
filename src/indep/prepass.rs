use std::collections::HashSet;

use log::debug;

use crate::sat::solver::CoreSolver;
use super::frontier::Frontier;
use super::gadgets::Gadgets;

/// Runs one round of the solver's own in-processing (here: unit propagation
/// to a fixpoint) and then shrinks `Unknown` two ways, both unconditionally
/// safe:
///
/// - any `v` whose indicator `d_v` is already fixed false at the ground
///   level can never be witnessed as essential, so it moves straight to
///   `NotIndep`;
/// - any two still-Unknown `v`, `w` the solver has proven equivalent carry
///   the same information, so one of the pair is dropped.
pub fn run(solver: &mut CoreSolver, gadgets: &Gadgets, frontier: &mut Frontier) {
    solver.simplify("zero-assigned + binary-equivalences");

    let zero_fixed: HashSet<_> = solver.zero_assigned_lits().into_iter().map(|l| l.var()).collect();
    let mut to_drop = Vec::new();
    for &v in frontier.unknown() {
        if zero_fixed.contains(&gadgets.indicator(v)) {
            to_drop.push(v);
        }
    }

    let unknown_set: HashSet<_> = frontier.unknown().iter().copied().collect();
    for (l1, l2) in solver.binary_equivalences() {
        let (v1, v2) = (l1.var(), l2.var());
        if v1 == v2 || to_drop.contains(&v1) || to_drop.contains(&v2) {
            continue;
        }
        if unknown_set.contains(&v1) && unknown_set.contains(&v2) {
            to_drop.push(v2);
        }
    }

    if !to_drop.is_empty() {
        debug!("pre-pass dropped {} variables from Unknown", to_drop.len());
        frontier.move_many_to_not_indep(&to_drop);
    }
}
