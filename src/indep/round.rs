use log::trace;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::sat::formula::Var;
use crate::sat::solver::CoreSolver;
use super::formula_store::FormulaStore;
use super::frontier::Frontier;
use super::gadgets::Gadgets;
use super::query::{self, Verdict};

/// The closed set of query shapes the driver can issue. `Inverse` only ever
/// runs once, as the startup guess in `run_guess`; the main loop alternates
/// between `Many` (while the grouping factor `by` still batches more than
/// one variable per group) and `One` (once `by` has decayed to 1) — see the
/// schedule note in `indep::run`.
pub enum Mode {
    One,
    Many,
    Inverse,
}

/// A batch of Unknown variables sharing one selector. Built fresh every
/// round — selectors are append-only, so an old round's selector clauses
/// are simply left in the clause database once that group is no longer
/// referenced.
pub struct Group {
    pub selector: Var,
    pub members: Vec<Var>,
}

/// Sorts `members` by ascending clause incidence (stable on ties) and packs
/// them into groups of at most `by`, each with a fresh selector pinning its
/// members equal across the two formula copies when assumed. `seed` only
/// affects the order within an incidence tie — shuffle first, then a stable
/// sort keeps that shuffled order wherever incidence doesn't distinguish.
pub fn make_groups(solver: &mut CoreSolver, gadgets: &Gadgets, members: &[Var], by: usize, seed: u32) -> Vec<Group> {
    let incidence = solver.var_incidence();
    let mut sorted: Vec<Var> = members.to_vec();
    let mut rng = StdRng::seed_from_u64(seed as u64);
    sorted.shuffle(&mut rng);
    sorted.sort_by_key(|v| incidence[v.index()]);

    let chunk_size = by.max(1);
    let mut groups = Vec::with_capacity((sorted.len() + chunk_size - 1) / chunk_size.max(1));
    for chunk in sorted.chunks(chunk_size) {
        let selector = solver.new_var();
        for &v in chunk {
            let d = gadgets.indicator(v);
            solver.add_clause(&[!selector.pos_lit(), !d.pos_lit()]);
        }
        groups.push(Group { selector, members: chunk.to_vec() });
    }
    groups
}

/// `Many` mode: assume every active group's selector and `¬M` in one query.
/// An unsat core, by construction, must name at least one selector; every
/// selector it does *not* name can be retired and its whole group dropped
/// to `NotIndep` at once.
///
/// Retirement only removes the group from `Unknown`; it does *not* also
/// assert the group's selector as a permanent ground fact (see the note on
/// `run_one` below for why that would be unsound).
pub fn run_many(solver: &mut CoreSolver, gadgets: &Gadgets, frontier: &mut Frontier, groups: &[Group], by: usize) {
    let assumptions: Vec<_> = groups.iter().map(|g| g.selector.pos_lit()).chain(std::iter::once(!gadgets.m.pos_lit())).collect();

    match query::ask(solver, &assumptions, by) {
        Verdict::Unsat { core } => {
            for g in groups {
                if !core.contains(&g.selector) {
                    frontier.move_many_to_not_indep(&g.members);
                }
            }
        }
        Verdict::Sat | Verdict::Unknown => {
            trace!("many-mode query made no provable progress over {} groups", groups.len());
        }
    }
}

/// `One` mode: probe each not-yet-tried Unknown variable individually,
/// holding every *other* variable of the current candidate support
/// `Indep ∪ Unknown` equal across copies (per §4.1: the held-equal set is
/// `Indep ∪ Unknown \ {v*}`, not just `Unknown \ {v*}` — a variable only
/// determined with the help of an already-`Indep` variable must still be
/// judged redundant, or the returned support is not 1-minimal). Retired
/// (`NotIndep`) variables are left unconstrained — see below.
///
/// A retired variable's indicator is deliberately *not* asserted false as a
/// permanent ground clause. Doing so would make a variable's redundancy
/// proof (`C \ {v} determines v`, for the candidate support `C` at the time
/// of the test) silently feed into *later* tests as if it were still part
/// of the held-equal context, even after it has left `C`. For a cyclic
/// dependency (e.g. an XOR chain where every variable is determined by the
/// other three), that turns a single valid removal into an unsound cascade
/// that empties `Unknown` entirely. Leaving the indicator free and relying
/// solely on the variable's absence from `frontier.result()` keeps each
/// test scoped to the support as it stood at that moment, which is what the
/// invariant `Indep ∪ Unknown` being a valid support at every step actually
/// requires.
pub fn run_one(solver: &mut CoreSolver, gadgets: &Gadgets, store: &FormulaStore, frontier: &mut Frontier, by: usize) {
    let candidates: Vec<Var> = frontier.unknown().iter().copied().filter(|v| !frontier.is_tried(*v)).collect();

    for v in candidates {
        if frontier.status(v) != super::frontier::Status::Unknown {
            continue;
        }

        let mut assumptions: Vec<_> = frontier
            .result()
            .into_iter()
            .filter(|&w| w != v)
            .map(|w| !gadgets.indicator(w).pos_lit())
            .collect();
        assumptions.push(!gadgets.m.pos_lit());
        assumptions.push(v.pos_lit());
        assumptions.push(!store.primed(v).pos_lit());

        match query::ask(solver, &assumptions, by) {
            Verdict::Sat => frontier.move_to_indep(v),
            Verdict::Unsat { .. } => frontier.move_to_not_indep(v),
            Verdict::Unknown => frontier.mark_tried(v),
        }
    }
}

/// The one-shot startup guess: bet that a single large group of size `by`
/// already determines the rest of the sampling set.
pub fn run_guess(solver: &mut CoreSolver, gadgets: &Gadgets, frontier: &mut Frontier, by: usize, seed: u32) {
    let groups = make_groups(solver, gadgets, frontier.unknown(), by, seed);
    let guess = match groups.first() {
        Some(g) => g,
        None => return,
    };

    let assumptions = [guess.selector.pos_lit(), !gadgets.m.pos_lit()];
    match query::ask(solver, &assumptions, by) {
        Verdict::Unsat { .. } => {
            frontier.restrict_unknown_to(&guess.members);
        }
        Verdict::Sat | Verdict::Unknown => {}
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::sat::dimacs;

    /// 20 variables, `10..19` each forced equal to `0..9` via a binary
    /// equivalence. With the whole frontier as `Unknown`, `by=4` groups the
    /// determined half into three batches; one `Many`-mode query on all of
    /// them at once must retire every one of `10..19` to `NotIndep`.
    #[test]
    fn many_mode_drops_a_fully_determined_half_in_one_query() {
        let mut dimacs_text = String::from("p cnf 20 20\n");
        for i in 0..10u32 {
            let (a, b) = (i + 1, i + 11);
            dimacs_text.push_str(&format!("-{} {} 0\n{} -{} 0\n", a, b, a, b));
        }
        let cnf = dimacs::parse(&dimacs_text).unwrap();

        let (mut solver, store) = FormulaStore::build(&cnf);
        let all: Vec<Var> = (0..20).map(Var::from_index).collect();
        let gadgets = Gadgets::build(&mut solver, &store, &all);

        let snapshot = Arc::new(Mutex::new(Vec::new()));
        let mut frontier = Frontier::new(all, snapshot);
        for i in 0..10usize {
            frontier.move_to_indep(Var::from_index(i));
        }

        let redundant: Vec<Var> = frontier.unknown().to_vec();
        assert_eq!(redundant.len(), 10);

        let groups = make_groups(&mut solver, &gadgets, &redundant, 4, 0);
        assert_eq!(groups.len(), 3);

        run_many(&mut solver, &gadgets, &mut frontier, &groups, 4);

        assert!(frontier.unknown().is_empty());
        for i in 10..20usize {
            assert_eq!(frontier.status(Var::from_index(i)), super::super::frontier::Status::NotIndep);
        }
    }
}
