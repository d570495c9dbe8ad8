use crate::sat::formula::{Var, VarMap};
use crate::sat::solver::CoreSolver;
use super::formula_store::FormulaStore;

/// The indicator/disjunction scaffolding built once over the initial
/// sampling set. `d_v` says "the two copies disagree on `v`"; `m` says "they
/// disagree somewhere in `S`".
pub struct Gadgets {
    indicator: VarMap<Var>,
    pub m: Var,
}

impl Gadgets {
    pub fn build(solver: &mut CoreSolver, store: &FormulaStore, sampling_set: &[Var]) -> Gadgets {
        let mut indicator = VarMap::new();
        let mut disjuncts = Vec::with_capacity(sampling_set.len());

        for &v in sampling_set {
            let vp = store.primed(v);
            let d = solver.new_var();

            // d ↔ (v ⊕ vp), the standard 4-clause Tseitin XOR-gate encoding.
            solver.add_clause(&[(!v.pos_lit()), (!vp.pos_lit()), !d.pos_lit()]);
            solver.add_clause(&[v.pos_lit(), vp.pos_lit(), !d.pos_lit()]);
            solver.add_clause(&[v.pos_lit(), !vp.pos_lit(), d.pos_lit()]);
            solver.add_clause(&[!v.pos_lit(), vp.pos_lit(), d.pos_lit()]);

            indicator.insert(&v, d);
            disjuncts.push(d.pos_lit());
        }

        // (M ∨ d_1 ∨ ... ∨ d_k): assuming ¬M forces at least one indicator
        // true, i.e. the two copies must differ somewhere in the sampling
        // set. This is the polarity every query assumes throughout `round.rs`.
        let m = solver.new_var();
        let mut m_clause = vec![m.pos_lit()];
        m_clause.extend(disjuncts);
        solver.add_clause(&m_clause);

        Gadgets { indicator, m }
    }

    #[inline]
    pub fn indicator(&self, v: Var) -> Var {
        *self.indicator.get(&v).expect("every sampling-set variable has an indicator")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::dimacs;
    use crate::sat::solver::SolveResult;

    #[test]
    fn indicator_forces_models_to_differ_when_assumed_true() {
        let cnf = dimacs::parse("p cnf 1 0\n").unwrap();
        let (mut solver, store) = FormulaStore::build(&cnf);
        let v = Var::from_index(0);
        let gadgets = Gadgets::build(&mut solver, &store, &[v]);

        let d = gadgets.indicator(v);
        match solver.solve(&[d.pos_lit()], None) {
            SolveResult::Sat(model) => {
                let vp = store.primed(v);
                let v_true = model.contains(&v.pos_lit());
                let vp_true = model.contains(&vp.pos_lit());
                assert_ne!(v_true, vp_true);
            }
            _ => panic!("expected sat"),
        }
    }

    #[test]
    fn indicator_forces_equality_when_assumed_false() {
        let cnf = dimacs::parse("p cnf 1 0\n").unwrap();
        let (mut solver, store) = FormulaStore::build(&cnf);
        let v = Var::from_index(0);
        let gadgets = Gadgets::build(&mut solver, &store, &[v]);

        let d = gadgets.indicator(v);
        match solver.solve(&[!d.pos_lit()], None) {
            SolveResult::Sat(model) => {
                let vp = store.primed(v);
                assert_eq!(model.contains(&v.pos_lit()), model.contains(&vp.pos_lit()));
            }
            _ => panic!("expected sat"),
        }
    }

    #[test]
    fn assuming_not_m_forces_some_indicator_true() {
        let cnf = dimacs::parse("p cnf 2 0\n").unwrap();
        let (mut solver, store) = FormulaStore::build(&cnf);
        let (v0, v1) = (Var::from_index(0), Var::from_index(1));
        let gadgets = Gadgets::build(&mut solver, &store, &[v0, v1]);

        match solver.solve(&[!gadgets.m.pos_lit()], None) {
            SolveResult::Sat(model) => {
                let d0 = gadgets.indicator(v0);
                let d1 = gadgets.indicator(v1);
                assert!(model.contains(&d0.pos_lit()) || model.contains(&d1.pos_lit()));
            }
            _ => panic!("expected sat"),
        }
    }

    #[test]
    fn assuming_not_m_is_unsat_once_every_indicator_is_pinned_false() {
        let cnf = dimacs::parse("p cnf 1 0\n").unwrap();
        let (mut solver, store) = FormulaStore::build(&cnf);
        let v = Var::from_index(0);
        let gadgets = Gadgets::build(&mut solver, &store, &[v]);

        let d = gadgets.indicator(v);
        assert!(solver.add_clause(&[!d.pos_lit()]));
        match solver.solve(&[!gadgets.m.pos_lit()], None) {
            SolveResult::Unsat => {}
            _ => panic!("expected unsat: no indicator can be true anymore"),
        }
    }
}
