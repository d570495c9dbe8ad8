use crate::sat::dimacs::Cnf;
use crate::sat::formula::{Lit, Var};
use crate::sat::solver::CoreSolver;

/// The original clause set plus its disjoint primed copy, both already
/// loaded into one solver instance. Comparing two candidate models of the
/// same formula then reduces to a single SAT call over `0..2n`.
pub struct FormulaStore {
    /// Number of variables in one copy of the original formula.
    pub n: usize,
}

impl FormulaStore {
    /// Allocates `2n` solver variables and asserts the clause set twice: once
    /// unshifted (the `F` copy) and once shifted by `n` (the `F'` copy).
    pub fn build(cnf: &Cnf) -> (CoreSolver, FormulaStore) {
        let mut solver = CoreSolver::new();
        let n = cnf.num_vars;

        for _ in 0..2 * n {
            solver.new_var();
        }

        for clause in &cnf.clauses {
            let lits: Vec<Lit> = clause.iter().map(|&x| Lit::from_dimacs(x as i64, 0)).collect();
            solver.add_clause(&lits);
        }
        for clause in &cnf.clauses {
            let lits: Vec<Lit> = clause.iter().map(|&x| Lit::from_dimacs(x as i64, n as u32)).collect();
            solver.add_clause(&lits);
        }

        (solver, FormulaStore { n })
    }

    /// The primed counterpart of an original-copy variable.
    #[inline]
    pub fn primed(&self, v: Var) -> Var {
        Var::from_index(v.index() + self.n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::dimacs;

    #[test]
    fn duplicates_every_clause_at_the_n_offset() {
        let cnf = dimacs::parse("p cnf 2 1\n1 -2 0\n").unwrap();
        let (solver, store) = FormulaStore::build(&cnf);
        assert_eq!(store.n, 2);
        assert_eq!(solver.n_vars(), 4);
        assert_eq!(solver.n_clauses(), 2);
    }
}
