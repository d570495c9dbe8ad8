use std::collections::HashSet;

use crate::sat::formula::{Lit, Var};
use crate::sat::solver::{CoreSolver, SolveResult};

pub enum Verdict {
    Sat,
    Unsat { core: HashSet<Var> },
    Unknown,
}

/// Conflict budget per §4.2: small groups are cheap to prove wrong, large
/// groups need more room to find the proof at all.
pub fn budget_for(by: usize) -> u64 {
    if by <= 100 {
        200
    } else {
        800
    }
}

pub fn ask(solver: &mut CoreSolver, assumptions: &[Lit], by: usize) -> Verdict {
    match solver.solve(assumptions, Some(budget_for(by))) {
        SolveResult::Sat(_) => Verdict::Sat,
        SolveResult::Unsat => {
            let core = solver.conflict_core().iter().map(|l| l.var()).collect();
            Verdict::Unsat { core }
        }
        SolveResult::Unknown => Verdict::Unknown,
    }
}
