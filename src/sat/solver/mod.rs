pub mod budget;
mod conflict;
mod decision_heuristic;
mod watches;

use log::trace;
use crate::sat::formula::{Lit, Var};
use crate::sat::formula::assignment::{self, Assignment, GROUND_LEVEL};
use crate::sat::formula::clause::ClauseDb;
use self::budget::Budget;
use self::conflict::Analyzer;
use self::decision_heuristic::DecisionHeuristic;
use self::watches::Watches;

#[derive(Debug, Clone, Copy, Default)]
pub struct Stats {
    pub solves: u64,
    pub conflicts: u64,
    pub decisions: u64,
    pub propagations: u64,
}

pub enum SolveResult {
    Sat(Vec<Lit>),
    Unsat,
    /// The conflict budget ran out before a verdict was reached.
    Unknown,
}

enum Decision {
    Assign(Lit),
    /// The next assumption is already falsified; carries the raw
    /// `analyze_final` output (not yet negated back to assumption polarity).
    AssumpsConflict(Vec<Lit>),
    Sat,
}

/// A single incremental CDCL core. Clauses are permanent and append-only;
/// there is no garbage collection, clause deletion, or restart schedule —
/// the independent-support driver above this layer controls its own pacing
/// through assumptions and conflict budgets instead.
pub struct CoreSolver {
    db: ClauseDb,
    assigns: Assignment,
    watches: Watches,
    heur: DecisionHeuristic,
    analyzer: Analyzer,
    ok: bool,
    last_conflict_core: Vec<Lit>,
    stats: Stats,
}

impl CoreSolver {
    pub fn new() -> CoreSolver {
        CoreSolver {
            db: ClauseDb::new(),
            assigns: Assignment::new(),
            watches: Watches::new(),
            heur: DecisionHeuristic::new(),
            analyzer: Analyzer::new(),
            ok: true,
            last_conflict_core: Vec::new(),
            stats: Stats::default(),
        }
    }

    pub fn n_vars(&self) -> usize {
        self.assigns.number_of_vars()
    }

    pub fn n_clauses(&self) -> usize {
        self.db.len()
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    /// `false` once the clause set has been proven unsatisfiable on its own,
    /// independent of any assumptions — every subsequent `solve` call will
    /// return `Unsat` no matter what.
    pub fn is_ok(&self) -> bool {
        self.ok
    }

    pub fn new_var(&mut self) -> Var {
        let v = self.assigns.new_var();
        self.watches.init_var(v);
        self.heur.init_var(v);
        self.analyzer.init_var(v);
        v
    }

    /// Adds a permanent clause. Must only be called at the ground decision
    /// level (between `solve` calls). Returns `false` once the clause set is
    /// known unsatisfiable, at which point the solver is dead for good.
    pub fn add_clause(&mut self, lits: &[Lit]) -> bool {
        if !self.ok {
            return false;
        }
        debug_assert!(self.assigns.is_ground_level());

        let mut ps: Vec<Lit> = Vec::with_capacity(lits.len());
        for &l in lits {
            match self.assigns.of_lit(l) {
                assignment::LitVal::True => return true,
                assignment::LitVal::False => continue,
                assignment::LitVal::Undef => {
                    if ps.contains(&!l) {
                        return true;
                    }
                    if !ps.contains(&l) {
                        ps.push(l);
                    }
                }
            }
        }

        match ps.len() {
            0 => {
                self.ok = false;
                false
            }
            1 => {
                self.assigns.assign_lit(ps[0], None);
                self.ok = self.propagate().is_none();
                self.ok
            }
            _ => {
                let cr = self.db.add_clause(ps, false);
                self.watches.watch_clause(&self.db, cr);
                true
            }
        }
    }

    fn propagate(&mut self) -> Option<crate::sat::formula::clause::ClauseRef> {
        let confl = self.watches.propagate(&mut self.db, &mut self.assigns);
        confl
    }

    fn cancel_to_ground(&mut self) {
        let heur = &mut self.heur;
        self.assigns.rewind_until_level(GROUND_LEVEL, |_, lit| heur.cancel(lit));
    }

    fn decide(&mut self, assumptions: &[Lit]) -> Decision {
        loop {
            let offset = self.assigns.decision_level().offset();
            if offset < assumptions.len() {
                let p = assumptions[offset];
                match self.assigns.of_lit(p) {
                    assignment::LitVal::True => {
                        self.assigns.new_decision_level();
                        continue;
                    }
                    assignment::LitVal::False => {
                        let core = self.analyzer.analyze_final(&self.db, &self.assigns, !p);
                        return Decision::AssumpsConflict(core);
                    }
                    assignment::LitVal::Undef => return Decision::Assign(p),
                }
            }
            return match self.heur.pick_branch_lit(&self.assigns) {
                Some(lit) => {
                    self.stats.decisions += 1;
                    Decision::Assign(lit)
                }
                None => Decision::Sat,
            };
        }
    }

    /// Solves under `assumptions`, bounded by `conflict_budget` conflicts
    /// (`None` for unbounded). Always returns to the ground decision level
    /// before returning, regardless of outcome.
    pub fn solve(&mut self, assumptions: &[Lit], conflict_budget: Option<u64>) -> SolveResult {
        self.stats.solves += 1;
        if !self.ok {
            return SolveResult::Unsat;
        }

        let budget = match conflict_budget {
            Some(n) => Budget::with_conflicts(n),
            None => Budget::unbounded(),
        };
        let mut local_conflicts = 0u64;

        loop {
            match self.propagate() {
                Some(confl) => {
                    self.stats.conflicts += 1;
                    local_conflicts += 1;
                    if self.assigns.is_ground_level() {
                        self.ok = false;
                        return SolveResult::Unsat;
                    }

                    let (learnt, btlevel) = self.analyzer.analyze(&self.db, &self.assigns, &mut self.heur, confl);
                    {
                        let heur = &mut self.heur;
                        self.assigns.rewind_until_level(btlevel, |_, lit| heur.cancel(lit));
                    }
                    self.heur.decay();

                    if learnt.len() == 1 {
                        self.assigns.assign_lit(learnt[0], None);
                    } else {
                        let asserting = learnt[0];
                        let cr = self.db.add_clause(learnt, true);
                        self.watches.watch_clause(&self.db, cr);
                        self.assigns.assign_lit(asserting, Some(cr));
                    }

                    if !budget.within(local_conflicts) {
                        self.cancel_to_ground();
                        return SolveResult::Unknown;
                    }
                }
                None => match self.decide(assumptions) {
                    Decision::Assign(lit) => {
                        self.assigns.new_decision_level();
                        self.assigns.assign_lit(lit, None);
                    }
                    Decision::AssumpsConflict(raw_core) => {
                        self.last_conflict_core = raw_core.into_iter().map(|l| !l).collect();
                        self.cancel_to_ground();
                        return SolveResult::Unsat;
                    }
                    Decision::Sat => {
                        let model = assignment::extract_model(&self.assigns);
                        self.cancel_to_ground();
                        return SolveResult::Sat(model);
                    }
                },
            }
        }
    }

    /// The subset of the previous `solve` call's assumptions that were
    /// jointly sufficient to derive unsat. Empty (and meaningless) unless
    /// that call returned `SolveResult::Unsat` with a nonempty assumption
    /// list.
    pub fn conflict_core(&self) -> &[Lit] {
        &self.last_conflict_core
    }

    /// Runs propagation to a fixpoint at the ground level. `hint` names the
    /// family of simplification the caller would like (e.g. `"zero"` or
    /// `"binary"`); this core only ever does unit propagation, so the hint
    /// is informational and only shows up in the trace log.
    pub fn simplify(&mut self, hint: &str) -> bool {
        trace!("simplify: {}", hint);
        if !self.ok {
            return false;
        }
        debug_assert!(self.assigns.is_ground_level());
        if self.propagate().is_some() {
            self.ok = false;
        }
        self.ok
    }

    /// Literals forced to a fixed value at the ground level, independent of
    /// any assumption — always safe to drop from a sampling set.
    pub fn zero_assigned_lits(&self) -> Vec<Lit> {
        self.assigns.ground_lits().collect()
    }

    /// Pairs of literals `(a, b)` the clause database currently proves
    /// equivalent via two complementary binary clauses.
    pub fn binary_equivalences(&self) -> Vec<(Lit, Lit)> {
        use std::collections::{HashMap, HashSet};

        let mut implies: HashMap<Lit, HashSet<Lit>> = HashMap::new();
        for (_, c) in self.db.iter() {
            if c.len() == 2 {
                let (l0, l1) = c.head_pair();
                implies.entry(!l0).or_default().insert(l1);
                implies.entry(!l1).or_default().insert(l0);
            }
        }

        let mut seen_pairs = HashSet::new();
        let mut out = Vec::new();
        for (&a, bs) in implies.iter() {
            for &b in bs {
                if a.var() == b.var() {
                    continue;
                }
                if implies.get(&b).is_some_and(|s| s.contains(&a)) {
                    let key = if a.var() < b.var() { (a.var(), b.var()) } else { (b.var(), a.var()) };
                    if seen_pairs.insert(key) {
                        out.push((a, b));
                    }
                }
            }
        }
        out
    }

    /// Number of permanent-clause occurrences per variable, indexed by
    /// `Var::index()`. A cheap stand-in for the degree heuristics used to
    /// order probing candidates.
    pub fn var_incidence(&self) -> Vec<u32> {
        let mut counts = vec![0u32; self.assigns.number_of_vars()];
        for (_, c) in self.db.iter() {
            for &l in c.iter() {
                counts[l.var().index()] += 1;
            }
        }
        counts
    }
}

impl Default for CoreSolver {
    fn default() -> Self {
        CoreSolver::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(s: &mut CoreSolver, vars: &mut Vec<Var>, n: usize) {
        while vars.len() < n {
            vars.push(s.new_var());
        }
    }

    #[test]
    fn unit_propagation_detects_conflict() {
        let mut s = CoreSolver::new();
        let mut vars = Vec::new();
        lit(&mut s, &mut vars, 1);
        let x = vars[0].pos_lit();
        assert!(s.add_clause(&[x]));
        assert!(!s.add_clause(&[!x]));
    }

    #[test]
    fn small_sat_instance_has_a_model() {
        let mut s = CoreSolver::new();
        let mut vars = Vec::new();
        lit(&mut s, &mut vars, 2);
        let (a, b) = (vars[0].pos_lit(), vars[1].pos_lit());
        assert!(s.add_clause(&[a, b]));
        assert!(s.add_clause(&[!a, b]));
        match s.solve(&[], None) {
            SolveResult::Sat(model) => assert!(model.contains(&b)),
            _ => panic!("expected sat"),
        }
    }

    #[test]
    fn contradictory_assumptions_yield_a_core() {
        let mut s = CoreSolver::new();
        let mut vars = Vec::new();
        lit(&mut s, &mut vars, 1);
        let a = vars[0].pos_lit();
        match s.solve(&[a, !a], None) {
            SolveResult::Unsat => {
                let core = s.conflict_core();
                assert!(core.contains(&a) || core.contains(&!a));
            }
            _ => panic!("expected unsat"),
        }
    }
}
