use crate::sat::formula::{Lit, Var, VarMap};
use crate::sat::formula::assignment::{Assignment, GROUND_LEVEL, DecisionLevel};
use crate::sat::formula::clause::{ClauseDb, ClauseRef};
use super::decision_heuristic::DecisionHeuristic;

/// Scratch state for conflict-driven clause learning. Reused across calls
/// so no allocation happens on the hot path beyond the returned clause.
#[derive(Default)]
pub struct Analyzer {
    seen: VarMap<bool>,
}

impl Analyzer {
    pub fn new() -> Analyzer {
        Analyzer { seen: VarMap::new() }
    }

    pub fn init_var(&mut self, v: Var) {
        self.seen.insert(&v, false);
    }

    fn is_seen(&self, v: Var) -> bool {
        *self.seen.get(&v).unwrap_or(&false)
    }

    /// Standard first-UIP conflict analysis. Returns the learnt clause
    /// (asserting literal at index 0) and the level to backtrack to.
    pub fn analyze(&mut self, db: &ClauseDb, assigns: &Assignment, heur: &mut DecisionHeuristic, conflict: ClauseRef) -> (Vec<Lit>, DecisionLevel) {
        let cur_level = assigns.decision_level();
        let trail = assigns.trail();

        let mut out_learnt = vec![trail[trail.len() - 1]];
        let mut path_c: i32 = 0;
        let mut p: Option<Lit> = None;
        let mut confl = Some(conflict);
        let mut index = trail.len();

        loop {
            let cr = confl.expect("every non-decision trail literal carries a reason");
            let c = db.view(cr);
            let start = if p.is_some() { 1 } else { 0 };
            for j in start..c.len() {
                let q = c[j];
                let qv = q.var();
                if !self.is_seen(qv) {
                    let level = assigns.vardata(qv).level;
                    if level > GROUND_LEVEL {
                        self.seen.insert(&qv, true);
                        heur.bump(qv);
                        if level >= cur_level {
                            path_c += 1;
                        } else {
                            out_learnt.push(q);
                        }
                    }
                }
            }

            loop {
                index -= 1;
                if self.is_seen(assigns.trail()[index].var()) {
                    break;
                }
            }
            let pivot = assigns.trail()[index];
            self.seen.insert(&pivot.var(), false);
            path_c -= 1;
            p = Some(pivot);
            if path_c <= 0 {
                break;
            }
            confl = assigns.vardata(pivot.var()).reason;
        }

        out_learnt[0] = !p.unwrap();

        let btlevel = if out_learnt.len() == 1 {
            GROUND_LEVEL
        } else {
            let mut max_i = 1;
            let mut max_level = assigns.vardata(out_learnt[1].var()).level;
            for i in 2..out_learnt.len() {
                let level = assigns.vardata(out_learnt[i].var()).level;
                if level > max_level {
                    max_level = level;
                    max_i = i;
                }
            }
            out_learnt.swap(1, max_i);
            max_level
        };

        for &lit in out_learnt.iter() {
            self.seen.insert(&lit.var(), false);
        }

        (out_learnt, btlevel)
    }

    /// Given that `p` is currently assigned true by propagation alone (so
    /// some earlier assumption forced it), walks the implication graph
    /// backward and collects the decision literals responsible — i.e. the
    /// assumptions that made `!p` unsatisfiable. The caller negates these
    /// back to recover the failed subset of the original assumption list.
    pub fn analyze_final(&mut self, db: &ClauseDb, assigns: &Assignment, p: Lit) -> Vec<Lit> {
        let mut out = vec![p];
        if assigns.decision_level() == GROUND_LEVEL {
            return out;
        }
        self.seen.insert(&p.var(), true);

        let trail = assigns.trail();
        let ground = assigns.number_of_ground_assigns();
        for i in (ground..trail.len()).rev() {
            let x = trail[i].var();
            if self.is_seen(x) {
                match assigns.vardata(x).reason {
                    None => {
                        if assigns.vardata(x).level > GROUND_LEVEL {
                            out.push(!trail[i]);
                        }
                    }
                    Some(cr) => {
                        let c = db.view(cr);
                        for j in 1..c.len() {
                            let v = c[j].var();
                            if assigns.vardata(v).level > GROUND_LEVEL {
                                self.seen.insert(&v, true);
                            }
                        }
                    }
                }
                self.seen.insert(&x, false);
            }
        }
        self.seen.insert(&p.var(), false);
        out
    }
}
