use std::fmt;
use super::{Lit, Var};
use super::clause::ClauseRef;


#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Debug)]
pub struct DecisionLevel(usize);

pub const GROUND_LEVEL: DecisionLevel = DecisionLevel(0);

impl DecisionLevel {
    pub fn offset(&self) -> usize {
        self.0
    }
}


#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum LitVal {
    Undef,
    False,
    True,
}

impl LitVal {
    #[inline]
    fn is_undef(&self) -> bool {
        matches!(*self, LitVal::Undef)
    }
}


pub struct VarData {
    pub reason: Option<ClauseRef>,
    pub level: DecisionLevel,
}


struct VarLine {
    assign: [LitVal; 2],
    vd: VarData,
}


/// The trail of assigned literals, grouped into decision levels. This is
/// the only mutable truth about the current partial model; everything
/// else (watches, heuristics) is a cache derived from it.
pub struct Assignment {
    assignment: Vec<VarLine>,
    trail: Vec<Lit>,
    lim: Vec<usize>,
    qhead: usize,
}

impl Assignment {
    pub fn new() -> Assignment {
        Assignment { assignment: Vec::new(), trail: Vec::new(), lim: Vec::new(), qhead: 0 }
    }

    #[inline]
    pub fn number_of_vars(&self) -> usize {
        self.assignment.len()
    }

    #[inline]
    pub fn number_of_assigns(&self) -> usize {
        self.trail.len()
    }

    #[inline]
    pub fn number_of_ground_assigns(&self) -> usize {
        match self.lim.first() {
            Some(&lim) => lim,
            None => self.trail.len(),
        }
    }

    pub fn new_var(&mut self) -> Var {
        self.assignment.push(VarLine {
            assign: [LitVal::Undef, LitVal::Undef],
            vd: VarData { reason: None, level: GROUND_LEVEL },
        });
        Var::from_index(self.assignment.len() - 1)
    }

    #[inline]
    pub fn decision_level(&self) -> DecisionLevel {
        DecisionLevel(self.lim.len())
    }

    #[inline]
    pub fn is_ground_level(&self) -> bool {
        self.lim.is_empty()
    }

    #[inline]
    pub fn new_decision_level(&mut self) {
        self.lim.push(self.trail.len());
    }

    #[inline]
    pub fn assign_lit(&mut self, lit: Lit, reason: Option<ClauseRef>) {
        let idx = lit.var_index();
        let line = &mut self.assignment[idx];
        assert!(line.assign[0].is_undef());
        line.assign[lit.sign_index()] = LitVal::True;
        line.assign[lit.sign_index() ^ 1] = LitVal::False;
        line.vd.level = DecisionLevel(self.lim.len());
        line.vd.reason = reason;
        self.trail.push(lit);
    }

    #[inline]
    pub fn rewind_until_level<F: FnMut(DecisionLevel, Lit)>(&mut self, DecisionLevel(target_level): DecisionLevel, mut f: F) {
        while self.lim.len() > target_level {
            let level = self.trail.len();
            let bottom = self.lim.pop().unwrap();
            while self.trail.len() > bottom {
                let lit = self.trail.pop().unwrap();
                f(DecisionLevel(level), lit);

                let line = &mut self.assignment[lit.var_index()];
                line.assign = [LitVal::Undef, LitVal::Undef];
                line.vd.reason = None;
            }
        }
        self.qhead = self.qhead.min(self.trail.len());
    }

    #[inline]
    pub fn dequeue(&mut self) -> Option<Lit> {
        if self.qhead < self.trail.len() {
            let p = self.trail[self.qhead];
            self.qhead += 1;
            Some(p)
        } else {
            None
        }
    }

    #[inline]
    pub fn dequeue_all(&mut self) {
        self.qhead = self.trail.len();
    }

    #[inline]
    pub fn is_undef(&self, var: Var) -> bool {
        self.assignment[var.index()].assign[0].is_undef()
    }

    #[inline]
    pub fn is_assigned_pos(&self, p: Lit) -> bool {
        matches!(self.of_lit(p), LitVal::True)
    }

    #[inline]
    pub fn of_lit(&self, lit: Lit) -> LitVal {
        self.assignment[lit.var_index()].assign[lit.sign_index()]
    }

    #[inline]
    pub fn of_var(&self, v: Var) -> LitVal {
        self.of_lit(v.pos_lit())
    }

    #[inline]
    pub fn vardata(&self, v: Var) -> &VarData {
        &self.assignment[v.index()].vd
    }

    #[inline]
    pub fn trail(&self) -> &[Lit] {
        &self.trail
    }

    /// Literals assigned at decision level 0 — permanently fixed regardless
    /// of any assumption, and so always safe to drop from a sampling set.
    pub fn ground_lits(&self) -> impl Iterator<Item = Lit> + '_ {
        let ground = self.number_of_ground_assigns();
        self.trail[..ground].iter().copied()
    }
}

impl Default for Assignment {
    fn default() -> Self {
        Assignment::new()
    }
}

impl fmt::Debug for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for level in 0..1 + self.lim.len() {
            let l = if level > 0 { self.lim[level - 1] } else { 0 };
            let r = if level < self.lim.len() { self.lim[level] } else { self.trail.len() };
            if r > l {
                write!(f, "[{}:", level)?;
                for lit in self.trail[l..r].iter() {
                    write!(f, " {:?}", lit)?;
                }
                write!(f, " ]")?;
            }
        }
        Ok(())
    }
}


pub fn extract_model(assigns: &Assignment) -> Vec<Lit> {
    let mut model = Vec::with_capacity(assigns.assignment.len());
    for i in 0..assigns.assignment.len() {
        let v = Var::from_index(i);
        match assigns.assignment[i].assign[0] {
            LitVal::Undef => {}
            LitVal::False => model.push(v.neg_lit()),
            LitVal::True => model.push(v.pos_lit()),
        }
    }
    model
}
