use crate::sat::formula::{Lit, Var, VarMap, VarHeap};
use crate::sat::formula::assignment::Assignment;

const VAR_DECAY: f64 = 0.95;
const RESCALE_THRESHOLD: f64 = 1e100;
const RESCALE_FACTOR: f64 = 1e-100;

/// VSIDS-style branching: an activity score per variable, a max-heap keyed
/// on it, and the phase a variable last held (so a reintroduced variable
/// tends to pick up where it left off instead of flip-flopping).
pub struct DecisionHeuristic {
    activity: VarMap<f64>,
    var_inc: f64,
    order: VarHeap,
    polarity: VarMap<bool>,
}

impl DecisionHeuristic {
    pub fn new() -> DecisionHeuristic {
        DecisionHeuristic {
            activity: VarMap::new(),
            var_inc: 1.0,
            order: VarHeap::new(),
            polarity: VarMap::new(),
        }
    }

    pub fn init_var(&mut self, v: Var) {
        self.activity.insert(&v, 0.0);
        self.polarity.insert(&v, true);
        let activity = &self.activity;
        self.order.insert(v, |a, b| activity[a] > activity[b]);
    }

    pub fn bump(&mut self, v: Var) {
        let bumped = self.activity[&v] + self.var_inc;
        self.activity.insert(&v, bumped);
        if bumped > RESCALE_THRESHOLD {
            for (_, act) in self.activity.iter_mut() {
                *act *= RESCALE_FACTOR;
            }
            self.var_inc *= RESCALE_FACTOR;
        }
        let activity = &self.activity;
        if self.order.contains(&v) {
            self.order.update(&v, |a, b| activity[a] > activity[b]);
        }
    }

    pub fn decay(&mut self) {
        self.var_inc /= VAR_DECAY;
    }

    /// Called when `lit` leaves the trail during backtracking: remembers its
    /// phase and makes the variable eligible for branching again.
    pub fn cancel(&mut self, lit: Lit) {
        let v = lit.var();
        self.polarity.insert(&v, lit.sign());
        let activity = &self.activity;
        if !self.order.contains(&v) {
            self.order.insert(v, |a, b| activity[a] > activity[b]);
        }
    }

    pub fn pick_branch_lit(&mut self, assigns: &Assignment) -> Option<Lit> {
        loop {
            let activity = &self.activity;
            let v = self.order.pop(|a, b| activity[a] > activity[b])?;
            if assigns.is_undef(v) {
                let phase = *self.polarity.get(&v).unwrap_or(&true);
                return Some(v.sign_lit(phase));
            }
        }
    }
}

impl Default for DecisionHeuristic {
    fn default() -> Self {
        DecisionHeuristic::new()
    }
}
