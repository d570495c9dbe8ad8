use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use crate::sat::formula::{Var, VarMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Indep,
    NotIndep,
    Unknown,
}

/// The three-way partition of the sampling set, plus the per-round "already
/// probed" bitset. `snapshot` is the double-buffered view an interrupt
/// handler reads: `publish` is the only write path, called once per
/// iteration boundary so a concurrent reader never observes a torn set.
pub struct Frontier {
    status: VarMap<Status>,
    unknown: Vec<Var>,
    tried: HashSet<Var>,
    snapshot: Arc<Mutex<Vec<u32>>>,
}

impl Frontier {
    pub fn new(sampling_set: Vec<Var>, snapshot: Arc<Mutex<Vec<u32>>>) -> Frontier {
        let mut status = VarMap::new();
        for &v in &sampling_set {
            status.insert(&v, Status::Unknown);
        }
        let f = Frontier { status, unknown: sampling_set, tried: HashSet::new(), snapshot };
        f.publish();
        f
    }

    #[inline]
    pub fn unknown(&self) -> &[Var] {
        &self.unknown
    }

    pub fn status(&self, v: Var) -> Status {
        *self.status.get(&v).unwrap_or(&Status::Unknown)
    }

    pub fn move_to_indep(&mut self, v: Var) {
        self.status.insert(&v, Status::Indep);
        self.unknown.retain(|&u| u != v);
        self.tried.remove(&v);
    }

    pub fn move_to_not_indep(&mut self, v: Var) {
        self.status.insert(&v, Status::NotIndep);
        self.unknown.retain(|&u| u != v);
        self.tried.remove(&v);
    }

    pub fn move_many_to_not_indep(&mut self, vars: &[Var]) {
        let dropped: HashSet<Var> = vars.iter().copied().collect();
        for &v in vars {
            self.status.insert(&v, Status::NotIndep);
            self.tried.remove(&v);
        }
        self.unknown.retain(|u| !dropped.contains(u));
    }

    /// Used by a winning `Inverse` guess: every currently-Unknown variable
    /// not in `keep` is retired to `NotIndep`.
    pub fn restrict_unknown_to(&mut self, keep: &[Var]) {
        let keep_set: HashSet<Var> = keep.iter().copied().collect();
        let dropped: Vec<Var> = self.unknown.iter().copied().filter(|v| !keep_set.contains(v)).collect();
        self.move_many_to_not_indep(&dropped);
    }

    pub fn mark_tried(&mut self, v: Var) {
        self.tried.insert(v);
    }

    pub fn is_tried(&self, v: Var) -> bool {
        self.tried.contains(&v)
    }

    pub fn reset_tried(&mut self) {
        self.tried.clear();
    }

    /// `Indep ∪ Unknown`, the current best answer.
    pub fn result(&self) -> Vec<Var> {
        self.status
            .iter()
            .filter(|&(_, s)| *s != Status::NotIndep)
            .map(|(v, _)| v)
            .collect()
    }

    pub fn result_ids(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self.result().iter().map(|v| v.index() as u32 + 1).collect();
        ids.sort_unstable();
        ids
    }

    pub fn publish(&self) {
        let ids = self.result_ids();
        if let Ok(mut guard) = self.snapshot.lock() {
            *guard = ids;
        }
    }
}
