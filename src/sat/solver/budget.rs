/// A per-`solve` conflict budget. `-1` means unbounded; `Unknown` is only
/// ever returned when the budget is finite and gets exhausted.
pub struct Budget {
    conflict_budget: i64,
}

impl Budget {
    pub fn unbounded() -> Budget {
        Budget { conflict_budget: -1 }
    }

    pub fn with_conflicts(n: u64) -> Budget {
        Budget { conflict_budget: n as i64 }
    }

    #[inline]
    pub fn within(&self, conflicts: u64) -> bool {
        self.conflict_budget < 0 || conflicts < (self.conflict_budget as u64)
    }
}
