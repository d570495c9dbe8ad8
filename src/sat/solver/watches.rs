use crate::sat::formula::{Lit, LitVec, Var};
use crate::sat::formula::assignment::Assignment;
use crate::sat::formula::clause::{Clause, ClauseDb, ClauseRef};

#[derive(Clone, Copy)]
struct Watcher {
    cref: ClauseRef,
    /// A literal of the clause other than the two watched ones, kept around
    /// so propagation can often skip the clause without touching it at all.
    blocker: Lit,
}

/// Two-watched-literal occurrence lists: `watches[!l]` holds every clause
/// that currently watches `l`.
#[derive(Default)]
pub struct Watches {
    watches: LitVec<Vec<Watcher>>,
}

impl Watches {
    pub fn new() -> Watches {
        Watches { watches: LitVec::new() }
    }

    pub fn init_var(&mut self, v: Var) {
        self.watches.init(v.pos_lit());
        self.watches.init(v.neg_lit());
    }

    pub fn watch_clause(&mut self, db: &ClauseDb, cr: ClauseRef) {
        let c = db.view(cr);
        let (c0, c1) = c.head_pair();
        self.watches[!c0].push(Watcher { cref: cr, blocker: c1 });
        self.watches[!c1].push(Watcher { cref: cr, blocker: c0 });
    }

    /// Propagates every literal currently queued on the trail to a fixpoint,
    /// assigning newly forced literals as it goes. Returns the clause that
    /// conflicted, if propagation ran into one.
    pub fn propagate(&mut self, db: &mut ClauseDb, assigns: &mut Assignment) -> Option<ClauseRef> {
        while let Some(p) = assigns.dequeue() {
            let falsified = !p;
            let ws = std::mem::take(&mut self.watches[falsified]);
            let mut kept = Vec::with_capacity(ws.len());
            let mut i = 0;
            let mut conflict = None;

            while i < ws.len() {
                let w = ws[i];
                i += 1;

                if assigns.is_assigned_pos(w.blocker) {
                    kept.push(w);
                    continue;
                }

                let c = db.view_mut(w.cref);
                if c.head_pair().0 == falsified {
                    c.swap_watches();
                }
                let first = c.head_pair().0;
                if first != w.blocker && assigns.is_assigned_pos(first) {
                    kept.push(Watcher { cref: w.cref, blocker: first });
                    continue;
                }

                match find_new_watch(c, assigns) {
                    Some(new_lit) => {
                        self.watches[!new_lit].push(Watcher { cref: w.cref, blocker: first });
                    }
                    None => {
                        kept.push(Watcher { cref: w.cref, blocker: first });
                        if assigns.is_assigned_pos(!first) {
                            conflict = Some(w.cref);
                            while i < ws.len() {
                                kept.push(ws[i]);
                                i += 1;
                            }
                        } else {
                            assigns.assign_lit(first, Some(w.cref));
                        }
                    }
                }
            }

            self.watches[falsified] = kept;
            if let Some(cr) = conflict {
                assigns.dequeue_all();
                return Some(cr);
            }
        }
        None
    }
}

fn find_new_watch(c: &mut Clause, assigns: &Assignment) -> Option<Lit> {
    c.find_new_watch(1, |l| !assigns.is_assigned_pos(!l))
}
