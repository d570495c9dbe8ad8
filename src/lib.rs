//! Library surface for computing a minimal independent support of a CNF
//! formula: parse DIMACS, duplicate and gadget-up the formula, and run the
//! round-driver loop in [`indep`] until the `Unknown` frontier is resolved or
//! the outer loop's `by` decay terminates it.

#[macro_use]
extern crate log;

use std::sync::{Arc, Mutex};

pub mod error;
pub mod indep;
pub mod sat;
pub mod util;

pub use error::{AppError, Result};
pub use indep::{Config, Outcome};
use sat::dimacs::Cnf;

/// Runs the full driver on an already-parsed instance. `snapshot` is handed
/// to the frontier so a caller-owned signal handler can read a consistent
/// partial result at any time; pass a fresh `Arc::new(Mutex::new(Vec::new()))`
/// if nothing needs to observe it mid-run.
pub fn compute_independent_support(cnf: &Cnf, config: &Config, snapshot: Arc<Mutex<Vec<u32>>>) -> Outcome {
    indep::run(cnf, config, snapshot)
}

/// Parses `path` as (optionally gzip-compressed) DIMACS CNF and runs the
/// driver over it.
pub fn run_on_file<P: AsRef<std::path::Path>>(
    path: P,
    config: &Config,
    snapshot: Arc<Mutex<Vec<u32>>>,
) -> Result<Outcome> {
    let cnf = sat::dimacs::parse_file(path)?;
    Ok(compute_independent_support(&cnf, config, snapshot))
}
