//! Black-box scenarios driving `indepsupp::compute_independent_support` end
//! to end, independent of any single module's internals.

use std::io::Write;
use std::sync::{Arc, Mutex};

use indepsupp::{compute_independent_support, run_on_file, Config};
use indepsupp::sat::dimacs;

fn run(dimacs_text: &str, config: &Config) -> indepsupp::Outcome {
    let cnf = dimacs::parse(dimacs_text).expect("valid dimacs");
    compute_independent_support(&cnf, config, Arc::new(Mutex::new(Vec::new())))
}

/// F = (0∨1∨2), S = {0,1,2}: every bit is essential, since dropping any one
/// leaves the other two free to leave the dropped bit undetermined (the
/// blocker is satisfiable either way once one of the kept bits is true).
#[test]
fn independent_bits_keeps_every_variable() {
    let outcome = run("p cnf 3 1\n1 2 3 0\n", &Config::default());
    assert!(!outcome.trivially_unsat);
    let mut support = outcome.independent_support.clone();
    support.sort_unstable();
    assert_eq!(support, vec![1, 2, 3]);
}

/// F encodes 0 ↔ 1 ↔ 2 via two implications each way: any single variable
/// already determines the other two, so the minimal support has size 1.
#[test]
fn tautological_equivalence_shrinks_to_one_variable() {
    let outcome = run("p cnf 3 4\n-1 2 0\n1 -2 0\n-1 3 0\n1 -3 0\n", &Config::default());
    assert!(!outcome.trivially_unsat);
    assert_eq!(outcome.independent_support.len(), 1);
}

/// F = {(0), (¬0)}: unsatisfiable on construction. The driver must detect
/// this before ever entering the round loop and report an empty support.
#[test]
fn unsat_formula_is_detected_at_construction() {
    let outcome = run("p cnf 1 2\n1 0\n-1 0\n", &Config::default());
    assert!(outcome.trivially_unsat);
    assert!(outcome.independent_support.is_empty());
    assert_eq!(outcome.iterations, 0);
}

/// v ↔ (a ∧ b), with a, b otherwise unconstrained: the minimal support is
/// {a, b} (size 2), since v is always a function of the two inputs. This
/// only holds up if a later probe of v is tested against a *and* b held
/// equal, even though both have already moved to `Indep` by the time v is
/// probed — a regression check for `round::run_one`'s held-equal set.
#[test]
fn gate_output_is_pruned_once_its_inputs_are_classified_indep() {
    let text = "p cnf 3 3\n-3 1 0\n-3 2 0\n-1 -2 3 0\n";
    let outcome = run(text, &Config::default());
    assert!(!outcome.trivially_unsat);
    let mut support = outcome.independent_support.clone();
    support.sort_unstable();
    assert_eq!(support, vec![1, 2]);
}

/// x3 = x0 ⊕ x1 ⊕ x2 (even-parity encoding over 4 vars, 8 clauses
/// forbidding every odd-parity assignment): any 3 of the 4 variables
/// determine the last one, so the minimal support has size 3.
#[test]
fn xor_chain_needs_exactly_three_of_four_variables() {
    let xor4 = "p cnf 4 8\n\
                -1 2 3 4 0\n\
                1 -2 3 4 0\n\
                1 2 -3 4 0\n\
                1 2 3 -4 0\n\
                -1 -2 -3 4 0\n\
                -1 -2 3 -4 0\n\
                -1 2 -3 -4 0\n\
                1 -2 -3 -4 0\n";
    let outcome = run(xor4, &Config::default());
    assert!(!outcome.trivially_unsat);
    assert_eq!(outcome.independent_support.len(), 3);
    for v in &outcome.independent_support {
        assert!((1..=4).contains(v));
    }
}

/// `c ind` header restricts the sampling set to a strict subset of the
/// variables; the returned support must stay within that declared set even
/// though the formula mentions a variable outside it.
#[test]
fn sampling_set_header_is_honored_by_default() {
    let text = "p cnf 4 1\nc ind 1 2 3 0\n1 2 3 4 0\n";
    let outcome = run(text, &Config::default());
    assert!(!outcome.trivially_unsat);
    assert!(outcome.independent_support.iter().all(|&v| v <= 3));
}

/// `recompute_sampling_set` must ignore the header and fall back to the
/// full variable range.
#[test]
fn recompute_sampling_set_ignores_the_header() {
    let text = "p cnf 3 1\nc ind 1 0\n1 2 3 0\n";
    let mut config = Config::default();
    config.recompute_sampling_set = true;
    let outcome = run(text, &config);
    assert!(!outcome.trivially_unsat);
    assert!(outcome.independent_support.len() >= 1);
}

/// Idempotence (L1): re-running the driver on its own reported support
/// (declared via a fresh `c ind` header, `recompute=false`) returns exactly
/// that same support unchanged.
#[test]
fn rerunning_on_its_own_output_is_idempotent() {
    let text = "p cnf 3 4\n-1 2 0\n1 -2 0\n-1 3 0\n1 -3 0\n";
    let first = run(text, &Config::default());
    assert_eq!(first.independent_support.len(), 1);

    let kept = first.independent_support[0];
    let replayed_text = format!("p cnf 3 4\nc ind {} 0\n-1 2 0\n1 -2 0\n-1 3 0\n1 -3 0\n", kept);
    let second = run(&replayed_text, &Config::default());
    assert_eq!(second.independent_support, vec![kept]);
}

/// 20 variables, `11..20` each forced equal to `1..10` via a binary
/// equivalence, `1..10` made essential by one big OR blocker (scenario 6).
/// With the default scheduler (no guess, no pre-pass, so nothing shrinks
/// `Unknown` before the round loop), the initial grouping factor
/// `by = 20/10 = 2` is `> 1`, so the very first round must run in batch
/// `Many` mode rather than probing one variable at a time.
#[test]
fn many_mode_fires_through_the_default_scheduler_and_shrinks_a_determined_half() {
    let mut dimacs_text = String::from("p cnf 20 21\n1 2 3 4 5 6 7 8 9 10 0\n");
    for i in 0..10u32 {
        let (a, b) = (i + 1, i + 11);
        dimacs_text.push_str(&format!("-{} {} 0\n{} -{} 0\n", a, b, a, b));
    }

    let mut config = Config::default();
    config.guess = false;
    config.simp_at_start = false;

    let outcome = run(&dimacs_text, &config);
    assert!(!outcome.trivially_unsat);
    assert!(outcome.many_mode_rounds > 0, "expected at least one batch Many round to fire");

    let mut support = outcome.independent_support.clone();
    support.sort_unstable();
    assert_eq!(support, (1..=10).collect::<Vec<u32>>());
}

/// `one_by_one` forces every round through `One` mode (no batch `Many`
/// shrink); the result must still be a valid, non-empty-formula support.
#[test]
fn one_by_one_mode_still_converges() {
    let mut config = Config::default();
    config.one_by_one = true;
    config.guess = false;
    let outcome = run("p cnf 3 1\n1 2 3 0\n", &config);
    assert!(!outcome.trivially_unsat);
    let mut support = outcome.independent_support.clone();
    support.sort_unstable();
    assert_eq!(support, vec![1, 2, 3]);
}

/// `run_on_file` must transparently decompress gzip input and still parse
/// an ordinary plain-text instance.
#[test]
fn run_on_file_handles_plain_and_gzip_input() {
    use flate2::write::GzEncoder;
    use flate2::Compression;

    let text = "p cnf 3 1\n1 2 3 0\n";

    let plain_dir = tempfile::tempdir().unwrap();
    let plain_path = plain_dir.path().join("instance.cnf");
    std::fs::write(&plain_path, text).unwrap();
    let plain_outcome = run_on_file(&plain_path, &Config::default(), Arc::new(Mutex::new(Vec::new()))).unwrap();
    assert!(!plain_outcome.trivially_unsat);

    let gz_dir = tempfile::tempdir().unwrap();
    let gz_path = gz_dir.path().join("instance.cnf.gz");
    let mut encoder = GzEncoder::new(std::fs::File::create(&gz_path).unwrap(), Compression::default());
    encoder.write_all(text.as_bytes()).unwrap();
    encoder.finish().unwrap();

    let gz_outcome = run_on_file(&gz_path, &Config::default(), Arc::new(Mutex::new(Vec::new()))).unwrap();
    assert!(!gz_outcome.trivially_unsat);
    assert_eq!(gz_outcome.independent_support, plain_outcome.independent_support);
}

/// A malformed instance (no `p cnf` header) must surface as a clean
/// `AppError`, never a panic.
#[test]
fn malformed_input_is_a_clean_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.cnf");
    std::fs::write(&path, "1 2 0\n").unwrap();
    let result = run_on_file(&path, &Config::default(), Arc::new(Mutex::new(Vec::new())));
    assert!(result.is_err());
}
