use std::path::PathBuf;
use std::process;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use clap::Parser;
use log::{error, info};

use indepsupp::indep::Config;
use indepsupp::sat::dimacs;

/// Compute a minimal independent support of a CNF formula.
#[derive(Parser, Debug)]
#[command(name = "indepsupp", version, about = "Minimal independent support computation over a CNF formula")]
struct Cli {
    /// DIMACS CNF input, optionally gzip-compressed.
    input: PathBuf,

    /// Seed for the driver's RNG (group tie-break only).
    #[arg(long, default_value_t = 0)]
    seed: u32,

    /// Log verbosity: 0 = just the result line, 1 = info, 2 = trace.
    #[arg(long, default_value_t = 1)]
    verb: u32,

    /// Disable the solver's bounded-variable-elimination in-processing pass.
    #[arg(long)]
    no_bve: bool,

    /// Disable the solver's bounded-variable-addition in-processing pass.
    #[arg(long)]
    no_bva: bool,

    /// Force single-variable probing every round; disables the batch `Many` mode.
    #[arg(long)]
    one_by_one: bool,

    /// Skip the pre-pass simplifier before the main loop.
    #[arg(long = "no-simp-at-start")]
    no_simp_at_start: bool,

    /// Run the pre-pass simplifier before every round.
    #[arg(long = "simp-every-round")]
    simp_every_round: bool,

    /// Skip the one-shot Inverse guess round at startup.
    #[arg(long = "no-guess")]
    no_guess: bool,

    /// Ignore any `c ind` header in the input and start from the full variable set.
    #[arg(long, default_value_t = false)]
    recompute_sampling_set: bool,
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verb {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new().filter_level(level).format_timestamp(None).init();

    let config = Config {
        seed: cli.seed,
        verb: cli.verb,
        bve: !cli.no_bve,
        bva: !cli.no_bva,
        one_by_one: cli.one_by_one,
        simp_at_start: !cli.no_simp_at_start,
        simp_every_round: cli.simp_every_round,
        guess: !cli.no_guess,
        recompute_sampling_set: cli.recompute_sampling_set,
    };

    let snapshot = Arc::new(Mutex::new(Vec::new()));
    install_interrupt_handler(snapshot.clone());

    let start = Instant::now();
    let cnf = match dimacs::parse_file(&cli.input) {
        Ok(cnf) => cnf,
        Err(e) => {
            error!("{}", e);
            process::exit(-1);
        }
    };

    info!("parsed {} variables, {} clauses", cnf.num_vars, cnf.clauses.len());

    let outcome = indepsupp::compute_independent_support(&cnf, &config, snapshot);
    let elapsed = start.elapsed();

    print_result(&outcome.independent_support, cnf.num_vars, elapsed.as_secs_f64());
    info!("rounds run: {}", outcome.iterations);

    if outcome.trivially_unsat {
        info!("formula is unsatisfiable on its own; independent support is empty by definition");
    }

    if let Some(kb) = indepsupp::util::mem_used_peak() {
        info!("peak memory used: {} KB", kb);
    }

    process::exit(0);
}

fn print_result(support: &[u32], num_vars: usize, wall_time: f64) {
    print!("c ind");
    for v in support {
        print!(" {}", v);
    }
    println!(" 0");

    let fraction = if num_vars > 0 { support.len() as f64 / num_vars as f64 } else { 0.0 };
    println!(
        "c independent support: {} of {} variables ({:.1}%), {:.2}s",
        support.len(),
        num_vars,
        fraction * 100.0,
        wall_time
    );
}

/// Spawns a thread that waits for SIGINT/SIGTERM and prints the frontier's
/// most recent published snapshot before exiting. The main loop is never
/// cooperatively interrupted — per the driver's concurrency model the signal
/// only ever fires between solver calls, at a round boundary.
fn install_interrupt_handler(snapshot: Arc<Mutex<Vec<u32>>>) {
    use signal_hook::consts::{SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    let mut signals = match Signals::new([SIGINT, SIGTERM]) {
        Ok(s) => s,
        Err(e) => {
            error!("failed to install signal handler: {}", e);
            return;
        }
    };

    std::thread::spawn(move || {
        if signals.forever().next().is_some() {
            let support = snapshot.lock().unwrap_or_else(|e| e.into_inner());
            print!("c ind");
            for v in support.iter() {
                print!(" {}", v);
            }
            println!(" 0");
            println!("c interrupted with {} variables in the current snapshot", support.len());
            process::exit(1);
        }
    });
}
