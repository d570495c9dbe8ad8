/// Driver-level options. These mirror the knobs a caller can set on the
/// command line; see `main.rs` for the CLI surface that fills this in.
#[derive(Debug, Clone)]
pub struct Config {
    pub seed: u32,
    pub verb: u32,
    /// Forwarded to the solver's `simplify` hint; this core's solver only
    /// ever performs unit propagation, so these two toggles are accepted
    /// for contract compatibility but currently don't enable anything
    /// beyond what `simp_at_start`/`simp_every_round` already run.
    pub bve: bool,
    pub bva: bool,
    pub one_by_one: bool,
    pub simp_at_start: bool,
    pub simp_every_round: bool,
    pub guess: bool,
    pub recompute_sampling_set: bool,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            seed: 0,
            verb: 1,
            bve: true,
            bva: true,
            one_by_one: false,
            simp_at_start: true,
            simp_every_round: false,
            guess: true,
            recompute_sampling_set: false,
        }
    }
}
