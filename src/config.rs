//! Crate `config` provides [`SolverConfig`], the engine's tunables,
//! grounded on `splr::config::Config`'s shape (one struct, fields grouped
//! by concern, a `Default` impl giving the constants the rest of the
//! engine is written against) — minus the `structopt` CLI parsing `splr`
//! layers on top, since the command-line front-end is out of scope (§1).
use crate::types::DecisionLevel;

/// Tunables named throughout §4; every field has the `Default` value the
/// spec's prose names where it names one.
#[derive(Clone, Debug)]
pub struct SolverConfig {
    //
    //## LA simplex driver (§4.1)
    //
    /// Consecutive pivots without resolving every out-of-bounds row before
    /// `fix_out_of_bounds` switches from the heuristic to Bland's rule,
    /// expressed as a multiple of the live variable count.
    pub bland_use_factor: usize,

    /// Maximum Gomory mixed-integer cuts generated per `check_sat` call
    /// (§4.1 "Integer cuts").
    pub max_cuts: usize,

    //
    //## Proof checking (§4.5, §6)
    //
    /// Mirrors the SMT-LIB `:proof-check-mode` option (§6 "Recognized
    /// options"): when set, `Solver::check_sat` runs the independent
    /// checker on its own proof before returning `unsat`.
    pub proof_check_mode: bool,

    /// Whether proof objects are retained at all (§6 `produce-proofs`).
    /// When `false`, `get_proof` always returns `None` and the producer's
    /// bookkeeping is skipped.
    pub produce_proofs: bool,

    //
    //## Resource limits (§5 "Cancellation / timeouts", §7)
    //
    /// Upper bound on simplex pivots performed within one `check_sat` call
    /// before it gives up and reports `unknown` with `StepBudget` (§7
    /// "Resource exhaustion").
    pub step_budget: usize,

    //
    //## DPLL(T) (§4.3)
    //
    /// Decision-stack depth analogue of `splr`'s chronological-backtrack
    /// threshold (`chronobt`): below this depth, conflicts backtrack
    /// chronologically; above it, to the conflict's assertion level.
    pub chronobt: DecisionLevel,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            bland_use_factor: 4,
            max_cuts: 8,
            proof_check_mode: false,
            produce_proofs: true,
            step_budget: 1_000_000,
            chronobt: 100,
        }
    }
}

impl SolverConfig {
    pub fn new() -> Self {
        SolverConfig::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_the_documented_constants() {
        let cfg = SolverConfig::default();
        assert_eq!(cfg.bland_use_factor, 4);
        assert_eq!(cfg.max_cuts, 8);
        assert!(!cfg.proof_check_mode);
    }
}
