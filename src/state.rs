//! Crate `state` tracks solver-run statistics and emits progress via
//! `tracing`, grounded on `splr::state::SolverState` (a `Stat` enum indexing
//! a flat counter vector, plus a wall-clock start time) stripped of the
//! restart-EMA/progress-bar/eliminator bookkeeping `splr` needs for its own
//! search-quality tuning, none of which this engine carries (§4.3, §4.1).
use std::fmt;
use std::time::Instant;

use tracing::info;

/// Index into [`SolverState::stats`]. Each variant mirrors one of `splr`'s,
/// minus the ones tied to restart/reduction machinery this engine drops,
/// plus the LA-specific counters §4.1/§7 name.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum Stat {
    /// Boolean decisions made (§4.3).
    Decision,
    /// Clausal conflicts resolved (§4.3).
    Conflict,
    /// Unit-propagation steps (§4.3).
    Propagation,
    /// Simplex pivots performed across every `check_point` call (§4.1).
    Pivot,
    /// Gomory cuts generated (§4.1 "Integer cuts").
    Cut,
    /// Theory conflicts the LA decision procedure raised (§4.1, §4.5 `:LA`).
    TheoryConflict,
    /// Proof nodes the checker visited, across every `get_proof`/checking
    /// pass (§4.5, §7).
    ProofNodesChecked,
    EndOfStatIndex,
}

pub struct SolverState {
    pub ok: bool,
    pub stats: Vec<u64>,
    pub start: Instant,
    /// A human-readable label for the run, analogous to `splr`'s `target`
    /// (there the input CNF's filename; here, caller-supplied since this
    /// crate has no file-driven front-end, §1 Non-goals).
    pub label: String,
}

impl SolverState {
    pub fn new(label: impl Into<String>) -> Self {
        SolverState {
            ok: true,
            stats: vec![0; Stat::EndOfStatIndex as usize],
            start: Instant::now(),
            label: label.into(),
        }
    }

    pub fn bump(&mut self, stat: Stat) {
        self.stats[stat as usize] += 1;
    }

    pub fn add(&mut self, stat: Stat, n: u64) {
        self.stats[stat as usize] += n;
    }

    pub fn get(&self, stat: Stat) -> u64 {
        self.stats[stat as usize]
    }

    pub fn elapsed(&self) -> std::time::Duration {
        self.start.elapsed()
    }

    /// Emit a single structured progress line (grounded on `splr`'s
    /// `SolverStateIF::progress`, whose seven-line terminal dashboard is
    /// replaced here by one `tracing::info!` event — this engine is a
    /// library, not a CLI, so there is no terminal to redraw, §1 Non-goals).
    pub fn progress(&self) {
        info!(
            target: self.label.as_str(),
            decisions = self.get(Stat::Decision),
            conflicts = self.get(Stat::Conflict),
            propagations = self.get(Stat::Propagation),
            pivots = self.get(Stat::Pivot),
            cuts = self.get(Stat::Cut),
            theory_conflicts = self.get(Stat::TheoryConflict),
            elapsed_ms = self.elapsed().as_millis() as u64,
            "solver progress",
        );
    }
}

impl fmt::Display for SolverState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:36}|time:{:>10.3}s|conflicts:{:>8}|decisions:{:>8}",
            self.label,
            self.elapsed().as_secs_f64(),
            self.get(Stat::Conflict),
            self.get(Stat::Decision),
        )
    }
}
