//! Crate `error` collects the structured failure types that cross the
//! solver's public API boundary (§7, §6 "Rust API surface").
//!
//! Internal invariant breaches (tableau inconsistency after a pivot, a
//! reason chain out of order, ...) are *not* represented here: per §7 they
//! are programmer errors and are caught with `debug_assert!`/`unreachable!`
//! at their point of origin, the way `splr` treats its own tableau and
//! watch-list invariants.
use thiserror::Error;

use crate::types::VarId;

/// Errors surfaced at the solver's public API boundary.
///
/// Grounded on `splr::types::SolverError` (there: `Inconsistent`, `NullLearnt`,
/// `OutOfMemory`, `TimeOut`, `SolverBug`), generalized to the usage-error and
/// resource-exhaustion kinds §7 names for a theory solver.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SolverError {
    /// The assertion stack is already unsatisfiable at level 0; the new
    /// assertion was rejected and the previous state preserved.
    #[error("assertion stack is inconsistent")]
    Inconsistent,
    /// A term used a logic feature this core does not decide (e.g. a
    /// genuinely non-linear multiplication of two variables).
    #[error("unsupported term shape: {0}")]
    UnsupportedTerm(String),
    /// `(get-model)` was invoked on a variable assignment supplied as
    /// input rather than computed, which this core does not accept.
    #[error("model values may not appear in input")]
    ModelInInput,
    /// An unknown or unsupported SMT-LIB logic name.
    #[error("unknown logic: {0}")]
    UnknownLogic(String),
    /// `push`/`pop` called with a scope count exceeding the stack depth.
    #[error("pop({0}) exceeds current assertion-stack depth")]
    PopUnderflow(usize),
    /// The caller's `terminate` predicate fired; the engine abandoned the
    /// in-progress check. Carries the phase where termination was observed.
    #[error("resource exhausted during {phase}")]
    ResourceExhausted { phase: &'static str },
    /// A step/time budget configured on [`crate::config::SolverConfig`] was
    /// exceeded before a definite answer could be produced.
    #[error("step budget exceeded after {steps} steps")]
    StepBudgetExceeded { steps: usize },
}

/// `Result` alias mirroring `splr::types::MaybeInconsistent`.
pub type MaybeInconsistent = Result<(), SolverError>;

/// One finding accumulated by the proof checker (§4.5 "Failure policy").
///
/// The checker never short-circuits on the first bad node: every mismatch is
/// recorded here, tagged with the rule name and the proof-node identity, and
/// the walk continues so that one buggy rule never hides a second.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckerError {
    #[error("node {node}: @res left residual pivot literal")]
    ResidualPivot { node: usize },
    #[error("node {node}: @res accumulator contains extra literal not eliminated")]
    ExtraLiteral { node: usize },
    #[error("node {node}: @eq left-hand side does not match prior proved term")]
    EqLhsMismatch { node: usize },
    #[error("node {node}: @trans middle terms do not match: {lhs} vs {rhs}")]
    TransMismatch { node: usize, lhs: String, rhs: String },
    #[error("node {node}: @cong argument count does not match function arity")]
    CongArity { node: usize },
    #[error("node {node}: @clause literal multiset does not match annotation")]
    ClauseMismatch { node: usize },
    #[error("node {node}: @clause annotation contains a duplicate literal")]
    ClauseDuplicate { node: usize },
    #[error("node {node}: @split rule {rule} does not match its conclusion")]
    SplitMismatch { node: usize, rule: &'static str },
    #[error("node {node}: :LA lemma combination is not a non-positive constant")]
    LaNotInfeasible { node: usize },
    #[error("node {node}: :LA lemma has a coefficient of the wrong sign for literal {lit}")]
    LaBadCoefficientSign { node: usize, lit: usize },
    #[error("node {node}: :CC lemma path edge {edge} is not a known equality, congruence step, or trivial identity")]
    CcUnexplainedEdge { node: usize, edge: usize },
    #[error("node {node}: array path does not connect the goal equality's two sides")]
    ArrayPathDisconnected { node: usize },
    #[error("node {node}: :trichotomy lemma does not have exactly the three required literals over a shared affine term")]
    TrichotomyShape { node: usize },
    #[error("node {node}: :EQ lemma literals' affine forms do not coincide up to sign and gcd")]
    EqLemmaMismatch { node: usize },
    #[error("node {node}: @tautology clause does not match schema {schema}")]
    TautologyMismatch { node: usize, schema: &'static str },
    #[error("node {node}: @rewrite rule {rule} does not hold for the given sides")]
    RewriteMismatch { node: usize, rule: &'static str },
    #[error("node {node}: @intern right-hand side is not the internal form of the left")]
    InternMismatch { node: usize },
    #[error("node {node}: unknown var {var} referenced by proof term")]
    UnknownVar { node: usize, var: VarId },
}

impl CheckerError {
    /// The proof-node identity this finding is anchored to, for the
    /// "log with its rule name" reporting policy in §7.
    pub fn node(&self) -> usize {
        match self {
            CheckerError::ResidualPivot { node }
            | CheckerError::ExtraLiteral { node }
            | CheckerError::EqLhsMismatch { node }
            | CheckerError::TransMismatch { node, .. }
            | CheckerError::CongArity { node }
            | CheckerError::ClauseMismatch { node }
            | CheckerError::ClauseDuplicate { node }
            | CheckerError::SplitMismatch { node, .. }
            | CheckerError::LaNotInfeasible { node }
            | CheckerError::LaBadCoefficientSign { node, .. }
            | CheckerError::CcUnexplainedEdge { node, .. }
            | CheckerError::ArrayPathDisconnected { node }
            | CheckerError::TrichotomyShape { node }
            | CheckerError::EqLemmaMismatch { node }
            | CheckerError::TautologyMismatch { node, .. }
            | CheckerError::RewriteMismatch { node, .. }
            | CheckerError::InternMismatch { node }
            | CheckerError::UnknownVar { node, .. } => *node,
        }
    }
}
