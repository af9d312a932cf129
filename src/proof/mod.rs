//! Crate `proof` is the proof-term framework (§4.4 Proof Producer, §4.5
//! Proof Checker): a tagged-variant `ProofTerm` (one constructor per rule,
//! §9 "Polymorphic proof-term dispatch") plus a non-recursive checker that
//! walks a proof once, memoizing by node identity.
//!
//! Grounded on how `splr::clause::Clause` is itself a flat, arena-style
//! object the rest of the solver addresses by id rather than by reference
//! — `ProofTerm` nodes are `Arc`-shared instead of arena-indexed (a proof
//! is a DAG built bottom-up and never mutated once constructed, unlike the
//! term table, so `Arc` identity comparison stands in for an arena index).
pub mod checker;
pub mod producer;
pub mod rewrite;
pub mod tautology;

use std::sync::Arc;

use smallvec::SmallVec;

use crate::clause::Clause;
use crate::rational::Rational;
use crate::types::{Lit, TermId, VarId};

pub use checker::{check_proof, CheckerFailure};
pub use rewrite::RewriteRule;
pub use tautology::TautologySchema;

/// One argument to `@res`: resolve away `pivot` against `arg`'s clause.
#[derive(Clone, Debug)]
pub struct ResolutionStep {
    pub pivot: Lit,
    pub arg: Arc<ProofTerm>,
}

/// Which `@lemma` kind a leaf node asserts (§4.5 `@lemma`).
#[derive(Clone, Debug)]
pub enum LemmaKind {
    /// `:LA` — Farkas coefficients, one per literal of the lemma clause, in
    /// the same order.
    La { coefficients: Vec<Rational> },
    /// `:CC` — a path of `(from, to)` term pairs connecting the goal
    /// equality's two sides, via literal/congruence/trivial edges.
    Cc { path: Vec<(TermId, TermId)> },
    /// `:read-over-weakeq` / `:weakeq-ext` — an array path, plus optional
    /// weak subpaths supporting missing select-index equalities.
    ArrayPath { strong: bool, path: Vec<(TermId, TermId)>, weak: Vec<Vec<(TermId, TermId)>> },
    /// `:trichotomy` over a shared affine term, identified by its
    /// canonical key.
    Trichotomy { affine_key: String },
    /// `:EQ` — a positive equality and a disequality over affine-equal
    /// terms.
    Eq,
}

/// Which `@split` rule a split node applies (§4.5 `@split`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SplitRule {
    NotOr,
    EqPlusHalf,
    EqMinusHalf,
    ItePlusHalf,
    IteMinusHalf,
}

/// A node of the proof DAG. One variant per rule (§4.4, §4.5, §9).
#[derive(Clone, Debug)]
pub enum ProofTerm {
    /// `refl(t)` proves `(= t t)`.
    Refl { term: TermId },
    /// `trans(p1..pk)` chains pairwise equalities.
    Trans { steps: Vec<Arc<ProofTerm>> },
    /// `cong(p0, p1..pn)`: `p0` proves `(= lhs (f a1..am))`, each `pi` an
    /// argument rewrite `(= ai bi)`; proves `(= lhs (f b1..bn))`. `result`
    /// names the already-interned `(f b1..bn)` term so the checker can
    /// confirm it against the substitutions rather than just asserting one
    /// exists (§4.4 `cong`).
    Cong { base: Arc<ProofTerm>, arg_rewrites: Vec<Arc<ProofTerm>>, result: TermId },
    /// `@eq`: `p0` proves `f`, `p1` proves `(= f g)`; result `g`.
    Eq { fact: Arc<ProofTerm>, equality: Arc<ProofTerm> },
    /// `@rewrite`: a `:rule`-tagged rewrite `(= lhs rhs)`.
    Rewrite { rule: RewriteRule, lhs: TermId, rhs: TermId },
    /// `@intern`: `rhs` is the internal (`<=·0`, quoted-CC) form of `lhs`.
    Intern { lhs: TermId, rhs: TermId },
    /// `@res`: resolve `main`'s clause against each pivot/argument pair in
    /// order.
    Res { main: Arc<ProofTerm>, steps: SmallVec<[ResolutionStep; 4]> },
    /// `@clause`: assert the wrapped proof proves exactly `clause` (up to
    /// permutation, no duplicates).
    ClauseCheck { inner: Arc<ProofTerm>, clause: Clause },
    /// `@lemma`: a leaf clause justified by a theory-specific kind.
    Lemma { clause: Clause, kind: LemmaKind },
    /// `@tautology`: a leaf clause matching a fixed schema.
    Tautology { clause: Clause, schema: TautologySchema },
    /// `@asserted`: an input clause, taken as an axiom.
    Asserted { clause: Clause },
    /// `@split`: derive `target` from `arg` via `rule`.
    Split { rule: SplitRule, arg: Arc<ProofTerm>, target: Lit },
}
