//! `@proof` producer (§4.4): builder functions the engine's own theory and
//! clausifier code call to assemble proof terms it already knows are
//! well-typed. Per §4.4's implementation note, a malformed call here is an
//! internal invariant violation (`debug_assert!`/`unreachable!`), never a
//! recoverable error — adversarial validation is the checker's job
//! (§4.5, [`crate::proof::checker`]).
use std::sync::Arc;

use smallvec::SmallVec;

use crate::clause::Clause;
use crate::proof::{LemmaKind, ProofTerm, ResolutionStep, SplitRule};
use crate::rational::Rational;
use crate::types::{Lit, TermId};

/// `refl(t)` proves `(= t t)`.
pub fn refl(term: TermId) -> Arc<ProofTerm> {
    Arc::new(ProofTerm::Refl { term })
}

/// `trans(p1..pk)` chains pairwise equalities. The producer only asserts
/// there are at least two steps; the checker independently verifies the
/// chain actually links (§4.5 `@trans`).
pub fn trans(steps: Vec<Arc<ProofTerm>>) -> Arc<ProofTerm> {
    debug_assert!(steps.len() >= 2, "trans needs at least two equalities to chain");
    Arc::new(ProofTerm::Trans { steps })
}

/// `cong(p0, p1..pn)`: `result` is the interned application of `p0`'s
/// target symbol to the rewritten arguments (§4.4 `cong`).
pub fn cong(base: Arc<ProofTerm>, arg_rewrites: Vec<Arc<ProofTerm>>, result: TermId) -> Arc<ProofTerm> {
    Arc::new(ProofTerm::Cong { base, arg_rewrites, result })
}

/// `@eq`: `fact` proves `f`, `equality` proves `(= f g)`.
pub fn eq(fact: Arc<ProofTerm>, equality: Arc<ProofTerm>) -> Arc<ProofTerm> {
    Arc::new(ProofTerm::Eq { fact, equality })
}

pub fn rewrite(rule: crate::proof::RewriteRule, lhs: TermId, rhs: TermId) -> Arc<ProofTerm> {
    Arc::new(ProofTerm::Rewrite { rule, lhs, rhs })
}

pub fn intern(lhs: TermId, rhs: TermId) -> Arc<ProofTerm> {
    Arc::new(ProofTerm::Intern { lhs, rhs })
}

/// `res(main, (:pivot p arg)...)`: resolve clauses in order (§4.4).
pub fn res(main: Arc<ProofTerm>, steps: Vec<(Lit, Arc<ProofTerm>)>) -> Arc<ProofTerm> {
    debug_assert!(!steps.is_empty(), "res needs at least one pivot step");
    let steps: SmallVec<[ResolutionStep; 4]> =
        steps.into_iter().map(|(pivot, arg)| ResolutionStep { pivot, arg }).collect();
    Arc::new(ProofTerm::Res { main, steps })
}

pub fn clause_check(inner: Arc<ProofTerm>, clause: Clause) -> Arc<ProofTerm> {
    Arc::new(ProofTerm::ClauseCheck { inner, clause })
}

pub fn lemma(clause: Clause, kind: LemmaKind) -> Arc<ProofTerm> {
    Arc::new(ProofTerm::Lemma { clause, kind })
}

/// A `:LA` lemma from Farkas coefficients, the shape `crate::la` conflicts
/// (§4.1 "Conflict generation") feed directly into this producer.
pub fn la_lemma(clause: Clause, coefficients: Vec<Rational>) -> Arc<ProofTerm> {
    debug_assert_eq!(clause.len(), coefficients.len(), "one Farkas coefficient per literal");
    lemma(clause, LemmaKind::La { coefficients })
}

pub fn tautology(clause: Clause, schema: crate::proof::TautologySchema) -> Arc<ProofTerm> {
    Arc::new(ProofTerm::Tautology { clause, schema })
}

pub fn asserted(clause: Clause) -> Arc<ProofTerm> {
    Arc::new(ProofTerm::Asserted { clause })
}

pub fn split(rule: SplitRule, arg: Arc<ProofTerm>, target: Lit) -> Arc<ProofTerm> {
    Arc::new(ProofTerm::Split { rule, arg, target })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refl_builds_the_expected_node() {
        let p = refl(3);
        assert!(matches!(&*p, ProofTerm::Refl { term: 3 }));
    }

    #[test]
    fn la_lemma_pairs_one_coefficient_per_literal() {
        use crate::types::VarIdEncoding;
        let vi: crate::types::VarId = 0;
        let clause = Clause::unit(vi.pos_lit());
        let p = la_lemma(clause, vec![Rational::one()]);
        assert!(matches!(&*p, ProofTerm::Lemma { .. }));
    }
}
