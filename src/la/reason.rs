//! Crate `la::reason` implements the bound-justification chains of §3
//! "LAReason" and §4.2 "Bound Reasons & Explanation".
//!
//! Per §9 ("Cyclic term references in reason chains"): the source's object
//! graph lets composite reasons point at the literal reasons that complete
//! their evidence set, which in turn can be looked up again from the
//! composite — a back-edge shape that would be an ownership cycle in safe
//! Rust. Reimplemented here as a flat, append-only arena addressed by
//! [`ReasonId`], with every cross-reference (chain "older" pointer,
//! composite evidence, "last literal" back-pointer) stored as an index
//! rather than a reference.
use std::collections::HashMap;

use crate::rational::{InfinitNumber, Rational};
use crate::types::{Lit, VarId};

pub type ReasonId = usize;

/// One node of a bound's justification (§3 "LAReason").
#[derive(Clone, Debug)]
pub struct LAReason {
    pub var: VarId,
    pub is_upper: bool,
    /// The bound this reason asserts on `var`'s upper/lower side.
    pub bound: InfinitNumber,
    /// Chain pointer to the next-weaker reason on the same side (§3:
    /// "a chain pointer to an older (weaker) reason on the same side").
    pub older: Option<ReasonId>,
    /// Assertion-order index, used to keep chains append-only and to
    /// decide, on backtrack, which reasons a retracted literal invalidates.
    pub stack_pos: usize,
    pub kind: LAReasonKind,
}

#[derive(Clone, Debug)]
pub enum LAReasonKind {
    /// Bound justified directly by an asserted Boolean literal (§3
    /// "LiteralReason").
    Literal { lit: Lit },
    /// Bound refined from the bounds of the non-basic columns of a basic
    /// row (§3 "CompositeReason", §4.1 "Bound-refinement counters").
    Composite {
        /// `(child reason, Farkas coefficient)` pairs, one per contributing
        /// non-basic column.
        evidence: Vec<(ReasonId, Rational)>,
        /// The literal whose assertion completed this composite's evidence
        /// set (§3: "back-pointers to the 'last literal' ... for
        /// explanation and dependency invalidation").
        last_literal: Lit,
    },
}

impl LAReason {
    pub fn is_composite(&self) -> bool {
        matches!(self.kind, LAReasonKind::Composite { .. })
    }

    pub fn last_literal(&self) -> Option<Lit> {
        match &self.kind {
            LAReasonKind::Literal { lit } => Some(*lit),
            LAReasonKind::Composite { last_literal, .. } => Some(*last_literal),
        }
    }
}

/// The arena plus the per-`(var, side)` chain heads.
#[derive(Default)]
pub struct ReasonStore {
    arena: Vec<LAReason>,
    upper_head: HashMap<VarId, ReasonId>,
    lower_head: HashMap<VarId, ReasonId>,
}

impl ReasonStore {
    pub fn new() -> Self {
        ReasonStore::default()
    }

    pub fn get(&self, id: ReasonId) -> &LAReason {
        &self.arena[id]
    }

    pub fn head(&self, var: VarId, is_upper: bool) -> Option<ReasonId> {
        let map = if is_upper { &self.upper_head } else { &self.lower_head };
        map.get(&var).copied()
    }

    pub fn head_bound(&self, var: VarId, is_upper: bool) -> InfinitNumber {
        match self.head(var, is_upper) {
            Some(id) => self.arena[id].bound.clone(),
            None if is_upper => InfinitNumber::pos_infinity(),
            None => InfinitNumber::neg_infinity(),
        }
    }

    /// Push a new reason, linking it to the current head as `older`, iff it
    /// is strictly tighter than the current head (§3 invariant: chains are
    /// strictly monotone). Returns `None` (and pushes nothing) if the
    /// candidate bound is not an improvement, mirroring how `splr` declines
    /// to enqueue an assignment that is already entailed.
    fn push(&mut self, var: VarId, is_upper: bool, bound: InfinitNumber, stack_pos: usize, kind: LAReasonKind) -> Option<ReasonId> {
        let current = self.head_bound(var, is_upper);
        let improves = if is_upper { bound < current } else { bound > current };
        if !improves {
            return None;
        }
        let older = self.head(var, is_upper);
        let id = self.arena.len();
        self.arena.push(LAReason { var, is_upper, bound, older, stack_pos, kind });
        if is_upper {
            self.upper_head.insert(var, id);
        } else {
            self.lower_head.insert(var, id);
        }
        Some(id)
    }

    pub fn push_literal(&mut self, var: VarId, is_upper: bool, bound: InfinitNumber, lit: Lit, stack_pos: usize) -> Option<ReasonId> {
        self.push(var, is_upper, bound, stack_pos, LAReasonKind::Literal { lit })
    }

    pub fn push_composite(
        &mut self,
        var: VarId,
        is_upper: bool,
        bound: InfinitNumber,
        evidence: Vec<(ReasonId, Rational)>,
        last_literal: Lit,
        stack_pos: usize,
    ) -> Option<ReasonId> {
        self.push(var, is_upper, bound, stack_pos, LAReasonKind::Composite { evidence, last_literal })
    }

    /// Undo every reason created at or after `stack_pos` (§4.2 "On
    /// backtrack, the head(s) added by the retracted literal are
    /// unlinked"). Because the arena is append-only in non-decreasing
    /// `stack_pos` order, popping the tail and re-walking each chain's
    /// `older` pointer back to the first surviving node restores the heads
    /// exactly, including composites whose `last_literal` belonged to the
    /// retracted assertion.
    pub fn rollback_to(&mut self, stack_pos: usize) {
        while let Some(last) = self.arena.last() {
            if last.stack_pos < stack_pos {
                break;
            }
            let removed = self.arena.pop().unwrap();
            let map = if removed.is_upper { &mut self.upper_head } else { &mut self.lower_head };
            match removed.older {
                Some(older) => {
                    map.insert(removed.var, older);
                }
                None => {
                    map.remove(&removed.var);
                }
            }
        }
    }

    /// Walk a composite's evidence, accumulating each literal reason's
    /// contribution scaled by the accumulated Farkas coefficient (§4.2
    /// `explain`). `out` collects `(lit, coefficient)` pairs; composites
    /// recurse, literals terminate the walk.
    pub fn explain(&self, reason: ReasonId, coeff: &Rational, out: &mut Vec<(Lit, Rational)>) {
        let r = &self.arena[reason];
        match &r.kind {
            LAReasonKind::Literal { lit } => out.push((*lit, coeff.clone())),
            LAReasonKind::Composite { evidence, .. } => {
                for (child, child_coeff) in evidence {
                    self.explain(*child, &(child_coeff * coeff), out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tighter_upper_bound_becomes_new_head_and_chains_to_old() {
        let mut store = ReasonStore::new();
        let r1 = store.push_literal(0, true, InfinitNumber::exact(Rational::from_i64(10)), 2, 0).unwrap();
        let r2 = store.push_literal(0, true, InfinitNumber::exact(Rational::from_i64(5)), 4, 1).unwrap();
        assert_eq!(store.head(0, true), Some(r2));
        assert_eq!(store.get(r2).older, Some(r1));
    }

    #[test]
    fn weaker_bound_is_rejected() {
        let mut store = ReasonStore::new();
        store.push_literal(0, true, InfinitNumber::exact(Rational::from_i64(5)), 2, 0).unwrap();
        let rejected = store.push_literal(0, true, InfinitNumber::exact(Rational::from_i64(10)), 4, 1);
        assert!(rejected.is_none());
        assert_eq!(store.head_bound(0, true), InfinitNumber::exact(Rational::from_i64(5)));
    }

    #[test]
    fn rollback_restores_older_head() {
        let mut store = ReasonStore::new();
        store.push_literal(0, true, InfinitNumber::exact(Rational::from_i64(10)), 2, 0).unwrap();
        store.push_literal(0, true, InfinitNumber::exact(Rational::from_i64(5)), 4, 1).unwrap();
        store.rollback_to(1);
        assert_eq!(store.head_bound(0, true), InfinitNumber::exact(Rational::from_i64(10)));
    }

    #[test]
    fn explain_scales_literal_coefficients_through_composite() {
        let mut store = ReasonStore::new();
        let lit_r = store.push_literal(1, false, InfinitNumber::exact(Rational::from_i64(1)), 9, 0).unwrap();
        let comp = store
            .push_composite(
                0,
                false,
                InfinitNumber::exact(Rational::from_i64(2)),
                vec![(lit_r, Rational::from_i64(2))],
                5,
                10,
            )
            .unwrap();
        let mut out = Vec::new();
        store.explain(comp, &Rational::from_i64(3), &mut out);
        assert_eq!(out, vec![(9, Rational::from_i64(6))]);
    }
}
