//! Crate `la::var` provides the `LinVar` record (§3 "LinVar") and its
//! owning `VarStore`, the LA-theory analogue of `splr::var::VarDB`.
use std::collections::HashMap;

use crate::la::reason::ReasonId;
use crate::rational::{InfinitNumber, Rational};
use crate::types::{DecisionLevel, Lit, VarId};

/// A linear-arithmetic variable: a slack/shared term tracked by the
/// tableau. Basic variables own a row; non-basic variables own a column
/// (§3: "For basic variables: a matrix row; for non-basic: a matrix
/// column").
#[derive(Clone, Debug)]
pub struct LinVar {
    pub id: VarId,
    pub is_int: bool,
    pub is_basic: bool,
    pub value: InfinitNumber,
    pub upper_reason: Option<ReasonId>,
    pub lower_reason: Option<ReasonId>,
    /// Rationals this variable has been proved `≠` to (§3: "set of
    /// disequalities"), consulted by model repair (§4.1 "mutate").
    pub disequalities: Vec<Rational>,
    /// Bound value -> the atom literal asserting it, so that setting a
    /// tighter bound can find and propagate every bound atom it now
    /// entails (§4.1 "Theory propagation to DPLL").
    pub bound_atoms: Vec<(InfinitNumber, bool, Lit)>,
    pub created_at_level: DecisionLevel,
}

impl LinVar {
    pub fn new(id: VarId, is_int: bool, created_at_level: DecisionLevel) -> Self {
        LinVar {
            id,
            is_int,
            is_basic: false,
            value: InfinitNumber::zero(),
            upper_reason: None,
            lower_reason: None,
            disequalities: Vec::new(),
            bound_atoms: Vec::new(),
            created_at_level,
        }
    }

    pub fn register_bound_atom(&mut self, bound: InfinitNumber, is_upper: bool, lit: Lit) {
        self.bound_atoms.push((bound, is_upper, lit));
    }
}

/// Owns every live `LinVar`, keyed by [`VarId`]; mirrors `splr::var::VarDB`
/// being a flat `Vec<Var>` addressed by the same ids the clause/assignment
/// layer uses.
#[derive(Default)]
pub struct VarStore {
    vars: Vec<LinVar>,
    /// Shared terms registered as LA variables, so re-asserting a bound on
    /// an already-known term reuses its `LinVar` (mirrors
    /// `AtomTable::by_key` in [`crate::clause`]).
    by_term: HashMap<usize, VarId>,
}

impl VarStore {
    pub fn new() -> Self {
        VarStore::default()
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn get(&self, vi: VarId) -> &LinVar {
        &self.vars[vi]
    }

    pub fn get_mut(&mut self, vi: VarId) -> &mut LinVar {
        &mut self.vars[vi]
    }

    pub fn fresh(&mut self, is_int: bool, level: DecisionLevel) -> VarId {
        let id = self.vars.len();
        self.vars.push(LinVar::new(id, is_int, level));
        id
    }

    pub fn term_var(&mut self, term: usize, is_int: bool, level: DecisionLevel) -> VarId {
        if let Some(vi) = self.by_term.get(&term) {
            return *vi;
        }
        let vi = self.fresh(is_int, level);
        self.by_term.insert(term, vi);
        vi
    }

    pub fn iter(&self) -> impl Iterator<Item = &LinVar> {
        self.vars.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = VarId> {
        0..self.vars.len()
    }

    /// Drop variables created at a level deeper than `level` (§3
    /// "Lifecycles"). Safe because creation order is monotone in level, the
    /// same invariant [`crate::clause::AtomTable::truncate_to_level`]
    /// relies on.
    pub fn truncate_to_level(&mut self, level: DecisionLevel) {
        while let Some(last) = self.vars.last() {
            if last.created_at_level > level {
                self.vars.pop();
            } else {
                break;
            }
        }
        self.by_term.retain(|_, vi| *vi < self.vars.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn term_var_is_idempotent_per_term() {
        let mut store = VarStore::new();
        let a = store.term_var(42, false, 0);
        let b = store.term_var(42, false, 0);
        assert_eq!(a, b);
    }

    #[test]
    fn truncate_to_level_removes_deeper_vars() {
        let mut store = VarStore::new();
        store.fresh(false, 0);
        store.fresh(false, 1);
        store.truncate_to_level(0);
        assert_eq!(store.len(), 1);
    }
}
