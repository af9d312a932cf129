//! Crate `la` assembles the linear-arithmetic theory (§2 "LinVar / Tableau"
//! through "Model repair") behind one `LaTheory` facade, the LA-side
//! analogue of how `splr::solver::Solver` sits on top of its `AssignStack`
//! and `ClauseDB`.
pub mod cuts;
pub mod mutate;
pub mod reason;
pub mod simplex;
pub mod tableau;
pub mod var;

use std::collections::{BTreeSet, VecDeque};

use num_bigint::BigInt;
use tracing::{debug, trace};

use crate::la::cuts::{generate_cuts, Cut};
use crate::la::mutate::find_repair;
use crate::la::reason::ReasonStore;
use crate::la::simplex::{CheckPointResult, Conflict, Simplex};
use crate::la::tableau::Tableau;
use crate::la::var::VarStore;
use crate::rational::InfinitNumber;
use crate::types::{DecisionLevel, Lit, VarId};

/// What `end_of_search` found once the continuous relaxation is stable
/// (§4.1 "Integer cuts", "Model repair").
pub enum EndOfSearch {
    /// Fresh Gomory cuts to assert as new bounds before the next round of
    /// `check_point`.
    Cuts(Vec<Cut>),
    /// A non-basic shared variable should take `new_value` to break a
    /// spurious merge before reporting `sat`.
    Repair { var: VarId, new_value: InfinitNumber },
    /// Nothing left to do; the model stands.
    Satisfied,
}

/// Owns every LA store and exposes the §4.3 entry points
/// (`set_literal`/`check_point`/`push`/`pop`/...) that
/// [`crate::assign`]'s DPLL(T) loop drives.
pub struct LaTheory {
    pub vars: VarStore,
    pub tableau: Tableau,
    pub reasons: ReasonStore,
    out_of_bounds: BTreeSet<VarId>,
    propagated: VecDeque<Lit>,
    /// Shared (UF-visible) variables considered by the model-repair pass.
    shared: Vec<VarId>,
    current_level: DecisionLevel,
    scope_marks: Vec<usize>,
    next_stack_pos: usize,
    bland_use_factor: usize,
    max_cuts: usize,
}

impl LaTheory {
    pub fn new(bland_use_factor: usize, max_cuts: usize) -> Self {
        LaTheory {
            vars: VarStore::new(),
            tableau: Tableau::new(),
            reasons: ReasonStore::new(),
            out_of_bounds: BTreeSet::new(),
            propagated: VecDeque::new(),
            shared: Vec::new(),
            current_level: 0,
            scope_marks: Vec::new(),
            next_stack_pos: 0,
            bland_use_factor,
            max_cuts,
        }
    }

    pub fn fresh_var(&mut self, is_int: bool) -> VarId {
        self.vars.fresh(is_int, self.current_level)
    }

    pub fn term_var(&mut self, term: usize, is_int: bool) -> VarId {
        self.vars.term_var(term, is_int, self.current_level)
    }

    pub fn mark_shared(&mut self, var: VarId) {
        if !self.shared.contains(&var) {
            self.shared.push(var);
        }
    }

    /// Define `basic`'s row directly (e.g. a Tseitin-style slack
    /// introduced for a compound affine term).
    pub fn define_row(&mut self, basic: VarId, own: BigInt, cols: std::collections::BTreeMap<VarId, BigInt>) {
        self.tableau.insert_row(basic, own, cols);
    }

    fn simplex(&mut self) -> Simplex<'_> {
        Simplex::new(&mut self.vars, &mut self.tableau, &mut self.reasons, self.bland_use_factor)
    }

    /// Assert a new bound on `var`, justified by `lit` (§4.3 `set_literal`,
    /// restricted to the LA-atom case; Boolean-only literals never reach
    /// this theory). No-op if the bound does not improve on the current
    /// head, mirroring [`ReasonStore::push_literal`]'s own idempotence.
    pub fn assert_bound(&mut self, var: VarId, is_upper: bool, bound: InfinitNumber, lit: Lit) {
        let stack_pos = self.next_stack_pos;
        self.next_stack_pos += 1;
        let pushed = self.reasons.push_literal(var, is_upper, bound.clone(), lit, stack_pos);
        if pushed.is_none() {
            return;
        }
        trace!(var, is_upper, %bound, "la: bound asserted");
        if self.tableau.is_basic(var) {
            self.out_of_bounds.insert(var);
            return;
        }
        let value = self.vars.get(var).value.clone();
        let violates = if is_upper { value > bound } else { value < bound };
        if !violates {
            return;
        }
        self.vars.get_mut(var).value = bound;
        let dependents = self.tableau.rows_with_column(var);
        let mut simplex = self.simplex();
        for r in dependents {
            simplex.recompute_and_enqueue(r, &mut self.out_of_bounds);
        }
    }

    /// Run the repair loop to a fixed point, then drain any bound
    /// propagation the now-tighter bounds entail (§4.3 `check_point`).
    pub fn check_point(&mut self) -> Option<Conflict> {
        let mut out_of_bounds = std::mem::take(&mut self.out_of_bounds);
        let result = {
            let mut simplex = self.simplex();
            simplex.check_point(&mut out_of_bounds)
        };
        self.out_of_bounds = out_of_bounds;
        match result {
            CheckPointResult::Conflict(c) => {
                debug!(farkas_len = c.farkas.len(), "la: conflict");
                Some(c)
            }
            CheckPointResult::Stable { changed } => {
                let simplex = self.simplex();
                for v in changed {
                    for lit in simplex.propagate_bounds(v) {
                        self.propagated.push_back(lit);
                    }
                }
                None
            }
        }
    }

    /// §4.3 `get_propagated_literal`.
    pub fn get_propagated_literal(&mut self) -> Option<Lit> {
        self.propagated.pop_front()
    }

    /// §4.3 `compute_conflict_clause`'s non-conflict tail: integer cuts
    /// first, then shared-variable model repair, once `check_point` itself
    /// reports no conflict and no further propagation is pending.
    pub fn end_of_search(&mut self, equated: &dyn Fn(VarId, VarId) -> bool) -> EndOfSearch {
        let cuts = generate_cuts(&self.vars, &self.tableau, &self.reasons, self.max_cuts);
        if !cuts.is_empty() {
            debug!(count = cuts.len(), "la: generated integer cuts");
            return EndOfSearch::Cuts(cuts);
        }
        if let Some((var, new_value)) = find_repair(&self.vars, &self.tableau, &self.reasons, &self.shared, equated) {
            return EndOfSearch::Repair { var, new_value };
        }
        EndOfSearch::Satisfied
    }

    /// §4.3 `push()`.
    pub fn push(&mut self) {
        self.current_level += 1;
        self.scope_marks.push(self.next_stack_pos);
    }

    /// §4.3 `pop(n)`: discard `n` assertion-stack scopes, along with every
    /// variable, tableau row, and bound reason created inside them (§3
    /// "Lifecycles").
    pub fn pop(&mut self, n: usize) {
        for _ in 0..n {
            let Some(stack_pos) = self.scope_marks.pop() else { break };
            let target_level = self.current_level - 1;
            let doomed: Vec<VarId> = self.vars.ids().filter(|&v| self.vars.get(v).created_at_level > target_level).collect();
            for v in &doomed {
                self.tableau.remove_row(*v);
                self.out_of_bounds.remove(v);
            }
            self.shared.retain(|v| !doomed.contains(v));
            self.vars.truncate_to_level(target_level);
            self.reasons.rollback_to(stack_pos);
            self.current_level = target_level;
        }
        self.propagated.clear();
    }
}
