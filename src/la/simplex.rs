//! Crate `la::simplex` implements the pivot/repair loop of §4.1 "Tableau
//! and Simplex Driver", the General-Simplex-with-Bounds decision procedure
//! (Dutertre/de Moura style) over [`crate::la::tableau::Tableau`] and
//! [`crate::la::var::VarStore`].
use std::collections::BTreeSet;

use num_traits::Signed;

use crate::la::reason::ReasonStore;
use crate::la::tableau::Tableau;
use crate::la::var::VarStore;
use crate::rational::{InfinitNumber, Rational};
use crate::types::{Lit, LiteralEncoding, VarId};

/// A Farkas certificate for `false`: literals (already negated relative to
/// their asserted polarity, ready to drop straight into a conflict clause)
/// paired with the coefficient that witnessed their contribution (§4.1
/// "Conflict generation").
#[derive(Clone, Debug)]
pub struct Conflict {
    pub farkas: Vec<(Lit, Rational)>,
}

pub enum CheckPointResult {
    Conflict(Conflict),
    /// No conflict; `changed` lists every variable whose value moved during
    /// the repair loop, for the caller to run bound propagation over.
    Stable { changed: Vec<VarId> },
}

struct PivotCandidate {
    var: VarId,
    eff_coeff: Rational,
    wants_increase: bool,
    slack: InfinitNumber,
}

/// Borrows the three LA stores for the duration of one `check_point` call;
/// mirrors `splr`'s practice of building a short-lived driver struct
/// (`Linter`, `Vivifier`) around `&mut` store references rather than
/// threading them through free functions.
pub struct Simplex<'a> {
    vars: &'a mut VarStore,
    tableau: &'a mut Tableau,
    reasons: &'a mut ReasonStore,
    bland_use_factor: usize,
}

impl<'a> Simplex<'a> {
    pub fn new(vars: &'a mut VarStore, tableau: &'a mut Tableau, reasons: &'a mut ReasonStore, bland_use_factor: usize) -> Self {
        Simplex { vars, tableau, reasons, bland_use_factor }
    }

    fn effective_coeff(&self, own: &num_bigint::BigInt, c: &num_bigint::BigInt) -> Rational {
        Rational::new(c.clone(), own.clone())
    }

    /// Recompute a basic variable's value from the current values of its
    /// row's non-basic columns (§3: "current value of a basic variable
    /// equals the linear combination of non-basic current values using row
    /// coefficients").
    fn recompute_basic(&mut self, b: VarId) {
        let row = self.tableau.row(b).expect("recompute_basic: b must be basic").clone();
        let mut acc = InfinitNumber::zero();
        for (&j, c) in row.cols.iter() {
            let e = self.effective_coeff(&row.own, c);
            acc = acc.add(&self.vars.get(j).value.scale(&e));
        }
        self.vars.get_mut(b).value = acc;
    }

    /// Select an entering non-basic for `b`'s row that can move `b` toward
    /// `need_increase`'s direction (§4.1 "Finding a pivot"). `cols` is a
    /// `BTreeMap`, so scanning it in order already yields Bland's
    /// "strict variable-index ordering" for free when `use_bland` picks the
    /// first eligible candidate; the heuristic mode instead prefers a
    /// candidate whose freeing bound is unbounded.
    ///
    /// Simplification (recorded in the project's grounding ledger): the
    /// heuristic's "shortest dependency chain length" tie-break is not
    /// tracked explicitly; unbounded-first plus ascending `VarId` order is
    /// used in its place. Bland's rule, which is what guarantees
    /// termination, is exact.
    fn select_pivot(&self, b: VarId, need_increase: bool, use_bland: bool) -> Option<PivotCandidate> {
        let row = self.tableau.row(b)?;
        let mut best: Option<PivotCandidate> = None;
        for (&j, c) in row.cols.iter() {
            let e = self.effective_coeff(&row.own, c);
            let wants_increase = (need_increase && e.signum() > 0) || (!need_increase && e.signum() < 0);
            let upper_j = self.reasons.head_bound(j, true);
            let lower_j = self.reasons.head_bound(j, false);
            let value_j = &self.vars.get(j).value;
            let slack = if wants_increase { &upper_j - &value_j.a } else { &value_j.a - &lower_j };
            if slack.signum() <= 0 && !slack.is_infinite() {
                continue;
            }
            let slack = InfinitNumber::exact(slack);
            if use_bland {
                return Some(PivotCandidate { var: j, eff_coeff: e, wants_increase, slack });
            }
            let unbounded = if wants_increase { upper_j.is_infinite() } else { lower_j.is_infinite() };
            let better = match &best {
                None => true,
                Some(cur) => unbounded && !cur.slack.is_infinite(),
            };
            if better {
                best = Some(PivotCandidate { var: j, eff_coeff: e, wants_increase, slack });
            }
        }
        best
    }

    /// Run the repair loop over `out_of_bounds` until it is empty (stable)
    /// or a basic variable cannot be repaired (conflict), per §4.1 and the
    /// `check_point` entry point of §4.3.
    pub fn check_point(&mut self, out_of_bounds: &mut BTreeSet<VarId>) -> CheckPointResult {
        let n = self.vars.len().max(1);
        let bland_threshold = self.bland_use_factor.saturating_mul(n);
        let mut pivots = 0usize;
        let mut changed = Vec::new();
        loop {
            let b = match out_of_bounds.iter().next().copied() {
                Some(b) => b,
                None => return CheckPointResult::Stable { changed },
            };
            out_of_bounds.remove(&b);
            if !self.tableau.is_basic(b) {
                continue;
            }
            let lower = self.reasons.head_bound(b, false);
            let upper = self.reasons.head_bound(b, true);
            let value = self.vars.get(b).value.clone();
            if value >= lower && value <= upper {
                continue;
            }
            let need_increase = value < lower;
            let use_bland = pivots >= bland_threshold;
            let candidate = match self.select_pivot(b, need_increase, use_bland) {
                Some(c) => c,
                None => return CheckPointResult::Conflict(self.generate_conflict(b)),
            };

            let target = if need_increase { lower.clone() } else { upper.clone() };
            let needed = if need_increase { &target.a - &value.a } else { &value.a - &target.a };
            let gain_if_full = if candidate.slack.is_infinite() {
                Rational::PosInfinity
            } else {
                &candidate.slack.a * &candidate.eff_coeff.abs()
            };

            if candidate.slack.is_infinite() || gain_if_full >= needed {
                self.tableau.pivot(b, candidate.var);
                self.vars.get_mut(b).value = target;
                self.recompute_basic(candidate.var);
                changed.push(b);
                changed.push(candidate.var);
                pivots += 1;
                let v = self.vars.get(candidate.var).value.clone();
                let lo = self.reasons.head_bound(candidate.var, false);
                let hi = self.reasons.head_bound(candidate.var, true);
                if v < lo || v > hi {
                    out_of_bounds.insert(candidate.var);
                }
            } else {
                let bound_j = if candidate.wants_increase {
                    self.reasons.head_bound(candidate.var, true)
                } else {
                    self.reasons.head_bound(candidate.var, false)
                };
                self.vars.get_mut(candidate.var).value = bound_j;
                self.recompute_basic(b);
                changed.push(candidate.var);
                changed.push(b);
                let v = self.vars.get(b).value.clone();
                if v < lower || v > upper {
                    out_of_bounds.insert(b);
                }
            }
        }
    }

    /// Build a Farkas certificate from `b`'s conflicting upper/lower
    /// reasons (§4.1 "Conflict generation"): walk both chains, scaling each
    /// literal's contribution by the accumulated coefficient.
    fn generate_conflict(&self, b: VarId) -> Conflict {
        let upper_id = self.reasons.head(b, true).expect("conflict without an upper reason");
        let lower_id = self.reasons.head(b, false).expect("conflict without a lower reason");
        let mut out = Vec::new();
        self.reasons.explain(upper_id, &Rational::one(), &mut out);
        self.reasons.explain(lower_id, &Rational::one(), &mut out);
        Conflict { farkas: out }
    }

    /// Recompute a basic row's value after one of its columns changed
    /// outside the repair loop (e.g. a freshly asserted bound forced a
    /// non-basic straight to its new bound) and enqueue it if that leaves
    /// it out of range.
    pub fn recompute_and_enqueue(&mut self, b: VarId, out_of_bounds: &mut BTreeSet<VarId>) {
        self.recompute_basic(b);
        let v = self.vars.get(b).value.clone();
        let lo = self.reasons.head_bound(b, false);
        let hi = self.reasons.head_bound(b, true);
        if v < lo || v > hi {
            out_of_bounds.insert(b);
        }
    }

    /// After `v`'s bounds tightened, find every previously registered bound
    /// atom on `v` now entailed true or false and return its propagated
    /// literal (§4.1 "Theory propagation to DPLL").
    pub fn propagate_bounds(&self, v: VarId) -> Vec<Lit> {
        let upper = self.reasons.head_bound(v, true);
        let lower = self.reasons.head_bound(v, false);
        let mut out = Vec::new();
        for (bound, is_upper, lit) in self.vars.get(v).bound_atoms.iter() {
            if *is_upper {
                if upper <= *bound {
                    out.push(*lit);
                } else if lower > *bound {
                    out.push(lit.negate());
                }
            } else if lower >= *bound {
                out.push(*lit);
            } else if upper < *bound {
                out.push(lit.negate());
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::la::tableau::Tableau;
    use crate::rational::Rational;
    use num_bigint::BigInt;

    fn setup() -> (VarStore, Tableau, ReasonStore) {
        (VarStore::new(), Tableau::new(), ReasonStore::new())
    }

    #[test]
    fn pivots_to_satisfy_a_lower_bound() {
        let (mut vars, mut tableau, mut reasons) = setup();
        let b = vars.fresh(false, 0);
        let x = vars.fresh(false, 0);
        let mut cols = std::collections::BTreeMap::new();
        cols.insert(x, BigInt::from(1));
        tableau.insert_row(b, BigInt::from(-1), cols); // b = x
        vars.get_mut(b).value = InfinitNumber::zero();
        vars.get_mut(x).value = InfinitNumber::zero();
        reasons.push_literal(b, false, InfinitNumber::exact(Rational::from_i64(5)), 1, 0);
        reasons.push_literal(x, true, InfinitNumber::pos_infinity(), 2, 0);

        let mut oob = BTreeSet::new();
        oob.insert(b);
        let mut simplex = Simplex::new(&mut vars, &mut tableau, &mut reasons, 1000);
        match simplex.check_point(&mut oob) {
            CheckPointResult::Stable { .. } => {}
            CheckPointResult::Conflict(_) => panic!("expected a repair, not a conflict"),
        }
        assert!(vars.get(b).value >= InfinitNumber::exact(Rational::from_i64(5)));
    }

    #[test]
    fn unrepairable_row_yields_a_conflict() {
        let (mut vars, mut tableau, mut reasons) = setup();
        let b = vars.fresh(false, 0);
        let x = vars.fresh(false, 0);
        let mut cols = std::collections::BTreeMap::new();
        cols.insert(x, BigInt::from(1));
        tableau.insert_row(b, BigInt::from(-1), cols);
        vars.get_mut(b).value = InfinitNumber::zero();
        vars.get_mut(x).value = InfinitNumber::zero();
        reasons.push_literal(b, false, InfinitNumber::exact(Rational::from_i64(5)), 1, 0);
        // x pinned at 0 on both sides: cannot move to raise b.
        reasons.push_literal(x, true, InfinitNumber::zero(), 2, 0);
        reasons.push_literal(x, false, InfinitNumber::zero(), 3, 0);

        let mut oob = BTreeSet::new();
        oob.insert(b);
        let mut simplex = Simplex::new(&mut vars, &mut tableau, &mut reasons, 1000);
        match simplex.check_point(&mut oob) {
            CheckPointResult::Conflict(c) => assert!(!c.farkas.is_empty()),
            CheckPointResult::Stable { .. } => panic!("expected a conflict"),
        }
    }
}
