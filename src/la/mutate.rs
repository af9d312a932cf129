//! Crate `la::mutate` implements model repair (§4.1 "Model repair
//! ('mutate')"): after the continuous relaxation is satisfied, look for
//! shared variables that happen to hold equal values without the
//! uninterpreted-functions theory having equated them, and nudge one of
//! them to a value the tableau's remaining freedom still permits.
use std::cmp::{max, min};

use crate::la::reason::ReasonStore;
use crate::la::tableau::Tableau;
use crate::la::var::VarStore;
use crate::rational::{InfinitNumber, Rational};
use crate::types::VarId;

/// The interval `var` could move to without driving any dependent basic
/// row out of its own bounds (§4.1: "a non-empty freedom interval computed
/// from dependent basic bounds").
pub fn freedom_interval(var: VarId, vars: &VarStore, tableau: &Tableau, reasons: &ReasonStore) -> (InfinitNumber, InfinitNumber) {
    let mut lo = reasons.head_bound(var, false);
    let mut hi = reasons.head_bound(var, true);
    let value_var = vars.get(var).value.clone();
    for r in tableau.rows_with_column(var) {
        let row = match tableau.row(r) {
            Some(row) => row,
            None => continue,
        };
        let c = match row.cols.get(&var) {
            Some(c) => c,
            None => continue,
        };
        let e = Rational::new(c.clone(), row.own.clone());
        if e.is_zero() {
            continue;
        }
        let row_lo = reasons.head_bound(r, false);
        let row_hi = reasons.head_bound(r, true);
        let value_r = vars.get(r).value.clone();
        let reciprocal = &Rational::one() / &e;
        let q_lo = row_lo.sub(&value_r).scale(&reciprocal);
        let q_hi = row_hi.sub(&value_r).scale(&reciprocal);
        let delta_lo = min(q_lo.clone(), q_hi.clone());
        let delta_hi = max(q_lo, q_hi);
        lo = max(lo, value_var.add(&delta_lo));
        hi = min(hi, value_var.add(&delta_hi));
    }
    (lo, hi)
}

/// Pick a value inside `(lo, hi)` that avoids `var`'s recorded
/// disequalities and respects integrality, or `None` if the interval is too
/// narrow to offer one (§4.1 (a), (c)).
fn pick_value(var: VarId, lo: &InfinitNumber, hi: &InfinitNumber, vars: &VarStore) -> Option<InfinitNumber> {
    let record = vars.get(var);
    let mut candidate = match (lo.is_infinite(), hi.is_infinite()) {
        (false, false) => {
            let mid = &(&lo.a + &hi.a) / &Rational::from_i64(2);
            if record.is_int { Rational::from_bigint(mid.floor()) } else { mid }
        }
        (false, true) => {
            if record.is_int {
                &Rational::from_bigint(lo.a.floor()) + &Rational::one()
            } else {
                &lo.a + &Rational::one()
            }
        }
        (true, false) => {
            if record.is_int {
                &Rational::from_bigint(hi.a.floor()) - &Rational::one()
            } else {
                &hi.a - &Rational::one()
            }
        }
        (true, true) => Rational::zero(),
    };
    let mut attempts = 0;
    while record.disequalities.contains(&candidate) && attempts < 16 {
        candidate = &candidate + &Rational::one();
        attempts += 1;
    }
    let value = InfinitNumber::exact(candidate);
    if value > *lo && value < *hi {
        Some(value)
    } else if (value >= *lo && hi.is_infinite()) || (value <= *hi && lo.is_infinite()) {
        Some(value)
    } else {
        None
    }
}

/// Find one spurious-merge pair among `shared` (variables both theories
/// track) and a repair for one of its members, or `None` if the model is
/// already clean or no repair is available (§4.1 "scan shared variables
/// looking for pairs currently holding the same value that the
/// uninterpreted-functions theory has not equated").
pub fn find_repair(
    vars: &VarStore,
    tableau: &Tableau,
    reasons: &ReasonStore,
    shared: &[VarId],
    equated: &dyn Fn(VarId, VarId) -> bool,
) -> Option<(VarId, InfinitNumber)> {
    for (i, &a) in shared.iter().enumerate() {
        for &b in &shared[i + 1..] {
            if vars.get(a).value != vars.get(b).value || equated(a, b) {
                continue;
            }
            for candidate in [a, b] {
                if tableau.is_basic(candidate) {
                    continue;
                }
                let (lo, hi) = freedom_interval(candidate, vars, tableau, reasons);
                if let Some(new_value) = pick_value(candidate, &lo, &hi, vars) {
                    return Some((candidate, new_value));
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn freedom_interval_is_bounded_by_a_dependent_row() {
        let mut vars = VarStore::new();
        let mut tableau = Tableau::new();
        let mut reasons = ReasonStore::new();
        let b = vars.fresh(false, 0);
        let x = vars.fresh(false, 0);
        let mut cols = std::collections::BTreeMap::new();
        cols.insert(x, num_bigint::BigInt::from(1));
        tableau.insert_row(b, num_bigint::BigInt::from(-1), cols);
        vars.get_mut(x).value = InfinitNumber::exact(Rational::from_i64(2));
        vars.get_mut(b).value = InfinitNumber::exact(Rational::from_i64(2));
        reasons.push_literal(b, true, InfinitNumber::exact(Rational::from_i64(5)), 1, 0);
        let (_, hi) = freedom_interval(x, &vars, &tableau, &reasons);
        assert_eq!(hi, InfinitNumber::exact(Rational::from_i64(5)));
    }

    #[test]
    fn find_repair_detects_unmerged_equal_values() {
        let mut vars = VarStore::new();
        let tableau = Tableau::new();
        let reasons = ReasonStore::new();
        let a = vars.fresh(false, 0);
        let b = vars.fresh(false, 0);
        vars.get_mut(a).value = InfinitNumber::exact(Rational::from_i64(1));
        vars.get_mut(b).value = InfinitNumber::exact(Rational::from_i64(1));
        let shared = vec![a, b];
        let repair = find_repair(&vars, &tableau, &reasons, &shared, &|_, _| false);
        assert!(repair.is_some());
    }

    #[test]
    fn find_repair_ignores_already_equated_pairs() {
        let mut vars = VarStore::new();
        let tableau = Tableau::new();
        let reasons = ReasonStore::new();
        let a = vars.fresh(false, 0);
        let b = vars.fresh(false, 0);
        vars.get_mut(a).value = InfinitNumber::exact(Rational::from_i64(1));
        vars.get_mut(b).value = InfinitNumber::exact(Rational::from_i64(1));
        let shared = vec![a, b];
        let repair = find_repair(&vars, &tableau, &reasons, &shared, &|_, _| true);
        assert!(repair.is_none());
    }
}
