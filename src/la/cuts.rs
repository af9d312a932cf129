//! Crate `la::cuts` implements Gomory mixed-integer cut generation (§4.1
//! "Integer cuts"), invoked once the continuous relaxation is satisfied but
//! some integer basic variable still holds a fractional value.
use crate::affine::AffineTerm;
use crate::la::reason::ReasonStore;
use crate::la::tableau::Tableau;
use crate::la::var::VarStore;
use crate::rational::Rational;
use crate::types::VarId;

/// A generated cut, in the engine's usual `affine <= 0` bound-atom shape
/// (§3 `AtomKind::BoundLe0`), always non-strict: Gomory cuts are integer
/// inequalities that never need an epsilon term.
#[derive(Clone, Debug)]
pub struct Cut {
    pub source_row: VarId,
    pub affine: AffineTerm,
}

/// Generate at most `max_cuts` Gomory mixed-integer cuts from the rows of
/// integer basic variables whose current value is fractional.
///
/// Every non-basic column is assumed pinned at one of its bounds (true by
/// construction once [`crate::la::simplex::Simplex::check_point`] reports
/// stability), so each row can be restated as `b = value(b) + Σ gⱼ·dⱼ` with
/// `dⱼ ≥ 0` the column's displacement from its pinned bound; the standard
/// GMI derivation (Cornuéjols' lecture-note formula) then gives a cut
/// coefficient `αⱼ` for every column, and `Σ αⱼ·dⱼ ≥ f₀` is restated back
/// in terms of the original `xⱼ` below.
///
/// Simplification (recorded in the project's grounding ledger): rows whose
/// pinned bound on a contributing column is itself infinite or strict
/// (epsilon-shifted) are skipped rather than cut — a fractional optimum
/// pinned against a non-exact bound does not arise for the LIA fragment
/// this engine targets, since integer bounds are always exact integers.
pub fn generate_cuts(vars: &VarStore, tableau: &Tableau, reasons: &ReasonStore, max_cuts: usize) -> Vec<Cut> {
    let mut cuts = Vec::new();
    for b in tableau.basic_vars() {
        if cuts.len() >= max_cuts {
            break;
        }
        if !vars.get(b).is_int {
            continue;
        }
        if let Some(cut) = build_cut(b, vars, tableau, reasons) {
            cuts.push(cut);
        }
    }
    cuts
}

fn build_cut(b: VarId, vars: &VarStore, tableau: &Tableau, reasons: &ReasonStore) -> Option<Cut> {
    let value_b = &vars.get(b).value;
    if value_b.eps.is_strict() || value_b.is_infinite() {
        return None;
    }
    let f0 = value_b.a.frac();
    if f0.is_zero() {
        return None;
    }
    let row = tableau.row(b)?;
    let one = Rational::one();
    let mut affine = AffineTerm::constant(f0.clone());
    for (&j, c) in row.cols.iter() {
        let e = Rational::new(c.clone(), row.own.clone());
        let var_j = vars.get(j);
        let lower_j = reasons.head_bound(j, false);
        let upper_j = reasons.head_bound(j, true);
        let pinned_at_lower = var_j.value == lower_j;
        let bound_val = if pinned_at_lower { &lower_j } else { &upper_j };
        if bound_val.is_infinite() || bound_val.eps.is_strict() {
            return None;
        }
        let g = if pinned_at_lower { e.clone() } else { -e.clone() };
        let alpha = if var_j.is_int {
            let fj = g.frac();
            if fj <= f0 {
                fj
            } else {
                &(&f0 * &(&one - &fj)) / &(&one - &f0)
            }
        } else if g.signum() >= 0 {
            g.clone()
        } else {
            &(&(-g.clone()) * &f0) / &(&one - &f0)
        };
        if pinned_at_lower {
            affine.add_term(j, &(-alpha.clone()));
            affine.constant = &affine.constant + &(&alpha * &bound_val.a);
        } else {
            affine.add_term(j, &alpha);
            affine.constant = &affine.constant - &(&alpha * &bound_val.a);
        }
    }
    Some(Cut { source_row: b, affine })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::la::reason::ReasonStore;
    use crate::la::tableau::Tableau;
    use crate::la::var::VarStore;
    use crate::rational::InfinitNumber;
    use num_bigint::BigInt;
    use std::collections::BTreeMap;

    #[test]
    fn fractional_integer_row_yields_a_cut() {
        let mut vars = VarStore::new();
        let mut tableau = Tableau::new();
        let mut reasons = ReasonStore::new();
        let b = vars.fresh(true, 0);
        let x = vars.fresh(true, 0);
        let mut cols = BTreeMap::new();
        cols.insert(x, BigInt::from(1));
        tableau.insert_row(b, BigInt::from(-2), cols); // 2b = x, i.e. b = x/2
        vars.get_mut(x).value = InfinitNumber::exact(Rational::from_i64(3));
        vars.get_mut(b).value = InfinitNumber::exact(Rational::new(BigInt::from(3), BigInt::from(2)));
        reasons.push_literal(x, false, InfinitNumber::exact(Rational::from_i64(3)), 1, 0);
        reasons.push_literal(x, true, InfinitNumber::exact(Rational::from_i64(3)), 2, 0);

        let cuts = generate_cuts(&vars, &tableau, &reasons, 8);
        assert_eq!(cuts.len(), 1);
        assert_eq!(cuts[0].source_row, b);
    }

    #[test]
    fn integral_row_yields_no_cut() {
        let mut vars = VarStore::new();
        let mut tableau = Tableau::new();
        let reasons = ReasonStore::new();
        let b = vars.fresh(true, 0);
        let x = vars.fresh(true, 0);
        let mut cols = BTreeMap::new();
        cols.insert(x, BigInt::from(1));
        tableau.insert_row(b, BigInt::from(-1), cols);
        vars.get_mut(b).value = InfinitNumber::exact(Rational::from_i64(4));
        assert!(generate_cuts(&vars, &tableau, &reasons, 8).is_empty());
    }
}
