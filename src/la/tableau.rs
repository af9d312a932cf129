//! Crate `la::tableau` implements the sparse simplex tableau (§3
//! "Tableau", §4.1 "Tableau operations").
//!
//! §3 describes the source's representation as a doubly-linked sparse
//! matrix with four pointers per non-zero cell. Per §9's general guidance
//! to replace pointer graphs with index handles, this is reimplemented as
//! a pair of sparse maps — one row-major (`rows`, keyed by the basic
//! variable) and one column-major reverse index (`col_rows`, which basic
//! rows reference a given non-basic column) — which gives the same O(1)
//! "all rows touching column `n`" query the linked column list gave the
//! source, without a hand-rolled intrusive list.
use std::collections::{BTreeMap, BTreeSet, HashMap};

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{Signed, Zero};

use crate::types::VarId;

/// One basic variable's row: `Σ cols[i]·xᵢ = own·b` (§3 Tableau
/// invariants: `gcd(cᵢ, own) = 1`, `own < 0`).
#[derive(Clone, Debug)]
pub struct Row {
    pub own: BigInt,
    pub cols: BTreeMap<VarId, BigInt>,
}

fn normalize_row(own: &mut BigInt, cols: &mut BTreeMap<VarId, BigInt>) {
    cols.retain(|_, v| !v.is_zero());
    let mut g = own.abs();
    for v in cols.values() {
        g = g.gcd(v);
    }
    if !g.is_zero() && g != BigInt::from(1) {
        *own /= &g;
        for v in cols.values_mut() {
            *v /= &g;
        }
    }
    if own.is_positive() {
        *own = -own.clone();
        for v in cols.values_mut() {
            *v = -v.clone();
        }
    }
}

#[derive(Clone, Default)]
pub struct Tableau {
    rows: HashMap<VarId, Row>,
    /// Reverse index: non-basic column -> set of basic rows referencing it,
    /// the column-list half of §3's doubly-linked matrix.
    col_rows: HashMap<VarId, BTreeSet<VarId>>,
}

impl Tableau {
    pub fn new() -> Self {
        Tableau::default()
    }

    pub fn is_basic(&self, v: VarId) -> bool {
        self.rows.contains_key(&v)
    }

    pub fn row(&self, b: VarId) -> Option<&Row> {
        self.rows.get(&b)
    }

    pub fn rows_with_column(&self, n: VarId) -> Vec<VarId> {
        self.col_rows.get(&n).map(|s| s.iter().copied().collect()).unwrap_or_default()
    }

    pub fn basic_vars(&self) -> impl Iterator<Item = VarId> + '_ {
        self.rows.keys().copied()
    }

    fn reindex_add(&mut self, row: &Row, basic: VarId) {
        for &j in row.cols.keys() {
            self.col_rows.entry(j).or_default().insert(basic);
        }
    }

    fn reindex_remove(&mut self, row: &Row, basic: VarId) {
        for &j in row.cols.keys() {
            if let Some(set) = self.col_rows.get_mut(&j) {
                set.remove(&basic);
                if set.is_empty() {
                    self.col_rows.remove(&j);
                }
            }
        }
    }

    /// Insert a fresh row defining `basic` in terms of `cols`, e.g. when
    /// clausification introduces a slack for a compound affine term.
    pub fn insert_row(&mut self, basic: VarId, own: BigInt, mut cols: BTreeMap<VarId, BigInt>) {
        let mut own = own;
        normalize_row(&mut own, &mut cols);
        let row = Row { own, cols };
        self.reindex_add(&row, basic);
        self.rows.insert(basic, row);
    }

    pub fn remove_row(&mut self, basic: VarId) {
        if let Some(row) = self.rows.remove(&basic) {
            self.reindex_remove(&row, basic);
        }
    }

    /// Swap the basic/non-basic roles of `b` (currently basic) and `n`
    /// (currently a non-basic column of `b`'s row), per §4.1 "`pivot(entry)`".
    ///
    /// Derivation: `b`'s row reads `Σ cᵢ·xᵢ = own·b` with `n` among the
    /// `xᵢ` at coefficient `c_n`. Solving for `n` gives
    /// `c_n·n = own·b - Σ_{i≠n} cᵢ·xᵢ`, i.e. a new row for `n` with
    /// `own' = c_n`, column `b ↦ own`, and column `i ↦ -cᵢ` for every other
    /// `i`; `normalize_row` then restores the `own < 0`, gcd-1 invariants.
    /// Every other row still mentioning `n` is combined with the new row to
    /// cancel `n`'s column entry, per "add a multiple of the new n-row so
    /// that n's column entry in that row becomes zero".
    pub fn pivot(&mut self, b: VarId, n: VarId) {
        let mut row_b = self.rows.remove(&b).expect("pivot: b must be a basic row");
        self.reindex_remove(&row_b, b);
        let c_n = row_b.cols.remove(&n).expect("pivot: n must be a column of b's row");

        let mut new_cols: BTreeMap<VarId, BigInt> = BTreeMap::new();
        new_cols.insert(b, row_b.own.clone());
        for (&j, c) in row_b.cols.iter() {
            new_cols.insert(j, -c.clone());
        }
        let mut new_own = c_n;
        normalize_row(&mut new_own, &mut new_cols);

        let affected = self.rows_with_column(n);
        for r in affected {
            let mut row_r = self.rows.remove(&r).unwrap();
            self.reindex_remove(&row_r, r);
            if let Some(e_n) = row_r.cols.remove(&n) {
                let mut combined: BTreeMap<VarId, BigInt> = BTreeMap::new();
                for (&j, c) in row_r.cols.iter() {
                    *combined.entry(j).or_insert_with(BigInt::zero) += &new_own * c;
                }
                for (&j, c) in new_cols.iter() {
                    *combined.entry(j).or_insert_with(BigInt::zero) += &e_n * c;
                }
                let mut combined_own = &new_own * &row_r.own;
                normalize_row(&mut combined_own, &mut combined);
                let new_row = Row { own: combined_own, cols: combined };
                self.reindex_add(&new_row, r);
                self.rows.insert(r, new_row);
            } else {
                self.reindex_add(&row_r, r);
                self.rows.insert(r, row_r);
            }
        }

        let new_row = Row { own: new_own, cols: new_cols };
        self.reindex_add(&new_row, n);
        self.rows.insert(n, new_row);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bi(n: i64) -> BigInt {
        BigInt::from(n)
    }

    #[test]
    fn insert_row_normalizes_gcd_and_sign() {
        let mut t = Tableau::new();
        let mut cols = BTreeMap::new();
        cols.insert(1, bi(4));
        cols.insert(2, bi(-6));
        t.insert_row(0, bi(2), cols);
        let row = t.row(0).unwrap();
        // Dividing `4x1 - 6x2 = 2x0` by gcd 2 gives `2x1 - 3x2 = x0`; since
        // `own` came out positive, the whole equation (not just `own`) is
        // negated to restore the `own < 0` invariant: `-2x1 + 3x2 = -x0`.
        assert!(row.own.is_negative());
        assert_eq!(row.own, bi(-1));
        assert_eq!(row.cols[&1], bi(-2));
        assert_eq!(row.cols[&2], bi(3));
    }

    #[test]
    fn pivot_swaps_basic_and_nonbasic_roles() {
        let mut t = Tableau::new();
        let mut cols = BTreeMap::new();
        cols.insert(1, bi(1));
        t.insert_row(0, bi(-1), cols); // 0 = x1
        t.pivot(0, 1);
        assert!(t.is_basic(1));
        assert!(!t.is_basic(0));
        let row = t.row(1).unwrap();
        assert_eq!(row.cols[&0], bi(1));
    }

    #[test]
    fn pivot_eliminates_column_from_other_rows() {
        let mut t = Tableau::new();
        let mut cols0 = BTreeMap::new();
        cols0.insert(2, bi(1));
        t.insert_row(0, bi(-1), cols0); // 0 = x2
        let mut cols1 = BTreeMap::new();
        cols1.insert(2, bi(1));
        cols1.insert(3, bi(1));
        t.insert_row(1, bi(-1), cols1); // 1 = x2 + x3
        t.pivot(0, 2); // x2 becomes basic, expressed via 0
        assert!(!t.row(1).unwrap().cols.contains_key(&2));
    }
}
