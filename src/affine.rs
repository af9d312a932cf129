//! Crate `affine` provides the canonical linear-combination representation
//! used both by the term compiler's `SMTAffineTerm` (§4.6) and by the LA
//! theory's tableau rows (§3 "Tableau").
//!
//! A `BTreeMap` keyed by [`VarId`] keeps the variable order total and the
//! representation canonical without a separate sort step, which is what
//! §3 calls "a totally-ordered variable set".
use std::collections::BTreeMap;
use std::fmt;

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, Zero};

use crate::rational::Rational;
use crate::types::VarId;

/// `Σ cᵢ·xᵢ + c`, coefficients kept as exact rationals (integer tableau
/// rows normalize them to a shared integer denominator separately, per §3
/// Tableau invariants; see [`crate::la::tableau`]).
#[derive(Clone, Debug, Default)]
pub struct AffineTerm {
    terms: BTreeMap<VarId, Rational>,
    pub constant: Rational,
}

impl AffineTerm {
    pub fn zero() -> Self {
        AffineTerm { terms: BTreeMap::new(), constant: Rational::zero() }
    }

    pub fn constant(c: Rational) -> Self {
        AffineTerm { terms: BTreeMap::new(), constant: c }
    }

    pub fn var(vi: VarId) -> Self {
        let mut terms = BTreeMap::new();
        terms.insert(vi, Rational::one());
        AffineTerm { terms, constant: Rational::zero() }
    }

    pub fn is_constant(&self) -> bool {
        self.terms.values().all(|c| c.is_zero())
    }

    pub fn coefficients(&self) -> impl Iterator<Item = (VarId, &Rational)> {
        self.terms.iter().filter(|(_, c)| !c.is_zero()).map(|(v, c)| (*v, c))
    }

    pub fn coefficient_of(&self, vi: VarId) -> Rational {
        self.terms.get(&vi).cloned().unwrap_or_else(Rational::zero)
    }

    pub fn add_term(&mut self, vi: VarId, coeff: &Rational) {
        let entry = self.terms.entry(vi).or_insert_with(Rational::zero);
        *entry = &*entry + coeff;
    }

    /// `self += coeff * other`, the workhorse of both flattening `+`/`-`/`*`
    /// during compilation (§4.6 "canonicalSum") and building Farkas
    /// combinations of bound literals (§4.1 "Conflict generation").
    pub fn add_scaled(&mut self, other: &AffineTerm, coeff: &Rational) {
        for (vi, c) in other.terms.iter() {
            self.add_term(*vi, &(c * coeff));
        }
        self.constant = &self.constant + &(&other.constant * coeff);
    }

    pub fn scale(&self, coeff: &Rational) -> AffineTerm {
        let mut out = AffineTerm::constant(&self.constant * coeff);
        for (vi, c) in self.terms.iter() {
            out.terms.insert(*vi, c * coeff);
        }
        out
    }

    pub fn negate(&self) -> AffineTerm {
        self.scale(&Rational::from_i64(-1))
    }

    /// gcd of all (finite) coefficient numerators after scaling to a shared
    /// denominator, i.e. the normalization factor a tableau row is divided
    /// by to keep `gcd(cᵢ, c_b) = 1` (§3 Tableau invariants, §4.1 "Re-gcd
    /// every touched row").
    pub fn coefficient_gcd(&self) -> Rational {
        let mut g: Option<Rational> = None;
        for (_, c) in self.coefficients() {
            g = Some(match g {
                None => c.abs(),
                Some(acc) => acc.gcd(c),
            });
        }
        g.unwrap_or_else(Rational::one)
    }

    /// Canonical (variable, integer-coefficient) rows plus an integer
    /// denominator, used to re-derive an integer tableau row from an affine
    /// term built during compilation.
    pub fn to_integer_row(&self) -> (Vec<(VarId, BigInt)>, BigInt) {
        let mut den = BigInt::one();
        for (_, c) in self.coefficients() {
            if let Rational::Finite(_, d) = c {
                den = den.lcm(d);
            }
        }
        let mut row = Vec::new();
        for (vi, c) in self.coefficients() {
            if let Rational::Finite(n, d) = c {
                row.push((vi, n * (&den / d)));
            }
        }
        (row, den)
    }

    pub fn is_zero(&self) -> bool {
        self.is_constant() && self.constant.is_zero()
    }
}

impl fmt::Display for AffineTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (vi, c) in self.coefficients() {
            if !first {
                write!(f, " + ")?;
            }
            write!(f, "{}*x{}", c, vi)?;
            first = false;
        }
        if first || !self.constant.is_zero() {
            if !first {
                write!(f, " + ")?;
            }
            write!(f, "{}", self.constant)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_scaled_accumulates_shared_variables() {
        let mut a = AffineTerm::var(0);
        let b = AffineTerm::var(0);
        a.add_scaled(&b, &Rational::from_i64(2));
        assert_eq!(a.coefficient_of(0), Rational::from_i64(3));
    }

    #[test]
    fn coefficient_gcd_of_6_and_9_is_3() {
        let mut t = AffineTerm::zero();
        t.add_term(0, &Rational::from_i64(6));
        t.add_term(1, &Rational::from_i64(9));
        assert_eq!(t.coefficient_gcd(), Rational::from_i64(3));
    }

    #[test]
    fn to_integer_row_clears_denominators() {
        let mut t = AffineTerm::zero();
        t.add_term(0, &Rational::new(BigInt::from(1), BigInt::from(2)));
        t.add_term(1, &Rational::new(BigInt::from(1), BigInt::from(3)));
        let (row, den) = t.to_integer_row();
        assert_eq!(den, BigInt::from(6));
        assert_eq!(row, vec![(0, BigInt::from(3)), (1, BigInt::from(2))]);
    }
}
