//! Crate `rational` provides arbitrary-precision rationals and the
//! infinitesimal-augmented numbers used to encode strict bounds uniformly
//! with non-strict ones (§3 "Rational", "InfinitNumber").
//!
//! Built on `num_bigint`/`num_integer` rather than hand-rolled `i64` pairs,
//! the way `megesdal-lemke-rs`'s own tableau leans on `num::bigint::BigInt`
//! and `carcara`'s linear-arithmetic rule checker leans on
//! `num_rational::BigRational`.
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, Zero};

/// An arbitrary-precision rational in lowest terms, plus sentinels for the
/// two unbounded values a `LinVar` bound can take.
#[derive(Clone, Debug)]
pub enum Rational {
    NegInfinity,
    Finite(BigInt, BigInt),
    PosInfinity,
}

impl Rational {
    pub fn zero() -> Self {
        Rational::Finite(BigInt::zero(), BigInt::one())
    }

    pub fn one() -> Self {
        Rational::Finite(BigInt::one(), BigInt::one())
    }

    pub fn from_bigint(n: BigInt) -> Self {
        Rational::Finite(n, BigInt::one())
    }

    pub fn from_i64(n: i64) -> Self {
        Rational::from_bigint(BigInt::from(n))
    }

    /// Construct and normalize to lowest terms with a positive denominator,
    /// per §3's invariant `denominator > 0, gcd(|num|, den) = 1`.
    pub fn new(num: BigInt, den: BigInt) -> Self {
        assert!(!den.is_zero(), "rational with zero denominator");
        let (mut n, mut d) = (num, den);
        if d.is_negative() {
            n = -n;
            d = -d;
        }
        let g = n.gcd(&d);
        if !g.is_zero() && g != BigInt::one() {
            n /= &g;
            d /= &g;
        }
        Rational::Finite(n, d)
    }

    pub fn is_infinite(&self) -> bool {
        !matches!(self, Rational::Finite(..))
    }

    pub fn is_zero(&self) -> bool {
        matches!(self, Rational::Finite(n, _) if n.is_zero())
    }

    pub fn signum(&self) -> i32 {
        match self {
            Rational::NegInfinity => -1,
            Rational::PosInfinity => 1,
            Rational::Finite(n, _) => {
                if n.is_zero() {
                    0
                } else if n.is_negative() {
                    -1
                } else {
                    1
                }
            }
        }
    }

    pub fn negate(&self) -> Self {
        match self {
            Rational::NegInfinity => Rational::PosInfinity,
            Rational::PosInfinity => Rational::NegInfinity,
            Rational::Finite(n, d) => Rational::Finite(-n, d.clone()),
        }
    }

    /// Greatest common divisor of the (finite) numerators of `self` and
    /// `other`, scaled to a common denominator; used by gcd-normalization
    /// of affine rows (§3 Tableau invariants).
    pub fn gcd(&self, other: &Rational) -> Rational {
        match (self, other) {
            (Rational::Finite(n1, d1), Rational::Finite(n2, d2)) => {
                let common_den = d1.lcm(d2);
                let n1s = n1 * (&common_den / d1);
                let n2s = n2 * (&common_den / d2);
                Rational::new(n1s.gcd(&n2s), common_den)
            }
            _ => Rational::one(),
        }
    }

    pub fn floor(&self) -> BigInt {
        match self {
            Rational::Finite(n, d) => n.div_floor(d),
            Rational::NegInfinity => panic!("floor of -infinity"),
            Rational::PosInfinity => panic!("floor of +infinity"),
        }
    }

    pub fn ceil(&self) -> BigInt {
        match self {
            Rational::Finite(n, d) => -((-n).div_floor(d)),
            Rational::NegInfinity => panic!("ceil of -infinity"),
            Rational::PosInfinity => panic!("ceil of +infinity"),
        }
    }

    /// Fractional part in `[0, 1)`, used by Gomory cut generation (§4.1).
    pub fn frac(&self) -> Rational {
        match self {
            Rational::Finite(n, d) => {
                let f = self.floor();
                Rational::new(n - f * d, d.clone())
            }
            _ => panic!("frac of an infinite rational"),
        }
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, Rational::Finite(_, d) if d == &BigInt::one())
    }

    pub fn abs(&self) -> Rational {
        if self.signum() < 0 {
            self.negate()
        } else {
            self.clone()
        }
    }
}

impl PartialEq for Rational {
    fn eq(&self, other: &Self) -> bool {
        self.partial_cmp(other) == Some(Ordering::Equal)
    }
}
impl Eq for Rational {}

impl PartialOrd for Rational {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Rational {
    fn cmp(&self, other: &Self) -> Ordering {
        use Rational::*;
        match (self, other) {
            (NegInfinity, NegInfinity) | (PosInfinity, PosInfinity) => Ordering::Equal,
            (NegInfinity, _) => Ordering::Less,
            (_, NegInfinity) => Ordering::Greater,
            (PosInfinity, _) => Ordering::Greater,
            (_, PosInfinity) => Ordering::Less,
            (Finite(n1, d1), Finite(n2, d2)) => (n1 * d2).cmp(&(n2 * d1)),
        }
    }
}

impl Add for &Rational {
    type Output = Rational;
    fn add(self, other: &Rational) -> Rational {
        use Rational::*;
        match (self, other) {
            (Finite(n1, d1), Finite(n2, d2)) => Rational::new(n1 * d2 + n2 * d1, d1 * d2),
            (NegInfinity, PosInfinity) | (PosInfinity, NegInfinity) => {
                panic!("infinity minus infinity")
            }
            (NegInfinity, _) | (_, NegInfinity) => NegInfinity,
            (PosInfinity, _) | (_, PosInfinity) => PosInfinity,
        }
    }
}

impl Sub for &Rational {
    type Output = Rational;
    fn sub(self, other: &Rational) -> Rational {
        self + &other.negate()
    }
}

impl Mul for &Rational {
    type Output = Rational;
    fn mul(self, other: &Rational) -> Rational {
        use Rational::*;
        match (self, other) {
            (Finite(n1, d1), Finite(n2, d2)) => Rational::new(n1 * n2, d1 * d2),
            _ => {
                let s = self.signum() * other.signum();
                if s > 0 {
                    PosInfinity
                } else if s < 0 {
                    NegInfinity
                } else {
                    panic!("zero times infinity")
                }
            }
        }
    }
}

impl Div for &Rational {
    type Output = Rational;
    fn div(self, other: &Rational) -> Rational {
        match other {
            Rational::Finite(n, _) if n.is_zero() => panic!("division by zero rational"),
            Rational::Finite(n, d) => self * &Rational::new(d.clone(), n.clone()),
            _ => panic!("division by an infinite rational"),
        }
    }
}

impl Neg for Rational {
    type Output = Rational;
    fn neg(self) -> Rational {
        self.negate()
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rational::NegInfinity => write!(f, "-oo"),
            Rational::PosInfinity => write!(f, "+oo"),
            Rational::Finite(n, d) if d == &BigInt::one() => write!(f, "{}", n),
            Rational::Finite(n, d) => write!(f, "{}/{}", n, d),
        }
    }
}

/// Symbolic infinitesimal sign used to encode strict vs. non-strict bounds
/// (§3 "InfinitNumber"): `-1`, `0`, `+1` times an unspecified `δ > 0`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Epsilon(pub i8);

impl Epsilon {
    pub const MINUS: Epsilon = Epsilon(-1);
    pub const ZERO: Epsilon = Epsilon(0);
    pub const PLUS: Epsilon = Epsilon(1);

    pub fn is_strict(self) -> bool {
        self.0 != 0
    }
}

impl Neg for Epsilon {
    type Output = Epsilon;
    fn neg(self) -> Epsilon {
        Epsilon(-self.0)
    }
}

/// `a + ε·δ`: the value domain simplex variables actually take, so that
/// strict and non-strict bounds share one comparison (§3).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InfinitNumber {
    pub a: Rational,
    pub eps: Epsilon,
}

impl InfinitNumber {
    pub fn exact(a: Rational) -> Self {
        InfinitNumber { a, eps: Epsilon::ZERO }
    }

    pub fn zero() -> Self {
        InfinitNumber::exact(Rational::zero())
    }

    pub fn plus_epsilon(a: Rational) -> Self {
        InfinitNumber { a, eps: Epsilon::PLUS }
    }

    pub fn minus_epsilon(a: Rational) -> Self {
        InfinitNumber { a, eps: Epsilon::MINUS }
    }

    pub fn neg_infinity() -> Self {
        InfinitNumber::exact(Rational::NegInfinity)
    }

    pub fn pos_infinity() -> Self {
        InfinitNumber::exact(Rational::PosInfinity)
    }

    pub fn is_infinite(&self) -> bool {
        self.a.is_infinite()
    }

    pub fn negate(&self) -> Self {
        InfinitNumber { a: self.a.negate(), eps: -self.eps }
    }

    pub fn add_rational(&self, r: &Rational) -> Self {
        InfinitNumber { a: &self.a + r, eps: self.eps }
    }

    /// Sum two infinitesimal-augmented numbers, used to accumulate
    /// bound-refinement contributions across a row's columns (§4.1).
    pub fn add(&self, other: &Self) -> Self {
        InfinitNumber { a: &self.a + &other.a, eps: Epsilon(self.eps.0 + other.eps.0) }
    }

    /// `self - other`, used by the freedom-interval computation of model
    /// repair (§4.1 "mutate") to measure how far a dependent row's value is
    /// from its bounds.
    pub fn sub(&self, other: &Self) -> Self {
        InfinitNumber { a: &self.a - &other.a, eps: Epsilon(self.eps.0 - other.eps.0) }
    }

    /// Scale by a finite, nonzero rational coefficient; flips the
    /// infinitesimal sign when the coefficient is negative (used by
    /// bound-refinement and Farkas combination, §4.1/§4.2).
    pub fn scale(&self, coeff: &Rational) -> Self {
        let eps = if coeff.signum() < 0 { -self.eps } else { self.eps };
        InfinitNumber { a: &self.a * coeff, eps }
    }
}

impl PartialOrd for InfinitNumber {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for InfinitNumber {
    fn cmp(&self, other: &Self) -> Ordering {
        self.a.cmp(&other.a).then(self.eps.cmp(&other.eps))
    }
}

impl fmt::Display for InfinitNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.eps.0 {
            0 => write!(f, "{}", self.a),
            n if n > 0 => write!(f, "{}+{}ε", self.a, n),
            n => write!(f, "{}-{}ε", self.a, -n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rational_normalizes_sign_and_gcd() {
        let r = Rational::new(BigInt::from(-4), BigInt::from(-6));
        assert_eq!(r, Rational::new(BigInt::from(2), BigInt::from(3)));
    }

    #[test]
    fn rational_ordering_handles_infinities() {
        assert!(Rational::NegInfinity < Rational::zero());
        assert!(Rational::zero() < Rational::PosInfinity);
        assert!(Rational::NegInfinity < Rational::PosInfinity);
    }

    #[test]
    fn infinit_number_orders_strict_before_nonstrict_above() {
        let a = InfinitNumber::minus_epsilon(Rational::zero());
        let b = InfinitNumber::exact(Rational::zero());
        let c = InfinitNumber::plus_epsilon(Rational::zero());
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn infinit_number_scale_by_negative_flips_epsilon() {
        let x = InfinitNumber::plus_epsilon(Rational::one());
        let y = x.scale(&Rational::from_i64(-2));
        assert_eq!(y.eps, Epsilon::MINUS);
        assert_eq!(y.a, Rational::from_i64(-2));
    }

    #[test]
    fn floor_and_ceil_match_for_negative_rationals() {
        let r = Rational::new(BigInt::from(-7), BigInt::from(2));
        assert_eq!(r.floor(), BigInt::from(-4));
        assert_eq!(r.ceil(), BigInt::from(-3));
    }
}
