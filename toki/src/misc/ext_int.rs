use std::cmp::Ordering;
use std::fmt::{Debug, Display};
use std::ops::{Add, Div, Mul, Sub};
use num_traits::Zero;

use crate::{Integer, IntOps};

/// An integer extended by a single point at infinity, used where group
/// elements may have infinite order. `Inf` compares strictly greater than
/// every finite value; arithmetic follows `∞ ± finite = ∞`,
/// `finite / ∞ = 0` and `finite / 0 = ∞`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum ExtInt<I> {
    Fin(I),
    Inf
}

use ExtInt::{Fin, Inf};

impl<I> ExtInt<I> {
    pub fn is_infinite(&self) -> bool {
        matches!(self, Inf)
    }

    pub fn is_finite(&self) -> bool {
        !self.is_infinite()
    }

    pub fn fin(&self) -> Option<&I> {
        match self {
            Fin(a) => Some(a),
            Inf => None
        }
    }
}

impl<I> From<I> for ExtInt<I> {
    fn from(a: I) -> Self {
        Fin(a)
    }
}

impl<I> Default for ExtInt<I>
where I: Default {
    fn default() -> Self {
        Fin(I::default())
    }
}

impl<I> PartialOrd for ExtInt<I>
where I: Integer, for<'x> &'x I: IntOps<I> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<I> Ord for ExtInt<I>
where I: Integer, for<'x> &'x I: IntOps<I> {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Inf, Inf) => Ordering::Equal,
            (Inf, Fin(_)) => Ordering::Greater,
            (Fin(_), Inf) => Ordering::Less,
            (Fin(a), Fin(b)) => a.cmp(b)
        }
    }
}

impl<I> Add for ExtInt<I>
where I: Integer, for<'x> &'x I: IntOps<I> {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        match (self, rhs) {
            (Fin(a), Fin(b)) => Fin(a + b),
            _ => Inf
        }
    }
}

impl<I> Sub for ExtInt<I>
where I: Integer, for<'x> &'x I: IntOps<I> {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        match (self, rhs) {
            (Fin(a), Fin(b)) => Fin(a - b),
            (Inf, Fin(_)) => Inf,
            (Fin(_), Inf) => Inf,
            (Inf, Inf) => panic!("∞ - ∞ is undefined")
        }
    }
}

impl<I> Mul for ExtInt<I>
where I: Integer, for<'x> &'x I: IntOps<I> {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        match (self, rhs) {
            (Fin(a), Fin(b)) => Fin(a * b),
            (Fin(a), Inf) | (Inf, Fin(a)) => {
                assert!(!a.is_zero(), "∞ * 0 is undefined");
                Inf
            },
            (Inf, Inf) => Inf
        }
    }
}

impl<I> Div for ExtInt<I>
where I: Integer, for<'x> &'x I: IntOps<I> {
    type Output = Self;
    fn div(self, rhs: Self) -> Self {
        match (self, rhs) {
            (Fin(_), Inf) => Fin(I::zero()),
            (Fin(a), Fin(b)) if b.is_zero() => {
                assert!(!a.is_zero(), "0 / 0 is undefined");
                Inf
            },
            (Fin(a), Fin(b)) => Fin(a / b),
            (Inf, Fin(_)) => Inf,
            (Inf, Inf) => panic!("∞ / ∞ is undefined")
        }
    }
}

impl<I> Display for ExtInt<I>
where I: Display {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Fin(a) => Display::fmt(a, f),
            Inf => f.write_str("inf")
        }
    }
}

impl<I> Debug for ExtInt<I>
where I: Display {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cmp() {
        let a = ExtInt::from(1_000_000_i64);
        assert!(ExtInt::Inf > a);
        assert!(a < ExtInt::Inf);
        assert_eq!(ExtInt::<i64>::Inf, ExtInt::Inf);
        assert!(ExtInt::from(2_i64) > ExtInt::from(1));
    }

    #[test]
    fn add() {
        assert_eq!(ExtInt::from(2_i64) + ExtInt::from(3), ExtInt::from(5));
        assert_eq!(ExtInt::Inf + ExtInt::from(3_i64), ExtInt::Inf);
        assert_eq!(ExtInt::<i64>::Inf + ExtInt::Inf, ExtInt::Inf);
    }

    #[test]
    fn sub() {
        assert_eq!(ExtInt::from(2_i64) - ExtInt::from(3), ExtInt::from(-1));
        assert_eq!(ExtInt::Inf - ExtInt::from(3_i64), ExtInt::Inf);
    }

    #[test]
    #[should_panic]
    fn sub_inf_inf() {
        let _ = ExtInt::<i64>::Inf - ExtInt::Inf;
    }

    #[test]
    fn div() {
        assert_eq!(ExtInt::from(3_i64) / ExtInt::Inf, ExtInt::from(0));
        assert_eq!(ExtInt::from(3_i64) / ExtInt::from(0), ExtInt::Inf);
        assert_eq!(ExtInt::from(6_i64) / ExtInt::from(3), ExtInt::from(2));
    }

    #[test]
    fn display() {
        assert_eq!(ExtInt::from(-3_i64).to_string(), "-3");
        assert_eq!(ExtInt::<i64>::Inf.to_string(), "inf");
    }
}
