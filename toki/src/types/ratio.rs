use std::cmp;
use std::fmt::{Debug, Display};
use std::iter::{Product, Sum};
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Rem, RemAssign, Sub, SubAssign};
use std::str::FromStr;
use auto_impl_ops::auto_ops;
use num_traits::{One, Zero};
use crate::{AddGrp, AddGrpOps, AddMon, AddMonOps, Elem, EucRing, EucRingOps, Field, FieldOps, IntOps, Integer, Mon, MonOps, Ring, RingOps};
use crate::util::format::paren_expr;

/// An exact rational over a Euclidean ring, extended by two points:
/// `+∞` (stored as `1/0`, the canonical image of every `a/0` with `a ≠ 0`)
/// and *undefined* (stored as `0/0`). Finite values are kept coprime with
/// positive denominator. `∞ − ∞`, `∞ · 0` and `∞ / ∞` are undefined;
/// undefined compares below everything, `∞` above everything, and both are
/// equal to themselves.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Ratio<T> {
    numer: T,
    denom: T,
}

impl<T> Ratio<T> {
    #[inline]
    const fn new_raw(numer: T, denom: T) -> Ratio<T> {
        Ratio { numer, denom }
    }

    #[inline]
    pub const fn numer(&self) -> &T {
        &self.numer
    }

    #[inline]
    pub const fn denom(&self) -> &T {
        &self.denom
    }
}

impl<T> Ratio<T>
where T: Zero + One {
    pub fn infinity() -> Self {
        Self::new_raw(T::one(), T::zero())
    }

    pub fn undefined() -> Self {
        Self::new_raw(T::zero(), T::zero())
    }
}

impl<T> Ratio<T>
where T: Zero + PartialEq {
    pub fn is_finite(&self) -> bool {
        !self.denom.is_zero()
    }

    pub fn is_infinite(&self) -> bool {
        self.denom.is_zero() && !self.numer.is_zero()
    }

    pub fn is_undefined(&self) -> bool {
        self.denom.is_zero() && self.numer.is_zero()
    }
}

impl<T> Ratio<T>
where T: One + PartialEq {
    pub fn is_integer(&self) -> bool {
        self.denom.is_one()
    }
}

impl<T> Ratio<T>
where T: EucRing, for<'x> &'x T: EucRingOps<T> {
    pub fn new(numer: T, denom: T) -> Ratio<T> {
        if denom.is_zero() {
            return if numer.is_zero() {
                Self::undefined()
            } else {
                Self::infinity() // -1/0 canonicalizes here.
            }
        }

        let mut ret = Ratio::new_raw(numer, denom);
        ret.reduce();
        ret
    }

    fn reduce(&mut self) {
        if self.numer.is_zero() {
            if !self.denom.is_one() {
                self.denom.set_one();
            }
            return;
        }

        let u = self.denom.normalizing_unit();

        if !u.is_one() {
            self.numer *= &u;
            self.denom *= &u;
        }

        if self.denom.is_one() || self.numer.is_unit() {
            return
        }

        let g = EucRing::gcd(&self.numer, &self.denom);

        if !g.is_one() {
            self.numer /= &g;
            self.denom /= &g;
        }
    }

    // The extended reciprocal: 1/∞ = 0, 1/0 = ∞, undef stays undef.
    fn recip(&self) -> Self {
        Self::new(self.denom.clone(), self.numer.clone())
    }
}

impl<T> Ratio<T>
where T: One {
    pub fn from_numer(a: T) -> Self {
        Self::new_raw(a, T::one())
    }
}

impl<T> From<i32> for Ratio<T>
where T: One + From<i32> {
    fn from(i: i32) -> Self {
        Self::from_numer(T::from(i))
    }
}

impl<T> From<(T, T)> for Ratio<T>
where T: EucRing, for<'x> &'x T: EucRingOps<T> {
    fn from(pair: (T, T)) -> Self {
        let (p, q) = pair;
        Self::new(p, q)
    }
}

impl<T> FromStr for Ratio<T>
where T: EucRing + FromStr, for<'x> &'x T: EucRingOps<T> {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "inf" {
            return Ok(Self::infinity())
        }

        if let Ok(a) = s.parse::<T>() {
            return Ok(Self::from_numer(a))
        }

        let r = regex::Regex::new(r"(.+)/(.+)").unwrap();
        if let Some(c) = r.captures(s) {
            let (s1, s2) = (&c[1], &c[2]);
            if let (Ok(a), Ok(b)) = (s1.parse::<T>(), s2.parse::<T>()) {
                return Ok(Self::new(a, b))
            }
        }

        Err(format!("cannot parse string: '{s}'"))
    }
}

impl<T> Default for Ratio<T>
where T: Default + One {
    fn default() -> Self {
        Self::from_numer(T::default())
    }
}

impl<T> Display for Ratio<T>
where T: Zero + One + PartialEq + Display {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_infinite() {
            return f.write_str("inf")
        }
        if self.is_undefined() {
            return f.write_str("undef")
        }

        let p = paren_expr(&self.numer);
        let q = paren_expr(&self.denom);

        if &q == "1" {
            write!(f, "{}", p)
        } else {
            write!(f, "{}/{}", p, q)
        }
    }
}

impl<T> Debug for Ratio<T>
where T: Zero + One + PartialEq + Display {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

impl<T> Zero for Ratio<T>
where T: EucRing, for<'x> &'x T: EucRingOps<T> {
    fn zero() -> Self {
        Self::from_numer(T::zero())
    }

    fn is_zero(&self) -> bool {
        self.numer.is_zero() && !self.denom.is_zero()
    }
}

impl<T> One for Ratio<T>
where T: EucRing, for<'x> &'x T: EucRingOps<T> {
    fn one() -> Self {
        Self::from_numer(T::one())
    }

    fn is_one(&self) -> bool {
        self.numer.is_one() && self.denom.is_one()
    }
}

#[auto_ops]
impl<T> AddAssign<&Ratio<T>> for Ratio<T>
where T: EucRing, for<'x> &'x T: EucRingOps<T> {
    fn add_assign(&mut self, rhs: &Ratio<T>) {
        if self.is_undefined() || rhs.is_undefined() {
            *self = Self::undefined();
        } else if self.is_infinite() || rhs.is_infinite() {
            *self = Self::infinity(); // ∞ + ∞ = ∞
        } else {
            self.finite_add(rhs, false)
        }
    }
}

#[auto_ops]
impl<T> SubAssign<&Ratio<T>> for Ratio<T>
where T: EucRing, for<'x> &'x T: EucRingOps<T> {
    fn sub_assign(&mut self, rhs: &Ratio<T>) {
        if self.is_undefined() || rhs.is_undefined() {
            *self = Self::undefined();
        } else if self.is_infinite() && rhs.is_infinite() {
            *self = Self::undefined(); // ∞ - ∞
        } else if self.is_infinite() || rhs.is_infinite() {
            *self = Self::infinity();
        } else {
            self.finite_add(rhs, true)
        }
    }
}

impl<T> Ratio<T>
where T: EucRing, for<'x> &'x T: EucRingOps<T> {
    fn finite_add(&mut self, rhs: &Self, sub: bool) {
        let sadd = |a: &mut T, c: T| if sub { *a -= c } else { *a += c };

        let b = &self.denom;
        let (c, d) = (&rhs.numer, &rhs.denom);

        if rhs.is_zero() {
            // do nothing
        } else if self.is_zero() {
            sadd(&mut self.numer, c.clone()); // 0 -> 0 ± c
            self.denom = d.clone();           // 1 -> d
        } else if b == d {
            sadd(&mut self.numer, c.clone()); // a -> a ± c
            self.reduce()
        } else {
            let l = EucRing::lcm(b, d);       // l = xb = yd
            self.numer *= &l / b;             // a -> xa ± yc
            sadd(&mut self.numer, (&l / d) * c);
            self.denom = l;                   // b -> l
            self.reduce()
        }
    }
}

impl<T> Neg for Ratio<T>
where T: EucRing, for<'x> &'x T: EucRingOps<T> {
    type Output = Self;
    fn neg(self) -> Self::Output {
        -&self
    }
}

impl<T> Neg for &Ratio<T>
where T: EucRing, for<'x> &'x T: EucRingOps<T> {
    type Output = Ratio<T>;
    fn neg(self) -> Self::Output {
        if !self.is_finite() {
            return self.clone() // -∞ = +∞, -undef = undef
        }
        Ratio::new_raw(-&self.numer, self.denom.clone())
    }
}

#[auto_ops]
impl<T> MulAssign<&Ratio<T>> for Ratio<T>
where T: EucRing, for<'x> &'x T: EucRingOps<T> {
    fn mul_assign(&mut self, rhs: &Ratio<T>) {
        if self.is_undefined() || rhs.is_undefined() {
            *self = Self::undefined();
            return
        }
        if self.is_infinite() || rhs.is_infinite() {
            *self = if self.is_zero() || rhs.is_zero() {
                Self::undefined() // ∞ · 0
            } else {
                Self::infinity()
            };
            return
        }

        let (a, b) = (&self.numer, &self.denom);
        let (c, d) = ( &rhs.numer,  &rhs.denom);

        if self.is_zero() || rhs.is_one() {
            // do nothing
        } else if rhs.is_zero() {
            self.set_zero();
        } else if rhs.is_integer() {
            let k = EucRing::gcd(b, c);  // b = kb', c = kc'
            self.numer *= c / &k;        // a -> a * c'
            self.denom /= &k;            // b -> b'
        } else if self.is_integer() {
            let k = EucRing::gcd(a, d);  // a = ka', d = kd'
            self.numer /= &k;            // a -> a' * c
            self.numer *= c;
            self.denom = d / &k;         // 1 ->      d'
        } else {
            let k = EucRing::gcd(a, d);  // a = ka', d = kd'
            let l = EucRing::gcd(b, c);  // b = lb', c = lc'
            self.numer /= &k;            // a -> a' * c'
            self.numer *= c / &l;
            self.denom /= &l;            // b -> b' * d'
            self.denom *= d / &k;
        }
    }
}

#[auto_ops]
impl<T> DivAssign<&Ratio<T>> for Ratio<T>
where T: EucRing, for<'x> &'x T: EucRingOps<T> {
    fn div_assign(&mut self, rhs: &Ratio<T>) {
        *self *= rhs.recip() // a/0 = ∞, a/∞ = 0, ∞/∞ = undef
    }
}

#[auto_ops]
impl<'a, 'b, T> Rem<&'b Ratio<T>> for &'a Ratio<T>
where T: EucRing, for<'x> &'x T: EucRingOps<T> {
    type Output = Ratio<T>;
    fn rem(self, rhs: &'b Ratio<T>) -> Self::Output {
        assert!(!rhs.is_zero());
        Ratio::zero() // fractions form a field.
    }
}

macro_rules! impl_accum {
    ($trait:ident, $method:ident, $accum_method:ident, $accum_init:ident) => {
        impl<T> $trait for Ratio<T>
        where T: EucRing, for<'x> &'x T: EucRingOps<T> {
            fn $method<Iter: Iterator<Item = Self>>(iter: Iter) -> Self {
                iter.fold(Self::$accum_init(), |mut res, r| {
                    Self::$accum_method(&mut res, r);
                    res
                })
            }
        }

        impl<'a, T> $trait<&'a Ratio<T>> for Ratio<T>
        where T: EucRing, for<'x> &'x T: EucRingOps<T> {
            fn $method<Iter: Iterator<Item = &'a Ratio<T>>>(iter: Iter) -> Self {
                iter.fold(Self::$accum_init(), |mut res, r| {
                    Self::$accum_method(&mut res, r);
                    res
                })
            }
        }
    }
}

impl_accum!(Sum, sum, add_assign, zero);
impl_accum!(Product, product, mul_assign, one);

macro_rules! decl_alg_ops {
    ($trait:ident) => {
        impl<T> $trait for Ratio<T>
        where T: EucRing, for<'x> &'x T: EucRingOps<T> {}

        impl<T> $trait<Ratio<T>> for &Ratio<T>
        where T: EucRing, for<'x> &'x T: EucRingOps<T> {}
    };
}

decl_alg_ops!(AddMonOps);
decl_alg_ops!(AddGrpOps);
decl_alg_ops!(MonOps);
decl_alg_ops!(RingOps);
decl_alg_ops!(EucRingOps);
decl_alg_ops!(FieldOps);

impl<T> Elem for Ratio<T>
where T: EucRing, for<'x> &'x T: EucRingOps<T> {
    fn math_symbol() -> String {
        let t = T::math_symbol();
        if &t == "Z" {
            String::from("Q")
        } else {
            format!("Q({})", t)
        }
    }
}

impl<T> Mon for Ratio<T>
where T: EucRing, for<'x> &'x T: EucRingOps<T> {}

impl<T> AddMon for Ratio<T>
where T: EucRing, for<'x> &'x T: EucRingOps<T> {}

impl<T> AddGrp for Ratio<T>
where T: EucRing, for<'x> &'x T: EucRingOps<T> {}

impl<T> Ring for Ratio<T>
where T: EucRing, for<'x> &'x T: EucRingOps<T> {
    fn inv(&self) -> Option<Self> {
        if self.is_unit() {
            Some(self.recip())
        } else {
            None
        }
    }

    fn is_unit(&self) -> bool {
        self.is_finite() && !self.is_zero()
    }

    fn normalizing_unit(&self) -> Self {
        if self.is_unit() {
            self.recip()
        } else {
            Self::one()
        }
    }
}

impl<T> EucRing for Ratio<T>
where T: EucRing, for<'x> &'x T: EucRingOps<T> {}

impl<T> Field for Ratio<T>
where T: EucRing, for<'x> &'x T: EucRingOps<T> {}

impl<T> Ratio<T>
where T: Integer, for<'x> &'x T: IntOps<T> {
    pub fn abs(&self) -> Self {
        if self.is_finite() && self.numer.is_negative() {
            -self
        } else {
            self.clone()
        }
    }

    /// The greatest integer `n` with `n ≤ self`. Finite values only.
    pub fn floor(&self) -> Self {
        assert!(self.is_finite());
        let (q, _) = self.numer.div_rem_euc(&self.denom);
        Self::from_numer(q)
    }

    /// `self - floor(self)`, in `[0, 1)`. Finite values only.
    pub fn frac(&self) -> Self {
        assert!(self.is_finite());
        let r = self.numer.rem_euc(&self.denom);
        Self::new(r, self.denom.clone())
    }

    /// `None` when the value is not finite or does not fit a double;
    /// callers that prefer a silent `0.0` use [`Self::to_f64_lossy`].
    pub fn to_f64(&self) -> Option<f64> {
        if !self.is_finite() {
            return None
        }
        let p = self.numer.to_f64()?;
        let q = self.denom.to_f64()?;
        let v = p / q;
        v.is_finite().then_some(v)
    }

    pub fn to_f64_lossy(&self) -> f64 {
        self.to_f64().unwrap_or(0.0)
    }
}

impl<T> Ord for Ratio<T>
where T: Integer, for<'x> &'x T: IntOps<T> {
    fn cmp(&self, other: &Self) -> cmp::Ordering {
        use cmp::Ordering::*;

        match (self.is_finite(), other.is_finite()) {
            (false, false) => {
                // undefined < ∞, both self-equal.
                let (a, b) = (self.is_undefined(), other.is_undefined());
                b.cmp(&a)
            },
            (false, true) => if self.is_undefined() { Less } else { Greater },
            (true, false) => if other.is_undefined() { Greater } else { Less },
            (true, true) => {
                // denominators are positive, so cross-multiplication is exact.
                let l = &self.numer * &other.denom;
                let r = &other.numer * &self.denom;
                l.cmp(&r)
            }
        }
    }
}

impl<T> PartialOrd for Ratio<T>
where T: Integer, for<'x> &'x T: IntOps<T> {
    fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    type Q = Ratio<i64>;

    #[test]
    fn math_symbol() {
        assert_eq!(Q::math_symbol(), "Q");
    }

    #[test]
    fn reduce() {
        let a = Q::new(0, -4);
        assert_eq!((a.numer, a.denom), (0, 1));

        let a = Q::new(1, -3);
        assert_eq!((a.numer, a.denom), (-1, 3));

        let a = Q::new(6, -8);
        assert_eq!((a.numer, a.denom), (-3, 4));
    }

    #[test]
    fn special_points() {
        let inf = Q::new(-1, 0);
        assert!(inf.is_infinite());
        assert_eq!(inf, Q::infinity()); // -1/0 canonicalizes to +∞

        let und = Q::new(0, 0);
        assert!(und.is_undefined());
        assert!(!und.is_zero());
        assert!(!inf.is_zero());
    }

    #[test]
    fn display() {
        assert_eq!(Q::new(-3, 1).to_string(), "-3");
        assert_eq!(Q::new(-3, 4).to_string(), "-3/4");
        assert_eq!(Q::infinity().to_string(), "inf");
        assert_eq!(Q::undefined().to_string(), "undef");
    }

    #[test]
    fn add() {
        assert_eq!(Q::new(1, 2) + Q::new(3, 5), Q::new(11, 10));
        assert_eq!(Q::new(1, 6) + Q::new(1, 3), Q::new(1, 2));
        assert_eq!(Q::new(1, 2) + Q::infinity(), Q::infinity());
        assert_eq!(Q::infinity() + Q::infinity(), Q::infinity());
        assert_eq!(Q::new(1, 2) + Q::undefined(), Q::undefined());
    }

    #[test]
    fn sub() {
        assert_eq!(Q::new(1, 2) - Q::new(3, 5), Q::new(-1, 10));
        assert_eq!(Q::new(1, 2) - Q::infinity(), Q::infinity());
        assert_eq!(Q::infinity() - Q::infinity(), Q::undefined());
    }

    #[test]
    fn mul() {
        assert_eq!(Q::new(3, 10) * Q::new(-2, 7), Q::new(-3, 35));
        assert_eq!(Q::new(3, 4) * Q::zero(), Q::zero());
        assert_eq!(Q::infinity() * Q::new(-2, 7), Q::infinity());
        assert_eq!(Q::infinity() * Q::zero(), Q::undefined());
        assert_eq!(Q::infinity() * Q::infinity(), Q::infinity());
    }

    #[test]
    fn div() {
        assert_eq!(Q::new(3, 10) / Q::new(2, 7), Q::new(21, 20));
        assert_eq!(Q::new(3, 10) / Q::zero(), Q::infinity());
        assert_eq!(Q::zero() / Q::zero(), Q::undefined());
        assert_eq!(Q::new(3, 10) / Q::infinity(), Q::zero());
        assert_eq!(Q::infinity() / Q::infinity(), Q::undefined());
    }

    #[test]
    fn inv() {
        assert_eq!(Q::new(-3, 10).inv(), Some(Q::new(-10, 3)));
        assert_eq!(Q::zero().inv(), None);
        assert_eq!(Q::infinity().inv(), None);
        assert_eq!(Q::undefined().inv(), None);
    }

    #[test]
    fn cmp() {
        assert!(Q::new(3, 5) > Q::new(4, 7));
        assert!(Q::new(-1, 2) < Q::zero());
        assert!(Q::infinity() > Q::new(1 << 40, 1));
        assert!(Q::undefined() < Q::new(-(1 << 40), 1));
        assert!(Q::undefined() < Q::infinity());
        assert_eq!(Q::infinity().cmp(&Q::infinity()), cmp::Ordering::Equal);
        assert_eq!(Q::undefined().cmp(&Q::undefined()), cmp::Ordering::Equal);
    }

    #[test]
    fn floor_frac() {
        assert_eq!(Q::new(7, 2).floor(), Q::from_numer(3));
        assert_eq!(Q::new(-7, 2).floor(), Q::from_numer(-4));
        assert_eq!(Q::new(7, 2).frac(), Q::new(1, 2));
        assert_eq!(Q::new(-7, 2).frac(), Q::new(1, 2));
        assert_eq!(Q::new(3, 1).frac(), Q::zero());
    }

    #[test]
    fn to_f64() {
        assert_eq!(Q::new(1, 2).to_f64(), Some(0.5));
        assert_eq!(Q::infinity().to_f64(), None);
        assert_eq!(Q::undefined().to_f64(), None);
        assert_eq!(Q::undefined().to_f64_lossy(), 0.0);
    }

    #[test]
    fn to_f64_overflow() {
        use num_bigint::BigInt;
        use num_traits::Pow;
        let huge = Ratio::new(Pow::pow(BigInt::from(10), 400_u32), BigInt::one());
        assert_eq!(huge.to_f64(), None);
        assert_eq!(huge.to_f64_lossy(), 0.0);
    }

    #[test]
    fn from_str() {
        assert_eq!(Q::from_str("-3"), Ok(Q::from_numer(-3)));
        assert_eq!(Q::from_str("3/4"), Ok(Q::new(3, 4)));
        assert_eq!(Q::from_str("inf"), Ok(Q::infinity()));
        assert!(Q::from_str("x").is_err());
    }
}
