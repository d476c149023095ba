use std::collections::BTreeMap;
use std::fmt::{Debug, Display};
use std::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};
use auto_impl_ops::auto_ops;
use delegate::delegate;
use num_traits::{One, Signed, Zero};

use crate::{AddGrp, AddGrpOps, AddMon, AddMonOps, Elem, IntOps, Integer, Mon, MonOps, Ring, RingOps, Sign};
use crate::util::format::paren_expr;

/// A sparse Laurent polynomial over `R` in the variable `X`, stored as an
/// ordered map from exponent to coefficient. The stored key set is exactly
/// the support: no key ever maps to zero.
#[derive(Clone, PartialEq, Eq)]
pub struct LPoly<const X: char, R> {
    data: BTreeMap<isize, R>,
    zero: R
}

impl<const X: char, R> LPoly<X, R>
where R: Ring, for<'x> &'x R: RingOps<R> {
    fn new(data: BTreeMap<isize, R>) -> Self {
        let mut res = Self { data, zero: R::zero() };
        res.reduce();
        res
    }

    fn reduce(&mut self) {
        self.data.retain(|_, a| !a.is_zero())
    }

    pub fn from_const(a: R) -> Self {
        Self::from((0, a))
    }

    pub fn from_term(e: isize, a: R) -> Self {
        Self::from((e, a))
    }

    pub fn variable() -> Self {
        Self::from((1, R::one()))
    }

    /// The telescoping family `t^{m-n} + … + t^{m-dn}` (`d > 0`), resp.
    /// `-t^m - t^{m+n} - … - t^{m-(d+1)n}` (`d < 0`), realizing the division
    /// algorithm on exponents: if `m = dn + r` with `0 ≤ r < |n|` then
    /// `t^m - 1 = geom_sum(m, n, d)·(t^n - 1) + (t^r - 1)`.
    pub fn geom_sum(m: isize, n: isize, d: isize) -> Self {
        if d > 0 {
            Self::from_iter((1..=d).map(|i| (m - i * n, R::one())))
        } else {
            Self::from_iter((0..-d).map(|i| (m + i * n, -R::one())))
        }
    }

    delegate! {
        to self.data {
            #[call(len)]
            pub fn nterms(&self) -> usize;
            pub fn iter(&self) -> impl Iterator<Item = (&isize, &R)>;
        }
    }

    pub fn coeff(&self, e: isize) -> &R {
        self.data.get(&e).unwrap_or(&self.zero)
    }

    pub fn min_exp(&self) -> Option<isize> {
        self.data.keys().next().cloned()
    }

    pub fn max_exp(&self) -> Option<isize> {
        self.data.keys().next_back().cloned()
    }

    pub fn first_term(&self) -> Option<(isize, &R)> {
        self.data.iter().next().map(|(e, a)| (*e, a))
    }

    pub fn last_term(&self) -> Option<(isize, &R)> {
        self.data.iter().next_back().map(|(e, a)| (*e, a))
    }

    /// `max_exp - min_exp`, or 0 when empty.
    pub fn width(&self) -> isize {
        match (self.min_exp(), self.max_exp()) {
            (Some(l), Some(h)) => h - l,
            _ => 0
        }
    }

    /// The exponent of maximal absolute value, ties resolved to the
    /// positive one. 0 for the zero polynomial.
    pub fn degree(&self) -> isize {
        match (self.min_exp(), self.max_exp()) {
            (Some(l), Some(h)) => if -l > h { l } else { h },
            _ => 0
        }
    }

    pub fn is_const(&self) -> bool {
        self.data.keys().all(|e| *e == 0)
    }

    pub fn const_term(&self) -> &R {
        self.coeff(0)
    }

    fn mul_impl(&self, rhs: &Self) -> Self {
        use std::collections::btree_map::Entry;

        let mut data: BTreeMap<isize, R> = BTreeMap::new();
        for (e1, a1) in self.data.iter() {
            for (e2, a2) in rhs.data.iter() {
                let e = e1 + e2;
                let p = a1 * a2;
                match data.entry(e) {
                    Entry::Occupied(mut o) => { *o.get_mut() += p },
                    Entry::Vacant(v) => { v.insert(p); }
                }
            }
        }
        Self::new(data) // drops coefficients that cancelled to zero.
    }
}

impl<const X: char, R> LPoly<X, R>
where R: Integer, for<'x> &'x R: IntOps<R> {
    /// Descartes sign-change number: `#sign changes of P(t)` minus
    /// `#sign changes of P(-t)`, scanned once over the support in ascending
    /// exponent order. When all roots of `P` are real this equals
    /// `#positive roots - #negative roots`.
    pub fn descartes_no(&self) -> isize {
        let mut prev_p: Option<Sign> = None;
        let mut prev_m: Option<Sign> = None;
        let mut count = 0;

        for (e, a) in self.data.iter() {
            let s = if a.is_negative() { Sign::Neg } else { Sign::Pos };
            let sm = if e % 2 == 0 { s } else { -s };

            if prev_p.is_some_and(|p| p != s) { count += 1 }
            if prev_m.is_some_and(|p| p != sm) { count -= 1 }

            (prev_p, prev_m) = (Some(s), Some(sm));
        }

        count
    }
}

impl<const X: char, R> From<(isize, R)> for LPoly<X, R>
where R: Ring, for<'x> &'x R: RingOps<R> {
    fn from(term: (isize, R)) -> Self {
        Self::from_iter([term])
    }
}

impl<const X: char, R> FromIterator<(isize, R)> for LPoly<X, R>
where R: Ring, for<'x> &'x R: RingOps<R> {
    fn from_iter<T: IntoIterator<Item = (isize, R)>>(iter: T) -> Self {
        use std::collections::btree_map::Entry;

        let mut data: BTreeMap<isize, R> = BTreeMap::new();
        for (e, a) in iter.into_iter() {
            match data.entry(e) {
                Entry::Occupied(mut o) => { *o.get_mut() += a },
                Entry::Vacant(v) => { v.insert(a); }
            }
        }
        Self::new(data)
    }
}

impl<const X: char, R> From<i32> for LPoly<X, R>
where R: Ring, for<'x> &'x R: RingOps<R> {
    fn from(a: i32) -> Self {
        Self::from_const(R::from(a))
    }
}

impl<const X: char, R> Default for LPoly<X, R>
where R: Ring, for<'x> &'x R: RingOps<R> {
    fn default() -> Self {
        Self::zero()
    }
}

impl<const X: char, R> Display for LPoly<X, R>
where R: Ring, for<'x> &'x R: RingOps<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_zero() {
            return f.write_str("0")
        }

        // t^1 elides to t, t^0 to the bare coefficient; negative and
        // multi-digit exponents are parenthesized.
        let var = |e: isize| match e {
            0 => String::new(),
            1 => X.to_string(),
            e if e < 0 || e >= 10 => format!("{X}^({e})"),
            e => format!("{X}^{e}")
        };

        let mut res = String::new();

        for (i, (e, a)) in self.data.iter().enumerate() {
            let a = paren_expr(a);
            let (sign, mag) = match a.strip_prefix('-') {
                Some(m) => ("-", m.to_owned()),
                None => ("+", a)
            };

            if i == 0 {
                if sign == "-" { res.push('-') }
            } else {
                res.push_str(if sign == "-" { " - " } else { " + " });
            }

            let v = var(*e);
            if mag == "1" && !v.is_empty() {
                res.push_str(&v);
            } else {
                res.push_str(&mag);
                res.push_str(&v);
            }
        }

        f.write_str(&res)
    }
}

impl<const X: char, R> Debug for LPoly<X, R>
where R: Ring, for<'x> &'x R: RingOps<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

impl<const X: char, R> Zero for LPoly<X, R>
where R: Ring, for<'x> &'x R: RingOps<R> {
    fn zero() -> Self {
        Self { data: BTreeMap::new(), zero: R::zero() }
    }

    fn is_zero(&self) -> bool {
        self.data.is_empty()
    }
}

impl<const X: char, R> One for LPoly<X, R>
where R: Ring, for<'x> &'x R: RingOps<R> {
    fn one() -> Self {
        Self::from((0, R::one()))
    }

    fn is_one(&self) -> bool {
        self.nterms() == 1 && self.const_term().is_one()
    }
}

impl<const X: char, R> Neg for LPoly<X, R>
where R: Ring, for<'x> &'x R: RingOps<R> {
    type Output = Self;
    fn neg(self) -> Self::Output {
        -&self
    }
}

impl<const X: char, R> Neg for &LPoly<X, R>
where R: Ring, for<'x> &'x R: RingOps<R> {
    type Output = LPoly<X, R>;
    fn neg(self) -> Self::Output {
        let data = self.data.iter().map(|(e, a)| (*e, -a)).collect();
        LPoly { data, zero: R::zero() }
    }
}

#[auto_ops]
impl<const X: char, R> AddAssign<&LPoly<X, R>> for LPoly<X, R>
where R: Ring, for<'x> &'x R: RingOps<R> {
    fn add_assign(&mut self, rhs: &LPoly<X, R>) {
        use std::collections::btree_map::Entry;

        for (e, a) in rhs.data.iter() {
            match self.data.entry(*e) {
                Entry::Occupied(mut o) => {
                    *o.get_mut() += a;
                    if o.get().is_zero() {
                        o.remove();
                    }
                },
                Entry::Vacant(v) => { v.insert(a.clone()); }
            }
        }
    }
}

#[auto_ops]
impl<const X: char, R> SubAssign<&LPoly<X, R>> for LPoly<X, R>
where R: Ring, for<'x> &'x R: RingOps<R> {
    fn sub_assign(&mut self, rhs: &LPoly<X, R>) {
        use std::collections::btree_map::Entry;

        for (e, a) in rhs.data.iter() {
            match self.data.entry(*e) {
                Entry::Occupied(mut o) => {
                    *o.get_mut() -= a;
                    if o.get().is_zero() {
                        o.remove();
                    }
                },
                Entry::Vacant(v) => { v.insert(-a); }
            }
        }
    }
}

#[auto_ops]
impl<const X: char, R> MulAssign<&R> for LPoly<X, R>
where R: Ring, for<'x> &'x R: RingOps<R> {
    fn mul_assign(&mut self, rhs: &R) {
        for a in self.data.values_mut() {
            *a *= rhs;
        }
        self.reduce()
    }
}

#[auto_ops]
impl<const X: char, R> MulAssign<&LPoly<X, R>> for LPoly<X, R>
where R: Ring, for<'x> &'x R: RingOps<R> {
    fn mul_assign(&mut self, rhs: &LPoly<X, R>) {
        if rhs.is_one() {
            // do nothing
        } else {
            *self = self.mul_impl(rhs)
        }
    }
}

macro_rules! impl_alg_ops {
    ($trait:ident) => {
        impl<const X: char, R> $trait<Self> for LPoly<X, R>
        where R: Ring, for<'x> &'x R: RingOps<R> {}

        impl<const X: char, R> $trait<LPoly<X, R>> for &LPoly<X, R>
        where R: Ring, for<'x> &'x R: RingOps<R> {}
    };
}

impl_alg_ops!(AddMonOps);
impl_alg_ops!(AddGrpOps);
impl_alg_ops!(MonOps);
impl_alg_ops!(RingOps);

impl<const X: char, R> Elem for LPoly<X, R>
where R: Ring, for<'x> &'x R: RingOps<R> {
    fn math_symbol() -> String {
        format!("{}[{X}, {X}⁻¹]", R::math_symbol())
    }
}

impl<const X: char, R> AddMon for LPoly<X, R>
where R: Ring, for<'x> &'x R: RingOps<R> {}

impl<const X: char, R> AddGrp for LPoly<X, R>
where R: Ring, for<'x> &'x R: RingOps<R> {}

impl<const X: char, R> Mon for LPoly<X, R>
where R: Ring, for<'x> &'x R: RingOps<R> {}

impl<const X: char, R> Ring for LPoly<X, R>
where R: Ring, for<'x> &'x R: RingOps<R> {
    fn inv(&self) -> Option<Self> {
        if self.nterms() != 1 {
            return None
        }
        let (e, a) = self.first_term()?; // (a t^e)^{-1} = a^{-1} t^{-e}
        let ainv = a.inv()?;
        Some(Self::from((-e, ainv)))
    }

    fn is_unit(&self) -> bool {
        self.nterms() == 1 && self.first_term().unwrap().1.is_unit()
    }

    fn normalizing_unit(&self) -> Self {
        let u = match self.last_term() {
            Some((_, a)) => a.normalizing_unit(),
            None => R::one()
        };
        Self::from_const(u)
    }
}
