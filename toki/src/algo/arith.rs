use num_bigint::{BigInt, RandBigInt};
use num_traits::{One, Signed, Zero};

use crate::{EucRing, IntOps, Integer};

/// `a^e mod m` by binary exponentiation, with `e ≥ 0` and the result in
/// `[0, m)`.
pub fn pow_mod<I>(a: &I, e: &I, m: &I) -> I
where I: Integer, for<'x> &'x I: IntOps<I> {
    assert!(!e.is_negative());

    let two = I::one() + I::one();
    let mut base = a.rem_euc(m);
    let mut exp = e.clone();
    let mut res = I::one().rem_euc(m);

    while !exp.is_zero() {
        let (q, r) = exp.div_rem_euc(&two);
        if !r.is_zero() {
            res = (&res * &base).rem_euc(m);
        }
        base = (&base * &base).rem_euc(m);
        exp = q;
    }

    res
}

/// The inverse of `a` modulo `m`, in `[0, m)`, if `gcd(a, m) = 1`.
pub fn inv_mod<I>(a: &I, m: &I) -> Option<I>
where I: Integer, for<'x> &'x I: IntOps<I> {
    let (d, s, _) = I::gcdx(a, m);

    if d.is_one() {
        Some(s.rem_euc(m))
    } else if (-&d).is_one() {
        Some((-s).rem_euc(m))
    } else {
        None
    }
}

/// The Legendre symbol `(a/p)` for an odd prime `p`, via Euler's criterion
/// `a^{(p-1)/2} ≡ ±1 (mod p)`.
pub fn legendre<I>(a: &I, p: &I) -> i32
where I: Integer, for<'x> &'x I: IntOps<I> {
    let r = a.rem_euc(p);
    if r.is_zero() {
        return 0
    }

    let two = I::one() + I::one();
    let e = (p - I::one()) / two;

    if pow_mod(&r, &e, p).is_one() { 1 } else { -1 }
}

/// The prime power decomposition `n = Π p_i^{k_i}` of a positive integer,
/// as ascending `(p, k)` pairs.
pub fn prime_power_decomp<I>(n: &I) -> Vec<(I, usize)>
where I: Integer, for<'x> &'x I: IntOps<I> {
    assert!(n.is_positive());

    let mut res = vec![];
    let mut n = n.clone();
    let mut d = I::one() + I::one();

    while &(&d * &d) <= &n {
        let mut k = 0;
        while (&n % &d).is_zero() {
            n /= &d;
            k += 1;
        }
        if k > 0 {
            res.push((d.clone(), k));
        }
        d += I::one();
    }

    if !n.is_one() {
        res.push((n, 1));
    }

    res
}

/// A uniform random integer in `[0, bound)`, drawn from the thread-local
/// generator.
pub fn rand_below(bound: &BigInt) -> BigInt {
    assert!(bound.is_positive());
    rand::thread_rng().gen_bigint_range(&BigInt::zero(), bound)
}
