use num_bigint::BigInt;
use num_traits::{One, Signed, ToPrimitive, FromPrimitive, Zero};
use crate::*;

pub trait IntOps<T = Self>: EucRingOps<T> {}

pub trait Integer: EucRing + IntOps + Signed + PartialOrd + Ord + FromPrimitive + ToPrimitive
where for<'a> &'a Self: EucRingOps<Self> {
    // The division algorithm with non-negative remainder:
    // a = q d + r with 0 <= r < |d|, also for negative dividends.
    fn div_rem_euc(&self, d: &Self) -> (Self, Self);

    fn rem_euc(&self, d: &Self) -> Self {
        self.div_rem_euc(d).1
    }
}

macro_rules! impl_ops {
    ($trait:ident, $type:ty) => {
        impl $trait for $type {}
        impl<'a> $trait<$type> for &'a $type {}
    };
}

macro_rules! impl_integer {
    ($type:ident) => {
        impl_ops!(AddMonOps, $type);
        impl_ops!(AddGrpOps, $type);
        impl_ops!(MonOps, $type);
        impl_ops!(RingOps, $type);
        impl_ops!(EucRingOps, $type);
        impl_ops!(IntOps, $type);

        impl Elem for $type {
            fn math_symbol() -> String {
                String::from("Z")
            }
        }

        impl AddMon for $type {}
        impl AddGrp for $type {}
        impl Mon for $type {}

        impl Ring for $type {
            fn inv(&self) -> Option<Self> {
                if self.is_unit() {
                    Some(self.clone())
                } else {
                    None
                }
            }

            fn is_unit(&self) -> bool {
                self.is_one() || (-self).is_one()
            }

            fn normalizing_unit(&self) -> Self {
                if !self.is_negative() {
                    Self::one()
                } else {
                    -Self::one()
                }
            }
        }

        impl EucRing for $type {
            fn gcd(x: &Self, y: &Self) -> Self {
                num_integer::Integer::gcd(x, y)
            }

            fn gcdx(x: &Self, y: &Self) -> (Self, Self, Self) {
                let num_integer::ExtendedGcd{ gcd: d, x: s, y: t } = num_integer::Integer::extended_gcd(x, y);
                (d, s, t)
            }

            fn lcm(x: &Self, y: &Self) -> Self {
                num_integer::Integer::lcm(x, y)
            }
        }

        impl Integer for $type {
            fn div_rem_euc(&self, d: &Self) -> (Self, Self) {
                assert!(!d.is_zero());
                let (q, r) = num_integer::Integer::div_mod_floor(self, d);
                if r.is_negative() {
                    (q + Self::one(), r - d)
                } else {
                    (q, r)
                }
            }
        }
    }
}

impl_integer!(i32);
impl_integer!(i64);
impl_integer!(i128);
impl_integer!(BigInt);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_type() {
        fn check<T>() where T: Integer, for<'a> &'a T: IntOps<T> {}
        check::<i32>();
        check::<i64>();
        check::<i128>();
        check::<BigInt>();
    }

    #[test]
    fn int_is_unit() {
        assert!(1.is_unit());
        assert!((-1).is_unit());
        assert!(!2.is_unit());
    }

    #[test]
    fn int_normalizing_unit() {
        assert_eq!(1.normalizing_unit(), 1);
        assert_eq!((-1).normalizing_unit(), -1);
        assert_eq!(2.normalizing_unit(), 1);
    }

    #[test]
    fn int_divides() {
        assert!(2.divides(&4));
        assert!(!3.divides(&4));
        assert!(!0.divides(&1));
    }

    #[test]
    fn gcd_i64() {
        assert_eq!(i64::gcd(&240, &46), 2);
        assert_eq!(i64::gcd(&24, &0), 24);
        assert_eq!(i64::gcd(&0, &-24), 24);
        assert_eq!(i64::gcd(&0, &0), 0);
    }

    #[test]
    fn gcdx_i64() {
        let (a, b) = (240, 46);
        let (d, s, t) = i64::gcdx(&a, &b);
        assert_eq!(d, 2);
        assert_eq!(s * a + t * b, d);

        let (a, b) = (24, 0);
        let (d, s, t) = i64::gcdx(&a, &b);
        assert_eq!(d, 24);
        assert_eq!(s * a + t * b, d);
    }

    #[test]
    fn div_rem_euc() {
        assert_eq!(13.div_rem_euc(&5), (2, 3));
        assert_eq!((-13).div_rem_euc(&5), (-3, 2));
        assert_eq!(13.div_rem_euc(&-5), (-2, 3));
        assert_eq!((-13).div_rem_euc(&-5), (3, 2));
        assert_eq!(10.div_rem_euc(&5), (2, 0));
        assert_eq!((-10).div_rem_euc(&5), (-2, 0));
    }

    #[test]
    fn div_rem_euc_bigint() {
        let a = BigInt::from(-13);
        let d = BigInt::from(5);
        let (q, r) = a.div_rem_euc(&d);
        assert_eq!(q, BigInt::from(-3));
        assert_eq!(r, BigInt::from(2));
        assert_eq!(&q * &d + &r, a);
    }
}
