use std::ops::Neg;
use derive_more::{Display, Debug};
use is_even::IsEven;

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Display, Debug)]
#[repr(i8)]
pub enum Sign {
    #[default]
    #[display("+")]
    #[debug("+")]
    Pos = 1,

    #[display("-")]
    #[debug("-")]
    Neg = -1
}

impl Sign {
    pub fn is_positive(&self) -> bool {
        self == &Sign::Pos
    }

    pub fn is_negative(&self) -> bool {
        !self.is_positive()
    }

    pub fn from_parity<I: IsEven>(val: I) -> Self {
        if val.is_even() {
            Sign::Pos
        } else {
            Sign::Neg
        }
    }

    pub fn to_i32(&self) -> i32 {
        match self {
            Sign::Pos =>  1,
            Sign::Neg => -1
        }
    }
}

impl From<i32> for Sign {
    fn from(value: i32) -> Self {
        match value {
             1 => Sign::Pos,
            -1 => Sign::Neg,
             _ => panic!("not a sign: {value}")
        }
    }
}

impl Neg for Sign {
    type Output = Self;
    fn neg(self) -> Self {
        use Sign::*;
        match self {
            Neg => Pos,
            Pos => Neg
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        assert_eq!(Sign::Pos.to_string(), "+");
        assert_eq!(Sign::Neg.to_string(), "-");
    }

    #[test]
    fn from_parity() {
        assert_eq!(Sign::from_parity(0), Sign::Pos);
        assert_eq!(Sign::from_parity(3), Sign::Neg);
    }

    #[test]
    fn neg() {
        assert_eq!(-Sign::Pos, Sign::Neg);
        assert_eq!(-Sign::Neg, Sign::Pos);
    }
}
