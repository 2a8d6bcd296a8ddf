//! Exact Rational Arithmetic
//!
//! Arbitrary-precision rationals used for every hypercharge and every anomaly
//! invariant. Values are always kept in lowest terms with a positive
//! denominator, so structural equality is numeric equality.

use crate::error::{Result, ScanError};
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub};
use std::str::FromStr;

/// Exact rational number in lowest terms.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ExactRational(BigRational);

impl ExactRational {
    /// Build `numerator / denominator`, reduced.
    ///
    /// A zero or negative denominator is an arithmetic domain error: callers
    /// that accept user-provided denominators must reject them earlier.
    pub fn new(numerator: i64, denominator: i64) -> Result<Self> {
        if denominator <= 0 {
            return Err(ScanError::ArithmeticDomainError(format!(
                "denominator must be positive, got {}/{}",
                numerator, denominator
            )));
        }
        Ok(Self(BigRational::new(
            BigInt::from(numerator),
            BigInt::from(denominator),
        )))
    }

    pub fn from_integer(value: i64) -> Self {
        Self(BigRational::from_integer(BigInt::from(value)))
    }

    pub fn zero() -> Self {
        Self(BigRational::zero())
    }

    pub fn one() -> Self {
        Self(BigRational::one())
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_negative()
    }

    pub fn is_positive(&self) -> bool {
        self.0.is_positive()
    }

    pub fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    pub fn pow(&self, exponent: i32) -> Self {
        Self(self.0.pow(exponent))
    }

    pub fn numer(&self) -> &BigInt {
        self.0.numer()
    }

    pub fn denom(&self) -> &BigInt {
        self.0.denom()
    }

    /// Smallest integer `>= self`.
    pub fn ceil_i64(&self) -> Option<i64> {
        self.0.ceil().to_integer().to_i64()
    }

    /// Largest integer `<= self`.
    pub fn floor_i64(&self) -> Option<i64> {
        self.0.floor().to_integer().to_i64()
    }

    /// Multiply by an integer.
    pub fn scale(&self, factor: i64) -> Self {
        Self(&self.0 * BigRational::from_integer(BigInt::from(factor)))
    }
}

impl Default for ExactRational {
    fn default() -> Self {
        Self::zero()
    }
}

impl From<i64> for ExactRational {
    fn from(value: i64) -> Self {
        Self::from_integer(value)
    }
}

impl fmt::Display for ExactRational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_integer() {
            write!(f, "{}", self.0.numer())
        } else {
            write!(f, "{}/{}", self.0.numer(), self.0.denom())
        }
    }
}

impl FromStr for ExactRational {
    type Err = ScanError;

    /// Accepts `"a/b"`, `"a"` and finite decimals such as `"-0.5"`.
    fn from_str(s: &str) -> Result<Self> {
        let text = s.trim();
        let malformed = || ScanError::ArithmeticDomainError(format!("not an exact rational: '{}'", s));

        if let Some((num, den)) = text.split_once('/') {
            let num: BigInt = num.trim().parse().map_err(|_| malformed())?;
            let den: BigInt = den.trim().parse().map_err(|_| malformed())?;
            if !den.is_positive() {
                return Err(ScanError::ArithmeticDomainError(format!(
                    "denominator must be positive in '{}'",
                    s
                )));
            }
            return Ok(Self(BigRational::new(num, den)));
        }

        if let Some((int_part, frac_part)) = text.split_once('.') {
            if frac_part.is_empty() || !frac_part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(malformed());
            }
            let (negative, int_digits) = match int_part.strip_prefix('-') {
                Some(rest) => (true, rest),
                None => (false, int_part.strip_prefix('+').unwrap_or(int_part)),
            };
            if !int_digits.bytes().all(|b| b.is_ascii_digit()) {
                return Err(malformed());
            }
            let digits = format!("{}{}", int_digits, frac_part);
            let mut num: BigInt = digits.parse().map_err(|_| malformed())?;
            if negative {
                num = -num;
            }
            let den = num_traits::pow(BigInt::from(10), frac_part.len());
            return Ok(Self(BigRational::new(num, den)));
        }

        let num: BigInt = text.parse().map_err(|_| malformed())?;
        Ok(Self(BigRational::from_integer(num)))
    }
}

impl Serialize for ExactRational {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ExactRational {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Literal {
            Int(i64),
            Float(f64),
            Text(String),
        }

        match Literal::deserialize(deserializer)? {
            Literal::Int(value) => Ok(Self::from_integer(value)),
            // Shortest decimal form, parsed exactly.
            Literal::Float(value) => value.to_string().parse().map_err(serde::de::Error::custom),
            Literal::Text(text) => text.parse().map_err(serde::de::Error::custom),
        }
    }
}

impl Add for &ExactRational {
    type Output = ExactRational;

    fn add(self, rhs: &ExactRational) -> ExactRational {
        ExactRational(&self.0 + &rhs.0)
    }
}

impl Add for ExactRational {
    type Output = ExactRational;

    fn add(self, rhs: ExactRational) -> ExactRational {
        ExactRational(self.0 + rhs.0)
    }
}

impl AddAssign<&ExactRational> for ExactRational {
    fn add_assign(&mut self, rhs: &ExactRational) {
        self.0 += &rhs.0;
    }
}

impl Sub for &ExactRational {
    type Output = ExactRational;

    fn sub(self, rhs: &ExactRational) -> ExactRational {
        ExactRational(&self.0 - &rhs.0)
    }
}

impl Mul for &ExactRational {
    type Output = ExactRational;

    fn mul(self, rhs: &ExactRational) -> ExactRational {
        ExactRational(&self.0 * &rhs.0)
    }
}

impl Mul for ExactRational {
    type Output = ExactRational;

    fn mul(self, rhs: ExactRational) -> ExactRational {
        ExactRational(self.0 * rhs.0)
    }
}

impl Neg for &ExactRational {
    type Output = ExactRational;

    fn neg(self) -> ExactRational {
        ExactRational(-&self.0)
    }
}

impl Neg for ExactRational {
    type Output = ExactRational;

    fn neg(self) -> ExactRational {
        ExactRational(-self.0)
    }
}

/// Shorthand for literal rationals in tables and tests.
///
/// Panics on a non-positive denominator, so only use it with constants.
pub fn q(numerator: i64, denominator: i64) -> ExactRational {
    assert!(denominator > 0, "constant rational with non-positive denominator");
    ExactRational(BigRational::new(
        BigInt::from(numerator),
        BigInt::from(denominator),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reduction_to_lowest_terms() {
        let a = ExactRational::new(2, 4).unwrap();
        let b = ExactRational::new(1, 2).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "1/2");
        assert_eq!(ExactRational::new(-6, 3).unwrap().to_string(), "-2");
        assert_eq!(ExactRational::zero().to_string(), "0");
    }

    #[test]
    fn test_non_positive_denominator_is_domain_error() {
        assert!(matches!(
            ExactRational::new(1, 0),
            Err(ScanError::ArithmeticDomainError(_))
        ));
        assert!(matches!(
            ExactRational::new(1, -3),
            Err(ScanError::ArithmeticDomainError(_))
        ));
        assert!(matches!(
            "1/0".parse::<ExactRational>(),
            Err(ScanError::ArithmeticDomainError(_))
        ));
    }

    #[test]
    fn test_parse_forms() {
        assert_eq!("1/3".parse::<ExactRational>().unwrap(), q(1, 3));
        assert_eq!("-2/3".parse::<ExactRational>().unwrap(), q(-2, 3));
        assert_eq!(" 4 ".parse::<ExactRational>().unwrap(), q(4, 1));
        assert_eq!("0.5".parse::<ExactRational>().unwrap(), q(1, 2));
        assert_eq!("-1.25".parse::<ExactRational>().unwrap(), q(-5, 4));
        assert!("abc".parse::<ExactRational>().is_err());
        assert!("1.".parse::<ExactRational>().is_err());
    }

    #[test]
    fn test_decimal_takes_one_sign() {
        assert_eq!("+0.5".parse::<ExactRational>().unwrap(), q(1, 2));
        assert_eq!("-.5".parse::<ExactRational>().unwrap(), q(-1, 2));
        for bad in ["--1.5", "+-0.5", "-+0.5", "1-.5", "++2.0"] {
            assert!(
                matches!(bad.parse::<ExactRational>(), Err(ScanError::ArithmeticDomainError(_))),
                "{} should not parse",
                bad
            );
        }
    }

    #[test]
    fn test_arithmetic_is_exact() {
        let sixth = q(1, 6);
        let sum = (0..6).fold(ExactRational::zero(), |acc, _| &acc + &sixth);
        assert_eq!(sum, ExactRational::one());

        assert_eq!(q(-1, 2).pow(3), q(-1, 8));
        assert_eq!(&q(2, 3) * &q(3, 4), q(1, 2));
        assert_eq!(-q(1, 6), q(-1, 6));
        assert_eq!(q(-7, 2).abs(), q(7, 2));
        assert_eq!(q(7, 2).scale(-2), q(-7, 1));
    }

    #[test]
    fn test_ceil_and_floor() {
        assert_eq!(q(-4, 3).ceil_i64(), Some(-1));
        assert_eq!(q(-4, 3).floor_i64(), Some(-2));
        assert_eq!(q(3, 1).ceil_i64(), Some(3));
        assert_eq!(q(3, 1).floor_i64(), Some(3));
    }

    #[test]
    fn test_serde_uses_exact_string() {
        let json = serde_json::to_string(&q(-1, 3)).unwrap();
        assert_eq!(json, "\"-1/3\"");

        let back: ExactRational = serde_json::from_str("\"-1/3\"").unwrap();
        assert_eq!(back, q(-1, 3));

        let int: ExactRational = serde_json::from_str("2").unwrap();
        assert_eq!(int, q(2, 1));

        let decimal: ExactRational = serde_json::from_str("-0.1").unwrap();
        assert_eq!(decimal, q(-1, 10));
        let whole: ExactRational = serde_json::from_str("1.0").unwrap();
        assert_eq!(whole, q(1, 1));
    }

    #[test]
    fn test_ordering_is_numeric() {
        let mut values = vec![q(1, 2), q(-1, 3), q(0, 1), q(1, 3)];
        values.sort();
        assert_eq!(values, vec![q(-1, 3), q(0, 1), q(1, 3), q(1, 2)]);
    }
}
