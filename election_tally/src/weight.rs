// Exact vote arithmetic.
//
// Fractional transfers are compounded across many rounds, so everything is kept as
// an arbitrary precision rational. Rounding only happens for display and for the quota.

use std::fmt::Display;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub, SubAssign};

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{Signed, Zero};

/// An exact amount of votes.
///
/// Ballot counts may be fractional (`"count": 2.5`) and surplus transfers scale them
/// further, so the weight is a rational number rather than an integer count.
#[derive(Eq, PartialEq, Debug, Clone, PartialOrd, Ord, Hash)]
pub struct VoteWeight(BigRational);

impl VoteWeight {
    pub fn zero() -> VoteWeight {
        VoteWeight(BigRational::zero())
    }

    pub fn from_integer(n: u64) -> VoteWeight {
        VoteWeight(BigRational::from_integer(BigInt::from(n)))
    }

    /// Panics if `denom` is zero.
    pub fn from_ratio(numer: u64, denom: u64) -> VoteWeight {
        VoteWeight(BigRational::new(BigInt::from(numer), BigInt::from(denom)))
    }

    /// Parses the textual form of a decimal number, as found in JSON documents.
    ///
    /// Accepts an optional sign, a fractional part and an exponent: `3`, `-1`, `2.5`,
    /// `.75`, `1e-3`, `4.2E+1`. The value is converted exactly, so `0.1` is one tenth.
    /// Negative values are returned as-is; it is up to the caller to reject them.
    pub fn parse_decimal(s: &str) -> Option<VoteWeight> {
        let s = s.trim();
        let (mantissa, exponent) = match s.find(|c| c == 'e' || c == 'E') {
            Some(idx) => (&s[..idx], s[idx + 1..].parse::<i32>().ok()?),
            None => (s, 0),
        };
        let (negative, digits) = match mantissa.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, mantissa.strip_prefix('+').unwrap_or(mantissa)),
        };
        let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, ""));
        if int_part.is_empty() && frac_part.is_empty() {
            return None;
        }
        if !int_part
            .chars()
            .chain(frac_part.chars())
            .all(|c| c.is_ascii_digit())
        {
            return None;
        }
        let numer: BigInt = format!("{}{}", int_part, frac_part).parse().ok()?;
        let shift = exponent.checked_sub(frac_part.len() as i32)?;
        let power = BigRational::from_integer(num_traits::pow(
            BigInt::from(10u32),
            shift.unsigned_abs() as usize,
        ));
        let mut value = BigRational::from_integer(numer);
        if shift >= 0 {
            value *= power;
        } else {
            value /= power;
        }
        if negative {
            value = -value;
        }
        Some(VoteWeight(value))
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        self.0.is_positive()
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_negative()
    }

    pub fn is_integer(&self) -> bool {
        self.0.is_integer()
    }

    /// Largest whole number of votes not greater than this weight.
    pub fn floor(&self) -> VoteWeight {
        VoteWeight(self.0.floor())
    }

    /// `self * numer / denom`. Panics if `denom` is zero.
    pub fn scale(&self, numer: &VoteWeight, denom: &VoteWeight) -> VoteWeight {
        VoteWeight(&self.0 * &numer.0 / &denom.0)
    }

    /// Panics if `d` is zero.
    pub fn div_integer(&self, d: u64) -> VoteWeight {
        VoteWeight(&self.0 / BigRational::from_integer(BigInt::from(d)))
    }

    pub fn mul_integer(&self, m: u64) -> VoteWeight {
        VoteWeight(&self.0 * BigRational::from_integer(BigInt::from(m)))
    }

    /// This weight as a percentage of `total`, or None if the total is zero.
    pub fn percent_of(&self, total: &VoteWeight) -> Option<VoteWeight> {
        if total.is_zero() {
            None
        } else {
            Some(self.mul_integer(100).scale(&VoteWeight::from_integer(1), total))
        }
    }
}

impl Display for VoteWeight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.is_integer() {
            return write!(f, "{}", self.0.to_integer());
        }
        // Rounded to 4 decimals, half away from zero.
        let scaled = (&self.0 * BigRational::from_integer(BigInt::from(10_000u32)))
            .round()
            .to_integer();
        let sign = if scaled.is_negative() { "-" } else { "" };
        let digits = format!("{:0>5}", scaled.abs().to_string());
        let (int_part, frac_part) = digits.split_at(digits.len() - 4);
        let frac_part = frac_part.trim_end_matches('0');
        if frac_part.is_empty() {
            write!(f, "{}{}", sign, int_part)
        } else {
            write!(f, "{}{}.{}", sign, int_part, frac_part)
        }
    }
}

impl AddAssign for VoteWeight {
    fn add_assign(&mut self, rhs: VoteWeight) {
        self.0 += rhs.0;
    }
}

impl<'a> AddAssign<&'a VoteWeight> for VoteWeight {
    fn add_assign(&mut self, rhs: &'a VoteWeight) {
        self.0 += &rhs.0;
    }
}

impl SubAssign for VoteWeight {
    fn sub_assign(&mut self, rhs: VoteWeight) {
        self.0 -= rhs.0;
    }
}

impl Add for VoteWeight {
    type Output = VoteWeight;
    fn add(self, rhs: VoteWeight) -> VoteWeight {
        VoteWeight(self.0 + rhs.0)
    }
}

impl Sub for VoteWeight {
    type Output = VoteWeight;
    fn sub(self, rhs: VoteWeight) -> VoteWeight {
        VoteWeight(self.0 - rhs.0)
    }
}

impl<'a> Sub<&'a VoteWeight> for &'a VoteWeight {
    type Output = VoteWeight;
    fn sub(self, rhs: &'a VoteWeight) -> VoteWeight {
        VoteWeight(&self.0 - &rhs.0)
    }
}

impl Sum for VoteWeight {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(VoteWeight::zero(), |acc, w| acc + w)
    }
}

impl<'a> Sum<&'a VoteWeight> for VoteWeight {
    fn sum<I: Iterator<Item = &'a VoteWeight>>(iter: I) -> Self {
        let mut acc = VoteWeight::zero();
        for w in iter {
            acc += w;
        }
        acc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_decimal_is_exact() {
        assert_eq!(
            VoteWeight::parse_decimal("2.5"),
            Some(VoteWeight::from_ratio(5, 2))
        );
        assert_eq!(
            VoteWeight::parse_decimal("0.1"),
            Some(VoteWeight::from_ratio(1, 10))
        );
        assert_eq!(
            VoteWeight::parse_decimal("1e-3"),
            Some(VoteWeight::from_ratio(1, 1000))
        );
        assert_eq!(
            VoteWeight::parse_decimal("4.2E+1"),
            Some(VoteWeight::from_integer(42))
        );
        assert_eq!(
            VoteWeight::parse_decimal(".75"),
            Some(VoteWeight::from_ratio(3, 4))
        );
        assert!(VoteWeight::parse_decimal("-3").unwrap().is_negative());
    }

    #[test]
    fn parse_decimal_rejects_garbage() {
        assert_eq!(VoteWeight::parse_decimal(""), None);
        assert_eq!(VoteWeight::parse_decimal("."), None);
        assert_eq!(VoteWeight::parse_decimal("1.2.3"), None);
        assert_eq!(VoteWeight::parse_decimal("abc"), None);
        assert_eq!(VoteWeight::parse_decimal("1e"), None);
    }

    #[test]
    fn display_rounds_to_four_decimals() {
        assert_eq!(VoteWeight::from_integer(7).to_string(), "7");
        assert_eq!(VoteWeight::from_ratio(100, 3).to_string(), "33.3333");
        assert_eq!(VoteWeight::from_ratio(2, 3).to_string(), "0.6667");
        assert_eq!(VoteWeight::from_ratio(1, 2).to_string(), "0.5");
        assert_eq!(VoteWeight::from_ratio(1, 100_000).to_string(), "0");
    }

    #[test]
    fn floor_and_scale() {
        let w = VoteWeight::from_ratio(10, 3);
        assert_eq!(w.floor(), VoteWeight::from_integer(3));
        let scaled = VoteWeight::from_integer(6).scale(&VoteWeight::from_integer(2), &w);
        assert_eq!(scaled, VoteWeight::from_ratio(18, 5));
        assert_eq!(
            VoteWeight::from_integer(1).percent_of(&VoteWeight::from_integer(3)),
            Some(VoteWeight::from_ratio(100, 3))
        );
        assert_eq!(
            VoteWeight::from_integer(1).percent_of(&VoteWeight::zero()),
            None
        );
    }

    #[test]
    fn sums_are_exact() {
        let parts = vec![VoteWeight::from_ratio(1, 3); 3];
        let total: VoteWeight = parts.iter().sum();
        assert_eq!(total, VoteWeight::from_integer(1));
    }
}
