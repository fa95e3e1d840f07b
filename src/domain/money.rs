use crate::error::UnderwritingError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul};

/// A non-negative currency amount.
///
/// Wraps `rust_decimal::Decimal` so loan sizes and protocol limits cannot go
/// negative once they enter the domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(value: Decimal) -> Result<Self, UnderwritingError> {
        if value >= Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(UnderwritingError::ValidationError(format!(
                "Amount must not be negative, got {value}"
            )))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn round_dp(self, dp: u32) -> Self {
        Self(self.0.round_dp(dp))
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = UnderwritingError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A non-negative percentage expressed in percentage points (`150` is 150%).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Percent(Decimal);

impl Percent {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(points: Decimal) -> Result<Self, UnderwritingError> {
        if points >= Decimal::ZERO {
            Ok(Self(points))
        } else {
            Err(UnderwritingError::ValidationError(format!(
                "Percentage must not be negative, got {points}"
            )))
        }
    }

    /// Builds a percentage from a compile-time constant known to be non-negative.
    pub(crate) const fn from_points_unchecked(points: Decimal) -> Self {
        Self(points)
    }

    pub fn points(&self) -> Decimal {
        self.0
    }

    /// `150%` becomes `1.5`.
    pub fn as_fraction(&self) -> Decimal {
        self.0 / Decimal::ONE_HUNDRED
    }

    pub fn round_dp(self, dp: u32) -> Self {
        Self(self.0.round_dp(dp))
    }
}

impl TryFrom<Decimal> for Percent {
    type Error = UnderwritingError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Percent> for Decimal {
    fn from(percent: Percent) -> Self {
        percent.0
    }
}

impl Add for Percent {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

/// Scaling a percentage by a non-negative multiplier keeps it a percentage.
impl Mul<Decimal> for Percent {
    type Output = Self;
    fn mul(self, rhs: Decimal) -> Self::Output {
        Self((self.0 * rhs).max(Decimal::ZERO))
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}
