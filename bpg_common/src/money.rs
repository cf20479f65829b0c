use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, Mul, Neg, Sub, SubAssign},
};

use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

use crate::op;

pub const ILS_CURRENCY_CODE: &str = "ILS";
pub const ILS_CURRENCY_CODE_LOWER: &str = "ils";

//--------------------------------------       Money         ---------------------------------------------------------

/// A monetary amount in integer agorot (1 ILS = 100 agorot).
///
/// All amounts in the system are carried and stored in minor units, so monetary arithmetic is exact integer
/// arithmetic. The only place rounding can occur is [`Money::percentage_bps`], which rounds half-up.
#[derive(Debug, Clone, Copy, Default, Type, Ord, PartialOrd, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct Money(i64);

op!(binary Money, Add, add);
op!(binary Money, Sub, sub);
op!(inplace Money, SubAssign, sub_assign);
op!(unary Money, Neg, neg);

impl Mul<i64> for Money {
    type Output = Self;

    fn mul(self, rhs: i64) -> Self::Output {
        Self::from(self.value() * rhs)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

#[derive(Debug, Clone, Error)]
#[error("Value cannot be represented in agorot: {0}")]
pub struct MoneyConversionError(String);

impl From<i64> for Money {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl PartialEq for Money {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for Money {}

impl TryFrom<u64> for Money {
    type Error = MoneyConversionError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        if value > i64::MAX as u64 {
            Err(MoneyConversionError(format!("Value {} is too large to convert to Money", value)))
        } else {
            #[allow(clippy::cast_possible_wrap)]
            Ok(Self(value as i64))
        }
    }
}

impl Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let agorot = self.0.unsigned_abs();
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{sign}₪{}.{:02}", agorot / 100, agorot % 100)
    }
}

impl Money {
    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn from_ils(ils: i64) -> Self {
        Self(ils * 100)
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Applies a rate given in basis points (1 bps = 0.01%), rounding half-up.
    ///
    /// Half-up means 62.5 agorot becomes 63. This is the single rounding rule for fee calculations; keep every
    /// percentage computation on this method so quotes and charges cannot drift apart.
    pub fn percentage_bps(&self, bps: i64) -> Self {
        Self((self.0 * bps + 5_000).div_euclid(10_000))
    }
}
