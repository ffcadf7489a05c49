//! Fixed-point amount type
//!
//! All monetary and quantity values are signed integers in units of 10⁻⁸.
//! Arithmetic is exact i128 integer arithmetic; `rust_decimal` handles
//! decimal strings at the boundary so no floating point is involved anywhere.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use std::str::FromStr;
use thiserror::Error;

/// Number of fractional decimal digits carried by an `Amount`.
pub const AMOUNT_SCALE: u32 = 8;

/// One whole unit expressed in base units (10⁸).
const UNIT: i128 = 100_000_000;

/// Basis-point divisor.
const BPS_DENOM: i128 = 10_000;

/// Amount parse failure. The only fallible operation on amounts.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("invalid amount: {0}")]
    Invalid(String),
}

/// Signed fixed-point amount in units of 10⁻⁸.
///
/// Multiplication carries price·quantity semantics: `(a·b) / 10⁸` with
/// truncation toward zero. Division is `(a·10⁸) / b`, also truncating.
/// Serialized as a fixed 8-decimal string to prevent JSON number precision
/// loss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(i128);

impl Amount {
    pub const ZERO: Amount = Amount(0);
    pub const ONE: Amount = Amount(UNIT);

    /// Construct from raw base units (10⁻⁸).
    pub const fn from_units(units: i128) -> Self {
        Self(units)
    }

    /// Construct from a whole-number value.
    pub const fn from_int(value: i64) -> Self {
        Self(value as i128 * UNIT)
    }

    /// Raw base units (10⁻⁸).
    pub const fn units(&self) -> i128 {
        self.0
    }

    /// Parse a decimal string.
    ///
    /// Rejects non-numeric input and any value not representable in 10⁻⁸
    /// units (i.e. more than 8 significant fractional digits).
    pub fn parse(s: &str) -> Result<Self, AmountError> {
        let d = Decimal::from_str(s.trim())
            .map_err(|e| AmountError::Invalid(format!("{s:?}: {e}")))?;
        let scale = d.scale();
        let mantissa = d.mantissa();
        if scale <= AMOUNT_SCALE {
            Ok(Self(mantissa * 10i128.pow(AMOUNT_SCALE - scale)))
        } else {
            let factor = 10i128.pow(scale - AMOUNT_SCALE);
            if mantissa % factor != 0 {
                return Err(AmountError::Invalid(format!(
                    "{s:?}: more than {AMOUNT_SCALE} fractional digits"
                )));
            }
            Ok(Self(mantissa / factor))
        }
    }

    /// Price·quantity multiplication: `(a·b) / 10⁸`, truncating toward zero.
    pub fn mul(&self, rhs: Amount) -> Amount {
        Amount((self.0 * rhs.0) / UNIT)
    }

    /// Division: `(a·10⁸) / b`, truncating toward zero.
    pub fn div(&self, rhs: Amount) -> Amount {
        assert!(rhs.0 != 0, "Division by zero");
        Amount((self.0 * UNIT) / rhs.0)
    }

    /// Basis-point multiplication: `(a·bps) / 10000`, truncating toward zero.
    pub fn mul_bps(&self, bps: i64) -> Amount {
        Amount((self.0 * bps as i128) / BPS_DENOM)
    }

    pub fn abs(&self) -> Amount {
        Amount(self.0.abs())
    }

    pub fn min(self, other: Amount) -> Amount {
        if self.0 <= other.0 { self } else { other }
    }

    pub fn max(self, other: Amount) -> Amount {
        if self.0 >= other.0 { self } else { other }
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Amount) -> Amount {
        Amount(self.0 + rhs.0)
    }
}

impl Sub for Amount {
    type Output = Amount;

    fn sub(self, rhs: Amount) -> Amount {
        Amount(self.0 - rhs.0)
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Amount) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Amount {
    fn sub_assign(&mut self, rhs: Amount) {
        self.0 -= rhs.0;
    }
}

impl Neg for Amount {
    type Output = Amount;

    fn neg(self) -> Amount {
        Amount(-self.0)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Amount::parse(s)
    }
}

// Fixed 8-decimal rendering, e.g. "10.50000000". Total for any i128 value.
impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(
            f,
            "{}{}.{:08}",
            sign,
            abs / UNIT as u128,
            abs % UNIT as u128
        )
    }
}

// Custom serialization to preserve precision
impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Amount::parse(&s).map_err(serde::de::Error::custom)
    }
}
