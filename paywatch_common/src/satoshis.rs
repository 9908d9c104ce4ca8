use std::fmt::Display;

use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

use crate::op;

/// Asset code recorded against native-chain value.
pub const NATIVE_ASSET: &str = "NATIVE";
/// Number of smallest units in one whole unit of the native currency (and of a non-divisible token).
pub const SATOSHIS_PER_UNIT: i64 = 100_000_000;

//--------------------------------------      Satoshis       ---------------------------------------------------------
/// An amount expressed in the native chain's smallest unit.
///
/// Token-layer quantities are normalised into the same unit so that native and token amounts can be compared.
#[derive(Debug, Clone, Copy, Default, Type, Ord, PartialOrd, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct Satoshis(i64);

op!(inplace Satoshis, AddAssign, add_assign);

#[derive(Debug, Clone, Error)]
#[error("Value cannot be represented in satoshis: {0}")]
pub struct SatoshiConversionError(String);

impl From<i64> for Satoshis {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl Display for Satoshis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.abs() < 10_000 {
            write!(f, "{} sat", self.0)
        } else {
            let units = self.0 as f64 / SATOSHIS_PER_UNIT as f64;
            write!(f, "{units:0.8}")
        }
    }
}

impl Satoshis {
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }

    /// Converts a count of whole units (e.g. a quantity of a non-divisible token) into smallest units.
    pub fn from_whole_units(units: i64) -> Result<Self, SatoshiConversionError> {
        units
            .checked_mul(SATOSHIS_PER_UNIT)
            .map(Self)
            .ok_or_else(|| SatoshiConversionError(format!("{units} whole units overflows the satoshi range")))
    }
}
