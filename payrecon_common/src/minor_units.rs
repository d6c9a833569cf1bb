use std::fmt::Display;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The minor-unit factor for every currency the storefront currently sells in (fils, cents).
pub const DEFAULT_MINOR_UNIT_FACTOR: u32 = 100;

//--------------------------------------     MinorUnits       ---------------------------------------------------------
/// An amount as reported by the payment gateway, i.e. an integer count of the currency's smallest unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MinorUnits(i64);

impl From<i64> for MinorUnits {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl Display for MinorUnits {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}¢", self.0)
    }
}

impl MinorUnits {
    pub fn value(&self) -> i64 {
        self.0
    }

    /// Converts the amount to a major-unit decimal, e.g. `3500` with a factor of 100 becomes `35.00`.
    ///
    /// When the factor is a power of ten the result keeps the matching number of decimal places, so that the
    /// stored value reads the way the gateway's dashboard does. A factor of zero is treated as one.
    pub fn to_major(&self, factor: u32) -> Decimal {
        let factor = factor.max(1);
        match decimal_places(factor) {
            Some(scale) => Decimal::new(self.0, scale),
            None => Decimal::from(self.0) / Decimal::from(factor),
        }
    }
}

/// Returns `Some(n)` if `factor == 10^n`
fn decimal_places(factor: u32) -> Option<u32> {
    let mut f = factor;
    let mut places = 0;
    while f > 1 && f % 10 == 0 {
        f /= 10;
        places += 1;
    }
    (f == 1).then_some(places)
}
