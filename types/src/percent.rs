//! Percentages for discounts and taxes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A non-negative percentage stored as basis points (1/100 of a percent).
///
/// On the wire a percentage is a plain decimal number (`18` or `12.5`).
/// Negative, NaN and infinite inputs clamp to zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct Percent(u32);

impl Percent {
    pub const ZERO: Self = Self(0);
    pub const HUNDRED: Self = Self(10_000);

    pub fn from_basis_points(bps: u32) -> Self {
        Self(bps)
    }

    pub fn from_percent(pct: f64) -> Self {
        if !pct.is_finite() || pct <= 0.0 {
            return Self::ZERO;
        }
        let bps = (pct * 100.0).round();
        if bps >= u32::MAX as f64 {
            Self(u32::MAX)
        } else {
            Self(bps as u32)
        }
    }

    pub fn basis_points(&self) -> u32 {
        self.0
    }

    pub fn as_percent(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Clamp to at most 100%.
    pub fn capped(self) -> Self {
        self.min(Self::HUNDRED)
    }
}

impl From<f64> for Percent {
    fn from(pct: f64) -> Self {
        Self::from_percent(pct)
    }
}

impl From<Percent> for f64 {
    fn from(pct: Percent) -> Self {
        pct.as_percent()
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.as_percent())
    }
}
