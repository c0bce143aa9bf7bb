//! Money amounts.
//!
//! Amounts are fixed-point integers in the smallest currency unit (paise for
//! INR) to avoid floating-point errors in fee computation.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::Percent;

/// A non-negative amount of money in minor units.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Amount(u64);

impl Amount {
    pub const ZERO: Self = Self(0);

    pub fn new(minor: u64) -> Self {
        Self(minor)
    }

    pub fn minor(&self) -> u64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    pub fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    pub fn saturating_mul(self, factor: u64) -> Self {
        Self(self.0.saturating_mul(factor))
    }

    /// The given share of this amount, truncated to whole minor units.
    pub fn percent_of(self, pct: Percent) -> Self {
        let share = (self.0 as u128) * (pct.basis_points() as u128) / 10_000;
        Self(u64::try_from(share).unwrap_or(u64::MAX))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
