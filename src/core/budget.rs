// src/core/budget.rs — Fixed-point amounts and per-run budget state

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{Add, AddAssign, Sub};

/// Micro-units per whole budget unit.
pub const MICROS_PER_UNIT: i64 = 1_000_000;

/// Largest magnitude accepted from the wire, well inside `i64` after scaling.
const MAX_UNITS: f64 = 1.0e12;

/// A budget or cost amount, stored as integer micro-units.
///
/// All charging and ratio arithmetic happens on the integer value, so a run's
/// totals are exact and threshold comparisons never depend on binary
/// floating-point rounding. On the wire an `Amount` is a plain decimal number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(i64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    pub const fn from_micros(micros: i64) -> Self {
        Self(micros)
    }

    pub const fn micros(self) -> i64 {
        self.0
    }

    /// Convert a decimal unit value, rounding to the nearest micro-unit.
    /// Returns `None` for NaN, infinities and absurdly large magnitudes.
    pub fn from_units(units: f64) -> Option<Self> {
        if !units.is_finite() || units.abs() > MAX_UNITS {
            return None;
        }
        Some(Self((units * MICROS_PER_UNIT as f64).round() as i64))
    }

    pub fn as_units(self) -> f64 {
        self.0 as f64 / MICROS_PER_UNIT as f64
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub fn checked_sub(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_sub(rhs.0).map(Amount)
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Amount) -> Amount {
        Amount(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Amount) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl Sub for Amount {
    type Output = Amount;

    fn sub(self, rhs: Amount) -> Amount {
        Amount(self.0.saturating_sub(rhs.0))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = format!("{:.6}", self.as_units());
        let s = s.trim_end_matches('0').trim_end_matches('.');
        f.write_str(s)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_units())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let units = f64::deserialize(deserializer)?;
        Amount::from_units(units)
            .ok_or_else(|| serde::de::Error::custom(format!("amount out of range: {units}")))
    }
}

/// `remaining / total`, kept as an exact fraction.
///
/// Thresholds are given in basis points (1 000 = 0.10) and compared by
/// cross-multiplication. A non-positive total reads as an exhausted budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BudgetRatio {
    remaining: i128,
    total: i128,
}

impl BudgetRatio {
    pub fn new(remaining: Amount, total: Amount) -> Self {
        if !total.is_positive() {
            return Self {
                remaining: 0,
                total: 1,
            };
        }
        Self {
            remaining: remaining.micros().max(0) as i128,
            total: total.micros() as i128,
        }
    }

    /// `ratio < bps / 10_000`
    pub fn below(self, bps: u32) -> bool {
        self.remaining * 10_000 < self.total * bps as i128
    }

    /// `ratio >= bps / 10_000`
    pub fn at_least(self, bps: u32) -> bool {
        !self.below(bps)
    }

    pub fn as_f64(self) -> f64 {
        self.remaining as f64 / self.total as f64
    }
}

/// A charge that was refused because it exceeds what is left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChargeRefused {
    pub cost: Amount,
    pub remaining: Amount,
}

/// Budget for a single run. Created at run start and dropped with the result.
#[derive(Debug, Clone)]
pub struct BudgetState {
    total: Amount,
    remaining: Amount,
}

impl BudgetState {
    pub fn new(total: Amount) -> Self {
        Self {
            total,
            remaining: total,
        }
    }

    pub fn total(&self) -> Amount {
        self.total
    }

    pub fn remaining(&self) -> Amount {
        self.remaining
    }

    pub fn spent(&self) -> Amount {
        self.total - self.remaining
    }

    pub fn ratio(&self) -> BudgetRatio {
        BudgetRatio::new(self.remaining, self.total)
    }

    /// Debit `cost` if and only if `cost <= remaining`.
    pub fn charge(&mut self, cost: Amount) -> Result<Amount, ChargeRefused> {
        if cost > self.remaining {
            return Err(ChargeRefused {
                cost,
                remaining: self.remaining,
            });
        }
        self.remaining = self.remaining - cost;
        Ok(self.remaining)
    }

    pub fn is_exhausted(&self) -> bool {
        !self.remaining.is_positive()
    }
}
