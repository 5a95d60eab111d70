//! Suspect composure: runtime resistance to revealing secrets.

use serde::{Deserialize, Serialize};

/// A suspect's composure, 0–100.
///
/// Composure only ever goes down. Nothing in a game restores it, which is
/// what makes sustained evidence pressure meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Composure(u8);

impl Composure {
    pub const FULL: Self = Self(100);

    /// Reconstruct from a persisted value, clamped into range.
    pub fn from_value(value: u8) -> Self {
        Self(value.min(100))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Apply pressure, saturating at zero.
    #[must_use]
    pub fn lose(self, amount: u8) -> Self {
        Self(self.0.saturating_sub(amount))
    }

    /// True once composure has dropped strictly below the threshold.
    pub fn broken_below(self, threshold: u8) -> bool {
        self.0 < threshold
    }
}

impl Default for Composure {
    fn default() -> Self {
        Self::FULL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loss_saturates_at_zero() {
        let c = Composure::from_value(10).lose(200);
        assert_eq!(c.value(), 0);
    }

    #[test]
    fn threshold_is_strict() {
        let c = Composure::from_value(40);
        assert!(!c.broken_below(40));
        assert!(c.broken_below(41));
    }

    #[test]
    fn persisted_values_are_clamped() {
        assert_eq!(Composure::from_value(250).value(), 100);
    }
}
