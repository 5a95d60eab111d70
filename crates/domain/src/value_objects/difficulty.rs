//! Difficulty tuning for procedural case generation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// How hard a generated case plays.
///
/// Difficulty scales the structure generator: more filler movement in the
/// timeline, more red herrings, more DNA contamination, and more shuffling of
/// the suspect order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    /// Filler movement events woven into the generated timeline.
    pub fn filler_events(self) -> usize {
        match self {
            Self::Easy => 3,
            Self::Medium => 5,
            Self::Hard => 8,
        }
    }

    /// Red-herring items scattered across the map.
    pub fn red_herrings(self) -> usize {
        match self {
            Self::Easy => 1,
            Self::Medium => 2,
            Self::Hard => 3,
        }
    }

    /// Chance per room of planting unrelated suspect DNA.
    pub fn contamination_chance(self) -> f64 {
        match self {
            Self::Easy => 0.0,
            Self::Medium => 0.15,
            Self::Hard => 0.3,
        }
    }

    /// Shuffle passes over the suspect order. Zero keeps the template order,
    /// which leaves the killer in a predictable slot.
    pub fn shuffle_passes(self) -> usize {
        match self {
            Self::Easy => 0,
            Self::Medium => 1,
            Self::Hard => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "medium" | "normal" => Ok(Self::Medium),
            "hard" | "expert" => Ok(Self::Hard),
            _ => Err(DomainError::parse(format!("Unknown difficulty: {s}"))),
        }
    }
}
