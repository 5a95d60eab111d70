//! Suspect definitions: personas, secrets, and what unlocks them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ids::{RoomId, SecretId, SuspectId};

/// An interrogable suspect as authored in the case document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuspectDefinition {
    pub id: SuspectId,
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(rename = "isGuilty", default)]
    pub is_guilty: bool,
    #[serde(rename = "isAccomplice", default)]
    pub is_accomplice: bool,
    #[serde(rename = "isSilentWitness", default)]
    pub is_silent_witness: bool,
    #[serde(default)]
    pub alibi: String,
    #[serde(default)]
    pub motive: String,
    #[serde(default)]
    pub traits: Vec<String>,
    #[serde(rename = "currentLocation")]
    pub current_location: RoomId,
    #[serde(rename = "resistance_level", default)]
    pub resistance: ResistanceLevel,
    #[serde(default)]
    pub secrets: Vec<Secret>,
}

impl SuspectDefinition {
    pub fn secret(&self, id: &SecretId) -> Option<&Secret> {
        self.secrets.iter().find(|s| &s.id == id)
    }
}

/// How hard a suspect is to crack. Sets the defensiveness baseline and
/// scales composure loss under pressure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ResistanceLevel {
    Low,
    #[default]
    Moderate,
    High,
    Expert,
}

impl ResistanceLevel {
    /// Fixed defensiveness floor for this resistance level.
    pub fn baseline_defensiveness(self) -> u8 {
        match self {
            Self::Low => 20,
            Self::Moderate => 40,
            Self::High => 60,
            Self::Expert => 80,
        }
    }

    /// Divisor applied to incoming pressure. Tougher suspects shrug more off.
    pub fn pressure_divisor(self) -> u8 {
        match self {
            Self::Low => 1,
            Self::Moderate => 2,
            Self::High => 3,
            Self::Expert => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::High => "high",
            Self::Expert => "expert",
        }
    }
}

impl fmt::Display for ResistanceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResistanceLevel {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "moderate" => Ok(Self::Moderate),
            "high" => Ok(Self::High),
            "expert" => Ok(Self::Expert),
            _ => Err(DomainError::parse(format!(
                "Unknown resistance level: {s}"
            ))),
        }
    }
}

/// Something a suspect is hiding.
///
/// Revealed at most once per game; once out, it never re-hides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Secret {
    pub id: SecretId,
    pub text: String,
    #[serde(default)]
    pub trigger: SecretTrigger,
}

/// The conditions under which a secret comes out.
///
/// All populated conditions must hold: composure below `min_pressure`,
/// every `requires_evidence` ref discovered, every `requires_secrets`
/// prerequisite already revealed. `keywords` make presented evidence count
/// as relevant even without a direct evidence match.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SecretTrigger {
    #[serde(rename = "requiresEvidence", default)]
    pub requires_evidence: Vec<String>,
    #[serde(rename = "requiresSecrets", default)]
    pub requires_secrets: Vec<SecretId>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(rename = "minPressure", default = "default_min_pressure")]
    pub min_pressure: u8,
}

fn default_min_pressure() -> u8 {
    100
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resistance_scales_monotonically() {
        assert!(
            ResistanceLevel::Low.baseline_defensiveness()
                < ResistanceLevel::Expert.baseline_defensiveness()
        );
        assert!(
            ResistanceLevel::Low.pressure_divisor() < ResistanceLevel::Expert.pressure_divisor()
        );
    }

    #[test]
    fn trigger_default_gate_opens_on_first_composure_loss() {
        // min_pressure 100: reveal is gated only by the discovery
        // requirements once composure has dropped below full.
        let trigger = SecretTrigger::default();
        assert!(trigger.requires_evidence.is_empty());
        let parsed: SecretTrigger = serde_json::from_str("{}").expect("deserialize");
        assert_eq!(parsed.min_pressure, 100);
    }

    #[test]
    fn suspect_deserializes_with_sparse_fields() {
        let json = r#"{
            "id": "gardener",
            "name": "Old Tom",
            "currentLocation": "garden",
            "resistance_level": "expert",
            "secrets": [{"id": "s1", "text": "I saw them.", "trigger": {"minPressure": 60}}]
        }"#;
        let suspect: SuspectDefinition = serde_json::from_str(json).expect("deserialize");
        assert_eq!(suspect.resistance, ResistanceLevel::Expert);
        assert!(!suspect.is_guilty);
        assert_eq!(suspect.secrets[0].trigger.min_pressure, 60);
    }
}
