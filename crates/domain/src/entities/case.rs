//! The immutable case definition.
//!
//! A case document is authored (or generated) once and never mutated by play;
//! all per-playthrough state lives in [`crate::entities::game_state::GameState`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::entities::suspect::SuspectDefinition;
use crate::ids::{CaseId, RoomId, SuspectId};
use crate::value_objects::difficulty::Difficulty;

/// A complete murder mystery case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseDefinition {
    pub id: CaseId,
    pub name: String,
    pub description: String,
    pub victim: Victim,
    #[serde(rename = "murderTime")]
    pub murder_time: String,
    #[serde(rename = "murderLocation")]
    pub murder_location: RoomId,
    pub map: BTreeMap<RoomId, Room>,
    pub suspects: Vec<SuspectDefinition>,
    #[serde(default)]
    pub evidence: EvidenceBundle,
    pub solution: Solution,
    #[serde(default)]
    pub settings: CaseSettings,
}

impl CaseDefinition {
    pub fn suspect(&self, id: &SuspectId) -> Option<&SuspectDefinition> {
        self.suspects.iter().find(|s| &s.id == id)
    }

    pub fn killer(&self) -> Option<&SuspectDefinition> {
        self.suspect(&self.solution.killer)
    }

    pub fn suspect_ids(&self) -> Vec<SuspectId> {
        self.suspects.iter().map(|s| s.id.clone()).collect()
    }

    /// Resolve a suspect by id, name, or alias (case-insensitive).
    pub fn find_suspect(&self, query: &str) -> Option<&SuspectDefinition> {
        let q = query.trim().to_lowercase();
        self.suspects.iter().find(|s| {
            s.id.as_str().to_lowercase() == q
                || s.name.to_lowercase() == q
                || s.aliases.iter().any(|a| a.to_lowercase() == q)
        })
    }

    pub fn has_room(&self, room: &RoomId) -> bool {
        self.map.contains_key(room)
    }
}

/// The murder victim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Victim {
    pub name: String,
    #[serde(default)]
    pub id: Option<String>,
    pub cause: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub avatar: Option<String>,
}

/// A room on the case map.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Room {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub connects_to: Vec<RoomId>,
    #[serde(default)]
    pub interactables: Vec<Interactable>,
}

/// An object players can `examine` inside a room.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interactable {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Physical evidence granted when examined, if any.
    #[serde(default)]
    pub evidence_id: Option<String>,
}

/// Everything discoverable through the investigation tools.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvidenceBundle {
    /// room -> DNA profiles found there (suspect ids or the victim)
    #[serde(default)]
    pub dna: BTreeMap<RoomId, Vec<String>>,
    /// time -> log text
    #[serde(default)]
    pub digital_logs: BTreeMap<String, String>,
    /// time -> camera footage text
    #[serde(default)]
    pub footage: BTreeMap<String, String>,
    /// suspect -> time -> room
    #[serde(default)]
    pub locations: BTreeMap<SuspectId, BTreeMap<String, RoomId>>,
    /// item id -> description
    #[serde(default)]
    pub physical_evidence: BTreeMap<String, String>,
    /// room -> item ids discoverable by searching it
    #[serde(default)]
    pub physical_discovery: BTreeMap<RoomId, Vec<String>>,
    /// suspect -> what they first told the police
    #[serde(default)]
    pub initial_police_statements: BTreeMap<SuspectId, String>,
}

/// Who did it, and how the case knows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Solution {
    pub killer: SuspectId,
    #[serde(default)]
    pub accomplice: Option<SuspectId>,
    #[serde(default)]
    pub silent_witness: Option<SuspectId>,
    #[serde(default)]
    pub motive: Option<String>,
    #[serde(default)]
    pub weapon: Option<String>,
    #[serde(default)]
    pub key_evidence: Vec<String>,
}

/// Per-case play settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseSettings {
    /// Minutes until the investigation times out.
    #[serde(rename = "timeLimit", default = "default_time_limit")]
    pub time_limit_minutes: u32,
    #[serde(rename = "startingPoints", default = "default_starting_points")]
    pub starting_points: u32,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub point_costs: PointCosts,
}

fn default_time_limit() -> u32 {
    30
}

fn default_starting_points() -> u32 {
    100
}

impl Default for CaseSettings {
    fn default() -> Self {
        Self {
            time_limit_minutes: default_time_limit(),
            starting_points: default_starting_points(),
            difficulty: Difficulty::default(),
            point_costs: PointCosts::default(),
        }
    }
}

/// What each investigation tool costs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PointCosts {
    #[serde(default = "default_dna_cost")]
    pub dna: u32,
    #[serde(default = "default_footage_cost")]
    pub footage: u32,
    #[serde(default = "default_logs_cost")]
    pub logs: u32,
    #[serde(default = "default_search_cost")]
    pub search: u32,
    #[serde(default = "default_examine_cost")]
    pub examine: u32,
}

fn default_dna_cost() -> u32 {
    20
}

fn default_footage_cost() -> u32 {
    15
}

fn default_logs_cost() -> u32 {
    10
}

fn default_search_cost() -> u32 {
    15
}

fn default_examine_cost() -> u32 {
    5
}

impl Default for PointCosts {
    fn default() -> Self {
        Self {
            dna: default_dna_cost(),
            footage: default_footage_cost(),
            logs: default_logs_cost(),
            search: default_search_cost(),
            examine: default_examine_cost(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_case_deserializes_with_defaults() {
        let json = r#"{
            "id": "test_case",
            "name": "Test Case",
            "description": "A test.",
            "victim": {"name": "Lord Blackwood", "cause": "poison"},
            "murderTime": "22:00",
            "murderLocation": "study",
            "map": {
                "study": {"description": "Dark.", "connects_to": ["hall"]},
                "hall": {"description": "Long.", "connects_to": ["study"]}
            },
            "suspects": [],
            "solution": {"killer": "butler"}
        }"#;
        let case: CaseDefinition = serde_json::from_str(json).expect("deserialize");
        assert_eq!(case.settings.time_limit_minutes, 30);
        assert_eq!(case.settings.starting_points, 100);
        assert_eq!(case.settings.point_costs.dna, 20);
        assert!(case.evidence.dna.is_empty());
        assert!(case.has_room(&RoomId::new("study")));
    }

    #[test]
    fn find_suspect_matches_aliases_case_insensitively() {
        let json = r#"{
            "id": "c", "name": "C", "description": "",
            "victim": {"name": "V", "cause": "x"},
            "murderTime": "22:00", "murderLocation": "study",
            "map": {"study": {"description": "", "connects_to": []}},
            "suspects": [{
                "id": "butler", "name": "Mr. Jenkins",
                "aliases": ["the butler"], "isGuilty": true,
                "currentLocation": "study"
            }],
            "solution": {"killer": "butler"}
        }"#;
        let case: CaseDefinition = serde_json::from_str(json).expect("deserialize");
        assert!(case.find_suspect("The Butler").is_some());
        assert!(case.find_suspect("MR. JENKINS").is_some());
        assert!(case.find_suspect("gardener").is_none());
    }
}
