//! The raw structural output of the generator, before narrative enrichment.
//!
//! Everything here uses ordered collections so that a skeleton serializes
//! byte-identically for a given seed.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::ids::{RoomId, SuspectId};
use crate::value_objects::difficulty::Difficulty;

/// Actor id used for the victim in timelines and DNA tables.
pub const VICTIM_ACTOR: &str = "victim";

/// A procedurally generated case structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseSkeleton {
    pub seed: String,
    pub difficulty: Difficulty,
    pub theme: String,
    pub template_name: String,
    pub victim_role: String,
    pub weapon: String,
    pub motive: String,
    pub murder_room: RoomId,
    pub murder_time: String,
    pub flee_room: RoomId,
    /// room -> connected rooms (symmetric by construction)
    pub rooms: BTreeMap<RoomId, Vec<RoomId>>,
    /// Ordered suspect slots; exactly one has `is_killer`.
    pub suspects: Vec<SkeletonSuspect>,
    /// Chronologically sorted events.
    pub timeline: Vec<TimelineEvent>,
    /// Physical evidence placements (weapon + red herrings).
    pub evidence: Vec<PlacedEvidence>,
    /// room -> actor ids whose DNA is present.
    pub dna: BTreeMap<RoomId, BTreeSet<String>>,
}

impl CaseSkeleton {
    pub fn killer(&self) -> Option<&SkeletonSuspect> {
        self.suspects.iter().find(|s| s.is_killer)
    }
}

/// A suspect slot before narrative enrichment gives it a persona.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkeletonSuspect {
    pub id: SuspectId,
    pub role: String,
    pub is_killer: bool,
    /// Where the suspect stands when the investigation opens.
    pub starting_room: RoomId,
}

/// One event on the synthesized timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEvent {
    /// Minutes after the evening begins.
    pub at: u32,
    /// Suspect id, or [`VICTIM_ACTOR`].
    pub actor: String,
    pub room: RoomId,
    pub kind: EventKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventKind {
    /// Initial placement at the start of the evening.
    Placement,
    /// Filler movement between rooms.
    Movement,
    /// The murder itself.
    Kill { weapon: String },
    /// The killer leaving the scene.
    Flee,
}

/// A physical item planted on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedEvidence {
    pub id: String,
    pub room: RoomId,
    pub label: String,
    pub kind: PlacedEvidenceKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacedEvidenceKind {
    Weapon,
    RedHerring,
}
