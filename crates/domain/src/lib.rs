//! Gumshoe domain: the case model, per-playthrough game state, and the
//! value objects both are built from.
//!
//! This crate is pure data and invariants. No I/O, no async, no randomness;
//! anything effectful lives in `gumshoe-engine`.

pub mod entities;
pub mod error;
pub mod ids;
pub mod value_objects;

pub use entities::{
    CaseDefinition, CaseSettings, CaseSkeleton, EndReason, EventKind, EvidenceBundle, GamePhase,
    GameState, Interactable, PlacedEvidence, PlacedEvidenceKind, PlayerStats, PointCosts,
    ResistanceLevel, Room, Secret, SecretTrigger, SkeletonSuspect, Solution, SuspectDefinition,
    TimelineEvent, Victim, VICTIM_ACTOR,
};
pub use error::DomainError;
pub use ids::{CaseId, GuildId, PlayerId, RoomId, SecretId, SuspectId};
pub use value_objects::{Composure, Difficulty, EvidenceRef};
