pub mod case;
pub mod game_state;
pub mod skeleton;
pub mod suspect;

pub use case::{
    CaseDefinition, CaseSettings, EvidenceBundle, Interactable, PointCosts, Room, Solution, Victim,
};
pub use game_state::{EndReason, GamePhase, GameState, PlayerStats};
pub use skeleton::{
    CaseSkeleton, EventKind, PlacedEvidence, PlacedEvidenceKind, SkeletonSuspect, TimelineEvent,
    VICTIM_ACTOR,
};
pub use suspect::{ResistanceLevel, Secret, SecretTrigger, SuspectDefinition};
