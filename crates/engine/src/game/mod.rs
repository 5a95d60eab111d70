//! Runtime game logic: the per-guild registry, the game state machine, and
//! the suspect and hint engines.

pub mod hints;
pub mod manager;
pub mod registry;
pub mod suspect;

pub use hints::{HintEngine, HintRule};
pub use manager::{AccuseOutcome, EndSummary, GameManager, PresentationTicket};
pub use registry::{GameRegistry, SharedGame};
pub use suspect::Suspect;
