//! The command surface the chat-platform layer drives the engine with.
//!
//! The transport adapter (Discord, test harness, anything else) parses its
//! own message format into a [`Command`] and hands the engine nothing but the
//! guild id, the player id, and these plain values.

use serde::{Deserialize, Serialize};

/// A player action, one variant per named command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    /// Start an investigation for the given case.
    Start {
        case_id: String,
        #[serde(default)]
        time_override_minutes: Option<u32>,
    },
    /// Current game status.
    Status,
    /// Join the running investigation.
    Join,
    /// Leave the running investigation.
    Leave,
    /// Run a DNA scan on a room.
    Dna { location: String },
    /// Pull camera footage for a timestamp.
    Footage { time: String },
    /// Pull digital logs for a timestamp.
    Logs { time: String },
    /// Search a room for physical evidence.
    Search { location: String },
    /// Examine an object in the player's current room.
    Examine { target: String },
    /// Present discovered evidence to a suspect.
    Present { evidence: String, suspect: String },
    /// Accuse a suspect.
    Accuse { suspect: String },
    /// List the suspects and what is known about them.
    Suspects,
    /// List the secrets revealed so far.
    Secrets,
    /// Command help text.
    Help,
    /// End the investigation early.
    End,
    /// Tear down any finished game state for the guild.
    Cleanup,
    /// Generate a new procedural case.
    Generate {
        #[serde(default)]
        theme: Option<String>,
        #[serde(default)]
        difficulty: Option<String>,
        #[serde(default)]
        seed: Option<String>,
    },
}

impl Command {
    /// The command's name as typed by players, for logs and usage errors.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Start { .. } => "start",
            Self::Status => "status",
            Self::Join => "join",
            Self::Leave => "leave",
            Self::Dna { .. } => "dna",
            Self::Footage { .. } => "footage",
            Self::Logs { .. } => "logs",
            Self::Search { .. } => "search",
            Self::Examine { .. } => "examine",
            Self::Present { .. } => "present",
            Self::Accuse { .. } => "accuse",
            Self::Suspects => "suspects",
            Self::Secrets => "secrets",
            Self::Help => "help",
            Self::End => "end",
            Self::Cleanup => "cleanup",
            Self::Generate { .. } => "generate",
        }
    }
}
