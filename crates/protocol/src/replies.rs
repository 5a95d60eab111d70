//! Engine replies to player commands.
//!
//! Every expected failure is a distinct [`RejectReason`] with its own
//! human-readable message; the chat layer renders these verbatim. A generic
//! "error occurred" never comes out of the engine for an expected condition.

use serde::{Deserialize, Serialize};

use gumshoe_domain::EndReason;

/// Outcome of dispatching a [`crate::Command`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Reply {
    Started {
        case_id: String,
        case_name: String,
        time_limit_minutes: u32,
        points: u32,
    },
    StatusReport {
        state: crate::DashboardState,
    },
    Joined {
        participant_count: usize,
    },
    Left {
        participant_count: usize,
    },
    /// A single evidence record revealed by dna/footage/logs/examine.
    EvidenceRevealed {
        id: String,
        text: String,
        cost: u32,
        points_remaining: u32,
        #[serde(default)]
        hint: Option<String>,
    },
    /// Items turned up by searching a room.
    SearchResults {
        location: String,
        items: Vec<FoundItem>,
        cost: u32,
        points_remaining: u32,
        #[serde(default)]
        hint: Option<String>,
    },
    /// A suspect's reaction to presented evidence.
    SuspectResponse {
        suspect_id: String,
        suspect_name: String,
        dialogue: String,
        composure: u8,
        revealed_secrets: Vec<RevealedSecret>,
    },
    AccusationRecorded {
        accused_id: String,
        votes: usize,
        quorum: usize,
    },
    /// The vote concluded; the game is over.
    VoteResolved {
        accused_id: String,
        accused_name: String,
        correct: bool,
        killer_id: String,
        killer_name: String,
        #[serde(default)]
        motive: Option<String>,
    },
    SuspectList {
        suspects: Vec<SuspectSummary>,
    },
    SecretsList {
        secrets: Vec<RevealedSecret>,
    },
    HelpText {
        text: String,
    },
    Ended {
        reason: EndReason,
    },
    CleanedUp,
    Generated {
        case_id: String,
        score: u8,
        issues: Vec<String>,
    },
    Rejected {
        reason: RejectReason,
    },
}

impl Reply {
    pub fn rejected(reason: RejectReason) -> Self {
        Self::Rejected { reason }
    }
}

/// A physical item found by `search`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoundItem {
    pub id: String,
    pub description: String,
}

/// A secret a suspect has given up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevealedSecret {
    pub suspect_id: String,
    pub secret_id: String,
    pub text: String,
}

/// One line of the `suspects` listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuspectSummary {
    pub id: String,
    pub name: String,
    pub location: String,
    #[serde(default)]
    pub police_statement: Option<String>,
}

/// Why a command was refused. Each variant renders a specific message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum RejectReason {
    #[error("There is no active investigation in this server. Start one with `start`.")]
    NoActiveGame,
    #[error("An investigation of case '{case_id}' is already running.")]
    GameAlreadyRunning { case_id: String },
    #[error("You have not joined this investigation. Use `join` first.")]
    NotAParticipant,
    #[error("You have already joined this investigation.")]
    AlreadyJoined,
    #[error("The investigation is over; this action is only available while investigating.")]
    WrongPhase { phase: String },
    #[error("Not enough points: that costs {needed}, you have {available}.")]
    InsufficientPoints { needed: u32, available: u32 },
    #[error("No room called '{location}' exists in this case.")]
    UnknownLocation { location: String },
    #[error("The {tool} turned up nothing for '{query}'.")]
    NothingFound { tool: String, query: String },
    #[error("No suspect matches '{query}'.")]
    UnknownSuspect { query: String },
    #[error("{suspect} is in the {location}; you have to confront them where they are.")]
    SuspectNotPresent { suspect: String, location: String },
    #[error("{suspect} is already being questioned. Wait for them to finish.")]
    SuspectBusy { suspect: String },
    #[error("You haven't discovered any evidence matching '{query}'.")]
    EvidenceNotFound { query: String },
    #[error("'{query}' matches more than one piece of evidence; be more specific.")]
    AmbiguousEvidence { query: String, matches: Vec<String> },
    #[error("You have already cast your accusation; it cannot be changed.")]
    AlreadyAccused,
    #[error("No case '{case_id}' exists.")]
    CaseNotFound { case_id: String },
    #[error("Case '{case_id}' failed validation and cannot be played.")]
    CaseInvalid { case_id: String, issues: Vec<String> },
    #[error("There is nothing called '{target}' to examine here.")]
    NothingToExamine { target: String },
    #[error("The investigation is still running; end it before cleaning up.")]
    GameStillRunning,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reject_reasons_render_specific_messages() {
        let a = RejectReason::InsufficientPoints {
            needed: 20,
            available: 5,
        };
        let b = RejectReason::NoActiveGame;
        assert!(a.to_string().contains("costs 20"));
        assert_ne!(a.to_string(), b.to_string());
    }

    #[test]
    fn replies_round_trip_through_json() {
        let reply = Reply::rejected(RejectReason::AmbiguousEvidence {
            query: "knife".into(),
            matches: vec!["bloody_knife".into(), "butter_knife".into()],
        });
        let json = serde_json::to_string(&reply).expect("serialize");
        let back: Reply = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, reply);
    }
}
