//! WebSocket message types for the dashboard connection.
//!
//! The dashboard is a passive observer: it subscribes to a guild and receives
//! a fresh [`DashboardState`] on every material state change. Unknown client
//! variants deserialize to `Unknown` so an older engine tolerates a newer
//! dashboard.

use serde::{Deserialize, Serialize};

use gumshoe_domain::{EndReason, GamePhase};

/// Messages from the dashboard to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Watch a guild's game.
    Subscribe { guild_id: String },
    /// Heartbeat ping.
    Heartbeat,
    /// Forward compatibility for newer dashboards.
    #[serde(other)]
    Unknown,
}

/// Messages from the engine to the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Full game snapshot, pushed on every material change.
    GameState {
        guild_id: String,
        state: DashboardState,
    },
    /// Terminal notification for a finished game.
    GameEnded {
        guild_id: String,
        reason: EndReason,
        #[serde(default)]
        accused: Option<String>,
        #[serde(default)]
        correct: Option<bool>,
    },
    Pong,
    Error {
        code: String,
        message: String,
    },
}

/// The passive state object the dashboard renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardState {
    pub case_id: String,
    pub case_name: String,
    pub phase: GamePhase,
    pub time_remaining_secs: i64,
    pub points: u32,
    pub participant_count: usize,
    pub suspects: Vec<SuspectView>,
    pub discovered_evidence: Vec<String>,
}

/// Per-suspect psych readout for the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuspectView {
    pub id: String,
    pub name: String,
    pub composure: u8,
    pub defensiveness: u8,
    pub busy: bool,
    pub secrets_revealed: usize,
    pub secrets_total: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_client_variants_do_not_fail_deserialization() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type": "telemetry_opt_in"}"#).expect("deserialize");
        assert_eq!(msg, ClientMessage::Unknown);
    }

    #[test]
    fn server_messages_tag_by_type() {
        let msg = ServerMessage::GameEnded {
            guild_id: "g1".into(),
            reason: EndReason::Timeout,
            accused: None,
            correct: None,
        };
        let json = serde_json::to_string(&msg).expect("serialize");
        assert!(json.contains("\"type\":\"game_ended\""));
    }
}
