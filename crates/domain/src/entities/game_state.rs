//! Mutable per-playthrough state.
//!
//! One `GameState` exists per active investigation. Its discovered sets only
//! grow, its points only shrink, and its phase only moves forward; the API
//! here enforces all three.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ids::{CaseId, PlayerId, RoomId, SuspectId};

/// Investigation phase. Transitions are linear and non-reversible:
/// `Investigating -> Accused -> Ended`, or `Investigating -> Ended` directly
/// on timeout or manual end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    Investigating,
    Accused,
    Ended,
}

impl GamePhase {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Investigating => "investigating",
            Self::Accused => "accused",
            Self::Ended => "ended",
        }
    }
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GamePhase {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "investigating" => Ok(Self::Investigating),
            "accused" => Ok(Self::Accused),
            "ended" => Ok(Self::Ended),
            _ => Err(DomainError::parse(format!("Unknown game phase: {s}"))),
        }
    }
}

/// Why a game finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// The accusation quorum was reached and the vote resolved.
    Verdict,
    /// The countdown expired.
    Timeout,
    /// A player ended the game early.
    Manual,
}

/// Per-player bookkeeping.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PlayerStats {
    pub tools_used: u32,
    pub evidence_found: u32,
    pub secrets_revealed: u32,
}

/// The mutable state of one investigation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub case_id: CaseId,
    pub started_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    phase: GamePhase,
    points: u32,
    participants: BTreeSet<PlayerId>,
    discovered_evidence: BTreeSet<String>,
    discovered_locations: BTreeSet<RoomId>,
    /// Accusations in cast order; at most one per player, immutable once set.
    accusations: Vec<(PlayerId, SuspectId)>,
    /// Where each player currently stands. Updated by the on-site tools
    /// (search, dna, examine); gates `present`.
    player_rooms: BTreeMap<PlayerId, RoomId>,
    player_stats: BTreeMap<PlayerId, PlayerStats>,
    used_tools: Vec<String>,
}

impl GameState {
    pub fn new(
        case_id: CaseId,
        now: DateTime<Utc>,
        time_limit_minutes: u32,
        starting_points: u32,
        initiator: PlayerId,
    ) -> Self {
        let mut participants = BTreeSet::new();
        participants.insert(initiator);
        Self {
            case_id,
            started_at: now,
            ends_at: now + Duration::minutes(i64::from(time_limit_minutes)),
            phase: GamePhase::Investigating,
            points: starting_points,
            participants,
            discovered_evidence: BTreeSet::new(),
            discovered_locations: BTreeSet::new(),
            accusations: Vec::new(),
            player_rooms: BTreeMap::new(),
            player_stats: BTreeMap::new(),
            used_tools: Vec::new(),
        }
    }

    /// Reconstruct from a persisted row. Sets not covered by the row
    /// (discoveries, accusations) restart empty; the row is a crash-recovery
    /// cache, not a full journal.
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        case_id: CaseId,
        started_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
        phase: GamePhase,
        points: u32,
        participants: BTreeSet<PlayerId>,
        discovered_evidence: BTreeSet<String>,
        used_tools: Vec<String>,
    ) -> Self {
        Self {
            case_id,
            started_at,
            ends_at,
            phase,
            points,
            participants,
            discovered_evidence,
            discovered_locations: BTreeSet::new(),
            accusations: Vec::new(),
            player_rooms: BTreeMap::new(),
            player_stats: BTreeMap::new(),
            used_tools,
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn points(&self) -> u32 {
        self.points
    }

    pub fn participants(&self) -> &BTreeSet<PlayerId> {
        &self.participants
    }

    pub fn is_participant(&self, player: &PlayerId) -> bool {
        self.participants.contains(player)
    }

    pub fn discovered_evidence(&self) -> &BTreeSet<String> {
        &self.discovered_evidence
    }

    pub fn discovered_locations(&self) -> &BTreeSet<RoomId> {
        &self.discovered_locations
    }

    pub fn used_tools(&self) -> &[String] {
        &self.used_tools
    }

    pub fn stats(&self, player: &PlayerId) -> PlayerStats {
        self.player_stats.get(player).copied().unwrap_or_default()
    }

    pub fn stats_mut(&mut self, player: &PlayerId) -> &mut PlayerStats {
        self.player_stats.entry(player.clone()).or_default()
    }

    pub fn time_remaining(&self, now: DateTime<Utc>) -> Duration {
        (self.ends_at - now).max(Duration::zero())
    }

    // --- membership ---

    pub fn join(&mut self, player: PlayerId) -> Result<(), DomainError> {
        if !self.participants.insert(player.clone()) {
            return Err(DomainError::constraint(format!(
                "player {player} already joined"
            )));
        }
        Ok(())
    }

    pub fn leave(&mut self, player: &PlayerId) -> Result<(), DomainError> {
        if !self.participants.remove(player) {
            return Err(DomainError::constraint(format!(
                "player {player} is not a participant"
            )));
        }
        Ok(())
    }

    // --- points & discoveries ---

    pub fn can_afford(&self, cost: u32) -> bool {
        self.points >= cost
    }

    /// Deduct `cost` from the balance. Callers check affordability first;
    /// a shortfall here is a caller bug surfaced as a constraint error.
    pub fn spend(&mut self, cost: u32) -> Result<(), DomainError> {
        if self.points < cost {
            return Err(DomainError::constraint(format!(
                "insufficient points: need {cost}, have {}",
                self.points
            )));
        }
        self.points -= cost;
        Ok(())
    }

    /// Record a discovered evidence id. Returns true if it was new.
    pub fn record_evidence(&mut self, id: impl Into<String>) -> bool {
        self.discovered_evidence.insert(id.into())
    }

    pub fn has_evidence(&self, id: &str) -> bool {
        self.discovered_evidence.contains(id)
    }

    pub fn record_location(&mut self, room: RoomId) -> bool {
        self.discovered_locations.insert(room)
    }

    pub fn record_tool_use(&mut self, tool: impl Into<String>) {
        self.used_tools.push(tool.into());
    }

    /// The room a player last worked in, if they have gone anywhere yet.
    pub fn room_of(&self, player: &PlayerId) -> Option<&RoomId> {
        self.player_rooms.get(player)
    }

    pub fn move_player(&mut self, player: PlayerId, room: RoomId) {
        self.player_rooms.insert(player, room);
    }

    // --- accusations ---

    /// Accusations needed to conclude the vote: ceil(participants / 2).
    pub fn quorum(&self) -> usize {
        self.participants.len().div_ceil(2)
    }

    pub fn accusation_count(&self) -> usize {
        self.accusations.len()
    }

    pub fn accusation_of(&self, player: &PlayerId) -> Option<&SuspectId> {
        self.accusations
            .iter()
            .find(|(p, _)| p == player)
            .map(|(_, s)| s)
    }

    /// Cast an accusation. One per player, immutable once set.
    pub fn record_accusation(
        &mut self,
        player: PlayerId,
        suspect: SuspectId,
    ) -> Result<(), DomainError> {
        if self.accusation_of(&player).is_some() {
            return Err(DomainError::constraint(format!(
                "player {player} has already accused"
            )));
        }
        self.accusations.push((player, suspect));
        Ok(())
    }

    /// The majority-voted suspect, with ties broken by earliest accusation.
    /// None while no accusation has been cast.
    pub fn leading_accusation(&self) -> Option<SuspectId> {
        let mut counts: Vec<(SuspectId, usize)> = Vec::new();
        for (_, suspect) in &self.accusations {
            match counts.iter_mut().find(|(s, _)| s == suspect) {
                Some((_, n)) => *n += 1,
                None => counts.push((suspect.clone(), 1)),
            }
        }
        counts
            .into_iter()
            .max_by_key(|(_, n)| *n)
            .map(|(s, _)| s)
    }

    // --- phase ---

    /// Advance the phase. Only forward transitions are legal.
    pub fn transition(&mut self, next: GamePhase) -> Result<(), DomainError> {
        let ok = matches!(
            (self.phase, next),
            (GamePhase::Investigating, GamePhase::Accused)
                | (GamePhase::Investigating, GamePhase::Ended)
                | (GamePhase::Accused, GamePhase::Ended)
        );
        if !ok {
            return Err(DomainError::invalid_state_transition(format!(
                "{} -> {}",
                self.phase, next
            )));
        }
        self.phase = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh() -> GameState {
        GameState::new(
            CaseId::new("test_case"),
            Utc::now(),
            10,
            100,
            PlayerId::new("p1"),
        )
    }

    #[test]
    fn initiator_is_first_participant() {
        let state = fresh();
        assert!(state.is_participant(&PlayerId::new("p1")));
        assert_eq!(state.participants().len(), 1);
    }

    #[test]
    fn double_join_is_rejected_and_changes_nothing() {
        let mut state = fresh();
        state.join(PlayerId::new("p2")).expect("first join");
        assert!(state.join(PlayerId::new("p2")).is_err());
        assert_eq!(state.participants().len(), 2);
    }

    #[test]
    fn leave_when_not_joined_is_rejected() {
        let mut state = fresh();
        assert!(state.leave(&PlayerId::new("ghost")).is_err());
    }

    #[test]
    fn spend_never_goes_negative() {
        let mut state = fresh();
        state.spend(80).expect("affordable");
        assert_eq!(state.points(), 20);
        assert!(state.spend(90).is_err());
        assert_eq!(state.points(), 20);
    }

    #[test]
    fn quorum_is_half_rounded_up() {
        let mut state = fresh();
        assert_eq!(state.quorum(), 1);
        for p in ["p2", "p3", "p4", "p5"] {
            state.join(PlayerId::new(p)).expect("join");
        }
        assert_eq!(state.quorum(), 3);
    }

    #[test]
    fn majority_vote_wins_with_earliest_tiebreak() {
        let mut state = fresh();
        for p in ["p2", "p3", "p4", "p5"] {
            state.join(PlayerId::new(p)).expect("join");
        }
        let x = SuspectId::new("x");
        let y = SuspectId::new("y");
        state
            .record_accusation(PlayerId::new("p1"), y.clone())
            .expect("accuse");
        state
            .record_accusation(PlayerId::new("p2"), x.clone())
            .expect("accuse");
        state
            .record_accusation(PlayerId::new("p3"), x.clone())
            .expect("accuse");
        assert_eq!(state.leading_accusation(), Some(x));

        // ties resolve to the earliest-accused suspect
        let mut tied = fresh();
        tied.join(PlayerId::new("p2")).expect("join");
        tied.record_accusation(PlayerId::new("p1"), y.clone())
            .expect("accuse");
        tied.record_accusation(PlayerId::new("p2"), SuspectId::new("x"))
            .expect("accuse");
        assert_eq!(tied.leading_accusation(), Some(y));
    }

    #[test]
    fn second_accusation_by_same_player_is_rejected() {
        let mut state = fresh();
        state
            .record_accusation(PlayerId::new("p1"), SuspectId::new("x"))
            .expect("first accusation");
        assert!(state
            .record_accusation(PlayerId::new("p1"), SuspectId::new("y"))
            .is_err());
        assert_eq!(state.accusation_count(), 1);
    }

    #[test]
    fn phase_only_moves_forward() {
        let mut state = fresh();
        state.transition(GamePhase::Accused).expect("accuse");
        state.transition(GamePhase::Ended).expect("end");
        assert!(state.transition(GamePhase::Investigating).is_err());
        assert!(state.transition(GamePhase::Ended).is_err());
    }

    #[test]
    fn direct_timeout_transition_is_legal() {
        let mut state = fresh();
        state.transition(GamePhase::Ended).expect("timeout path");
        assert_eq!(state.phase(), GamePhase::Ended);
    }
}
