//! Per-guild game orchestration.
//!
//! One `GameManager` owns the active case, its mutable state, and the
//! suspect registry for a guild. All methods are synchronous: the registry
//! wraps each manager in a `tokio::sync::Mutex`, so every call here runs as
//! one uninterrupted critical section. The only long-running work, the
//! suspect voice call, happens *between* `begin_presentation` and
//! `complete_presentation` with the lock released and the suspect's busy
//! flag held instead.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;

use gumshoe_domain::{
    CaseDefinition, EndReason, GamePhase, GameState, GuildId, PlayerId, RoomId, Secret, SecretId,
    SuspectId,
};
use gumshoe_protocol::{
    DashboardState, FoundItem, RejectReason, Reply, RevealedSecret, SuspectSummary, SuspectView,
};

use crate::game::hints::{normalize, HintEngine};
use crate::game::suspect::Suspect;
use crate::infrastructure::ports::GameRow;

/// What a finished game resolved to.
#[derive(Debug, Clone, PartialEq)]
pub struct EndSummary {
    pub reason: EndReason,
    pub accused: Option<SuspectId>,
    pub correct: Option<bool>,
}

/// Result of casting an accusation.
#[derive(Debug, Clone, PartialEq)]
pub enum AccuseOutcome {
    /// Recorded; the quorum is not there yet.
    Recorded {
        accused: SuspectId,
        votes: usize,
        quorum: usize,
    },
    /// Quorum reached; the game is over.
    Resolved(EndSummary),
}

/// Everything `complete_presentation` needs after the voice call, captured
/// while the lock was held.
#[derive(Debug)]
pub struct PresentationTicket {
    pub suspect_id: SuspectId,
    pub suspect_name: String,
    pub evidence_id: String,
    pub question: String,
    pub system_prompt: String,
    pub memory: Vec<(String, String)>,
    pub revealed: Vec<Secret>,
    pub composure: u8,
}

pub struct GameManager {
    guild_id: GuildId,
    case: CaseDefinition,
    hints: HintEngine,
    state: GameState,
    suspects: BTreeMap<SuspectId, Suspect>,
    finalized: bool,
    timer: Option<JoinHandle<()>>,
}

impl GameManager {
    pub fn new(guild_id: GuildId, case: CaseDefinition, hints: HintEngine, state: GameState) -> Self {
        let ids = case.suspect_ids();
        let suspects = case
            .suspects
            .iter()
            .map(|def| (def.id.clone(), Suspect::new(def.clone(), &ids)))
            .collect();
        Self {
            guild_id,
            case,
            hints,
            state,
            suspects,
            finalized: false,
            timer: None,
        }
    }

    /// Rebuild a manager from a persisted row. Discoveries are re-derived by
    /// replaying the recorded tool uses against the case; suspect psych
    /// state restarts fresh.
    pub fn restore(
        guild_id: GuildId,
        case: CaseDefinition,
        hints: HintEngine,
        mut state: GameState,
    ) -> Self {
        let tools: Vec<String> = state.used_tools().to_vec();
        for entry in tools {
            replay_tool_use(&case, &mut state, &entry);
        }
        Self::new(guild_id, case, hints, state)
    }

    pub fn guild_id(&self) -> &GuildId {
        &self.guild_id
    }

    pub fn case(&self) -> &CaseDefinition {
        &self.case
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn set_timer(&mut self, handle: JoinHandle<()>) {
        if let Some(old) = self.timer.replace(handle) {
            old.abort();
        }
    }

    // --- gates ---

    fn ensure_investigating(&self, player: &PlayerId) -> Result<(), RejectReason> {
        if self.state.phase() != GamePhase::Investigating {
            return Err(RejectReason::WrongPhase {
                phase: self.state.phase().to_string(),
            });
        }
        if !self.state.is_participant(player) {
            return Err(RejectReason::NotAParticipant);
        }
        Ok(())
    }

    fn charge(&mut self, cost: u32) -> Result<(), RejectReason> {
        if !self.state.can_afford(cost) {
            return Err(RejectReason::InsufficientPoints {
                needed: cost,
                available: self.state.points(),
            });
        }
        // can_afford was just checked; spend cannot fail inside this
        // critical section
        self.state.spend(cost).map_err(|_| RejectReason::InsufficientPoints {
            needed: cost,
            available: self.state.points(),
        })
    }

    fn resolve_room(&self, query: &str) -> Result<RoomId, RejectReason> {
        let wanted = normalize(query).replace(['_', '-', '.'], "");
        self.case
            .map
            .keys()
            .find(|room| normalize(room.as_str()).replace(['_', '-', '.'], "") == wanted)
            .cloned()
            .ok_or_else(|| RejectReason::UnknownLocation {
                location: query.to_string(),
            })
    }

    // --- membership ---

    pub fn join(&mut self, player: &PlayerId) -> Result<usize, RejectReason> {
        if self.state.phase() != GamePhase::Investigating {
            return Err(RejectReason::WrongPhase {
                phase: self.state.phase().to_string(),
            });
        }
        self.state
            .join(player.clone())
            .map_err(|_| RejectReason::AlreadyJoined)?;
        Ok(self.state.participants().len())
    }

    pub fn leave(&mut self, player: &PlayerId) -> Result<usize, RejectReason> {
        self.state
            .leave(player)
            .map_err(|_| RejectReason::NotAParticipant)?;
        Ok(self.state.participants().len())
    }

    // --- evidence tools ---

    pub fn dna(&mut self, player: &PlayerId, location: &str) -> Result<Reply, RejectReason> {
        self.ensure_investigating(player)?;
        let room = self.resolve_room(location)?;
        let cost = self.case.settings.point_costs.dna;
        self.charge(cost)?;

        let evidence_id = format!("dna_{room}");
        let profiles = self.case.evidence.dna.get(&room);
        let text = match profiles {
            Some(profiles) if !profiles.is_empty() => {
                format!("DNA traces in the {room}: {}.", profiles.join(", "))
            }
            _ => format!("The {room} yields no usable DNA traces."),
        };

        let new = self.state.record_evidence(evidence_id.clone());
        self.state.record_location(room.clone());
        self.state.move_player(player.clone(), room.clone());
        self.state.record_tool_use(format!("dna:{room}"));
        let stats = self.state.stats_mut(player);
        stats.tools_used += 1;
        if new {
            stats.evidence_found += 1;
        }

        Ok(Reply::EvidenceRevealed {
            id: evidence_id,
            text,
            cost,
            points_remaining: self.state.points(),
            hint: self.hints.evaluate("dna", location),
        })
    }

    pub fn footage(&mut self, player: &PlayerId, time: &str) -> Result<Reply, RejectReason> {
        self.timed_record(player, "footage", time)
    }

    pub fn logs(&mut self, player: &PlayerId, time: &str) -> Result<Reply, RejectReason> {
        self.timed_record(player, "logs", time)
    }

    /// Shared path for the two time-indexed archives. A miss costs nothing;
    /// a hit charges, grants, and counts in one step.
    fn timed_record(
        &mut self,
        player: &PlayerId,
        tool: &str,
        time: &str,
    ) -> Result<Reply, RejectReason> {
        self.ensure_investigating(player)?;
        let key = time.trim().to_string();
        let (cost, text) = match tool {
            "footage" => (
                self.case.settings.point_costs.footage,
                self.case.evidence.footage.get(&key),
            ),
            _ => (
                self.case.settings.point_costs.logs,
                self.case.evidence.digital_logs.get(&key),
            ),
        };
        let Some(text) = text.cloned() else {
            return Err(RejectReason::NothingFound {
                tool: tool.to_string(),
                query: time.to_string(),
            });
        };
        self.charge(cost)?;

        let evidence_id = format!("{tool}_{key}");
        let new = self.state.record_evidence(evidence_id.clone());
        self.state.record_tool_use(format!("{tool}:{key}"));
        let stats = self.state.stats_mut(player);
        stats.tools_used += 1;
        if new {
            stats.evidence_found += 1;
        }

        Ok(Reply::EvidenceRevealed {
            id: evidence_id,
            text,
            cost,
            points_remaining: self.state.points(),
            hint: self.hints.evaluate(tool, time),
        })
    }

    pub fn search(&mut self, player: &PlayerId, location: &str) -> Result<Reply, RejectReason> {
        self.ensure_investigating(player)?;
        let room = self.resolve_room(location)?;
        let cost = self.case.settings.point_costs.search;
        self.charge(cost)?;

        let item_ids = self
            .case
            .evidence
            .physical_discovery
            .get(&room)
            .cloned()
            .unwrap_or_default();
        let items: Vec<FoundItem> = item_ids
            .iter()
            .map(|id| FoundItem {
                id: id.clone(),
                description: self
                    .case
                    .evidence
                    .physical_evidence
                    .get(id)
                    .cloned()
                    .unwrap_or_else(|| "An item of uncertain significance.".to_string()),
            })
            .collect();

        self.state.record_location(room.clone());
        self.state.move_player(player.clone(), room.clone());
        self.state.record_tool_use(format!("search:{room}"));
        let mut found = 0;
        for item in &item_ids {
            if self.state.record_evidence(item.clone()) {
                found += 1;
            }
        }
        let stats = self.state.stats_mut(player);
        stats.tools_used += 1;
        stats.evidence_found += found;

        Ok(Reply::SearchResults {
            location: room.to_string(),
            items,
            cost,
            points_remaining: self.state.points(),
            hint: self.hints.evaluate("search", location),
        })
    }

    pub fn examine(&mut self, player: &PlayerId, target: &str) -> Result<Reply, RejectReason> {
        self.ensure_investigating(player)?;
        let Some(room) = self.state.room_of(player).cloned() else {
            return Err(RejectReason::NothingToExamine {
                target: target.to_string(),
            });
        };
        let wanted = normalize(target);
        let interactable = self
            .case
            .map
            .get(&room)
            .and_then(|info| {
                info.interactables
                    .iter()
                    .find(|i| normalize(&i.name).contains(&wanted))
            })
            .cloned()
            .ok_or_else(|| RejectReason::NothingToExamine {
                target: target.to_string(),
            })?;
        let cost = self.case.settings.point_costs.examine;
        self.charge(cost)?;

        let mut text = interactable.description.clone();
        let mut evidence_id = format!("examined_{}", normalize(&interactable.name));
        if let Some(item) = &interactable.evidence_id {
            evidence_id = item.clone();
            if let Some(description) = self.case.evidence.physical_evidence.get(item) {
                text.push(' ');
                text.push_str(description);
            }
        }

        let new = self.state.record_evidence(evidence_id.clone());
        self.state
            .record_tool_use(format!("examine:{room}:{}", interactable.name));
        let stats = self.state.stats_mut(player);
        stats.tools_used += 1;
        if new {
            stats.evidence_found += 1;
        }

        Ok(Reply::EvidenceRevealed {
            id: evidence_id,
            text,
            cost,
            points_remaining: self.state.points(),
            hint: self.hints.evaluate("examine", target),
        })
    }

    // --- presentation ---

    /// Synchronous half of `present`: validate, claim the suspect, apply
    /// pressure, and collect reveals. Irreversible effects all land here,
    /// inside the lock; the caller then makes the voice call without it.
    pub fn begin_presentation(
        &mut self,
        player: &PlayerId,
        evidence_query: &str,
        suspect_query: &str,
    ) -> Result<PresentationTicket, RejectReason> {
        self.ensure_investigating(player)?;

        let suspect_def = self
            .case
            .find_suspect(suspect_query)
            .ok_or_else(|| RejectReason::UnknownSuspect {
                query: suspect_query.to_string(),
            })?;
        let suspect_id = suspect_def.id.clone();
        let suspect_room = suspect_def.current_location.clone();
        let suspect_name = suspect_def.name.clone();

        match self.state.room_of(player) {
            Some(room) if *room == suspect_room => {}
            _ => {
                return Err(RejectReason::SuspectNotPresent {
                    suspect: suspect_name,
                    location: suspect_room.to_string(),
                })
            }
        }

        let evidence_id = self.resolve_evidence(evidence_query)?;

        let revealed_anywhere: BTreeSet<SecretId> = self
            .suspects
            .values()
            .flat_map(|s| s.revealed_ids().iter().cloned())
            .collect();
        let discovered = self.state.discovered_evidence().clone();

        let suspect = self
            .suspects
            .get_mut(&suspect_id)
            .ok_or_else(|| RejectReason::UnknownSuspect {
                query: suspect_query.to_string(),
            })?;
        if !suspect.begin_questioning() {
            return Err(RejectReason::SuspectBusy {
                suspect: suspect_name,
            });
        }

        let loss = suspect.pressure_for(&evidence_id);
        suspect.apply_pressure(loss);
        let revealed = suspect.collect_reveals(&discovered, &revealed_anywhere);
        let composure = suspect.composure();
        let question = format!("I want you to explain this: {evidence_id}.");
        let system_prompt = suspect.persona_prompt(&self.case, &revealed);
        let memory = suspect.memory().to_vec();

        if !revealed.is_empty() {
            self.state.stats_mut(player).secrets_revealed += revealed.len() as u32;
        }

        Ok(PresentationTicket {
            suspect_id,
            suspect_name,
            evidence_id,
            question,
            system_prompt,
            memory,
            revealed,
            composure,
        })
    }

    /// Asynchronous half of `present`: store the reply and release the
    /// suspect. `dialogue` is None when the voice call failed or came back
    /// empty; the suspect simply has nothing to say.
    pub fn complete_presentation(
        &mut self,
        ticket: PresentationTicket,
        dialogue: Option<String>,
    ) -> Reply {
        let dialogue = dialogue
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| format!("{} says nothing.", ticket.suspect_name));

        if let Some(suspect) = self.suspects.get_mut(&ticket.suspect_id) {
            suspect.remember(ticket.question.clone(), dialogue.clone());
            suspect.end_questioning();
        }

        Reply::SuspectResponse {
            suspect_id: ticket.suspect_id.to_string(),
            suspect_name: ticket.suspect_name,
            dialogue,
            composure: ticket.composure,
            revealed_secrets: ticket
                .revealed
                .iter()
                .map(|secret| RevealedSecret {
                    suspect_id: ticket.suspect_id.to_string(),
                    secret_id: secret.id.to_string(),
                    text: secret.text.clone(),
                })
                .collect(),
        }
    }

    /// Fuzzy evidence resolution against the discovered set. An exact
    /// normalized match wins outright; otherwise the query must match
    /// exactly one discovered id as a substring.
    fn resolve_evidence(&self, query: &str) -> Result<String, RejectReason> {
        let wanted = normalize(query);
        if wanted.is_empty() {
            return Err(RejectReason::EvidenceNotFound {
                query: query.to_string(),
            });
        }
        let discovered = self.state.discovered_evidence();
        if let Some(exact) = discovered.iter().find(|id| normalize(id) == wanted) {
            return Ok(exact.clone());
        }
        let matches: Vec<String> = discovered
            .iter()
            .filter(|id| normalize(id).contains(&wanted))
            .cloned()
            .collect();
        match matches.len() {
            0 => Err(RejectReason::EvidenceNotFound {
                query: query.to_string(),
            }),
            1 => Ok(matches.into_iter().next().ok_or_else(|| {
                RejectReason::EvidenceNotFound {
                    query: query.to_string(),
                }
            })?),
            _ => Err(RejectReason::AmbiguousEvidence {
                query: query.to_string(),
                matches,
            }),
        }
    }

    // --- accusation ---

    pub fn accuse(
        &mut self,
        player: &PlayerId,
        suspect_query: &str,
    ) -> Result<AccuseOutcome, RejectReason> {
        self.ensure_investigating(player)?;
        let accused = self
            .case
            .find_suspect(suspect_query)
            .ok_or_else(|| RejectReason::UnknownSuspect {
                query: suspect_query.to_string(),
            })?
            .id
            .clone();

        self.state
            .record_accusation(player.clone(), accused.clone())
            .map_err(|_| RejectReason::AlreadyAccused)?;

        let votes = self.state.accusation_count();
        let quorum = self.state.quorum();
        if votes < quorum {
            return Ok(AccuseOutcome::Recorded {
                accused,
                votes,
                quorum,
            });
        }

        // Quorum reached: the majority suspect carries the vote and the game
        // passes through `accused` into `ended`.
        if self.state.phase() == GamePhase::Investigating {
            let _ = self.state.transition(GamePhase::Accused);
        }
        let summary = self
            .finalize(EndReason::Verdict)
            .unwrap_or_else(|| EndSummary {
                reason: EndReason::Verdict,
                accused: self.state.leading_accusation(),
                correct: self
                    .state
                    .leading_accusation()
                    .map(|s| s == self.case.solution.killer),
            });
        Ok(AccuseOutcome::Resolved(summary))
    }

    // --- termination ---

    /// One-shot finalization, shared by the quorum path, the manual end
    /// command, and the timer. The first caller wins; later calls are no-ops.
    pub fn finalize(&mut self, reason: EndReason) -> Option<EndSummary> {
        if self.finalized {
            return None;
        }
        self.finalized = true;

        if self.state.phase() != GamePhase::Ended {
            if let Err(e) = self.state.transition(GamePhase::Ended) {
                tracing::error!(guild_id = %self.guild_id, error = %e, "Finalize transition failed");
            }
        }

        // The timeout path is the timer itself; aborting it mid-cleanup
        // would cancel its own persistence work.
        if let Some(timer) = self.timer.take() {
            if reason != EndReason::Timeout {
                timer.abort();
            }
        }

        let accused = self.state.leading_accusation();
        let correct = accused.as_ref().map(|a| *a == self.case.solution.killer);
        tracing::info!(
            guild_id = %self.guild_id,
            reason = ?reason,
            accused = ?accused,
            correct = ?correct,
            "Game finalized"
        );
        Some(EndSummary {
            reason,
            accused,
            correct,
        })
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    // --- read models ---

    pub fn dashboard_state(&self, now: DateTime<Utc>) -> DashboardState {
        DashboardState {
            case_id: self.case.id.to_string(),
            case_name: self.case.name.clone(),
            phase: self.state.phase(),
            time_remaining_secs: self.state.time_remaining(now).num_seconds(),
            points: self.state.points(),
            participant_count: self.state.participants().len(),
            suspects: self
                .suspects
                .values()
                .map(|s| SuspectView {
                    id: s.id().to_string(),
                    name: s.name().to_string(),
                    composure: s.composure(),
                    defensiveness: s.defensiveness(),
                    busy: s.is_busy(),
                    secrets_revealed: s.secrets_revealed(),
                    secrets_total: s.secrets_total(),
                })
                .collect(),
            discovered_evidence: self
                .state
                .discovered_evidence()
                .iter()
                .cloned()
                .collect(),
        }
    }

    pub fn suspect_summaries(&self) -> Vec<SuspectSummary> {
        self.case
            .suspects
            .iter()
            .map(|def| SuspectSummary {
                id: def.id.to_string(),
                name: def.name.clone(),
                location: def.current_location.to_string(),
                police_statement: self
                    .case
                    .evidence
                    .initial_police_statements
                    .get(&def.id)
                    .cloned(),
            })
            .collect()
    }

    pub fn revealed_secret_list(&self) -> Vec<RevealedSecret> {
        self.suspects
            .values()
            .flat_map(|suspect| {
                suspect.revealed_secrets().map(|secret| RevealedSecret {
                    suspect_id: suspect.id().to_string(),
                    secret_id: secret.id.to_string(),
                    text: secret.text.clone(),
                })
            })
            .collect()
    }

    pub fn to_row(&self) -> GameRow {
        GameRow {
            guild_id: self.guild_id.to_string(),
            case_id: self.case.id.to_string(),
            category_id: None,
            role_id: None,
            points: self.state.points(),
            phase: self.state.phase().as_str().to_string(),
            started_at: self.state.started_at,
            ends_at: self.state.ends_at,
            participants: self
                .state
                .participants()
                .iter()
                .map(|p| p.to_string())
                .collect(),
            used_tools: self.state.used_tools().to_vec(),
        }
    }
}

/// Re-derive one tool use during restore. Entries that no longer resolve
/// (e.g. the case file changed underneath a saved game) are skipped.
fn replay_tool_use(case: &CaseDefinition, state: &mut GameState, entry: &str) {
    let Some((tool, arg)) = entry.split_once(':') else {
        return;
    };
    match tool {
        "dna" => {
            let room = RoomId::new(arg);
            if case.has_room(&room) {
                state.record_evidence(format!("dna_{room}"));
                state.record_location(room);
            }
        }
        "search" => {
            let room = RoomId::new(arg);
            if case.has_room(&room) {
                if let Some(items) = case.evidence.physical_discovery.get(&room) {
                    for item in items {
                        state.record_evidence(item.clone());
                    }
                }
                state.record_location(room);
            }
        }
        "footage" => {
            if case.evidence.footage.contains_key(arg) {
                state.record_evidence(format!("footage_{arg}"));
            }
        }
        "logs" => {
            if case.evidence.digital_logs.contains_key(arg) {
                state.record_evidence(format!("logs_{arg}"));
            }
        }
        "examine" => {
            let Some((room, target)) = arg.split_once(':') else {
                return;
            };
            let room = RoomId::new(room);
            if let Some(info) = case.map.get(&room) {
                if let Some(interactable) =
                    info.interactables.iter().find(|i| i.name == target)
                {
                    if let Some(item) = &interactable.evidence_id {
                        state.record_evidence(item.clone());
                    }
                }
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authoring::test_support::sample_case;
    use gumshoe_domain::CaseId;

    fn manager() -> GameManager {
        let case = sample_case();
        let state = GameState::new(
            CaseId::new("blackwood_manor"),
            Utc::now(),
            10,
            100,
            PlayerId::new("p1"),
        );
        GameManager::new(GuildId::new("g1"), case, HintEngine::empty(), state)
    }

    fn p(id: &str) -> PlayerId {
        PlayerId::new(id)
    }

    #[test]
    fn dna_charges_and_grants_in_one_step() {
        let mut game = manager();
        let reply = game.dna(&p("p1"), "study").expect("dna");
        assert_eq!(game.state().points(), 80);
        assert!(game.state().has_evidence("dna_study"));
        match reply {
            Reply::EvidenceRevealed { id, points_remaining, .. } => {
                assert_eq!(id, "dna_study");
                assert_eq!(points_remaining, 80);
            }
            other => panic!("unexpected reply: {other:?}"),
        }
    }

    #[test]
    fn unaffordable_tool_changes_nothing() {
        let mut game = manager();
        game.dna(&p("p1"), "study").expect("dna");
        game.dna(&p("p1"), "hall").expect("dna");
        game.dna(&p("p1"), "kitchen").expect("dna");
        game.search(&p("p1"), "study").expect("search");
        game.search(&p("p1"), "hall").expect("search");
        // points: 100 - 3*20 - 2*15 = 10; next search costs 15
        assert_eq!(game.state().points(), 10);
        let evidence_before = game.state().discovered_evidence().len();
        let err = game.search(&p("p1"), "kitchen").expect_err("broke");
        assert!(matches!(err, RejectReason::InsufficientPoints { needed: 15, available: 10 }));
        assert_eq!(game.state().points(), 10);
        assert_eq!(game.state().discovered_evidence().len(), evidence_before);
    }

    #[test]
    fn tools_reject_non_participants_and_wrong_phase() {
        let mut game = manager();
        let err = game.dna(&p("stranger"), "study").expect_err("not joined");
        assert!(matches!(err, RejectReason::NotAParticipant));

        game.finalize(EndReason::Manual);
        let err = game.dna(&p("p1"), "study").expect_err("ended");
        assert!(matches!(err, RejectReason::WrongPhase { .. }));
    }

    #[test]
    fn missing_footage_costs_nothing() {
        let mut game = manager();
        let err = game.footage(&p("p1"), "03:00").expect_err("no tape");
        assert!(matches!(err, RejectReason::NothingFound { .. }));
        assert_eq!(game.state().points(), 100);

        let reply = game.footage(&p("p1"), "22:05").expect("tape");
        assert_eq!(game.state().points(), 85);
        assert!(matches!(reply, Reply::EvidenceRevealed { .. }));
    }

    #[test]
    fn search_grants_all_items_in_the_room() {
        let mut game = manager();
        let reply = game.search(&p("p1"), "study").expect("search");
        assert!(game.state().has_evidence("bloody_knife"));
        match reply {
            Reply::SearchResults { items, .. } => assert_eq!(items.len(), 1),
            other => panic!("unexpected reply: {other:?}"),
        }
    }

    #[test]
    fn examine_requires_being_in_a_room_with_the_object() {
        let mut game = manager();
        let err = game.examine(&p("p1"), "desk").expect_err("nowhere yet");
        assert!(matches!(err, RejectReason::NothingToExamine { .. }));

        game.search(&p("p1"), "study").expect("move to study");
        let reply = game.examine(&p("p1"), "desk").expect("examine");
        match reply {
            Reply::EvidenceRevealed { id, .. } => assert_eq!(id, "torn_ledger"),
            other => panic!("unexpected reply: {other:?}"),
        }
    }

    #[test]
    fn presentation_requires_shared_room() {
        let mut game = manager();
        game.dna(&p("p1"), "kitchen").expect("dna");
        // butler is in the study, player is in the kitchen
        let err = game
            .begin_presentation(&p("p1"), "dna_kitchen", "butler")
            .expect_err("not present");
        assert!(matches!(err, RejectReason::SuspectNotPresent { .. }));
    }

    #[test]
    fn presentation_rejects_zero_and_ambiguous_evidence_matches() {
        let mut game = manager();
        game.dna(&p("p1"), "study").expect("dna study");
        game.footage(&p("p1"), "22:05").expect("footage");
        game.dna(&p("p1"), "hall").expect("dna hall");
        game.search(&p("p1"), "study").expect("back to study");

        let err = game
            .begin_presentation(&p("p1"), "crowbar", "butler")
            .expect_err("nothing like that");
        assert!(matches!(err, RejectReason::EvidenceNotFound { .. }));

        let err = game
            .begin_presentation(&p("p1"), "dna", "butler")
            .expect_err("two dna hits");
        match err {
            RejectReason::AmbiguousEvidence { matches, .. } => assert_eq!(matches.len(), 2),
            other => panic!("unexpected rejection: {other:?}"),
        }
    }

    #[test]
    fn busy_suspect_fails_fast() {
        let mut game = manager();
        game.dna(&p("p1"), "study").expect("dna");
        let ticket = game
            .begin_presentation(&p("p1"), "dna_study", "butler")
            .expect("first presentation");
        let err = game
            .begin_presentation(&p("p1"), "dna_study", "butler")
            .expect_err("suspect busy");
        assert!(matches!(err, RejectReason::SuspectBusy { .. }));

        game.complete_presentation(ticket, Some("I resent the implication.".into()));
        assert!(game
            .begin_presentation(&p("p1"), "dna_study", "butler")
            .is_ok());
    }

    #[test]
    fn empty_voice_response_degrades_to_silence() {
        let mut game = manager();
        game.dna(&p("p1"), "study").expect("dna");
        let ticket = game
            .begin_presentation(&p("p1"), "dna_study", "butler")
            .expect("presentation");
        let reply = game.complete_presentation(ticket, Some("   ".into()));
        match reply {
            Reply::SuspectResponse { dialogue, .. } => {
                assert_eq!(dialogue, "Mr. Jenkins says nothing.");
            }
            other => panic!("unexpected reply: {other:?}"),
        }
    }

    #[test]
    fn repeated_pressure_reveals_the_secret_chain() {
        let mut game = manager();
        game.dna(&p("p1"), "study").expect("dna");
        game.search(&p("p1"), "study").expect("knife");

        let mut all_revealed = Vec::new();
        for _ in 0..12 {
            let ticket = game
                .begin_presentation(&p("p1"), "dna_study", "butler")
                .expect("presentation");
            all_revealed.extend(ticket.revealed.iter().map(|s| s.id.to_string()));
            game.complete_presentation(ticket, None);
        }
        assert!(all_revealed.contains(&"butler_seen".to_string()));
    }

    #[test]
    fn quorum_is_required_to_resolve_the_vote() {
        let mut game = manager();
        for id in ["p2", "p3", "p4", "p5"] {
            game.join(&p(id)).expect("join");
        }
        // 5 participants -> quorum 3
        match game.accuse(&p("p1"), "maid").expect("accuse") {
            AccuseOutcome::Recorded { votes, quorum, .. } => {
                assert_eq!((votes, quorum), (1, 3));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(matches!(
            game.accuse(&p("p2"), "butler").expect("accuse"),
            AccuseOutcome::Recorded { .. }
        ));
        assert_eq!(game.state().phase(), GamePhase::Investigating);

        match game.accuse(&p("p3"), "butler").expect("accuse") {
            AccuseOutcome::Resolved(summary) => {
                assert_eq!(summary.reason, EndReason::Verdict);
                assert_eq!(summary.accused, Some(SuspectId::new("butler")));
                assert_eq!(summary.correct, Some(true));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(game.state().phase(), GamePhase::Ended);
    }

    #[test]
    fn second_accusation_from_one_player_is_immutable() {
        let mut game = manager();
        game.join(&p("p2")).expect("join");
        game.join(&p("p3")).expect("join");
        game.accuse(&p("p1"), "maid").expect("accuse");
        let err = game.accuse(&p("p1"), "butler").expect_err("immutable");
        assert!(matches!(err, RejectReason::AlreadyAccused));
    }

    #[test]
    fn finalize_is_one_shot() {
        let mut game = manager();
        let first = game.finalize(EndReason::Manual);
        assert!(first.is_some());
        // a timer firing later must be a no-op
        assert!(game.finalize(EndReason::Timeout).is_none());
        assert_eq!(game.state().phase(), GamePhase::Ended);
    }

    #[test]
    fn restore_replays_tool_uses_into_discoveries() {
        let case = sample_case();
        let mut participants = std::collections::BTreeSet::new();
        participants.insert(p("p1"));
        let state = GameState::restore(
            CaseId::new("blackwood_manor"),
            Utc::now(),
            Utc::now() + chrono::Duration::minutes(5),
            GamePhase::Investigating,
            45,
            participants,
            std::collections::BTreeSet::new(),
            vec![
                "dna:study".to_string(),
                "search:study".to_string(),
                "footage:22:05".to_string(),
                "bogus entry".to_string(),
            ],
        );
        let game = GameManager::restore(GuildId::new("g1"), case, HintEngine::empty(), state);
        assert!(game.state().has_evidence("dna_study"));
        assert!(game.state().has_evidence("bloody_knife"));
        assert!(game.state().has_evidence("footage_22:05"));
        assert_eq!(game.state().points(), 45);
    }

    #[test]
    fn dashboard_state_reflects_the_game() {
        let mut game = manager();
        game.dna(&p("p1"), "study").expect("dna");
        let state = game.dashboard_state(Utc::now());
        assert_eq!(state.case_name, "The Blackwood Manor Affair");
        assert_eq!(state.points, 80);
        assert_eq!(state.participant_count, 1);
        assert_eq!(state.suspects.len(), 2);
        assert_eq!(state.discovered_evidence, vec!["dna_study".to_string()]);
        assert!(state.time_remaining_secs > 0);
    }

    #[test]
    fn room_lookup_is_forgiving_about_separators() {
        let mut game = manager();
        assert!(game.dna(&p("p1"), "The Study!").is_ok());
        let err = game.dna(&p("p1"), "ballroom").expect_err("no such room");
        assert!(matches!(err, RejectReason::UnknownLocation { .. }));
    }
}
