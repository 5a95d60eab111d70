//! The per-guild game registry.
//!
//! An explicit map from guild id to game manager, owned by the application
//! context and passed by reference to every handler. Each manager sits
//! behind its own `tokio::sync::Mutex`, so a guild's mutations run strictly
//! one at a time while guilds stay independent of each other.

use std::collections::BTreeSet;
use std::str::FromStr;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

use gumshoe_domain::{CaseId, EndReason, GamePhase, GameState, GuildId, PlayerId};
use gumshoe_protocol::{RejectReason, Reply, ServerMessage};

use crate::api::connections::ConnectionManager;
use crate::authoring::validator;
use crate::game::hints::HintEngine;
use crate::game::manager::{EndSummary, GameManager};
use crate::infrastructure::case_store::{CaseStore, CaseStoreError};
use crate::infrastructure::ports::{ClockPort, GameRepo};

pub type SharedGame = Arc<Mutex<GameManager>>;

pub struct GameRegistry {
    games: DashMap<GuildId, SharedGame>,
    repo: Arc<dyn GameRepo>,
    cases: Arc<CaseStore>,
    clock: Arc<dyn ClockPort>,
    connections: Arc<ConnectionManager>,
}

impl GameRegistry {
    pub fn new(
        repo: Arc<dyn GameRepo>,
        cases: Arc<CaseStore>,
        clock: Arc<dyn ClockPort>,
        connections: Arc<ConnectionManager>,
    ) -> Self {
        Self {
            games: DashMap::new(),
            repo,
            cases,
            clock,
            connections,
        }
    }

    pub fn get(&self, guild_id: &GuildId) -> Option<SharedGame> {
        self.games.get(guild_id).map(|entry| entry.value().clone())
    }

    pub fn guild_ids(&self) -> Vec<GuildId> {
        self.games.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Start a new investigation for a guild.
    pub async fn start_game(
        self: &Arc<Self>,
        guild_id: GuildId,
        initiator: PlayerId,
        case_id: &str,
        time_override_minutes: Option<u32>,
    ) -> Result<Reply, RejectReason> {
        if let Some(existing) = self.get(&guild_id) {
            let game = existing.lock().await;
            if game.state().phase() != GamePhase::Ended {
                return Err(RejectReason::GameAlreadyRunning {
                    case_id: game.case().id.to_string(),
                });
            }
        }

        let case_key = CaseId::new(case_id);
        let case = match self.cases.load(&case_key) {
            Ok(case) => case,
            Err(CaseStoreError::NotFound { case_id }) => {
                return Err(RejectReason::CaseNotFound { case_id });
            }
            Err(e) => {
                return Err(RejectReason::CaseInvalid {
                    case_id: case_id.to_string(),
                    issues: vec![e.to_string()],
                });
            }
        };

        // A case never reaches runtime with validation errors.
        let issues = validator::validate(&case, case_id);
        if validator::has_errors(&issues) {
            return Err(RejectReason::CaseInvalid {
                case_id: case_id.to_string(),
                issues: validator::error_messages(&issues),
            });
        }

        let hints = match self.cases.load_hints(&case_key) {
            Ok(rules) => HintEngine::new(rules),
            Err(e) => {
                tracing::warn!(case_id, error = %e, "Failed to load hints, continuing without");
                HintEngine::empty()
            }
        };

        let time_limit = time_override_minutes.unwrap_or(case.settings.time_limit_minutes);
        let state = GameState::new(
            case.id.clone(),
            self.clock.now(),
            time_limit,
            case.settings.starting_points,
            initiator,
        );
        let reply = Reply::Started {
            case_id: case.id.to_string(),
            case_name: case.name.clone(),
            time_limit_minutes: time_limit,
            points: state.points(),
        };
        let ends_at = state.ends_at;

        let manager = GameManager::new(guild_id.clone(), case, hints, state);
        let shared = Arc::new(Mutex::new(manager));
        self.games.insert(guild_id.clone(), shared.clone());
        self.spawn_timer(guild_id.clone(), shared.clone(), ends_at).await;

        tracing::info!(guild_id = %guild_id, case_id, "Investigation started");
        self.persist(&shared).await;
        self.notify(&guild_id).await;
        Ok(reply)
    }

    /// Arm the countdown for a game. Firing finalizes with `Timeout`;
    /// finalize's one-shot guard makes a late fire after a manual end a
    /// no-op.
    async fn spawn_timer(
        self: &Arc<Self>,
        guild_id: GuildId,
        shared: SharedGame,
        ends_at: chrono::DateTime<chrono::Utc>,
    ) {
        let registry = Arc::clone(self);
        let timer_game = shared.clone();
        let handle = tokio::spawn(async move {
            let remaining = (ends_at - registry.clock.now())
                .to_std()
                .unwrap_or_default();
            tokio::time::sleep(remaining).await;
            let summary = {
                let mut game = timer_game.lock().await;
                game.finalize(EndReason::Timeout)
            };
            if let Some(summary) = summary {
                tracing::info!(guild_id = %guild_id, "Investigation timed out");
                registry.persist(&timer_game).await;
                registry.announce_end(&guild_id, &summary).await;
            }
        });
        shared.lock().await.set_timer(handle);
    }

    /// End a guild's game early. Returns the summary, or a rejection when
    /// there is nothing to end.
    pub async fn end_game(
        &self,
        guild_id: &GuildId,
        reason: EndReason,
    ) -> Result<EndSummary, RejectReason> {
        let shared = self.get(guild_id).ok_or(RejectReason::NoActiveGame)?;
        let summary = {
            let mut game = shared.lock().await;
            game.finalize(reason)
        };
        match summary {
            Some(summary) => {
                self.persist(&shared).await;
                self.announce_end(guild_id, &summary).await;
                Ok(summary)
            }
            None => Err(RejectReason::WrongPhase {
                phase: GamePhase::Ended.to_string(),
            }),
        }
    }

    /// Drop a finished game and its persisted row.
    pub async fn cleanup(&self, guild_id: &GuildId) -> Result<(), RejectReason> {
        let shared = self.get(guild_id).ok_or(RejectReason::NoActiveGame)?;
        {
            let game = shared.lock().await;
            if game.state().phase() != GamePhase::Ended {
                return Err(RejectReason::GameStillRunning);
            }
        }
        self.games.remove(guild_id);
        if let Err(e) = self.repo.delete(guild_id).await {
            tracing::warn!(guild_id = %guild_id, error = %e, "Failed to delete game row");
        }
        tracing::info!(guild_id = %guild_id, "Game state cleaned up");
        Ok(())
    }

    /// Rebuild in-memory state from persisted rows at process start.
    /// A row that cannot be restored is logged and skipped; startup never
    /// fails because one guild's save is bad.
    pub async fn restore_games(self: &Arc<Self>) {
        let rows = match self.repo.list_active().await {
            Ok(rows) => rows,
            Err(e) => {
                tracing::error!(error = %e, "Failed to list persisted games");
                return;
            }
        };

        for row in rows {
            let guild_id = GuildId::new(row.guild_id.clone());
            let case_key = CaseId::new(row.case_id.clone());
            let case = match self.cases.load(&case_key) {
                Ok(case) => case,
                Err(e) => {
                    tracing::warn!(
                        guild_id = %guild_id,
                        case_id = %case_key,
                        error = %e,
                        "Skipping restore, case failed to load"
                    );
                    continue;
                }
            };
            let phase = match GamePhase::from_str(&row.phase) {
                Ok(phase) => phase,
                Err(e) => {
                    tracing::warn!(guild_id = %guild_id, error = %e, "Skipping restore, bad phase");
                    continue;
                }
            };
            let hints = self
                .cases
                .load_hints(&case_key)
                .map(HintEngine::new)
                .unwrap_or_else(|_| HintEngine::empty());

            let participants: BTreeSet<PlayerId> = row
                .participants
                .iter()
                .map(|p| PlayerId::new(p.as_str()))
                .collect();
            let state = GameState::restore(
                case_key,
                row.started_at,
                row.ends_at,
                phase,
                row.points,
                participants,
                BTreeSet::new(),
                row.used_tools.clone(),
            );
            let ends_at = state.ends_at;
            let manager = GameManager::restore(guild_id.clone(), case, hints, state);
            let shared = Arc::new(Mutex::new(manager));
            self.games.insert(guild_id.clone(), shared.clone());

            if ends_at <= self.clock.now() {
                // The deadline passed while we were down.
                let summary = {
                    let mut game = shared.lock().await;
                    game.finalize(EndReason::Timeout)
                };
                if let Some(summary) = summary {
                    self.persist(&shared).await;
                    self.announce_end(&guild_id, &summary).await;
                }
            } else {
                self.spawn_timer(guild_id.clone(), shared, ends_at).await;
            }
            tracing::info!(guild_id = %guild_id, "Restored game from persistence");
        }
    }

    /// Write the current row. Persistence failures are logged and swallowed:
    /// in-memory state is authoritative while the game is live, and a failed
    /// write never rolls a mutation back.
    pub async fn persist(&self, shared: &SharedGame) {
        let row = {
            let game = shared.lock().await;
            game.to_row()
        };
        if let Err(e) = self.repo.upsert(&row).await {
            tracing::warn!(guild_id = %row.guild_id, error = %e, "Failed to persist game row");
        }
    }

    /// Push a fresh dashboard snapshot for a guild.
    pub async fn notify(&self, guild_id: &GuildId) {
        let Some(shared) = self.get(guild_id) else {
            return;
        };
        let state = {
            let game = shared.lock().await;
            game.dashboard_state(self.clock.now())
        };
        self.connections
            .broadcast_to_guild(
                guild_id,
                ServerMessage::GameState {
                    guild_id: guild_id.to_string(),
                    state,
                },
            )
            .await;
    }

    async fn announce_end(&self, guild_id: &GuildId, summary: &EndSummary) {
        self.notify(guild_id).await;
        self.connections
            .broadcast_to_guild(
                guild_id,
                ServerMessage::GameEnded {
                    guild_id: guild_id.to_string(),
                    reason: summary.reason,
                    accused: summary.accused.as_ref().map(|s| s.to_string()),
                    correct: summary.correct,
                },
            )
            .await;
    }
}
