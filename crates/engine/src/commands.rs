//! Command dispatch: the chat-platform surface mapped onto the engine.
//!
//! The transport adapter hands us a guild id, a player id, and a
//! [`Command`]; everything else is engine state. Expected failures come back
//! as [`Reply::Rejected`] with a specific reason; only infrastructure
//! surprises are logged.

use std::str::FromStr;
use std::sync::Arc;

use gumshoe_domain::{Difficulty, EndReason, GuildId, PlayerId};
use gumshoe_protocol::{Command, RejectReason, Reply};

use crate::app::App;
use crate::authoring::{validator, verifier, BuildConfig, CaseBuilder};
use crate::game::manager::AccuseOutcome;
use crate::game::registry::SharedGame;
use crate::infrastructure::ports::{LlmMessage, LlmRequest, MessageRole};

const HELP_TEXT: &str = "\
Commands: start <case>, status, join, leave, dna <room>, footage <hh:mm>, \
logs <hh:mm>, search <room>, examine <object>, present <evidence> <suspect>, \
accuse <suspect>, suspects, secrets, end, cleanup, generate [theme] [difficulty]. \
Tools cost points; presenting the right evidence to the right face cracks secrets.";

/// Execute one player command against a guild's game.
pub async fn dispatch(app: &Arc<App>, guild_id: GuildId, player: PlayerId, command: Command) -> Reply {
    tracing::debug!(guild_id = %guild_id, player = %player, command = command.name(), "Dispatching command");
    match command {
        Command::Help => Reply::HelpText {
            text: HELP_TEXT.to_string(),
        },
        Command::Start {
            case_id,
            time_override_minutes,
        } => app
            .registry
            .start_game(guild_id, player, &case_id, time_override_minutes)
            .await
            .unwrap_or_else(Reply::rejected),
        Command::Generate {
            theme,
            difficulty,
            seed,
        } => generate(app, theme, difficulty, seed).await,
        Command::End => match app.registry.end_game(&guild_id, EndReason::Manual).await {
            Ok(summary) => Reply::Ended {
                reason: summary.reason,
            },
            Err(reason) => Reply::rejected(reason),
        },
        Command::Cleanup => match app.registry.cleanup(&guild_id).await {
            Ok(()) => Reply::CleanedUp,
            Err(reason) => Reply::rejected(reason),
        },
        other => {
            let Some(shared) = app.registry.get(&guild_id) else {
                return Reply::rejected(RejectReason::NoActiveGame);
            };
            dispatch_in_game(app, &guild_id, &player, other, shared).await
        }
    }
}

async fn dispatch_in_game(
    app: &Arc<App>,
    guild_id: &GuildId,
    player: &PlayerId,
    command: Command,
    shared: SharedGame,
) -> Reply {
    let reply = match command {
        Command::Status => {
            let game = shared.lock().await;
            return Reply::StatusReport {
                state: game.dashboard_state(app.clock.now()),
            };
        }
        Command::Suspects => {
            let game = shared.lock().await;
            return Reply::SuspectList {
                suspects: game.suspect_summaries(),
            };
        }
        Command::Secrets => {
            let game = shared.lock().await;
            return Reply::SecretsList {
                secrets: game.revealed_secret_list(),
            };
        }
        Command::Join => {
            let mut game = shared.lock().await;
            game.join(player)
                .map(|participant_count| Reply::Joined { participant_count })
        }
        Command::Leave => {
            let mut game = shared.lock().await;
            game.leave(player)
                .map(|participant_count| Reply::Left { participant_count })
        }
        Command::Dna { location } => {
            let mut game = shared.lock().await;
            game.dna(player, &location)
        }
        Command::Footage { time } => {
            let mut game = shared.lock().await;
            game.footage(player, &time)
        }
        Command::Logs { time } => {
            let mut game = shared.lock().await;
            game.logs(player, &time)
        }
        Command::Search { location } => {
            let mut game = shared.lock().await;
            game.search(player, &location)
        }
        Command::Examine { target } => {
            let mut game = shared.lock().await;
            game.examine(player, &target)
        }
        Command::Present { evidence, suspect } => {
            return present(app, guild_id, player, &shared, &evidence, &suspect).await;
        }
        Command::Accuse { suspect } => {
            return accuse(app, guild_id, player, &shared, &suspect).await;
        }
        // handled by `dispatch`
        Command::Start { .. }
        | Command::Generate { .. }
        | Command::Help
        | Command::End
        | Command::Cleanup => return Reply::rejected(RejectReason::NoActiveGame),
    };

    match reply {
        Ok(reply) => {
            app.registry.persist(&shared).await;
            app.registry.notify(guild_id).await;
            reply
        }
        Err(reason) => Reply::rejected(reason),
    }
}

/// The two-phase presentation flow: mutate under the lock, voice the suspect
/// without it, then store the reply. The suspect's busy flag covers the gap.
async fn present(
    app: &Arc<App>,
    guild_id: &GuildId,
    player: &PlayerId,
    shared: &SharedGame,
    evidence: &str,
    suspect: &str,
) -> Reply {
    let ticket = {
        let mut game = shared.lock().await;
        match game.begin_presentation(player, evidence, suspect) {
            Ok(ticket) => ticket,
            Err(reason) => return Reply::rejected(reason),
        }
    };

    let mut messages: Vec<LlmMessage> = Vec::with_capacity(ticket.memory.len() * 2 + 1);
    for (question, answer) in &ticket.memory {
        messages.push(LlmMessage {
            role: MessageRole::User,
            content: question.clone(),
        });
        messages.push(LlmMessage {
            role: MessageRole::Assistant,
            content: answer.clone(),
        });
    }
    messages.push(LlmMessage {
        role: MessageRole::User,
        content: ticket.question.clone(),
    });
    let request = LlmRequest {
        system_prompt: ticket.system_prompt.clone(),
        messages,
        temperature: Some(0.9),
        max_tokens: Some(220),
    };

    let dialogue = match app.llm.generate(request).await {
        Ok(response) => Some(response.content),
        Err(e) => {
            tracing::warn!(
                guild_id = %guild_id,
                suspect = %ticket.suspect_id,
                error = %e,
                "Suspect voice call failed"
            );
            None
        }
    };

    let reply = {
        let mut game = shared.lock().await;
        game.complete_presentation(ticket, dialogue)
    };
    app.registry.persist(shared).await;
    app.registry.notify(guild_id).await;
    reply
}

async fn accuse(
    app: &Arc<App>,
    guild_id: &GuildId,
    player: &PlayerId,
    shared: &SharedGame,
    suspect: &str,
) -> Reply {
    let outcome = {
        let mut game = shared.lock().await;
        game.accuse(player, suspect)
    };
    match outcome {
        Err(reason) => Reply::rejected(reason),
        Ok(AccuseOutcome::Recorded {
            accused,
            votes,
            quorum,
        }) => {
            app.registry.persist(shared).await;
            app.registry.notify(guild_id).await;
            Reply::AccusationRecorded {
                accused_id: accused.to_string(),
                votes,
                quorum,
            }
        }
        Ok(AccuseOutcome::Resolved(summary)) => {
            app.registry.persist(shared).await;
            app.registry.notify(guild_id).await;
            let game = shared.lock().await;
            let case = game.case();
            let accused_id = summary
                .accused
                .map(|s| s.to_string())
                .unwrap_or_default();
            Reply::VoteResolved {
                accused_name: case
                    .find_suspect(&accused_id)
                    .map(|s| s.name.clone())
                    .unwrap_or_else(|| accused_id.clone()),
                accused_id,
                correct: summary.correct.unwrap_or(false),
                killer_id: case.solution.killer.to_string(),
                killer_name: case
                    .killer()
                    .map(|k| k.name.clone())
                    .unwrap_or_else(|| case.solution.killer.to_string()),
                motive: case.solution.motive.clone(),
            }
        }
    }
}

async fn generate(
    app: &Arc<App>,
    theme: Option<String>,
    difficulty: Option<String>,
    seed: Option<String>,
) -> Reply {
    let difficulty = match difficulty
        .as_deref()
        .map(Difficulty::from_str)
        .transpose()
    {
        Ok(d) => d.unwrap_or_default(),
        Err(e) => {
            return Reply::rejected(RejectReason::CaseInvalid {
                case_id: String::new(),
                issues: vec![e.to_string()],
            })
        }
    };
    let seed = seed.unwrap_or_else(|| format!("{:08x}", rand::random::<u32>()));
    let config = BuildConfig {
        seed,
        difficulty,
        theme,
        use_llm: false,
    };

    let builder = CaseBuilder::new(Some(app.llm.clone()));
    let case = match builder
        .build(&config, |stage, detail| {
            tracing::info!(stage = %stage, detail, "Case build progress");
        })
        .await
    {
        Ok(case) => case,
        Err(e) => {
            tracing::warn!(error = %e, "Case generation failed");
            return Reply::rejected(RejectReason::CaseInvalid {
                case_id: String::new(),
                issues: vec![e.to_string()],
            });
        }
    };

    let report = verifier::verify(&case);
    let issues = validator::validate(&case, case.id.as_str());
    if let Err(e) = app.cases.save(&case) {
        tracing::error!(case_id = %case.id, error = %e, "Failed to write generated case");
        return Reply::rejected(RejectReason::CaseInvalid {
            case_id: case.id.to_string(),
            issues: vec![e.to_string()],
        });
    }
    tracing::info!(case_id = %case.id, score = report.score, "Generated case saved");

    Reply::Generated {
        case_id: case.id.to_string(),
        score: report.score,
        issues: issues.into_iter().map(|i| i.message).collect(),
    }
}
