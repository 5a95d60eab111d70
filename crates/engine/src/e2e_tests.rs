//! End-to-end tests driving the engine through the command surface, with a
//! real SQLite file and a mocked LLM.

use std::path::Path;
use std::sync::Arc;

use sqlx::SqlitePool;

use gumshoe_domain::{EndReason, GuildId, PlayerId};
use gumshoe_protocol::{Command, RejectReason, Reply};

use crate::app::App;
use crate::authoring::test_support::sample_case;
use crate::commands::dispatch;
use crate::infrastructure::case_store::CaseStore;
use crate::infrastructure::clock::SystemClock;
use crate::infrastructure::persistence::SqliteGameRepo;
use crate::infrastructure::ports::{LlmResponse, MockLlmPort};

async fn test_app(dir: &Path) -> Arc<App> {
    let cases = Arc::new(CaseStore::new(dir.join("cases")));
    cases.save(&sample_case()).expect("seed case");

    let db = dir.join("games.db");
    let pool = SqlitePool::connect(&format!("sqlite://{}?mode=rwc", db.display()))
        .await
        .expect("pool");
    let repo = Arc::new(SqliteGameRepo::new(pool).await.expect("schema"));

    let mut llm = MockLlmPort::new();
    llm.expect_generate().returning(|_| {
        Ok(LlmResponse {
            content: "The nerve of you, waving that about.".into(),
        })
    });

    Arc::new(App::new(repo, cases, Arc::new(llm), Arc::new(SystemClock)))
}

fn guild() -> GuildId {
    GuildId::new("guild-1")
}

fn p(id: &str) -> PlayerId {
    PlayerId::new(id)
}

async fn run(app: &Arc<App>, player: &str, command: Command) -> Reply {
    dispatch(app, guild(), p(player), command).await
}

fn start_cmd() -> Command {
    Command::Start {
        case_id: "blackwood_manor".into(),
        time_override_minutes: Some(10),
    }
}

#[tokio::test]
async fn commands_without_a_game_are_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let app = test_app(dir.path()).await;
    let reply = run(&app, "p1", Command::Status).await;
    assert_eq!(
        reply,
        Reply::rejected(RejectReason::NoActiveGame),
        "status with no game"
    );
}

#[tokio::test]
async fn starting_twice_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let app = test_app(dir.path()).await;
    assert!(matches!(
        run(&app, "p1", start_cmd()).await,
        Reply::Started { .. }
    ));
    assert!(matches!(
        run(&app, "p2", start_cmd()).await,
        Reply::Rejected {
            reason: RejectReason::GameAlreadyRunning { .. }
        }
    ));
}

#[tokio::test]
async fn starting_an_unknown_case_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let app = test_app(dir.path()).await;
    let reply = run(
        &app,
        "p1",
        Command::Start {
            case_id: "ghost_case".into(),
            time_override_minutes: None,
        },
    )
    .await;
    assert!(matches!(
        reply,
        Reply::Rejected {
            reason: RejectReason::CaseNotFound { .. }
        }
    ));
}

#[tokio::test]
async fn full_investigation_resolves_by_quorum() {
    let dir = tempfile::tempdir().expect("tempdir");
    let app = test_app(dir.path()).await;

    assert!(matches!(
        run(&app, "p1", start_cmd()).await,
        Reply::Started { points: 100, .. }
    ));
    assert!(matches!(
        run(&app, "p2", Command::Join).await,
        Reply::Joined {
            participant_count: 2
        }
    ));
    assert!(matches!(
        run(&app, "p3", Command::Join).await,
        Reply::Joined {
            participant_count: 3
        }
    ));

    // p1 works the scene
    let reply = run(
        &app,
        "p1",
        Command::Dna {
            location: "study".into(),
        },
    )
    .await;
    assert!(
        matches!(&reply, Reply::EvidenceRevealed { id, points_remaining: 80, .. } if id == "dna_study"),
        "unexpected reply: {reply:?}"
    );

    let reply = run(
        &app,
        "p1",
        Command::Search {
            location: "study".into(),
        },
    )
    .await;
    assert!(matches!(&reply, Reply::SearchResults { items, .. } if items.len() == 1));

    // confront the butler in the study with the mocked voice line
    let reply = run(
        &app,
        "p1",
        Command::Present {
            evidence: "dna_study".into(),
            suspect: "butler".into(),
        },
    )
    .await;
    match &reply {
        Reply::SuspectResponse { dialogue, composure, .. } => {
            assert_eq!(dialogue, "The nerve of you, waving that about.");
            assert!(*composure < 100);
        }
        other => panic!("unexpected reply: {other:?}"),
    }

    // 3 participants -> quorum 2; the second accusation resolves the vote
    assert!(matches!(
        run(
            &app,
            "p1",
            Command::Accuse {
                suspect: "butler".into()
            }
        )
        .await,
        Reply::AccusationRecorded {
            votes: 1,
            quorum: 2,
            ..
        }
    ));
    let reply = run(
        &app,
        "p2",
        Command::Accuse {
            suspect: "butler".into(),
        },
    )
    .await;
    match &reply {
        Reply::VoteResolved {
            correct,
            killer_id,
            ..
        } => {
            assert!(*correct);
            assert_eq!(killer_id, "butler");
        }
        other => panic!("unexpected reply: {other:?}"),
    }

    // the game is over; tools now reject
    assert!(matches!(
        run(
            &app,
            "p1",
            Command::Dna {
                location: "hall".into()
            }
        )
        .await,
        Reply::Rejected {
            reason: RejectReason::WrongPhase { .. }
        }
    ));

    // and the finished game can be cleaned up
    assert_eq!(run(&app, "p1", Command::Cleanup).await, Reply::CleanedUp);
    assert_eq!(
        run(&app, "p1", Command::Status).await,
        Reply::rejected(RejectReason::NoActiveGame)
    );
}

#[tokio::test]
async fn cleanup_while_running_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let app = test_app(dir.path()).await;
    run(&app, "p1", start_cmd()).await;
    assert_eq!(
        run(&app, "p1", Command::Cleanup).await,
        Reply::rejected(RejectReason::GameStillRunning)
    );
}

#[tokio::test]
async fn manual_end_is_idempotent_against_the_timer() {
    let dir = tempfile::tempdir().expect("tempdir");
    let app = test_app(dir.path()).await;
    run(&app, "p1", start_cmd()).await;

    assert!(matches!(
        run(&app, "p1", Command::End).await,
        Reply::Ended {
            reason: EndReason::Manual
        }
    ));
    // a second end finds nothing left to finalize
    assert!(matches!(
        run(&app, "p1", Command::End).await,
        Reply::Rejected {
            reason: RejectReason::WrongPhase { .. }
        }
    ));
}

#[tokio::test]
async fn games_restore_across_restart() {
    let dir = tempfile::tempdir().expect("tempdir");
    let app = test_app(dir.path()).await;
    run(&app, "p1", start_cmd()).await;
    run(
        &app,
        "p1",
        Command::Dna {
            location: "study".into(),
        },
    )
    .await;
    drop(app);

    // a fresh process over the same database picks the game back up
    let app = test_app(dir.path()).await;
    app.registry.restore_games().await;
    let reply = run(&app, "p1", Command::Status).await;
    match &reply {
        Reply::StatusReport { state } => {
            assert_eq!(state.points, 80);
            assert!(state
                .discovered_evidence
                .contains(&"dna_study".to_string()));
            assert_eq!(state.participant_count, 1);
        }
        other => panic!("unexpected reply: {other:?}"),
    }
}

#[tokio::test]
async fn generate_writes_a_playable_case() {
    let dir = tempfile::tempdir().expect("tempdir");
    let app = test_app(dir.path()).await;
    let reply = run(
        &app,
        "p1",
        Command::Generate {
            theme: Some("manor".into()),
            difficulty: Some("medium".into()),
            seed: Some("e2e-seed".into()),
        },
    )
    .await;
    let case_id = match &reply {
        Reply::Generated { case_id, score, .. } => {
            assert_eq!(*score, 100);
            case_id.clone()
        }
        other => panic!("unexpected reply: {other:?}"),
    };

    // the generated case starts cleanly
    let reply = run(
        &app,
        "p1",
        Command::Start {
            case_id,
            time_override_minutes: Some(5),
        },
    )
    .await;
    assert!(matches!(reply, Reply::Started { .. }));
}
