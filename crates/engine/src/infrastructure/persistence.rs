//! SQLite persistence for game rows.
//!
//! One row per guild, upserted on every state-changing operation and read
//! back only by `restore_games` at startup.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use gumshoe_domain::GuildId;

use crate::infrastructure::ports::{GameRepo, GameRow, RepoError};

pub struct SqliteGameRepo {
    pool: SqlitePool,
}

impl SqliteGameRepo {
    pub async fn new(pool: SqlitePool) -> Result<Self, sqlx::Error> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS games (
                guild_id TEXT PRIMARY KEY,
                case_id TEXT NOT NULL,
                category_id TEXT,
                role_id TEXT,
                points INTEGER NOT NULL,
                phase TEXT NOT NULL,
                started_at TIMESTAMP NOT NULL,
                ends_at TIMESTAMP NOT NULL,
                participants TEXT NOT NULL,
                used_tools TEXT NOT NULL,
                updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&pool)
        .await?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

type RowTuple = (
    String,         // guild_id
    String,         // case_id
    Option<String>, // category_id
    Option<String>, // role_id
    i64,            // points
    String,         // phase
    DateTime<Utc>,  // started_at
    DateTime<Utc>,  // ends_at
    String,         // participants (JSON)
    String,         // used_tools (JSON)
);

fn row_from_tuple(t: RowTuple) -> Result<GameRow, RepoError> {
    let (guild_id, case_id, category_id, role_id, points, phase, started_at, ends_at, parts, tools) =
        t;
    let corrupt = |detail: String| RepoError::CorruptRow {
        guild_id: guild_id.clone(),
        detail,
    };
    let participants: Vec<String> = serde_json::from_str(&parts)
        .map_err(|e| corrupt(format!("participants column: {e}")))?;
    let used_tools: Vec<String> =
        serde_json::from_str(&tools).map_err(|e| corrupt(format!("used_tools column: {e}")))?;
    let points =
        u32::try_from(points).map_err(|_| corrupt(format!("negative points: {points}")))?;
    Ok(GameRow {
        guild_id,
        case_id,
        category_id,
        role_id,
        points,
        phase,
        started_at,
        ends_at,
        participants,
        used_tools,
    })
}

#[async_trait]
impl GameRepo for SqliteGameRepo {
    async fn upsert(&self, row: &GameRow) -> Result<(), RepoError> {
        let participants = serde_json::to_string(&row.participants)
            .map_err(|e| RepoError::Database(e.to_string()))?;
        let used_tools = serde_json::to_string(&row.used_tools)
            .map_err(|e| RepoError::Database(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT OR REPLACE INTO games
                (guild_id, case_id, category_id, role_id, points, phase,
                 started_at, ends_at, participants, used_tools, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, CURRENT_TIMESTAMP)
            "#,
        )
        .bind(&row.guild_id)
        .bind(&row.case_id)
        .bind(&row.category_id)
        .bind(&row.role_id)
        .bind(i64::from(row.points))
        .bind(&row.phase)
        .bind(row.started_at)
        .bind(row.ends_at)
        .bind(participants)
        .bind(used_tools)
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        Ok(())
    }

    async fn delete(&self, guild_id: &GuildId) -> Result<(), RepoError> {
        sqlx::query("DELETE FROM games WHERE guild_id = ?")
            .bind(guild_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;
        Ok(())
    }

    async fn list_active(&self) -> Result<Vec<GameRow>, RepoError> {
        let tuples: Vec<RowTuple> = sqlx::query_as(
            r#"
            SELECT guild_id, case_id, category_id, role_id, points, phase,
                   started_at, ends_at, participants, used_tools
            FROM games
            WHERE phase != 'ended'
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        // A corrupt row must not take restore down with it: surface it to the
        // caller as a skip, keep the rest.
        let mut rows = Vec::with_capacity(tuples.len());
        for tuple in tuples {
            match row_from_tuple(tuple) {
                Ok(row) => rows.push(row),
                Err(e) => tracing::warn!(error = %e, "Skipping corrupt game row"),
            }
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn repo() -> SqliteGameRepo {
        let pool = SqlitePool::connect("sqlite::memory:")
            .await
            .expect("in-memory pool");
        SqliteGameRepo::new(pool).await.expect("schema")
    }

    fn sample_row(guild: &str, phase: &str) -> GameRow {
        GameRow {
            guild_id: guild.to_string(),
            case_id: "manor_murder".to_string(),
            category_id: Some("123".to_string()),
            role_id: None,
            points: 80,
            phase: phase.to_string(),
            started_at: Utc::now(),
            ends_at: Utc::now() + chrono::Duration::minutes(10),
            participants: vec!["p1".to_string(), "p2".to_string()],
            used_tools: vec!["dna:study".to_string()],
        }
    }

    #[tokio::test]
    async fn upsert_then_list_round_trips() {
        let repo = repo().await;
        let row = sample_row("g1", "investigating");
        repo.upsert(&row).await.expect("upsert");

        let rows = repo.list_active().await.expect("list");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].participants, row.participants);
        assert_eq!(rows[0].points, 80);
    }

    #[tokio::test]
    async fn ended_games_are_not_restored() {
        let repo = repo().await;
        repo.upsert(&sample_row("g1", "ended")).await.expect("upsert");
        repo.upsert(&sample_row("g2", "investigating"))
            .await
            .expect("upsert");

        let rows = repo.list_active().await.expect("list");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].guild_id, "g2");
    }

    #[tokio::test]
    async fn corrupt_rows_are_skipped_not_fatal() {
        let repo = repo().await;
        repo.upsert(&sample_row("good", "investigating"))
            .await
            .expect("upsert");
        sqlx::query(
            "INSERT INTO games (guild_id, case_id, points, phase, started_at, ends_at, participants, used_tools)
             VALUES ('bad', 'c', 10, 'investigating', ?, ?, 'not json', '[]')",
        )
        .bind(Utc::now())
        .bind(Utc::now())
        .execute(repo.pool())
        .await
        .expect("raw insert");

        let rows = repo.list_active().await.expect("list");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].guild_id, "good");
    }

    #[tokio::test]
    async fn delete_removes_the_row() {
        let repo = repo().await;
        repo.upsert(&sample_row("g1", "investigating"))
            .await
            .expect("upsert");
        repo.delete(&GuildId::new("g1")).await.expect("delete");
        assert!(repo.list_active().await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn upsert_replaces_existing_row() {
        let repo = repo().await;
        let mut row = sample_row("g1", "investigating");
        repo.upsert(&row).await.expect("upsert");
        row.points = 20;
        repo.upsert(&row).await.expect("second upsert");

        let rows = repo.list_active().await.expect("list");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].points, 20);
    }
}
