//! Port traits for external dependencies.
//!
//! Everything effectful the engine needs from outside crosses one of these
//! seams, so tests can mock it and adapters can be swapped.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use gumshoe_domain::GuildId;

// =============================================================================
// LLM
// =============================================================================

/// Role of a message in an LLM conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

/// One turn of conversation context.
#[derive(Debug, Clone)]
pub struct LlmMessage {
    pub role: MessageRole,
    pub content: String,
}

/// A text-generation request.
#[derive(Debug, Clone, Default)]
pub struct LlmRequest {
    pub system_prompt: String,
    pub messages: Vec<LlmMessage>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

/// A text-generation result.
#[derive(Debug, Clone)]
pub struct LlmResponse {
    pub content: String,
}

#[derive(Debug, Clone, Error)]
pub enum LlmError {
    #[error("LLM request failed: {0}")]
    RequestFailed(String),
    #[error("LLM returned an invalid response: {0}")]
    InvalidResponse(String),
}

/// Text generation used to voice suspects and enrich generated cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LlmPort: Send + Sync {
    async fn generate(&self, request: LlmRequest) -> Result<LlmResponse, LlmError>;
}

// =============================================================================
// Game-row persistence
// =============================================================================

/// The persisted shape of a running game: a crash-recovery cache keyed by
/// guild, not a journal. In-memory state stays authoritative while a game
/// is live.
#[derive(Debug, Clone, PartialEq)]
pub struct GameRow {
    pub guild_id: String,
    pub case_id: String,
    /// Platform resource ids, opaque to the engine.
    pub category_id: Option<String>,
    pub role_id: Option<String>,
    pub points: u32,
    pub phase: String,
    pub started_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub participants: Vec<String>,
    pub used_tools: Vec<String>,
}

#[derive(Debug, Clone, Error)]
pub enum RepoError {
    #[error("Database error: {0}")]
    Database(String),
    #[error("Corrupt row for guild {guild_id}: {detail}")]
    CorruptRow { guild_id: String, detail: String },
}

/// Durable storage for game rows.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GameRepo: Send + Sync {
    /// Insert or replace the row for its guild.
    async fn upsert(&self, row: &GameRow) -> Result<(), RepoError>;
    /// Remove a guild's row, if any.
    async fn delete(&self, guild_id: &GuildId) -> Result<(), RepoError>;
    /// All rows whose phase is not `ended`, for restore at startup.
    async fn list_active(&self) -> Result<Vec<GameRow>, RepoError>;
}

// =============================================================================
// Clock
// =============================================================================

/// Wall-clock seam so timer logic is testable.
pub trait ClockPort: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
