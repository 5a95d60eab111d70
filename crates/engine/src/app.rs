//! Application state and composition.

use std::sync::Arc;

use crate::api::ConnectionManager;
use crate::game::GameRegistry;
use crate::infrastructure::case_store::CaseStore;
use crate::infrastructure::ports::{ClockPort, GameRepo, LlmPort};

/// Main application state.
///
/// Owns the per-guild game registry and the shared infrastructure, and is
/// passed to HTTP/WebSocket handlers via Axum state. There are no process
/// globals; everything hangs off this struct.
pub struct App {
    pub registry: Arc<GameRegistry>,
    pub connections: Arc<ConnectionManager>,
    pub cases: Arc<CaseStore>,
    pub llm: Arc<dyn LlmPort>,
    pub clock: Arc<dyn ClockPort>,
}

impl App {
    /// Create a new App with all dependencies wired up.
    pub fn new(
        repo: Arc<dyn GameRepo>,
        cases: Arc<CaseStore>,
        llm: Arc<dyn LlmPort>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        let connections = Arc::new(ConnectionManager::new());
        let registry = Arc::new(GameRegistry::new(
            repo,
            cases.clone(),
            clock.clone(),
            connections.clone(),
        ));
        Self {
            registry,
            connections,
            cases,
            llm,
            clock,
        }
    }
}
