//! Gumshoe Protocol - types shared between the engine and its consumers.
//!
//! Two consumers speak these types:
//! - the chat-platform command layer ([`Command`] in, [`Reply`] out)
//! - the dashboard WebSocket ([`ClientMessage`] in, [`ServerMessage`] out)
//!
//! # Design Principles
//!
//! 1. **Minimal dependencies** - serde, serde_json, thiserror, and the domain
//!    vocabulary types only
//! 2. **No business logic** - pure data and serialization
//! 3. **Platform-agnostic** - nothing here knows about Discord, HTTP, or any
//!    particular transport

pub mod commands;
pub mod messages;
pub mod replies;

pub use commands::Command;
pub use messages::{ClientMessage, DashboardState, ServerMessage, SuspectView};
pub use replies::{FoundItem, RejectReason, Reply, RevealedSecret, SuspectSummary};
