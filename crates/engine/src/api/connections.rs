//! Connection management for dashboard WebSocket clients.
//!
//! Tracks connected dashboards and which guild each one watches. The
//! dashboard is a passive observer; there are no roles to arbitrate.

use std::collections::HashMap;

use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

use gumshoe_domain::GuildId;
use gumshoe_protocol::ServerMessage;

/// Information about a connected client.
#[derive(Debug, Clone)]
pub struct ConnectionInfo {
    /// Unique ID for this connection
    pub connection_id: Uuid,
    /// The guild this connection watches (if subscribed)
    pub guild_id: Option<GuildId>,
}

/// Manages all active WebSocket connections.
pub struct ConnectionManager {
    /// Map of connection_id -> (ConnectionInfo, sender channel)
    connections: RwLock<HashMap<Uuid, (ConnectionInfo, mpsc::Sender<ServerMessage>)>>,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Register a new connection.
    pub async fn register(&self, connection_id: Uuid, sender: mpsc::Sender<ServerMessage>) {
        let info = ConnectionInfo {
            connection_id,
            guild_id: None,
        };
        let mut connections = self.connections.write().await;
        connections.insert(connection_id, (info, sender));
        tracing::debug!(connection_id = %connection_id, "Connection registered");
    }

    /// Unregister a connection.
    pub async fn unregister(&self, connection_id: Uuid) {
        let mut connections = self.connections.write().await;
        if connections.remove(&connection_id).is_some() {
            tracing::debug!(connection_id = %connection_id, "Connection unregistered");
        }
    }

    /// Point a connection at a guild's game.
    pub async fn subscribe(&self, connection_id: Uuid, guild_id: GuildId) {
        let mut connections = self.connections.write().await;
        if let Some((info, _)) = connections.get_mut(&connection_id) {
            tracing::info!(
                connection_id = %connection_id,
                guild_id = %guild_id,
                "Connection subscribed to guild"
            );
            info.guild_id = Some(guild_id);
        }
    }

    /// Broadcast a message to every connection watching a guild.
    pub async fn broadcast_to_guild(&self, guild_id: &GuildId, message: ServerMessage) {
        let connections = self.connections.read().await;
        for (info, sender) in connections.values() {
            if info.guild_id.as_ref() == Some(guild_id) {
                if let Err(e) = sender.try_send(message.clone()) {
                    tracing::warn!(
                        connection_id = %info.connection_id,
                        error = %e,
                        "Failed to broadcast message"
                    );
                }
            }
        }
    }

    /// Number of live connections, for the health endpoint.
    pub async fn count(&self) -> usize {
        self.connections.read().await.len()
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}
