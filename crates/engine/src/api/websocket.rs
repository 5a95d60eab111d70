//! WebSocket handling for dashboard connections.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use uuid::Uuid;

use gumshoe_domain::GuildId;
use gumshoe_protocol::{ClientMessage, ServerMessage};

use crate::app::App;

/// Buffer size for per-connection message channel.
const CONNECTION_CHANNEL_BUFFER: usize = 256;

/// WebSocket upgrade handler - entry point for new connections.
pub async fn ws_handler(ws: WebSocketUpgrade, State(app): State<Arc<App>>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, app))
}

/// Handle an individual WebSocket connection.
async fn handle_socket(socket: WebSocket, app: Arc<App>) {
    let (mut ws_sender, mut ws_receiver) = socket.split();

    let connection_id = Uuid::new_v4();
    let (tx, mut rx) = mpsc::channel::<ServerMessage>(CONNECTION_CHANNEL_BUFFER);

    app.connections.register(connection_id, tx.clone()).await;
    tracing::info!(connection_id = %connection_id, "Dashboard connection established");

    // Forward queued messages out to the socket
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if let Ok(json) = serde_json::to_string(&msg) {
                if ws_sender.send(Message::Text(json.into())).await.is_err() {
                    break;
                }
            }
        }
    });

    while let Some(result) = ws_receiver.next().await {
        match result {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(msg) => handle_message(msg, &app, connection_id, &tx).await,
                Err(e) => {
                    tracing::warn!(connection_id = %connection_id, error = %e, "Failed to parse message");
                    let _ = tx.try_send(ServerMessage::Error {
                        code: "PARSE_ERROR".to_string(),
                        message: format!("Invalid message format: {e}"),
                    });
                }
            },
            Ok(Message::Ping(_)) => {
                let _ = tx.try_send(ServerMessage::Pong);
            }
            Ok(Message::Close(_)) => {
                tracing::info!(connection_id = %connection_id, "WebSocket closed by client");
                break;
            }
            Err(e) => {
                tracing::error!(connection_id = %connection_id, error = %e, "WebSocket error");
                break;
            }
            _ => {}
        }
    }

    app.connections.unregister(connection_id).await;
    send_task.abort();
    tracing::info!(connection_id = %connection_id, "Dashboard connection closed");
}

async fn handle_message(
    msg: ClientMessage,
    app: &Arc<App>,
    connection_id: Uuid,
    tx: &mpsc::Sender<ServerMessage>,
) {
    match msg {
        ClientMessage::Subscribe { guild_id } => {
            let guild = GuildId::new(guild_id.clone());
            app.connections.subscribe(connection_id, guild.clone()).await;
            // Send the current snapshot right away so the dashboard does not
            // wait for the next state change.
            if let Some(shared) = app.registry.get(&guild) {
                let state = {
                    let game = shared.lock().await;
                    game.dashboard_state(app.clock.now())
                };
                let _ = tx.try_send(ServerMessage::GameState {
                    guild_id,
                    state,
                });
            }
        }
        ClientMessage::Heartbeat => {
            let _ = tx.try_send(ServerMessage::Pong);
        }
        ClientMessage::Unknown => {
            tracing::debug!(connection_id = %connection_id, "Ignoring unknown client message");
        }
    }
}
