pub mod board;
pub mod events;
pub mod registry;
pub mod session;
pub mod state_machine;
pub mod win;

use std::sync::Arc;

use axum::extract::ws::Message;
use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::warn;

use crate::{
    config::AppConfig,
    dto::ws::ServerMessage,
    services::websocket_service::send_message_to_websocket,
    state::{
        events::{ConnectionId, Outbound},
        registry::SessionRegistry,
    },
};

pub type SharedState = Arc<AppState>;

#[derive(Clone)]
/// Handle used to push messages to a connected player.
pub struct PlayerConnection {
    pub id: ConnectionId,
    pub tx: mpsc::UnboundedSender<Message>,
}

/// Central application state: configuration, rooms and live sockets.
pub struct AppState {
    config: Arc<AppConfig>,
    registry: SessionRegistry,
    connections: DashMap<ConnectionId, PlayerConnection>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    pub fn new(config: AppConfig) -> SharedState {
        Arc::new(Self {
            registry: SessionRegistry::new(config.max_rooms()),
            config: Arc::new(config),
            connections: DashMap::new(),
        })
    }

    /// Shared immutable configuration.
    pub fn config(&self) -> Arc<AppConfig> {
        Arc::clone(&self.config)
    }

    /// Registry of active rooms.
    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// Registry of active player sockets keyed by their connection identifier.
    pub fn connections(&self) -> &DashMap<ConnectionId, PlayerConnection> {
        &self.connections
    }

    /// Push a single message to one connection, dropping it if the socket is gone.
    pub fn send_to(&self, connection_id: &ConnectionId, message: &ServerMessage) {
        let Some(connection) = self.connections.get(connection_id) else {
            warn!(%connection_id, "cannot send: connection not registered");
            return;
        };
        let tx = connection.tx.clone();
        drop(connection);

        if send_message_to_websocket(&tx, message).is_err() {
            warn!(%connection_id, "send failed (writer closed), removing connection");
            self.connections.remove(connection_id);
        }
    }

    /// Fan the events produced by a session out to their recipients.
    pub fn deliver(&self, outbound: Vec<Outbound>) {
        for Outbound { recipients, event } in outbound {
            let message = ServerMessage::from(event);
            for recipient in &recipients {
                self.send_to(recipient, &message);
            }
        }
    }
}
