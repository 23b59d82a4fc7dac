use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{Instant, timeout_at},
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    dto::ws::{ClientMessage, ServerMessage},
    services::session_service,
    state::{PlayerConnection, SharedState, session::SessionError},
};

/// Failure to hand a frame to the writer task.
#[derive(Debug, Error)]
pub enum SocketError {
    /// Writer channel closed - connection should be terminated immediately.
    #[error("connection closed")]
    ConnectionClosed,
}

/// Handle the full lifecycle for an individual player WebSocket connection.
pub async fn handle_socket(state: SharedState, socket: WebSocket) {
    let (mut sender, mut receiver) = socket.split();
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<Message>();

    // Dedicated writer task keeps outbound messages flowing even while we await inbound frames.
    let writer_task = tokio::spawn(async move {
        while let Some(message) = outbound_rx.recv().await {
            if sender.send(message).await.is_err() {
                break;
            }
        }
    });

    let connection_id = Uuid::new_v4();
    state.connections().insert(
        connection_id,
        PlayerConnection {
            id: connection_id,
            tx: outbound_tx.clone(),
        },
    );
    info!(%connection_id, "player connected");

    if send_message_to_websocket(&outbound_tx, &ServerMessage::Connected { connection_id })
        .is_err()
    {
        state.connections().remove(&connection_id);
        finalize(writer_task, outbound_tx).await;
        return;
    }

    let join_deadline = Instant::now() + state.config().join_timeout();
    let mut has_joined = false;

    loop {
        let next = if has_joined {
            receiver.next().await
        } else {
            match timeout_at(join_deadline, receiver.next()).await {
                Ok(next) => next,
                Err(_) => {
                    warn!(%connection_id, "no room joined before timeout; closing");
                    let _ = outbound_tx.send(Message::Close(None));
                    break;
                }
            }
        };
        let Some(message) = next else {
            break;
        };

        match message {
            Ok(Message::Text(text)) => {
                debug!(%connection_id, payload = %text.as_str(), "received player message");

                let result = match ClientMessage::from_json_str(text.as_str()) {
                    Ok(msg) => {
                        session_service::handle_client_message(&state, connection_id, msg).await
                    }
                    Err(err) => Err(SessionError::InvalidRequest(format!(
                        "malformed message: {err}"
                    ))),
                };
                if let Err(err) = result {
                    session_service::reject(&state, connection_id, &err);
                }

                if !has_joined {
                    has_joined = state.registry().room_of(&connection_id).is_some();
                }
            }
            Ok(Message::Ping(payload)) => {
                let _ = outbound_tx.send(Message::Pong(payload));
            }
            Ok(Message::Close(frame)) => {
                info!(%connection_id, "player closed");
                let _ = outbound_tx.send(Message::Close(frame));
                break;
            }
            Ok(Message::Binary(_)) => {}
            Ok(Message::Pong(_)) => {}
            Err(err) => {
                warn!(%connection_id, error = %err, "websocket error");
                break;
            }
        }
    }

    session_service::disconnect(&state, connection_id).await;
    state.connections().remove(&connection_id);
    info!(%connection_id, "player disconnected");

    finalize(writer_task, outbound_tx).await;
}

/// Serialize a payload and push it onto the provided WebSocket sender.
///
/// Returns `Ok(())` if the message was queued or if serialization failed
/// (permanent error, no point retrying). Returns
/// `Err(SocketError::ConnectionClosed)` if the writer channel is closed.
pub fn send_message_to_websocket<T>(
    tx: &mpsc::UnboundedSender<Message>,
    value: &T,
) -> Result<(), SocketError>
where
    T: ?Sized + serde::Serialize + std::fmt::Debug,
{
    let payload = match serde_json::to_string(value) {
        Ok(p) => p,
        Err(err) => {
            warn!(error = %err, "failed to serialize message `{value:?}` (permanent error, not retrying)");
            return Ok(());
        }
    };

    tx.send(Message::Text(payload.into()))
        .map_err(|_| SocketError::ConnectionClosed)
}

/// Ensure the writer task winds down before we return from the socket handler.
async fn finalize(writer_task: JoinHandle<()>, outbound_tx: mpsc::UnboundedSender<Message>) {
    drop(outbound_tx);
    let _ = writer_task.await;
}
