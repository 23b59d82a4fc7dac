use tracing::{info, warn};

use crate::{
    dto::{
        validation::{validate_display_name, validate_room_id},
        ws::{ClientMessage, ServerMessage},
    },
    state::{
        SharedState,
        events::ConnectionId,
        session::SessionError,
    },
};

/// Apply one inbound intent and deliver the resulting events.
///
/// A rejected intent is returned untouched so the caller can notify the
/// sender; nothing is delivered in that case.
pub async fn handle_client_message(
    state: &SharedState,
    connection_id: ConnectionId,
    message: ClientMessage,
) -> Result<(), SessionError> {
    let registry = state.registry();
    let outbound = match message {
        ClientMessage::JoinRoom { name, room_id } => {
            let name = name.trim();
            validate_display_name(name, state.config().max_name_length())
                .map_err(|err| SessionError::InvalidRequest(err.to_string()))?;
            validate_room_id(&room_id)
                .map_err(|err| SessionError::InvalidRequest(err.to_string()))?;
            registry.join(connection_id, &room_id, name).await?
        }
        ClientMessage::SubmitBoard { room_id, board } => {
            registry
                .submit_board(connection_id, &room_id, &board)
                .await?
        }
        ClientMessage::MakeMove { room_id, number } => {
            registry.make_move(connection_id, &room_id, number).await?
        }
        ClientMessage::PlayAgain { room_id } => {
            registry.request_rematch(connection_id, &room_id).await?
        }
        ClientMessage::LeaveRoom { room_id } => match registry.room_of(&connection_id) {
            Some(current) if current == room_id => {
                info!(%connection_id, %room_id, "player left room");
                registry.leave(connection_id).await
            }
            Some(_) => return Err(SessionError::RoomNotFound(room_id)),
            None => return Err(SessionError::NotInRoom),
        },
        ClientMessage::Unknown => {
            return Err(SessionError::InvalidRequest(
                "unsupported message type".into(),
            ));
        }
    };

    state.deliver(outbound);
    Ok(())
}

/// Tell the sender why its intent was rejected.
pub fn reject(state: &SharedState, connection_id: ConnectionId, err: &SessionError) {
    warn!(%connection_id, error = %err, "rejected player intent");
    state.send_to(&connection_id, &ServerMessage::error(err));
}

/// Dissolve whatever room the connection was in and notify the other player.
pub async fn disconnect(state: &SharedState, connection_id: ConnectionId) {
    let outbound = state.registry().leave(connection_id).await;
    state.deliver(outbound);
}

#[cfg(test)]
mod tests {
    use axum::extract::ws::Message;
    use tokio::sync::mpsc;
    use uuid::Uuid;

    use super::*;
    use crate::{
        config::AppConfig,
        state::{AppState, PlayerConnection, state_machine::SessionPhase},
    };

    fn connect(state: &SharedState) -> (ConnectionId, mpsc::UnboundedReceiver<Message>) {
        let id = Uuid::new_v4();
        let (tx, rx) = mpsc::unbounded_channel();
        state.connections().insert(id, PlayerConnection { id, tx });
        (id, rx)
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<Message>) -> Vec<ServerMessage> {
        let mut out = Vec::new();
        while let Ok(Message::Text(text)) = rx.try_recv() {
            out.push(serde_json::from_str(text.as_str()).unwrap());
        }
        out
    }

    fn join(name: &str, room: &str) -> ClientMessage {
        ClientMessage::JoinRoom {
            name: name.into(),
            room_id: room.into(),
        }
    }

    #[tokio::test]
    async fn join_broadcasts_roster() {
        let state = AppState::new(AppConfig::default());
        let (a, mut rx_a) = connect(&state);
        let (b, mut rx_b) = connect(&state);

        handle_client_message(&state, a, join("A", "42")).await.unwrap();
        handle_client_message(&state, b, join(" B ", "42")).await.unwrap();

        let expected = ServerMessage::PlayerJoined {
            count: 2,
            players: vec!["A".into(), "B".into()],
        };
        assert_eq!(drain(&mut rx_a).last(), Some(&expected));
        assert_eq!(drain(&mut rx_b), vec![expected]);
    }

    #[tokio::test]
    async fn blank_or_long_names_are_rejected() {
        let state = AppState::new(AppConfig::default());
        let (a, _rx) = connect(&state);

        let err = handle_client_message(&state, a, join("  ", "42"))
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::InvalidRequest(_)));

        let long = "x".repeat(state.config().max_name_length() + 1);
        assert!(handle_client_message(&state, a, join(&long, "42")).await.is_err());
        assert!(!state.registry().contains_room("42"));
    }

    #[tokio::test]
    async fn unknown_messages_are_rejected() {
        let state = AppState::new(AppConfig::default());
        let (a, _rx) = connect(&state);
        let err = handle_client_message(&state, a, ClientMessage::Unknown)
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn leave_room_requires_matching_room() {
        let state = AppState::new(AppConfig::default());
        let (a, _rx_a) = connect(&state);
        let (b, mut rx_b) = connect(&state);
        handle_client_message(&state, a, join("A", "42")).await.unwrap();
        handle_client_message(&state, b, join("B", "42")).await.unwrap();

        let wrong = ClientMessage::LeaveRoom {
            room_id: "7".into(),
        };
        assert_eq!(
            handle_client_message(&state, a, wrong).await.unwrap_err(),
            SessionError::RoomNotFound("7".into())
        );

        drain(&mut rx_b);
        let leave = ClientMessage::LeaveRoom {
            room_id: "42".into(),
        };
        handle_client_message(&state, a, leave).await.unwrap();
        assert_eq!(drain(&mut rx_b), vec![ServerMessage::OpponentLeft]);
        assert!(!state.registry().contains_room("42"));
    }

    #[tokio::test]
    async fn reject_sends_error_to_sender_only() {
        let state = AppState::new(AppConfig::default());
        let (a, mut rx_a) = connect(&state);
        let (b, mut rx_b) = connect(&state);
        handle_client_message(&state, a, join("A", "42")).await.unwrap();
        handle_client_message(&state, b, join("B", "42")).await.unwrap();
        drain(&mut rx_a);
        drain(&mut rx_b);

        let submit = ClientMessage::SubmitBoard {
            room_id: "42".into(),
            board: vec![1, 1, 1],
        };
        let err = handle_client_message(&state, a, submit).await.unwrap_err();
        reject(&state, a, &err);

        assert!(matches!(
            drain(&mut rx_a).as_slice(),
            [ServerMessage::Error { .. }]
        ));
        assert!(drain(&mut rx_b).is_empty());
        let phase = state.registry().inspect("42", |s| s.phase()).await;
        assert_eq!(phase, Some(SessionPhase::Setup));
    }

    #[tokio::test]
    async fn disconnect_dissolves_room() {
        let state = AppState::new(AppConfig::default());
        let (a, mut rx_a) = connect(&state);
        let (b, _rx_b) = connect(&state);
        handle_client_message(&state, a, join("A", "42")).await.unwrap();
        handle_client_message(&state, b, join("B", "42")).await.unwrap();
        drain(&mut rx_a);

        disconnect(&state, b).await;
        assert_eq!(drain(&mut rx_a), vec![ServerMessage::OpponentLeft]);
        assert_eq!(state.registry().room_count(), 0);
    }
}
