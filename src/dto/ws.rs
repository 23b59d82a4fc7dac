//! JSON frames exchanged with player WebSocket clients.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::state::{
    events::RoomEvent,
    session::{ErrorKind, SessionError},
};

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, PartialEq, Eq)]
/// Messages accepted from player WebSocket clients.
#[serde(tag = "type")]
pub enum ClientMessage {
    #[serde(rename = "join_room")]
    JoinRoom {
        name: String,
        #[serde(rename = "roomId")]
        room_id: String,
    },
    #[serde(rename = "submit_board")]
    SubmitBoard {
        #[serde(rename = "roomId")]
        room_id: String,
        board: Vec<i64>,
    },
    #[serde(rename = "make_move")]
    MakeMove {
        #[serde(rename = "roomId")]
        room_id: String,
        number: i64,
    },
    #[serde(rename = "play_again")]
    PlayAgain {
        #[serde(rename = "roomId")]
        room_id: String,
    },
    #[serde(rename = "leave_room")]
    LeaveRoom {
        #[serde(rename = "roomId")]
        room_id: String,
    },
    #[serde(other)]
    Unknown,
}

impl ClientMessage {
    /// Parse a text frame.
    pub fn from_json_str(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
/// Category attached to every `error` frame.
pub enum ErrorCategory {
    Validation,
    Protocol,
    RoomFull,
    RoomNotFound,
    Capacity,
}

impl From<ErrorKind> for ErrorCategory {
    fn from(value: ErrorKind) -> Self {
        match value {
            ErrorKind::Validation => ErrorCategory::Validation,
            ErrorKind::Protocol => ErrorCategory::Protocol,
            ErrorKind::RoomFull => ErrorCategory::RoomFull,
            ErrorKind::RoomNotFound => ErrorCategory::RoomNotFound,
            ErrorKind::Capacity => ErrorCategory::Capacity,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, PartialEq, Eq)]
/// Messages pushed to player WebSocket clients.
#[serde(tag = "type")]
pub enum ServerMessage {
    /// First frame on every socket, carrying the id used in `turn` fields.
    #[serde(rename = "connected")]
    Connected {
        #[serde(rename = "connectionId")]
        connection_id: Uuid,
    },
    #[serde(rename = "player_joined")]
    PlayerJoined { count: usize, players: Vec<String> },
    #[serde(rename = "game_start")]
    GameStart { turn: Uuid },
    /// Sent only to the board's owner.
    #[serde(rename = "board_state")]
    BoardState {
        cells: Vec<u8>,
        called: Vec<u8>,
        #[serde(rename = "completedLines")]
        completed_lines: usize,
    },
    #[serde(rename = "move_made")]
    MoveMade {
        number: u8,
        #[serde(rename = "gameOver")]
        game_over: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        winner: Option<String>,
        #[serde(rename = "nextTurn", default, skip_serializing_if = "Option::is_none")]
        next_turn: Option<Uuid>,
    },
    #[serde(rename = "rematch_status")]
    RematchStatus { count: usize },
    #[serde(rename = "reset_game")]
    ResetGame,
    #[serde(rename = "opponent_left")]
    OpponentLeft,
    #[serde(rename = "error")]
    Error {
        message: String,
        kind: ErrorCategory,
    },
}

impl ServerMessage {
    /// Build an `error` frame from a rejected intent.
    pub fn error(err: &SessionError) -> Self {
        Self::Error {
            message: err.to_string(),
            kind: err.kind().into(),
        }
    }
}

impl From<RoomEvent> for ServerMessage {
    fn from(value: RoomEvent) -> Self {
        match value {
            RoomEvent::PlayerJoined { count, players } => Self::PlayerJoined { count, players },
            RoomEvent::GameStarted { turn } => Self::GameStart { turn },
            RoomEvent::BoardState {
                cells,
                called,
                completed_lines,
            } => Self::BoardState {
                cells,
                called,
                completed_lines,
            },
            RoomEvent::MoveMade {
                number,
                game_over,
                winner,
                next_turn,
            } => Self::MoveMade {
                number,
                game_over,
                winner,
                next_turn,
            },
            RoomEvent::RematchStatus { count } => Self::RematchStatus { count },
            RoomEvent::GameReset => Self::ResetGame,
            RoomEvent::OpponentLeft => Self::OpponentLeft,
        }
    }
}
