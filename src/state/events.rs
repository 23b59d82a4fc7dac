use uuid::Uuid;

use crate::state::board::Number;

/// Connection identifier assigned by the transport when a socket opens.
pub type ConnectionId = Uuid;
/// Caller-provided room identifier, treated as an opaque string.
pub type RoomId = String;

/// State changes a room reports to its members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomEvent {
    /// Room membership changed.
    PlayerJoined { count: usize, players: Vec<String> },
    /// Both boards are in; `turn` calls first.
    GameStarted { turn: ConnectionId },
    /// Private view of a single player's own board.
    BoardState {
        cells: Vec<Number>,
        called: Vec<Number>,
        completed_lines: usize,
    },
    /// A number was called and marked on both boards.
    MoveMade {
        number: Number,
        game_over: bool,
        winner: Option<String>,
        next_turn: Option<ConnectionId>,
    },
    /// How many players have asked for a rematch so far.
    RematchStatus { count: usize },
    /// Both players agreed to a rematch; boards must be arranged again.
    GameReset,
    /// The other player disconnected or left; the room is gone.
    OpponentLeft,
}

/// An event addressed to specific connections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outbound {
    pub recipients: Vec<ConnectionId>,
    pub event: RoomEvent,
}

impl Outbound {
    pub fn new(recipients: Vec<ConnectionId>, event: RoomEvent) -> Self {
        Self { recipients, event }
    }

    /// Address `event` to a single connection.
    pub fn to(recipient: ConnectionId, event: RoomEvent) -> Self {
        Self::new(vec![recipient], event)
    }
}
