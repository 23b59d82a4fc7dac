//! Read-only projections of rooms for the REST API. Boards are never exposed.

use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    dto::{format_system_time, phase::VisibleSessionPhase},
    state::session::{PlayerSlot, Session},
};

/// Public view of a seated player.
#[derive(Debug, Serialize, ToSchema)]
pub struct PlayerSummary {
    pub name: String,
    pub ready: bool,
}

impl From<&PlayerSlot> for PlayerSummary {
    fn from(slot: &PlayerSlot) -> Self {
        Self {
            name: slot.name.clone(),
            ready: slot.ready,
        }
    }
}

/// Public view of an active room.
#[derive(Debug, Serialize, ToSchema)]
pub struct RoomSummary {
    pub room_id: String,
    pub phase: VisibleSessionPhase,
    pub players: Vec<PlayerSummary>,
    /// Numbers called so far in the current game.
    pub called: Vec<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<String>,
    /// Incremented on every phase transition.
    pub version: usize,
    pub created_at: String,
}

impl From<&Session> for RoomSummary {
    fn from(session: &Session) -> Self {
        let snapshot = session.snapshot();
        Self {
            room_id: session.room_id().to_string(),
            phase: snapshot.phase.into(),
            players: session.players().map(PlayerSummary::from).collect(),
            called: session.history().to_vec(),
            winner: session.winner().map(str::to_string),
            version: snapshot.version,
            created_at: format_system_time(session.created_at()),
        }
    }
}
