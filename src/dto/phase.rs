use serde::Serialize;
use utoipa::ToSchema;

use crate::state::state_machine::SessionPhase;

/// Publicly visible room phase exposed over REST.
#[derive(Debug, Serialize, ToSchema, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VisibleSessionPhase {
    /// Waiting for a second player.
    Waiting,
    /// Both players are arranging their boards.
    Setup,
    /// Numbers are being called.
    Playing,
    /// A line was completed; rematch pending.
    Finished,
}

impl From<SessionPhase> for VisibleSessionPhase {
    fn from(value: SessionPhase) -> Self {
        match value {
            SessionPhase::Waiting => VisibleSessionPhase::Waiting,
            SessionPhase::Setup => VisibleSessionPhase::Setup,
            SessionPhase::Playing => VisibleSessionPhase::Playing,
            SessionPhase::Finished => VisibleSessionPhase::Finished,
        }
    }
}
