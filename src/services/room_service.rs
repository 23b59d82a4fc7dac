use crate::{
    dto::{board::RandomBoardResponse, room::RoomSummary},
    error::ServiceError,
    state::{SharedState, board::Board},
};

/// Summaries of every active room, ordered by room identifier.
pub async fn list_rooms(state: &SharedState) -> Vec<RoomSummary> {
    state.registry().inspect_all(|session| RoomSummary::from(session)).await
}

/// Summary of a single room.
pub async fn get_room(state: &SharedState, room_id: &str) -> Result<RoomSummary, ServiceError> {
    state
        .registry()
        .inspect(room_id, |session| RoomSummary::from(session))
        .await
        .ok_or_else(|| ServiceError::NotFound(format!("room `{room_id}` not found")))
}

/// A freshly shuffled, valid board arrangement.
pub fn random_board() -> RandomBoardResponse {
    Board::shuffled().into()
}
