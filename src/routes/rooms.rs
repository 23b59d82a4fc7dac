use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};

use crate::{
    dto::room::RoomSummary, error::AppError, services::room_service, state::SharedState,
};

/// Read-only room inspection endpoints.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/rooms", get(list_rooms))
        .route("/rooms/{id}", get(get_room))
}

/// List every active room.
#[utoipa::path(
    get,
    path = "/rooms",
    tag = "rooms",
    responses((status = 200, description = "Active rooms", body = [RoomSummary]))
)]
pub async fn list_rooms(State(state): State<SharedState>) -> Json<Vec<RoomSummary>> {
    Json(room_service::list_rooms(&state).await)
}

/// Inspect a single room by identifier.
#[utoipa::path(
    get,
    path = "/rooms/{id}",
    tag = "rooms",
    params(("id" = String, Path, description = "Room identifier chosen by the players")),
    responses(
        (status = 200, description = "Room", body = RoomSummary),
        (status = 404, description = "No such room")
    )
)]
pub async fn get_room(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<RoomSummary>, AppError> {
    Ok(Json(room_service::get_room(&state, &id).await?))
}
