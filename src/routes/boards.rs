use axum::{Json, Router, routing::get};

use crate::{dto::board::RandomBoardResponse, services::room_service, state::SharedState};

#[utoipa::path(
    get,
    path = "/boards/random",
    tag = "boards",
    responses((status = 200, description = "Shuffled valid arrangement", body = RandomBoardResponse))
)]
/// Generate a random board arrangement for clients that skip manual placement.
pub async fn random_board() -> Json<RandomBoardResponse> {
    Json(room_service::random_board())
}

pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/boards/random", get(random_board))
}
