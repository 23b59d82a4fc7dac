use axum::Router;

use crate::state::SharedState;

pub mod boards;
pub mod docs;
pub mod health;
pub mod rooms;
pub mod websocket;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    health::router()
        .merge(websocket::router())
        .merge(rooms::router())
        .merge(boards::router())
        .merge(docs::router())
        .with_state(state)
}
