use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Bingo Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::websocket::ws_handler,
        crate::routes::rooms::list_rooms,
        crate::routes::rooms::get_room,
        crate::routes::boards::random_board,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::ws::ClientMessage,
            crate::dto::ws::ServerMessage,
            crate::dto::ws::ErrorCategory,
            crate::dto::room::RoomSummary,
            crate::dto::room::PlayerSummary,
            crate::dto::phase::VisibleSessionPhase,
            crate::dto::board::RandomBoardResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "players", description = "WebSocket protocol for players"),
        (name = "rooms", description = "Read-only room inspection"),
        (name = "boards", description = "Board helpers"),
    )
)]
pub struct ApiDoc;
