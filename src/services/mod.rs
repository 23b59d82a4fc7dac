/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Read-only room inspection for the REST API.
pub mod room_service;
/// Routing of player intents into the session registry.
pub mod session_service;
/// WebSocket connection and message handling service.
pub mod websocket_service;
