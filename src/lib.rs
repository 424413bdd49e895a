// Library crate for the room broadcast server
// This file exposes the public API for integration tests

pub mod config;
pub mod hub;
pub mod shared;
pub mod websockets;

// Re-export commonly used types for easier access in tests
pub use config::ServerConfig;
pub use hub::{ConnectionId, ConnectionState, Hub, HubConfig, HubDispatcher, HubError};
pub use shared::{AppError, AppState};
pub use websockets::{ChatMessage, Session, SessionEnd, SocketWrapper};
