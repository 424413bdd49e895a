// Public API
pub use handler::{websocket_handler, ConnectParams};
pub use messages::ChatMessage;
pub use session::{Session, SessionEnd};
pub use socket::{Frame, SocketError, SocketWrapper};

// Internal modules
mod handler;
mod messages;
mod session;
mod socket;
