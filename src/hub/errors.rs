use thiserror::Error;

use super::registry::ConnectionId;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HubError {
    #[error("Hub dispatcher is not running")]
    Stopped,

    /// The id was never registered or has already been evicted
    #[error("Connection {0} is not registered")]
    UnknownConnection(ConnectionId),
}
