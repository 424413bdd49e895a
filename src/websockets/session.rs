use std::fmt;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use super::messages::ChatMessage;
use super::socket::{Frame, SocketError, SocketWrapper};
use crate::hub::{ConnectionId, Hub};

/// Why a session stopped
///
/// Every variant ends the session the same way: the connection leaves the
/// registry and its socket is closed. The distinction only reaches the logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEnd {
    /// Close frame or end of stream from the peer
    PeerClosed,
    /// Inbound frame that does not decode as a chat message
    Malformed(String),
    /// Read error from the transport
    Transport(SocketError),
    /// Socket write failed or exceeded the write timeout
    WriteFailed(SocketError),
    /// The hub dropped this connection (outbox overflow or closed)
    Evicted,
    /// The hub's dispatcher is gone
    HubStopped,
}

impl SessionEnd {
    pub fn is_clean(&self) -> bool {
        matches!(self, SessionEnd::PeerClosed)
    }
}

impl fmt::Display for SessionEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionEnd::PeerClosed => write!(f, "peer closed"),
            SessionEnd::Malformed(e) => write!(f, "malformed payload: {}", e),
            SessionEnd::Transport(e) => write!(f, "transport error: {}", e),
            SessionEnd::WriteFailed(e) => write!(f, "write failed: {}", e),
            SessionEnd::Evicted => write!(f, "evicted by hub"),
            SessionEnd::HubStopped => write!(f, "hub stopped"),
        }
    }
}

/// One live connection: reads client frames into the hub and writes the
/// hub's deliveries back out
pub struct Session {
    hub: Hub,
    socket: Box<dyn SocketWrapper>,
    room_id: String,
    write_timeout: Duration,
}

impl Session {
    pub fn new(
        hub: Hub,
        socket: Box<dyn SocketWrapper>,
        room_id: String,
        write_timeout: Duration,
    ) -> Self {
        Self {
            hub,
            socket,
            room_id,
            write_timeout,
        }
    }

    /// Register, run until the connection ends for any reason, then tear down
    pub async fn run(mut self) -> SessionEnd {
        let (id, mut outbox) = self.hub.connect(&self.room_id).await;

        info!(
            connection_id = %id,
            room_id = %self.room_id,
            "Session started"
        );

        let end = self.pump(id, &mut outbox).await;

        self.hub.disconnect(id).await;
        if let Err(e) = self.socket.close().await {
            debug!(connection_id = %id, error = %e, "Close frame not sent");
        }

        if end.is_clean() {
            info!(connection_id = %id, room_id = %self.room_id, "Session closed");
        } else {
            warn!(
                connection_id = %id,
                room_id = %self.room_id,
                reason = %end,
                "Session terminated"
            );
        }

        end
    }

    async fn pump(&mut self, id: ConnectionId, outbox: &mut mpsc::Receiver<String>) -> SessionEnd {
        loop {
            tokio::select! {
                // Hub -> client
                frame = outbox.recv() => {
                    let Some(frame) = frame else {
                        return SessionEnd::Evicted;
                    };
                    match timeout(self.write_timeout, self.socket.send_message(frame)).await {
                        Ok(Ok(())) => {}
                        Ok(Err(e)) => return SessionEnd::WriteFailed(e),
                        Err(_) => return SessionEnd::WriteFailed(SocketError::Timeout),
                    }
                }

                // Client -> hub
                inbound = self.socket.receive_message() => {
                    match inbound {
                        Ok(Frame::Text(text)) => match ChatMessage::decode(&text) {
                            Ok(message) => {
                                debug!(
                                    connection_id = %id,
                                    room_id = %message.room_id,
                                    sender = %message.sender,
                                    "Inbound message queued"
                                );
                                if self.hub.enqueue(message).is_err() {
                                    return SessionEnd::HubStopped;
                                }
                            }
                            Err(e) => return SessionEnd::Malformed(e.to_string()),
                        },
                        Ok(Frame::Binary(bytes)) => {
                            return SessionEnd::Malformed(format!(
                                "unexpected binary frame ({} bytes)",
                                bytes.len()
                            ));
                        }
                        Ok(Frame::Closed) => return SessionEnd::PeerClosed,
                        Err(e) => return SessionEnd::Transport(e),
                    }
                }
            }
        }
    }
}
