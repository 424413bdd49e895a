#![allow(dead_code)] // Not every test uses every helper

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{timeout, Duration};

use roomcast::websockets::{ChatMessage, Frame, SessionEnd, SocketError, SocketWrapper};

// ============================================================================
// Mock Infrastructure
// ============================================================================

/// In-memory stand-in for an upgraded WebSocket
pub struct MockSocket {
    inbound: mpsc::UnboundedReceiver<Result<Frame, SocketError>>,
    outbound: mpsc::UnboundedSender<String>,
    fail_writes: Arc<AtomicBool>,
    closed: Arc<AtomicBool>,
}

#[async_trait]
impl SocketWrapper for MockSocket {
    async fn send_message(&mut self, message: String) -> Result<(), SocketError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(SocketError::SendFailed("broken pipe".to_string()));
        }
        self.outbound
            .send(message)
            .map_err(|_| SocketError::ConnectionClosed)
    }

    async fn receive_message(&mut self) -> Result<Frame, SocketError> {
        match self.inbound.recv().await {
            Some(result) => result,
            None => Ok(Frame::Closed),
        }
    }

    async fn close(&mut self) -> Result<(), SocketError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// The client side of a MockSocket plus the session task driving it
pub struct MockClient {
    pub name: String,
    pub room_id: String,
    inbound: mpsc::UnboundedSender<Result<Frame, SocketError>>,
    outbound: mpsc::UnboundedReceiver<String>,
    fail_writes: Arc<AtomicBool>,
    closed: Arc<AtomicBool>,
    session: Option<JoinHandle<SessionEnd>>,
}

impl MockClient {
    /// Build a connected socket pair; the caller spawns the session
    pub fn pair(name: &str, room_id: &str) -> (Self, MockSocket) {
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let fail_writes = Arc::new(AtomicBool::new(false));
        let closed = Arc::new(AtomicBool::new(false));

        let socket = MockSocket {
            inbound: inbound_rx,
            outbound: outbound_tx,
            fail_writes: fail_writes.clone(),
            closed: closed.clone(),
        };
        let client = Self {
            name: name.to_string(),
            room_id: room_id.to_string(),
            inbound: inbound_tx,
            outbound: outbound_rx,
            fail_writes,
            closed,
            session: None,
        };
        (client, socket)
    }

    pub fn attach(&mut self, session: JoinHandle<SessionEnd>) {
        self.session = Some(session);
    }

    /// Send a chat message to this client's own room
    pub fn say(&self, body: &str) {
        self.send(&ChatMessage::new("message", body, &self.room_id, &self.name));
    }

    pub fn send(&self, message: &ChatMessage) {
        self.send_raw(&message.encode().unwrap());
    }

    pub fn send_raw(&self, text: &str) {
        let _ = self.inbound.send(Ok(Frame::Text(text.to_string())));
    }

    pub fn send_binary(&self, bytes: Vec<u8>) {
        let _ = self.inbound.send(Ok(Frame::Binary(bytes)));
    }

    pub fn hang_up(&self) {
        let _ = self.inbound.send(Ok(Frame::Closed));
    }

    pub fn break_transport(&self) {
        let _ = self
            .inbound
            .send(Err(SocketError::ReceiveFailed("connection reset".to_string())));
    }

    /// Make every subsequent write from the server fail
    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    pub fn was_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Next delivered message, or None after a short wait
    pub async fn recv(&mut self) -> Option<ChatMessage> {
        self.recv_within(Duration::from_secs(2)).await
    }

    pub async fn recv_within(&mut self, wait: Duration) -> Option<ChatMessage> {
        match timeout(wait, self.outbound.recv()).await {
            Ok(Some(frame)) => Some(ChatMessage::decode(&frame).unwrap()),
            _ => None,
        }
    }

    /// Everything delivered so far, without waiting
    pub fn drain(&mut self) -> Vec<ChatMessage> {
        let mut messages = Vec::new();
        while let Ok(frame) = self.outbound.try_recv() {
            messages.push(ChatMessage::decode(&frame).unwrap());
        }
        messages
    }

    /// Wait for the session task to finish and return why it ended
    pub async fn finished(&mut self) -> SessionEnd {
        let session = self.session.take().expect("session not attached");
        timeout(Duration::from_secs(2), session)
            .await
            .expect("session did not finish")
            .expect("session task panicked")
    }
}
