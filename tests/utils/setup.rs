#![allow(dead_code)]

use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};

use roomcast::{Hub, HubConfig, HubDispatcher, Session};

use super::mocks::MockClient;

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct TestSetup {
    pub hub: Hub,
    pub write_timeout: Duration,
    pub _dispatcher_handle: Option<JoinHandle<()>>,
}

pub struct TestSetupBuilder {
    outbox_capacity: usize,
    write_timeout: Duration,
    start_dispatcher: bool,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            outbox_capacity: 256,
            write_timeout: Duration::from_millis(500),
            start_dispatcher: true,
        }
    }

    pub fn with_outbox_capacity(mut self, outbox_capacity: usize) -> Self {
        self.outbox_capacity = outbox_capacity;
        self
    }

    /// Drop the dispatcher so the hub behaves as stopped
    pub fn without_dispatcher(mut self) -> Self {
        self.start_dispatcher = false;
        self
    }

    pub fn build(self) -> TestSetup {
        let (hub, dispatcher): (Hub, HubDispatcher) = Hub::new(HubConfig {
            outbox_capacity: self.outbox_capacity,
        });

        let handle = if self.start_dispatcher {
            Some(dispatcher.start())
        } else {
            drop(dispatcher);
            None
        };

        TestSetup {
            hub,
            write_timeout: self.write_timeout,
            _dispatcher_handle: handle,
        }
    }
}

impl TestSetup {
    /// Spawn a session for a new client without waiting for registration
    pub fn spawn_client(&self, name: &str, room_id: &str) -> MockClient {
        let (mut client, socket) = MockClient::pair(name, room_id);
        let session = Session::new(
            self.hub.clone(),
            Box::new(socket),
            room_id.to_string(),
            self.write_timeout,
        );
        client.attach(tokio::spawn(session.run()));
        client
    }

    /// Spawn a client and wait until the hub has registered it
    pub async fn connect(&self, name: &str, room_id: &str) -> MockClient {
        let before = self.hub.stats().await.connections;
        let client = self.spawn_client(name, room_id);
        self.wait_for_connections(before + 1).await;
        client
    }

    pub async fn wait_for_connections(&self, expected: usize) {
        let hub = self.hub.clone();
        timeout(Duration::from_secs(2), async move {
            while hub.stats().await.connections != expected {
                sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap_or_else(|_| panic!("hub never reached {} connections", expected));
    }
}
