//! Test assertion helpers - fluent API for verifying deliveries
#![allow(dead_code)] // Test utilities may not all be used in every test

use tokio::time::Duration;

use roomcast::ChatMessage;

use super::mocks::MockClient;

// ============================================================================
// Assertion Helpers
// ============================================================================

pub struct MessageAssertion<'a> {
    clients: Vec<&'a mut MockClient>,
}

impl<'a> MessageAssertion<'a> {
    pub fn for_clients(clients: Vec<&'a mut MockClient>) -> Self {
        Self { clients }
    }

    /// Assert every client receives `expected` next (consumes it)
    pub async fn received(self, expected: &ChatMessage) {
        for client in self.clients {
            let message = client.recv().await;
            assert_eq!(
                message.as_ref(),
                Some(expected),
                "{} should have received {:?}",
                client.name,
                expected
            );
        }
    }

    /// Assert every client receives these bodies, in this order
    pub async fn received_in_order(self, bodies: &[String]) {
        for client in self.clients {
            for body in bodies {
                let message = client.recv().await;
                assert_eq!(
                    message.map(|m| m.message).as_deref(),
                    Some(body.as_str()),
                    "{} received out of order",
                    client.name
                );
            }
        }
    }

    /// Assert nothing arrives within a short window
    pub async fn received_nothing(self) {
        for client in self.clients {
            let message = client.recv_within(Duration::from_millis(100)).await;
            assert!(
                message.is_none(),
                "{} should not have received {:?}",
                client.name,
                message
            );
        }
    }
}
