use std::time::Duration;

use crate::hub::{HubConfig, DEFAULT_OUTBOX_CAPACITY};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_WRITE_TIMEOUT_MS: u64 = 5_000;

/// Server configuration, read once at startup
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// Messages buffered per connection before it counts as a failed write
    pub outbox_capacity: usize,
    /// Upper bound on a single socket write
    pub write_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            outbox_capacity: DEFAULT_OUTBOX_CAPACITY,
            write_timeout: Duration::from_millis(DEFAULT_WRITE_TIMEOUT_MS),
        }
    }
}

impl ServerConfig {
    /// Reads `ROOMCAST_*` variables, keeping the default for anything missing or unparsable
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let bind_addr = lookup("ROOMCAST_BIND_ADDR")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(defaults.bind_addr);

        let outbox_capacity = lookup("ROOMCAST_OUTBOX_CAPACITY")
            .and_then(|s| s.parse::<usize>().ok())
            .map(|n| n.max(1))
            .unwrap_or(defaults.outbox_capacity);

        let write_timeout = lookup("ROOMCAST_WRITE_TIMEOUT_MS")
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.write_timeout);

        Self {
            bind_addr,
            outbox_capacity,
            write_timeout,
        }
    }

    pub fn hub_config(&self) -> HubConfig {
        HubConfig {
            outbox_capacity: self.outbox_capacity,
        }
    }
}
