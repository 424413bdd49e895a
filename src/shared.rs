use std::io;
use std::sync::Arc;
use thiserror::Error;

use crate::config::ServerConfig;
use crate::hub::Hub;

/// Shared application state handed to every request
#[derive(Clone)]
pub struct AppState {
    pub hub: Hub,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(hub: Hub, config: ServerConfig) -> Self {
        Self {
            hub,
            config: Arc::new(config),
        }
    }
}

/// Startup failures; nothing past bootstrap is fatal
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("Server error: {0}")]
    Serve(#[source] io::Error),

    #[error("Hub dispatcher stopped")]
    DispatcherStopped,
}
