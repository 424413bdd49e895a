// Connection registry and room broadcast hub
//
// Sessions register here at connect time and disconnect at teardown. A single
// dispatcher task drains the inbound queue and fans each message out to the
// connections currently joined to its room.

// Public API
pub use broadcaster::{
    DispatchReport, Hub, HubConfig, HubDispatcher, HubStats, DEFAULT_OUTBOX_CAPACITY,
};
pub use errors::HubError;
pub use registry::{ConnectionId, ConnectionState, JoinResult, Outbox};

// Internal modules
mod broadcaster;
mod errors;
mod registry;
