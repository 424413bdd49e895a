use std::collections::{HashMap, HashSet};
use std::fmt;
use tokio::sync::mpsc;
use uuid::Uuid;

use super::errors::HubError;

/// Sending half of a connection's outbound buffer (already-encoded frames)
pub type Outbox = mpsc::Sender<String>;

/// Identity of one live connection
///
/// Minted only at registration, so two connections never share an
/// id and an evicted id can never come back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Lifecycle of a registered connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Registered and eligible as a dispatch target
    Active,
    /// Disconnected or evicted, terminal
    Terminated,
}

/// Result of adding a connection to a room
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinResult {
    Joined,
    AlreadyMember,
    /// Empty room ids never create a membership
    EmptyRoom,
}

struct Member {
    rooms: HashSet<String>,
    outbox: Outbox,
}

/// Connection -> room memberships
///
/// Not synchronised on its own; the hub keeps it behind a single lock shared
/// by every mutation and the dispatch pass.
#[derive(Default)]
pub(crate) struct Registry {
    members: HashMap<ConnectionId, Member>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, outbox: Outbox) -> ConnectionId {
        let id = ConnectionId::new();
        self.members.insert(
            id,
            Member {
                rooms: HashSet::new(),
                outbox,
            },
        );
        id
    }

    pub fn join(&mut self, id: ConnectionId, room_id: &str) -> Result<JoinResult, HubError> {
        let member = self
            .members
            .get_mut(&id)
            .ok_or(HubError::UnknownConnection(id))?;

        if room_id.is_empty() {
            return Ok(JoinResult::EmptyRoom);
        }

        if member.rooms.insert(room_id.to_string()) {
            Ok(JoinResult::Joined)
        } else {
            Ok(JoinResult::AlreadyMember)
        }
    }

    /// Returns whether the membership existed
    pub fn leave(&mut self, id: ConnectionId, room_id: &str) -> Result<bool, HubError> {
        let member = self
            .members
            .get_mut(&id)
            .ok_or(HubError::UnknownConnection(id))?;

        Ok(member.rooms.remove(room_id))
    }

    /// Drops the connection with all its memberships. The outbox sender goes
    /// with it, which closes the session's outbound side.
    pub fn remove(&mut self, id: ConnectionId) -> Option<HashSet<String>> {
        self.members.remove(&id).map(|member| member.rooms)
    }

    pub fn state_of(&self, id: ConnectionId) -> ConnectionState {
        if self.members.contains_key(&id) {
            ConnectionState::Active
        } else {
            ConnectionState::Terminated
        }
    }

    pub fn rooms_of(&self, id: ConnectionId) -> Option<&HashSet<String>> {
        self.members.get(&id).map(|member| &member.rooms)
    }

    /// Every connection currently joined to `room_id`
    pub fn members_of<'a>(
        &'a self,
        room_id: &'a str,
    ) -> impl Iterator<Item = (ConnectionId, &'a Outbox)> + 'a {
        self.members
            .iter()
            .filter(move |(_, member)| member.rooms.contains(room_id))
            .map(|(id, member)| (*id, &member.outbox))
    }

    pub fn connection_count(&self) -> usize {
        self.members.len()
    }

    /// Number of distinct rooms with at least one member
    pub fn room_count(&self) -> usize {
        self.members
            .values()
            .flat_map(|member| member.rooms.iter())
            .collect::<HashSet<_>>()
            .len()
    }
}
