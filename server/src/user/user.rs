use std::net::SocketAddr;

use skein_shared::{ConnectionKey, ReplicationSession};

/// A connected client, as seen by the server
pub struct User {
    key: ConnectionKey,
    address: SocketAddr,
    pub(crate) session: ReplicationSession,
}

impl User {
    pub(crate) fn new(key: ConnectionKey, address: SocketAddr) -> Self {
        Self {
            key,
            address,
            session: ReplicationSession::new(),
        }
    }

    pub fn key(&self) -> ConnectionKey {
        self.key
    }

    pub fn address(&self) -> SocketAddr {
        self.address
    }

    /// Whether this user shares the server's world and so is sent no
    /// replication traffic
    pub fn is_local_viewer(&self) -> bool {
        self.session.is_local_viewer()
    }

    /// Reliable state packets sent to this user whose delivery is not yet
    /// known
    pub fn packets_in_flight(&self) -> usize {
        self.session.packets_in_flight()
    }
}
