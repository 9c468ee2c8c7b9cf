use std::{
    collections::{HashMap, VecDeque},
    net::SocketAddr,
    time::Instant,
};

use log::{debug, info, trace, warn};
use skein_serde::MTU_SIZE_BYTES;

use crate::{
    connection::{peek_packet_type, Connection, ConnectionConfig, PacketType, ServiceType},
    hub::{ConnectionKey, HubError},
    transport::{Socket, SocketFactory, UdpSocketFactory},
};

/// Receive errors tolerated on one socket within a single drain
const MAX_RECEIVE_ERRORS: usize = 16;

struct Listener {
    key: ConnectionKey,
    pending: VecDeque<ConnectionKey>,
}

/// Every connection sharing one bound local address
struct SocketGroup {
    socket: Box<dyn Socket>,
    peers: HashMap<SocketAddr, ConnectionKey>,
    listener: Option<Listener>,
}

impl SocketGroup {
    fn new(socket: Box<dyn Socket>) -> Self {
        Self {
            socket,
            peers: HashMap::new(),
            listener: None,
        }
    }
}

/// Owns one socket per bound local address and routes datagrams between
/// those sockets and the connections bound to them
pub struct ConnectionHub {
    config: ConnectionConfig,
    socket_factory: Box<dyn SocketFactory>,
    groups: HashMap<SocketAddr, SocketGroup>,
    connections: HashMap<ConnectionKey, Connection>,
    next_key: u64,
    receive_buffer: Box<[u8]>,
    now: Instant,
}

impl ConnectionHub {
    pub fn new(config: &ConnectionConfig) -> Self {
        Self::with_socket_factory(config, UdpSocketFactory)
    }

    pub fn with_socket_factory<F: SocketFactory + 'static>(
        config: &ConnectionConfig,
        socket_factory: F,
    ) -> Self {
        Self {
            config: config.clone(),
            socket_factory: Box::new(socket_factory),
            groups: HashMap::new(),
            connections: HashMap::new(),
            next_key: 0,
            receive_buffer: vec![0; MTU_SIZE_BYTES].into_boxed_slice(),
            now: Instant::now(),
        }
    }

    fn group_address(&mut self, local_address: &SocketAddr) -> Result<SocketAddr, HubError> {
        if self.groups.contains_key(local_address) {
            return Ok(*local_address);
        }
        let socket = self.socket_factory.bind(local_address)?;
        let bound_address = socket.local_address();
        info!("bound socket on {}", bound_address);
        self.groups
            .entry(bound_address)
            .or_insert_with(|| SocketGroup::new(socket));
        Ok(bound_address)
    }

    fn insert_connection(&mut self, connection: Connection) -> ConnectionKey {
        let key = ConnectionKey::new(self.next_key);
        self.next_key += 1;
        self.connections.insert(key, connection);
        key
    }

    // Lifecycle

    /// Register a listener on `local_address`, binding a socket if needed
    pub fn listen(&mut self, local_address: &SocketAddr) -> Result<ConnectionKey, HubError> {
        let address = self.group_address(local_address)?;
        if self
            .groups
            .get(&address)
            .is_some_and(|group| group.listener.is_some())
        {
            return Err(HubError::ListenerExists { address });
        }

        let mut connection = Connection::new(&self.config, address, self.now);
        connection.listen()?;
        let key = self.insert_connection(connection);
        if let Some(group) = self.groups.get_mut(&address) {
            group.listener = Some(Listener {
                key,
                pending: VecDeque::new(),
            });
        }
        Ok(key)
    }

    /// Start a handshake from `local_address` to `remote_address`. The
    /// handshake timeout counts from `now`.
    pub fn connect(
        &mut self,
        local_address: &SocketAddr,
        remote_address: &SocketAddr,
        now: Instant,
    ) -> Result<ConnectionKey, HubError> {
        self.now = now;
        let address = self.group_address(local_address)?;
        if self
            .groups
            .get(&address)
            .is_some_and(|group| group.peers.contains_key(remote_address))
        {
            return Err(HubError::PeerExists {
                local: address,
                remote: *remote_address,
            });
        }

        let mut connection = Connection::new(&self.config, address, self.now);
        connection.connect(*remote_address)?;
        let key = self.insert_connection(connection);
        if let Some(group) = self.groups.get_mut(&address) {
            group.peers.insert(*remote_address, key);
        }
        Ok(key)
    }

    fn listener_mut(&mut self, listener_key: &ConnectionKey) -> Option<&mut Listener> {
        self.groups
            .values_mut()
            .filter_map(|group| group.listener.as_mut())
            .find(|listener| listener.key == *listener_key)
    }

    pub fn has_pending_connections(&mut self, listener_key: &ConnectionKey) -> bool {
        self.listener_mut(listener_key)
            .is_some_and(|listener| !listener.pending.is_empty())
    }

    /// Take the oldest half-open connection waiting on a listener, reply to
    /// its peer and mark it connected
    pub fn accept_connection(&mut self, listener_key: &ConnectionKey) -> Option<ConnectionKey> {
        let key = self.listener_mut(listener_key)?.pending.pop_front()?;
        let connection = self.connections.get_mut(&key)?;
        connection.start();
        Some(key)
    }

    /// Close a connection, notifying its peer if it was established. It is
    /// removed on the next `update`.
    pub fn disconnect(&mut self, key: &ConnectionKey) {
        if let Some(connection) = self.connections.get_mut(key) {
            if connection.is_connected() {
                connection.disconnect();
            } else {
                connection.abort();
            }
        }
    }

    // Socket I/O

    /// Drain every socket without blocking, routing each datagram to its
    /// connection
    pub fn receive(&mut self, now: Instant) {
        self.now = now;
        let mut failed_peers = Vec::new();

        for (local_address, group) in self.groups.iter_mut() {
            let mut errors = 0;
            loop {
                match group.socket.receive(&mut self.receive_buffer) {
                    Ok(Some((length, remote_address))) => {
                        let datagram = &self.receive_buffer[..length];
                        Self::route(
                            &self.config,
                            now,
                            &mut self.next_key,
                            &mut self.connections,
                            group,
                            *local_address,
                            remote_address,
                            datagram,
                        );
                    }
                    Ok(None) => break,
                    Err(error) => {
                        match error.peer_address() {
                            Some(remote_address) => {
                                warn!("receive error from {}: {}", remote_address, error);
                                if let Some(key) = group.peers.get(&remote_address) {
                                    failed_peers.push(*key);
                                }
                            }
                            None => debug!("receive error on {}: {}", local_address, error),
                        }
                        // Keep draining past a failure, but not forever
                        errors += 1;
                        if errors >= MAX_RECEIVE_ERRORS {
                            warn!(
                                "{} receive errors on {}, draining again next tick",
                                errors, local_address
                            );
                            break;
                        }
                    }
                }
            }
        }

        for key in failed_peers {
            self.disconnect(&key);
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn route(
        config: &ConnectionConfig,
        now: Instant,
        next_key: &mut u64,
        connections: &mut HashMap<ConnectionKey, Connection>,
        group: &mut SocketGroup,
        local_address: SocketAddr,
        remote_address: SocketAddr,
        datagram: &[u8],
    ) {
        if let Some(key) = group.peers.get(&remote_address) {
            if let Some(connection) = connections.get_mut(key) {
                if !connection.buffer_incoming(datagram) {
                    trace!("inbound queue for {} full, dropping datagram", remote_address);
                }
            }
            return;
        }

        let is_request = peek_packet_type(datagram)
            == Some(PacketType::Service(ServiceType::ConnectionRequest));
        match group.listener.as_mut() {
            Some(listener) if is_request => {
                let key = ConnectionKey::new(*next_key);
                *next_key += 1;
                connections.insert(
                    key,
                    Connection::new_incoming(config, local_address, remote_address, now),
                );
                group.peers.insert(remote_address, key);
                listener.pending.push_back(key);
                info!("connection request from {}", remote_address);
            }
            _ => trace!("ignoring datagram from unknown peer {}", remote_address),
        }
    }

    /// Write every queued outgoing datagram to its socket
    pub fn flush(&mut self) {
        let mut failed_peers = Vec::new();

        for group in self.groups.values_mut() {
            for (remote_address, key) in group.peers.iter() {
                let Some(connection) = self.connections.get_mut(key) else {
                    continue;
                };
                for datagram in connection.drain_outgoing() {
                    if let Err(error) = group.socket.send(remote_address, &datagram) {
                        match error.peer_address() {
                            Some(_) => {
                                warn!("send error to {}: {}", remote_address, error);
                                failed_peers.push(*key);
                                break;
                            }
                            None => debug!("send error to {}: {}", remote_address, error),
                        }
                    }
                }
            }
        }

        for key in failed_peers {
            self.disconnect(&key);
        }
    }

    // Housekeeping

    /// Update every connection. Connections that have closed are flushed one
    /// last time, removed, and their keys returned.
    pub fn update(&mut self, now: Instant) -> Vec<ConnectionKey> {
        self.now = now;
        for connection in self.connections.values_mut() {
            connection.update(now);
        }

        let mut closed: Vec<ConnectionKey> = self
            .connections
            .iter()
            .filter(|(_, connection)| connection.is_closed())
            .map(|(key, _)| *key)
            .collect();
        if closed.is_empty() {
            return closed;
        }
        closed.sort();

        self.flush();
        for key in &closed {
            self.remove(key);
        }
        closed
    }

    fn remove(&mut self, key: &ConnectionKey) {
        let Some(connection) = self.connections.remove(key) else {
            return;
        };
        let Some(group) = self.groups.get_mut(&connection.local_address()) else {
            return;
        };
        if let Some(remote_address) = connection.remote_address() {
            if group.peers.get(&remote_address) == Some(key) {
                group.peers.remove(&remote_address);
            }
        }
        if let Some(listener) = group.listener.as_mut() {
            listener.pending.retain(|pending| pending != key);
        }
    }

    // Accessors

    pub fn connection(&self, key: &ConnectionKey) -> Option<&Connection> {
        self.connections.get(key)
    }

    pub fn connection_mut(&mut self, key: &ConnectionKey) -> Option<&mut Connection> {
        self.connections.get_mut(key)
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// The address a connection's socket is actually bound to
    pub fn local_address(&self, key: &ConnectionKey) -> Option<SocketAddr> {
        self.connections.get(key).map(Connection::local_address)
    }
}
