use std::{collections::HashMap, net::SocketAddr, time::Instant};

use log::{info, warn};
use skein_shared::{
    ByteReader, ConnectionHub, ConnectionKey, NetworkId, ObjectRegistry, ReplicatedObject, Rpc,
    RpcCall, RpcTable, SocketFactory, UdpSocketFactory,
};

use crate::{events::ServerEvent, user::User, ServerConfig, ServerError};

/// A server that accepts clients over UDP, replicates its registered objects
/// to every connected user and exchanges remote calls with them
pub struct Server {
    // Config
    config: ServerConfig,
    // Transport
    hub: ConnectionHub,
    listener_key: Option<ConnectionKey>,
    users: HashMap<ConnectionKey, User>,
    // World
    registry: ObjectRegistry,
    last_state_update: Option<Instant>,
}

impl Server {
    /// Create a new Server
    pub fn new(config: ServerConfig) -> Self {
        Self::with_socket_factory(config, UdpSocketFactory)
    }

    /// Create a new Server whose sockets come from `socket_factory`
    pub fn with_socket_factory<F: SocketFactory + 'static>(
        config: ServerConfig,
        socket_factory: F,
    ) -> Self {
        let hub = ConnectionHub::with_socket_factory(&config.connection, socket_factory);
        Self {
            config,
            hub,
            listener_key: None,
            users: HashMap::new(),
            registry: ObjectRegistry::new(),
            last_state_update: None,
        }
    }

    /// Listen for incoming connections from Clients
    pub fn listen(&mut self, address: &SocketAddr) -> Result<(), ServerError> {
        if let Some(address) = self.local_address() {
            return Err(ServerError::AlreadyListening { address });
        }
        let key = self.hub.listen(address)?;
        self.listener_key = Some(key);
        if let Some(address) = self.local_address() {
            info!("server listening on {}", address);
        }
        Ok(())
    }

    /// Returns whether or not the Server has initialized correctly and is
    /// listening for Clients
    pub fn is_listening(&self) -> bool {
        self.listener_key.is_some()
    }

    /// The address the server's socket is bound to
    pub fn local_address(&self) -> Option<SocketAddr> {
        self.hub.local_address(&self.listener_key?)
    }

    // Tick

    /// Read every available datagram, run connection housekeeping and admit
    /// new clients. Returns the users that connected or disconnected.
    pub fn update(&mut self, now: Instant) -> Vec<ServerEvent> {
        let mut events = Vec::new();

        self.hub.receive(now);
        for key in self.hub.update(now) {
            if let Some(user) = self.users.remove(&key) {
                info!("user {} disconnected", user.address());
                events.push(ServerEvent::Disconnect(key));
            }
        }

        // Delivery outcomes of earlier state packets
        for (key, user) in self.users.iter_mut() {
            if let Some(connection) = self.hub.connection_mut(key) {
                connection.notify(&mut user.session);
            }
        }

        if let Some(listener_key) = self.listener_key {
            while let Some(key) = self.hub.accept_connection(&listener_key) {
                let Some(address) = self
                    .hub
                    .connection(&key)
                    .and_then(|connection| connection.remote_address())
                else {
                    continue;
                };
                let mut user = User::new(key, address);
                for object in self.registry.iter() {
                    user.session.show(object);
                }
                self.users.insert(key, user);
                info!("user {} connected", address);
                events.push(ServerEvent::Connect(key));
            }
        }

        self.hub.flush();
        events
    }

    /// Run every remote call received from users since the last call. Input
    /// that cannot be read is logged and dropped.
    pub fn process_input<C>(&mut self, table: &mut RpcTable<C>, context: &mut C) {
        for (key, user) in self.users.iter_mut() {
            let Some(connection) = self.hub.connection_mut(key) else {
                continue;
            };
            while let Some(payload) = connection.receive() {
                let mut reader = ByteReader::new(&payload);
                if let Err(error) = user.session.rpc_endpoint_mut().read_execute(
                    &mut reader,
                    table,
                    context,
                    Some(*key),
                ) {
                    warn!("discarding input from {}: {}", user.address(), error);
                }
            }
        }
    }

    /// Send every user the changes to the objects it can see, plus its queued
    /// remote calls. Does nothing if the last state update was less than the
    /// configured interval ago.
    pub fn send_state_updates(&mut self, now: Instant) {
        if let Some(last_state_update) = self.last_state_update {
            if now.saturating_duration_since(last_state_update) < self.config.state_update_interval
            {
                return;
            }
        }
        self.last_state_update = Some(now);
        self.registry.update_state_masks();

        let mut user_keys: Vec<ConnectionKey> = self.users.keys().copied().collect();
        user_keys.sort();

        // shuffle order of users in order to avoid priority among them
        fastrand::shuffle(&mut user_keys);

        for key in user_keys {
            let (Some(user), Some(connection)) =
                (self.users.get_mut(&key), self.hub.connection_mut(&key))
            else {
                continue;
            };
            if !connection.is_connected() {
                continue;
            }
            if let Err(error) = user.session.send_state_update(
                &self.registry,
                connection,
                self.config.max_packet_size,
            ) {
                warn!("state update to {} failed: {}", user.address(), error);
            }
        }

        self.hub.flush();
    }

    // Objects

    /// Register an object and show it to every user. Returns its network id.
    pub fn spawn_object(&mut self, object: ReplicatedObject) -> NetworkId {
        let network_id = self.registry.insert(object);
        if let Some(object) = self.registry.get(&network_id) {
            for user in self.users.values_mut() {
                user.session.show(object);
            }
        }
        network_id
    }

    /// Remove an object and have every user destroy it
    pub fn despawn_object(&mut self, network_id: &NetworkId) -> Option<ReplicatedObject> {
        let object = self.registry.remove(network_id)?;
        for user in self.users.values_mut() {
            user.session.hide(*network_id);
        }
        Some(object)
    }

    pub fn object(&self, network_id: &NetworkId) -> Option<&ReplicatedObject> {
        self.registry.get(network_id)
    }

    pub fn object_mut(&mut self, network_id: &NetworkId) -> Option<&mut ReplicatedObject> {
        self.registry.get_mut(network_id)
    }

    pub fn objects(&self) -> &ObjectRegistry {
        &self.registry
    }

    // Remote Calls

    /// Queue `rpc` for one user. It goes out with the next state update.
    pub fn call<R: Rpc>(&mut self, key: &ConnectionKey, rpc: &R) -> Result<(), ServerError> {
        let user = self
            .users
            .get_mut(key)
            .ok_or(ServerError::UnknownUser { key: *key })?;
        user.session.queue_rpc(RpcCall::new(rpc));
        Ok(())
    }

    /// Queue `rpc` for every user
    pub fn call_all<R: Rpc>(&mut self, rpc: &R) {
        let call = RpcCall::new(rpc);
        for user in self.users.values_mut() {
            user.session.queue_rpc(call.clone());
        }
    }

    // Users

    /// Mark a user as sharing the server's world, such as a client running
    /// in the same process. It is sent remote calls but no replication.
    pub fn set_local_viewer(&mut self, key: &ConnectionKey) -> Result<(), ServerError> {
        let user = self
            .users
            .get_mut(key)
            .ok_or(ServerError::UnknownUser { key: *key })?;
        user.session.set_local_viewer(true);
        Ok(())
    }

    /// Disconnect a user. A Disconnect event follows on the next update.
    pub fn disconnect_user(&mut self, key: &ConnectionKey) {
        self.hub.disconnect(key);
    }

    pub fn user(&self, key: &ConnectionKey) -> Option<&User> {
        self.users.get(key)
    }

    pub fn user_keys(&self) -> Vec<ConnectionKey> {
        let mut keys: Vec<ConnectionKey> = self.users.keys().copied().collect();
        keys.sort();
        keys
    }

    pub fn users_count(&self) -> usize {
        self.users.len()
    }

    /// Smoothed round trip time to a user, in seconds
    pub fn rtt(&self, key: &ConnectionKey) -> Option<f32> {
        let connection = self.hub.connection(key)?;
        Some(connection.rtt().smoothed_rtt().as_secs_f32())
    }
}
