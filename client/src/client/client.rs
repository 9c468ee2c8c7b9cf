use std::{net::SocketAddr, time::Instant};

use log::{info, warn};
use skein_shared::{
    ByteReader, ByteWriter, Connection, ConnectionHub, ConnectionKey, NetworkId, ObjectFactory,
    ObjectRegistry, ReplicatedObject, ReplicationEvent, Rpc, RpcCall, RpcEndpoint, RpcTable,
    SocketFactory, StateUpdateReader, UdpSocketFactory,
};

use super::{call_tracker::CallTracker, client_config::ClientConfig};
use crate::{events::ClientEvent, ClientError};

/// Client can send remote calls to a Server and keeps a pool of the objects
/// the Server replicates to it
pub struct Client {
    // Transport
    hub: ConnectionHub,
    server_key: Option<ConnectionKey>,
    server_address: Option<SocketAddr>,
    is_connected: bool,
    // Replication
    registry: ObjectRegistry,
    rpc_endpoint: RpcEndpoint,
    calls: CallTracker,
}

impl Client {
    /// Create a new Client
    pub fn new(config: ClientConfig) -> Self {
        Self::with_socket_factory(config, UdpSocketFactory)
    }

    /// Create a new Client whose socket comes from `socket_factory`
    pub fn with_socket_factory<F: SocketFactory + 'static>(
        config: ClientConfig,
        socket_factory: F,
    ) -> Self {
        Self {
            hub: ConnectionHub::with_socket_factory(&config.connection, socket_factory),
            server_key: None,
            server_address: None,
            is_connected: false,
            registry: ObjectRegistry::new(),
            rpc_endpoint: RpcEndpoint::new(),
            calls: CallTracker::default(),
        }
    }

    /// Start connecting to the Server at `server_address` from
    /// `local_address` at time `now`. The Connect event arrives from
    /// `update` once the Server accepts.
    pub fn connect(
        &mut self,
        local_address: &SocketAddr,
        server_address: &SocketAddr,
        now: Instant,
    ) -> Result<(), ClientError> {
        if let Some(address) = self.server_address {
            return Err(ClientError::AlreadyConnected { address });
        }
        let key = self.hub.connect(local_address, server_address, now)?;
        self.server_key = Some(key);
        self.server_address = Some(*server_address);
        info!("connecting to {}", server_address);
        self.hub.flush();
        Ok(())
    }

    /// Close the connection to the Server. The Disconnect event follows on
    /// the next update.
    pub fn disconnect(&mut self) {
        if let Some(key) = self.server_key {
            self.hub.disconnect(&key);
            self.hub.flush();
        }
    }

    // Tick

    /// Read every available datagram and run connection housekeeping.
    /// Returns Connect and Disconnect events.
    pub fn update(&mut self, now: Instant) -> Vec<ClientEvent> {
        let mut events = Vec::new();

        self.hub.receive(now);
        let closed = self.hub.update(now);
        if let Some(key) = self.server_key {
            if closed.contains(&key) {
                self.handle_closed(&mut events);
            }
        }

        let established = self
            .server_connection()
            .is_some_and(Connection::is_connected);
        if established && !self.is_connected {
            self.is_connected = true;
            self.rpc_endpoint.reset();
            self.calls.clear();
            info!("connected to {:?}", self.server_address);
            events.push(ClientEvent::Connect);
        }

        if let Some(key) = self.server_key {
            if let Some(connection) = self.hub.connection_mut(&key) {
                connection.notify(&mut self.calls);
            }
        }
        while let Some(call) = self.calls.take_resend() {
            if let Err(error) = self.send_call(call) {
                warn!("failed to resend remote call: {}", error);
                break;
            }
        }

        self.hub.flush();
        events
    }

    fn handle_closed(&mut self, events: &mut Vec<ClientEvent>) {
        if self.is_connected {
            info!("disconnected from {:?}", self.server_address);
        } else {
            warn!("could not connect to {:?}", self.server_address);
        }
        self.server_key = None;
        self.server_address = None;
        self.is_connected = false;
        self.calls.clear();

        let despawned: Vec<NetworkId> = self
            .registry
            .iter()
            .map(ReplicatedObject::network_id)
            .collect();
        self.registry.clear();
        events.extend(despawned.into_iter().map(ClientEvent::Despawn));
        events.push(ClientEvent::Disconnect);
    }

    /// Apply every state update received from the Server, running the
    /// remote calls they carry. Returns Spawn and Despawn events.
    pub fn process_state_updates<C>(
        &mut self,
        factory: &mut dyn ObjectFactory,
        table: &mut RpcTable<C>,
        context: &mut C,
    ) -> Vec<ClientEvent> {
        let mut events = Vec::new();
        let Some(key) = self.server_key else {
            return events;
        };
        let Some(connection) = self.hub.connection_mut(&key) else {
            return events;
        };

        let mut replication_events = Vec::new();
        while let Some(payload) = connection.receive() {
            let mut reader = ByteReader::new(&payload);
            let result = StateUpdateReader {
                registry: &mut self.registry,
                factory: &mut *factory,
                rpc_endpoint: &mut self.rpc_endpoint,
                rpc_table: &mut *table,
                context: &mut *context,
            }
            .read(&mut reader, &mut replication_events);
            if let Err(error) = result {
                warn!("state update partially applied: {}", error);
            }
        }

        events.extend(replication_events.into_iter().map(|event| match event {
            ReplicationEvent::Spawn(network_id) => ClientEvent::Spawn(network_id),
            ReplicationEvent::Despawn(network_id) => ClientEvent::Despawn(network_id),
        }));
        events
    }

    // Remote Calls

    /// Send `rpc` to the Server right away. Reliable calls are resent until
    /// they arrive and run on the Server in call order.
    pub fn call<R: Rpc>(&mut self, rpc: &R) -> Result<(), ClientError> {
        self.send_call(RpcCall::new(rpc))?;
        self.hub.flush();
        Ok(())
    }

    fn send_call(&mut self, mut call: RpcCall) -> Result<(), ClientError> {
        let key = self.server_key.ok_or(ClientError::NotConnected)?;
        let connection = self
            .hub
            .connection_mut(&key)
            .filter(|connection| connection.is_connected())
            .ok_or(ClientError::NotConnected)?;

        self.rpc_endpoint.assign_index(&mut call);
        let mut writer = ByteWriter::new();
        call.write(&mut writer);

        if call.is_reliable() {
            let packet_index = connection.send(writer.as_slice())?;
            self.calls.track(packet_index, call);
        } else {
            connection.send_unreliable(writer.as_slice())?;
        }
        Ok(())
    }

    // Accessors

    fn server_connection(&self) -> Option<&Connection> {
        self.hub.connection(&self.server_key?)
    }

    pub fn is_connected(&self) -> bool {
        self.is_connected
    }

    /// Whether a handshake is under way but not yet accepted
    pub fn is_connecting(&self) -> bool {
        self.server_key.is_some() && !self.is_connected
    }

    pub fn server_address(&self) -> Option<SocketAddr> {
        self.server_address
    }

    /// The address this client's socket is bound to
    pub fn local_address(&self) -> Option<SocketAddr> {
        self.hub.local_address(&self.server_key?)
    }

    /// Smoothed round trip time to the Server, in seconds
    pub fn rtt(&self) -> Option<f32> {
        let connection = self.server_connection()?;
        Some(connection.rtt().smoothed_rtt().as_secs_f32())
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

    /// Reliable calls sent whose delivery is not yet known
    pub fn calls_in_flight(&self) -> usize {
        self.calls.in_flight()
    }
}
