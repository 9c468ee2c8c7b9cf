use std::{
    collections::{vec_deque, VecDeque},
    net::SocketAddr,
    time::{Duration, Instant},
};

use log::{debug, info, trace, warn};
use skein_serde::{ByteReader, ByteWrite, ByteWriter, Serde, SerdeErr};

use crate::{
    connection::{
        connection_config::ConnectionConfig,
        connection_state::ConnectionState,
        delivery_ledger::DeliveryLedger,
        error::ConnectionError,
        packet_notifiable::PacketNotifiable,
        packet_type::{PacketType, ServiceType},
        reorder_buffer::ReorderBuffer,
        rtt_estimator::RttEstimator,
    },
    types::PacketIndex,
    wrapping_number::next_sequence_index,
};

/// One end of a sequenced, acknowledged datagram stream to a single remote
/// peer. A Connection never touches a socket: datagrams are pushed in with
/// `buffer_incoming` and taken out with `drain_outgoing`.
pub struct Connection {
    config: ConnectionConfig,
    state: ConnectionState,
    local_address: SocketAddr,
    remote_address: Option<SocketAddr>,
    next_packet_index: PacketIndex,
    ledger: DeliveryLedger,
    reorder_buffer: ReorderBuffer,
    pending_acks: Vec<PacketIndex>,
    rtt: RttEstimator,
    now: Instant,
    connect_started_at: Instant,
    last_request_at: Option<Instant>,
    last_received_at: Instant,
    last_sent_at: Instant,
    closed: bool,
    incoming: VecDeque<Box<[u8]>>,
    outgoing: VecDeque<Box<[u8]>>,
}

impl Connection {
    pub fn new(config: &ConnectionConfig, local_address: SocketAddr, now: Instant) -> Self {
        Self {
            config: config.clone(),
            state: ConnectionState::Default,
            local_address,
            remote_address: None,
            next_packet_index: 1,
            ledger: DeliveryLedger::new(),
            reorder_buffer: ReorderBuffer::new(config.wraparound_window),
            pending_acks: Vec::new(),
            rtt: RttEstimator::new(config),
            now,
            connect_started_at: now,
            last_request_at: None,
            last_received_at: now,
            last_sent_at: now,
            closed: false,
            incoming: VecDeque::with_capacity(config.inbound_capacity),
            outgoing: VecDeque::new(),
        }
    }

    /// A half-open connection for a peer that asked to connect to a listener.
    /// It stays in Default until `start` is called.
    pub fn new_incoming(
        config: &ConnectionConfig,
        local_address: SocketAddr,
        remote_address: SocketAddr,
        now: Instant,
    ) -> Self {
        let mut connection = Self::new(config, local_address, now);
        connection.remote_address = Some(remote_address);
        connection
    }

    // Lifecycle

    /// Begin a handshake with `remote_address`
    pub fn connect(&mut self, remote_address: SocketAddr) -> Result<(), ConnectionError> {
        self.ensure_unused()?;
        self.remote_address = Some(remote_address);
        self.state = ConnectionState::Connecting;
        self.connect_started_at = self.now;
        self.send_connection_request();
        Ok(())
    }

    /// Start accepting connection requests
    pub fn listen(&mut self) -> Result<(), ConnectionError> {
        self.ensure_unused()?;
        self.state = ConnectionState::AwaitingConnection;
        Ok(())
    }

    fn ensure_unused(&self) -> Result<(), ConnectionError> {
        if self.state != ConnectionState::Default || self.closed {
            return Err(ConnectionError::AlreadyInUse { state: self.state });
        }
        Ok(())
    }

    /// Accept the peer behind a half-open connection
    pub fn start(&mut self) {
        self.send_service(ServiceType::ConnectionAccept);
        self.establish();
    }

    fn establish(&mut self) {
        self.state = ConnectionState::Connected;
        self.last_received_at = self.now;
        self.last_sent_at = self.now;
        if let Some(address) = self.remote_address {
            info!("connection established with {}", address);
        }
    }

    /// Close an established connection, notifying the peer on a best-effort
    /// basis. Has no effect in any other state.
    pub fn disconnect(&mut self) {
        if self.state != ConnectionState::Connected {
            return;
        }
        self.send_service(ServiceType::Disconnect);
        self.close();
    }

    /// Close the connection from any state without notifying the peer
    pub fn abort(&mut self) {
        if self.state == ConnectionState::AwaitingConnection {
            return;
        }
        self.close();
    }

    fn close(&mut self) {
        if let Some(address) = self.remote_address {
            info!("connection with {} closed", address);
        }
        self.state = ConnectionState::Default;
        self.closed = true;
        self.pending_acks.clear();
        self.reorder_buffer.clear();
        self.ledger.drop_all();
    }

    // Incoming Data

    /// Queue a raw datagram for the next update. Returns false, dropping the
    /// datagram, when the inbound queue is full.
    pub fn buffer_incoming(&mut self, datagram: &[u8]) -> bool {
        if self.incoming.len() >= self.config.inbound_capacity {
            return false;
        }
        self.incoming.push_back(datagram.into());
        true
    }

    /// Process queued datagrams and run timers
    pub fn update(&mut self, now: Instant) {
        self.now = now;
        self.process_incoming();

        match self.state {
            ConnectionState::Connecting => self.update_handshake(),
            ConnectionState::Connected => self.update_connected(),
            ConnectionState::Default | ConnectionState::AwaitingConnection => {}
        }
    }

    fn process_incoming(&mut self) {
        while let Some(datagram) = self.incoming.pop_front() {
            let mut reader = ByteReader::new(&datagram);
            let result = match PacketType::de(&mut reader) {
                Ok(PacketType::Service(service)) => self.process_service(service, &mut reader),
                Ok(PacketType::Data(packet_index)) => {
                    let payload = &datagram[PacketType::HEADER_SIZE..];
                    self.process_data(packet_index, payload);
                    Ok(())
                }
                Err(error) => Err(error),
            };
            if let Err(error) = result {
                debug!("discarding malformed datagram: {}", error);
            }
        }
    }

    fn process_service(
        &mut self,
        service: ServiceType,
        reader: &mut ByteReader,
    ) -> Result<(), SerdeErr> {
        match service {
            ServiceType::ConnectionRequest => {
                self.send_service(ServiceType::ConnectionAccept);
            }
            ServiceType::ConnectionAccept => {
                if self.state == ConnectionState::Connecting {
                    self.establish();
                }
            }
            ServiceType::Acknowledge => {
                if self.state == ConnectionState::Connected {
                    self.process_acknowledge(reader)?;
                }
            }
            ServiceType::Heartbeat => {
                self.last_received_at = self.now;
            }
            ServiceType::Disconnect => {
                if self.state == ConnectionState::Connected {
                    self.close();
                }
            }
        }
        Ok(())
    }

    fn process_acknowledge(&mut self, reader: &mut ByteReader) -> Result<(), SerdeErr> {
        let count = i32::de(reader)?;
        for _ in 0..count.max(0) {
            let packet_index = PacketIndex::de(reader)?;
            if let Some(sent_at) = self.ledger.acknowledge(packet_index) {
                self.rtt
                    .record_sample(self.now.saturating_duration_since(sent_at));
            }
        }
        Ok(())
    }

    fn process_data(&mut self, packet_index: PacketIndex, payload: &[u8]) {
        if self.state != ConnectionState::Connected {
            return;
        }
        self.last_received_at = self.now;
        if self.reorder_buffer.insert(packet_index, payload.into()) {
            self.pending_acks.push(packet_index);
        } else {
            trace!("discarding stale packet {}", packet_index);
        }
    }

    // Timers

    fn update_handshake(&mut self) {
        if self.since(self.connect_started_at) >= self.config.handshake_timeout {
            warn!(
                "no reply to connection request from {:?}, giving up",
                self.remote_address
            );
            self.close();
            return;
        }
        let request_due = match self.last_request_at {
            Some(last_request_at) => {
                self.since(last_request_at) >= self.config.connection_request_interval
            }
            None => true,
        };
        if request_due {
            self.send_connection_request();
        }
    }

    fn update_connected(&mut self) {
        // Delivery timeouts
        let dropped = self.ledger.expire(self.now, self.rtt.timeout());
        if dropped > 0 {
            self.rtt.back_off();
        }
        self.ledger.merge_staged();

        // Liveness
        if self.since(self.last_received_at) >= self.config.disconnection_timeout {
            info!("{:?} timed out", self.remote_address);
            self.disconnect();
            return;
        }

        // Acks
        if !self.pending_acks.is_empty() {
            self.send_acknowledge();
        }

        // Heartbeats
        if self.since(self.last_sent_at) >= self.config.heartbeat_interval {
            self.send_service(ServiceType::Heartbeat);
            self.last_sent_at = self.now;
        }
    }

    fn since(&self, then: Instant) -> Duration {
        self.now.saturating_duration_since(then)
    }

    // Outgoing Data

    /// Send `payload` and track its delivery. The outcome is reported through
    /// `notify` once the packet is acknowledged or times out.
    pub fn send(&mut self, payload: &[u8]) -> Result<PacketIndex, ConnectionError> {
        let packet_index = self.send_unreliable(payload)?;
        self.ledger.stage(packet_index, self.now);
        Ok(packet_index)
    }

    /// Send `payload` without tracking whether it arrives
    pub fn send_unreliable(&mut self, payload: &[u8]) -> Result<PacketIndex, ConnectionError> {
        if self.state != ConnectionState::Connected {
            return Err(ConnectionError::NotConnected { state: self.state });
        }
        let packet_index = self.next_packet_index;
        self.next_packet_index = next_sequence_index(packet_index);

        let mut writer =
            ByteWriter::with_capacity(PacketType::HEADER_SIZE + payload.len());
        PacketType::Data(packet_index).ser(&mut writer);
        writer.write_bytes(payload);
        self.outgoing.push_back(writer.to_bytes());
        self.last_sent_at = self.now;
        Ok(packet_index)
    }

    fn send_connection_request(&mut self) {
        self.send_service(ServiceType::ConnectionRequest);
        self.last_request_at = Some(self.now);
    }

    fn send_acknowledge(&mut self) {
        let mut writer = ByteWriter::new();
        PacketType::Service(ServiceType::Acknowledge).ser(&mut writer);
        (self.pending_acks.len() as i32).ser(&mut writer);
        for packet_index in self.pending_acks.drain(..) {
            packet_index.ser(&mut writer);
        }
        self.outgoing.push_back(writer.to_bytes());
    }

    fn send_service(&mut self, service: ServiceType) {
        let mut writer = ByteWriter::new();
        PacketType::Service(service).ser(&mut writer);
        self.outgoing.push_back(writer.to_bytes());
    }

    /// Take every datagram waiting to be written to the socket
    pub fn drain_outgoing(&mut self) -> vec_deque::Drain<'_, Box<[u8]>> {
        self.outgoing.drain(..)
    }

    // Reading

    pub fn has_data(&self) -> bool {
        !self.reorder_buffer.is_empty()
    }

    /// Take the next received payload, lowest sequence id first
    pub fn receive(&mut self) -> Option<Box<[u8]>> {
        self.reorder_buffer.pop()
    }

    /// Hand delivery outcomes collected since the last call to `notifiable`
    pub fn notify(&mut self, notifiable: &mut dyn PacketNotifiable) {
        self.ledger.notify(notifiable);
    }

    // Accessors

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    /// Whether this connection has ended and can be discarded
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn local_address(&self) -> SocketAddr {
        self.local_address
    }

    pub fn remote_address(&self) -> Option<SocketAddr> {
        self.remote_address
    }

    pub fn rtt(&self) -> &RttEstimator {
        &self.rtt
    }

    pub fn outstanding_deliveries(&self) -> usize {
        self.ledger.outstanding()
    }
}
