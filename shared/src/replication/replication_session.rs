use std::collections::{BTreeMap, HashMap, VecDeque};

use log::warn;
use skein_serde::{ByteCounter, ByteWrite, ByteWriter, Serde};

use crate::{
    connection::{Connection, ConnectionError, PacketNotifiable},
    replication::{
        diff_mask::DiffMask,
        object_registry::ObjectRegistry,
        replicated_object::ReplicatedObject,
        replication_command::{CommandType, ReplicationCommand},
    },
    rpc::{RpcCall, RpcEndpoint},
    types::{NetworkId, PacketIndex},
};

/// Bytes taken by the four section counts at the front of a state packet
const SECTION_HEADER_SIZE: usize = 4;

struct SentCommand {
    network_id: NetworkId,
    command_type: CommandType,
    state_masks: Vec<DiffMask>,
}

/// What went into one state packet, kept until its delivery is known
#[derive(Default)]
pub struct SentStatePacket {
    commands: Vec<SentCommand>,
    rpcs: Vec<RpcCall>,
}

impl SentStatePacket {
    pub fn command_count(&self) -> usize {
        self.commands.len()
    }

    pub fn rpc_count(&self) -> usize {
        self.rpcs.len()
    }
}

/// An assembled state packet payload
pub struct StatePacket {
    pub bytes: Box<[u8]>,
    pub sent: SentStatePacket,
}

/// Per-peer replication state on the authoritative side: which objects the
/// peer must hear about, which of their fields changed, and the remote calls
/// waiting to go out
pub struct ReplicationSession {
    commands: BTreeMap<NetworkId, ReplicationCommand>,
    command_queue: VecDeque<NetworkId>,
    rpc_queue: VecDeque<RpcCall>,
    rpc_endpoint: RpcEndpoint,
    sent_packets: HashMap<PacketIndex, SentStatePacket>,
    is_local_viewer: bool,
}

impl ReplicationSession {
    pub fn new() -> Self {
        Self {
            commands: BTreeMap::new(),
            command_queue: VecDeque::new(),
            rpc_queue: VecDeque::new(),
            rpc_endpoint: RpcEndpoint::new(),
            sent_packets: HashMap::new(),
            is_local_viewer: false,
        }
    }

    /// A local viewer shares the authoritative world, so it is never sent
    /// replication traffic. Anything already queued for it is discarded.
    pub fn set_local_viewer(&mut self, is_local_viewer: bool) {
        self.is_local_viewer = is_local_viewer;
        if is_local_viewer {
            self.commands.clear();
            self.command_queue.clear();
        }
    }

    pub fn is_local_viewer(&self) -> bool {
        self.is_local_viewer
    }

    // Visibility

    /// The object entered this peer's view: send it in full
    pub fn show(&mut self, object: &ReplicatedObject) {
        if self.is_local_viewer {
            return;
        }
        self.commands
            .insert(object.network_id(), ReplicationCommand::create(object));
    }

    /// The object left this peer's view: have the peer destroy it
    pub fn hide(&mut self, network_id: NetworkId) {
        if self.is_local_viewer {
            return;
        }
        self.replicate_destroy(network_id);
    }

    fn replicate_destroy(&mut self, network_id: NetworkId) {
        match self.commands.get_mut(&network_id) {
            Some(command) => command.mark_destroyed(),
            None => {
                self.commands
                    .insert(network_id, ReplicationCommand::destroy(network_id));
            }
        }
    }

    pub fn queue_rpc(&mut self, call: RpcCall) {
        self.rpc_queue.push_back(call);
    }

    // Outgoing

    /// Fold every visible object's latest state masks into its command and
    /// queue the commands that have something to send
    pub fn update_commands(&mut self, registry: &ObjectRegistry) {
        self.command_queue.clear();
        for (network_id, command) in self.commands.iter_mut() {
            match registry.get(network_id) {
                Some(object) => command.update_state_masks(object),
                None if command.command_type() != CommandType::Destroy => {
                    warn!("object {} vanished without being hidden", network_id);
                    command.mark_destroyed();
                }
                None => {}
            }
            if command.has_dirty_state() {
                self.command_queue.push_back(*network_id);
            }
        }
    }

    pub fn has_pending(&self) -> bool {
        !self.command_queue.is_empty() || !self.rpc_queue.is_empty()
    }

    /// Assemble the next state packet from the front of the command and RPC
    /// queues, stopping at the first entry that would take the packet past
    /// `max_packet_size`. Entries left behind stay queued. Returns None if
    /// nothing fit.
    pub fn write_packet(
        &mut self,
        registry: &ObjectRegistry,
        max_packet_size: usize,
    ) -> Option<StatePacket> {
        let mut sections = [ByteWriter::new(), ByteWriter::new(), ByteWriter::new()];
        let mut counts = [0_u8; 3];
        let mut size = SECTION_HEADER_SIZE;
        let mut sent = SentStatePacket::default();

        while let Some(network_id) = self.command_queue.front().copied() {
            let Some(command) = self.commands.get(&network_id) else {
                self.command_queue.pop_front();
                continue;
            };
            let section = match command.command_type() {
                CommandType::Create => 0,
                CommandType::Update => 1,
                CommandType::Destroy => 2,
            };
            if counts[section] == u8::MAX {
                break;
            }

            let mut counter = ByteCounter::new();
            if !write_command(&mut counter, command, registry) {
                self.command_queue.pop_front();
                continue;
            }
            if counter.overflows(size, max_packet_size) {
                break;
            }
            size += counter.count();
            write_command(&mut sections[section], command, registry);
            counts[section] += 1;
            self.command_queue.pop_front();

            sent.commands.push(SentCommand {
                network_id,
                command_type: command.command_type(),
                state_masks: command.state_masks().to_vec(),
            });
            if command.command_type() == CommandType::Destroy {
                self.commands.remove(&network_id);
            } else if let Some(command) = self.commands.get_mut(&network_id) {
                command.clear_state_masks();
            }
        }

        let mut rpc_section = ByteWriter::new();
        let mut rpc_count = 0_u8;
        while let Some(call) = self.rpc_queue.front_mut() {
            if rpc_count == u8::MAX {
                break;
            }
            self.rpc_endpoint.assign_index(call);
            let mut counter = ByteCounter::new();
            call.write(&mut counter);
            if counter.overflows(size, max_packet_size) {
                break;
            }
            size += counter.count();
            call.write(&mut rpc_section);
            rpc_count += 1;
            if let Some(call) = self.rpc_queue.pop_front() {
                if call.is_reliable() {
                    sent.rpcs.push(call);
                }
            }
        }

        if counts.iter().all(|count| *count == 0) && rpc_count == 0 {
            return None;
        }

        let mut writer = ByteWriter::with_capacity(size);
        for (count, section) in counts.iter().zip(sections.iter()) {
            count.ser(&mut writer);
            writer.write_bytes(section.as_slice());
        }
        rpc_count.ser(&mut writer);
        writer.write_bytes(rpc_section.as_slice());

        Some(StatePacket {
            bytes: writer.to_bytes(),
            sent,
        })
    }

    /// Write one state packet and send it over `connection`. Returns whether
    /// anything was sent.
    pub fn post(
        &mut self,
        registry: &ObjectRegistry,
        connection: &mut Connection,
        max_packet_size: usize,
    ) -> Result<bool, ConnectionError> {
        let Some(packet) = self.write_packet(registry, max_packet_size) else {
            return Ok(false);
        };
        match connection.send(&packet.bytes) {
            Ok(packet_index) => {
                self.sent_packets.insert(packet_index, packet.sent);
                Ok(true)
            }
            Err(error) => {
                self.handle_dropped(packet.sent);
                Err(error)
            }
        }
    }

    /// Queue every changed object and post packets until nothing is left
    pub fn send_state_update(
        &mut self,
        registry: &ObjectRegistry,
        connection: &mut Connection,
        max_packet_size: usize,
    ) -> Result<(), ConnectionError> {
        self.update_commands(registry);
        while self.has_pending() {
            if !self.post(registry, connection, max_packet_size)? {
                warn!(
                    "state update entry larger than the {} byte packet limit, it cannot be sent",
                    max_packet_size
                );
                break;
            }
        }
        Ok(())
    }

    // Delivery

    fn handle_delivered(&mut self, sent: SentStatePacket) {
        for sent_command in sent.commands {
            if sent_command.command_type != CommandType::Create {
                continue;
            }
            if let Some(command) = self.commands.get_mut(&sent_command.network_id) {
                if command.command_type() != CommandType::Destroy {
                    command.set_command_type(CommandType::Update);
                }
            }
        }
    }

    fn handle_dropped(&mut self, sent: SentStatePacket) {
        for sent_command in sent.commands {
            match sent_command.command_type {
                CommandType::Create | CommandType::Update => {
                    if let Some(command) = self.commands.get_mut(&sent_command.network_id) {
                        command.add_state_masks(sent_command.state_masks);
                    }
                }
                CommandType::Destroy => self.replicate_destroy(sent_command.network_id),
            }
        }
        self.rpc_queue.extend(sent.rpcs);
    }

    /// Resend everything from scratch, as to a peer that lost all state
    pub fn reset_commands(&mut self) {
        self.commands
            .retain(|_, command| command.command_type() != CommandType::Destroy);
        for command in self.commands.values_mut() {
            command.set_command_type(CommandType::Create);
            command.reset_state_masks();
        }
    }

    // Accessors

    pub fn command(&self, network_id: &NetworkId) -> Option<&ReplicationCommand> {
        self.commands.get(network_id)
    }

    pub fn queued_commands(&self) -> usize {
        self.command_queue.len()
    }

    pub fn queued_rpcs(&self) -> usize {
        self.rpc_queue.len()
    }

    pub fn packets_in_flight(&self) -> usize {
        self.sent_packets.len()
    }

    pub fn rpc_endpoint_mut(&mut self) -> &mut RpcEndpoint {
        &mut self.rpc_endpoint
    }
}

impl Default for ReplicationSession {
    fn default() -> Self {
        Self::new()
    }
}

impl PacketNotifiable for ReplicationSession {
    fn notify_packet_delivered(&mut self, packet_index: PacketIndex) {
        if let Some(sent) = self.sent_packets.remove(&packet_index) {
            self.handle_delivered(sent);
        }
    }

    fn notify_packet_dropped(&mut self, packet_index: PacketIndex) {
        if let Some(sent) = self.sent_packets.remove(&packet_index) {
            self.handle_dropped(sent);
        }
    }
}

// Create: id, type name, component block. Update: id, component block.
// Destroy: id. Returns false if the object to describe no longer exists.
fn write_command(
    writer: &mut dyn ByteWrite,
    command: &ReplicationCommand,
    registry: &ObjectRegistry,
) -> bool {
    let network_id = command.network_id();
    if command.command_type() == CommandType::Destroy {
        network_id.ser(writer);
        return true;
    }
    let Some(object) = registry.get(&network_id) else {
        return false;
    };
    network_id.ser(writer);
    if command.command_type() == CommandType::Create {
        object.type_name().to_string().ser(writer);
    }
    object.write_components(command.state_masks(), writer);
    true
}
