//! # Skein Shared
//! Common functionality shared between skein-server & skein-client crates:
//! the datagram transport, the connection state machine, the socket
//! multiplexer, dirty-bit replication and the ordered remote call channel.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

pub use skein_serde::{
    ByteCounter, ByteReader, ByteWrite, ByteWriter, Serde, SerdeErr, MTU_SIZE_BYTES,
};

mod connection;
mod hub;
mod replication;
mod rpc;
mod transport;
mod types;
mod wrapping_number;

pub use connection::{
    peek_packet_type, Connection, ConnectionConfig, ConnectionError, ConnectionState,
    DeliveryLedger, DeliveryOutcome, PacketNotifiable, PacketType, ReorderBuffer, RttEstimator,
    ServiceType,
};
pub use hub::{ConnectionHub, ConnectionKey, HubError};
pub use replication::{
    Change, CommandType, DiffMask, Field, NetworkComponent, ObjectFactory, ObjectRegistry,
    Replicate, ReplicatedObject, ReplicationCommand, ReplicationError, ReplicationEvent,
    ReplicationSession, SentStatePacket, StatePacket, StateUpdateReader, SyncVar,
};
pub use rpc::{Rpc, RpcCall, RpcEndpoint, RpcError, RpcTable};
pub use transport::{Socket, SocketFactory, TransportError, UdpSocket, UdpSocketFactory};
pub use types::{CallIndex, NetworkId, PacketIndex};
pub use wrapping_number::{effective_index, next_sequence_index, SEQUENCE_MODULUS};
