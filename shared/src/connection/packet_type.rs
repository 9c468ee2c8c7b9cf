// The leading bytes of every datagram: a 2-byte sequence id, followed for
// service packets (id 0) by the service type.

use skein_serde::{ByteReader, ByteWrite, Serde, SerdeErr};

use crate::types::PacketIndex;

#[derive(Copy, Debug, Clone, Eq, PartialEq)]
pub enum ServiceType {
    // Sent by a connecting peer until it is accepted
    ConnectionRequest,
    // Reply to every connection request
    ConnectionAccept,
    // Lists the sequence ids received since the last acknowledgement
    Acknowledge,
    // Keeps an idle connection alive
    Heartbeat,
    // Best-effort notice that the sender is closing
    Disconnect,
}

impl Serde for ServiceType {
    fn ser(&self, writer: &mut dyn ByteWrite) {
        let index: u8 = match self {
            ServiceType::ConnectionRequest => 0,
            ServiceType::ConnectionAccept => 1,
            ServiceType::Acknowledge => 2,
            ServiceType::Heartbeat => 3,
            ServiceType::Disconnect => 4,
        };
        index.ser(writer);
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        match u8::de(reader)? {
            0 => Ok(ServiceType::ConnectionRequest),
            1 => Ok(ServiceType::ConnectionAccept),
            2 => Ok(ServiceType::Acknowledge),
            3 => Ok(ServiceType::Heartbeat),
            4 => Ok(ServiceType::Disconnect),
            index => Err(SerdeErr::InvalidVariant {
                kind: "service type",
                index,
            }),
        }
    }

    fn byte_length(&self) -> usize {
        1
    }
}

#[derive(Copy, Debug, Clone, Eq, PartialEq)]
pub enum PacketType {
    // A control-plane packet, carried under the reserved id 0
    Service(ServiceType),
    // A data packet with its sequence id
    Data(PacketIndex),
}

impl PacketType {
    pub const HEADER_SIZE: usize = 2;
}

impl Serde for PacketType {
    fn ser(&self, writer: &mut dyn ByteWrite) {
        match self {
            PacketType::Service(service) => {
                0_u16.ser(writer);
                service.ser(writer);
            }
            PacketType::Data(index) => {
                index.ser(writer);
            }
        }
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        match PacketIndex::de(reader)? {
            0 => Ok(PacketType::Service(ServiceType::de(reader)?)),
            index => Ok(PacketType::Data(index)),
        }
    }

    fn byte_length(&self) -> usize {
        match self {
            PacketType::Service(_) => Self::HEADER_SIZE + 1,
            PacketType::Data(_) => Self::HEADER_SIZE,
        }
    }
}

/// Reads only the packet type from the front of a datagram
pub fn peek_packet_type(datagram: &[u8]) -> Option<PacketType> {
    PacketType::de(&mut ByteReader::new(datagram)).ok()
}
