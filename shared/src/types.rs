/// Sequence id carried in every datagram header. 0 marks a service packet.
pub type PacketIndex = u16;
/// Identity of a replicated object, assigned by the authoritative side
pub type NetworkId = i32;
/// Position of a reliable remote call in its sender's call order
pub type CallIndex = i32;
