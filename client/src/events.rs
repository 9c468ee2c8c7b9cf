use skein_shared::NetworkId;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ClientEvent {
    /// The handshake with the server completed
    Connect,
    /// The connection to the server closed, or the handshake gave up
    Disconnect,
    /// The server created an object this client did not have
    Spawn(NetworkId),
    /// The server destroyed an object
    Despawn(NetworkId),
}
