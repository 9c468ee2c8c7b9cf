use skein_shared::ConnectionKey;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ServerEvent {
    /// A client completed the handshake and is now a user
    Connect(ConnectionKey),
    /// A user disconnected or timed out. Its key is no longer valid.
    Disconnect(ConnectionKey),
}
