#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    Default,
    Connecting,
    AwaitingConnection,
    Connected,
}
