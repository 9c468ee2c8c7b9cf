use std::net::SocketAddr;

use skein_shared::{ConnectionError, HubError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Binding the socket or starting the handshake failed
    #[error("Failed to connect: {0}")]
    Hub(#[from] HubError),

    /// The connection refused to send
    #[error("{0}")]
    Connection(#[from] ConnectionError),

    /// Calls can only be made once the handshake has completed
    #[error("Client is not connected")]
    NotConnected,

    /// `connect` was called while a connection is open or opening
    #[error("Client is already connected or connecting to {address}")]
    AlreadyConnected { address: SocketAddr },
}
