use std::net::SocketAddr;

use thiserror::Error;

use crate::{connection::ConnectionError, transport::TransportError};

/// Errors returned by ConnectionHub operations
#[derive(Debug, Error)]
pub enum HubError {
    /// Binding or using the underlying socket failed
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// The connection rejected the requested transition
    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),

    /// A local address can carry only one listener
    #[error("A listener is already registered on {address}")]
    ListenerExists { address: SocketAddr },

    /// A local address can carry only one connection per remote peer
    #[error("A connection from {local} to {remote} already exists")]
    PeerExists {
        local: SocketAddr,
        remote: SocketAddr,
    },
}
