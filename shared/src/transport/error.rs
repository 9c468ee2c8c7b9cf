use std::{io, net::SocketAddr};

use thiserror::Error;

/// Errors raised by a Socket
#[derive(Debug, Error)]
pub enum TransportError {
    /// The socket could not be bound to the requested local address
    #[error("Failed to bind socket to {address}: {source}")]
    Bind {
        address: SocketAddr,
        source: io::Error,
    },

    /// A transient OS-level failure not attributable to any one peer
    #[error("Socket I/O error: {0}")]
    Io(#[from] io::Error),

    /// A failure caused by, and reported against, one remote peer
    #[error("Socket error for peer {address}: {source}")]
    Peer {
        address: SocketAddr,
        source: io::Error,
    },
}

impl TransportError {
    /// The remote peer this error is attributed to, if any
    pub fn peer_address(&self) -> Option<SocketAddr> {
        match self {
            TransportError::Peer { address, .. } => Some(*address),
            _ => None,
        }
    }
}
