use std::net::SocketAddr;

use skein_shared::{ConnectionKey, HubError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    /// Binding the listening socket failed
    #[error("Failed to listen: {0}")]
    Hub(#[from] HubError),

    /// `listen` was called on a server that already listens
    #[error("Server is already listening on {address}")]
    AlreadyListening { address: SocketAddr },

    /// The user is not (or no longer) connected
    #[error("No connected user {key:?}")]
    UnknownUser { key: ConnectionKey },
}
