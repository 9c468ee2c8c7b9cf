use thiserror::Error;

use crate::connection::ConnectionState;

/// Errors surfaced by a Connection to its owner
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectionError {
    /// Data can only be sent over an established connection
    #[error("Cannot send data while connection is {state:?}")]
    NotConnected { state: ConnectionState },

    /// `connect` or `listen` was called on a connection already in use
    #[error("Connection is already {state:?}")]
    AlreadyInUse { state: ConnectionState },
}
