use skein_serde::SerdeErr;
use thiserror::Error;

/// Errors raised while reading remote calls from a packet
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RpcError {
    /// The call name has no registered handler, so its arguments, and
    /// everything after them in the packet, cannot be read
    #[error("No handler registered for remote call '{name}'")]
    UnknownCall { name: String },

    /// The call's bytes could not be decoded
    #[error("Malformed remote call: {0}")]
    Serde(#[from] SerdeErr),
}
