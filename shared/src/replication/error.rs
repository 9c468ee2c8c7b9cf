use skein_serde::SerdeErr;
use thiserror::Error;

use crate::{rpc::RpcError, types::NetworkId};

/// Errors raised while applying a state update. Reading stops at the first
/// one, losing the rest of that packet.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplicationError {
    /// The packet's bytes could not be decoded
    #[error("Malformed state update: {0}")]
    Serde(#[from] SerdeErr),

    /// A remote call in the packet could not be read
    #[error("{0}")]
    Rpc(#[from] RpcError),

    /// The object factory does not know how to build this type
    #[error("No factory for object type '{type_name}'")]
    UnknownObjectType { type_name: String },

    /// An update arrived for an object this side has never seen created
    #[error("Update for unknown object {network_id}")]
    UnknownObject { network_id: NetworkId },

    /// A component block referenced a component the object does not have
    #[error("Object {network_id} has no component at index {index}")]
    UnknownComponent { network_id: NetworkId, index: usize },
}
