mod diff_mask;
mod error;
mod network_component;
mod object_factory;
mod object_registry;
mod replicate;
mod replicated_object;
mod replication_command;
mod replication_session;
mod state_update_reader;
mod sync_var;

pub use diff_mask::DiffMask;
pub use error::ReplicationError;
pub use network_component::NetworkComponent;
pub use object_factory::ObjectFactory;
pub use object_registry::ObjectRegistry;
pub use replicate::Replicate;
pub use replicated_object::ReplicatedObject;
pub use replication_command::{CommandType, ReplicationCommand};
pub use replication_session::{ReplicationSession, SentStatePacket, StatePacket};
pub use state_update_reader::{ReplicationEvent, StateUpdateReader};
pub use sync_var::{Change, Field, SyncVar};
