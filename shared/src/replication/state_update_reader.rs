use log::warn;
use skein_serde::{ByteReader, Serde};

use crate::{
    hub::ConnectionKey,
    replication::{
        error::ReplicationError, object_factory::ObjectFactory, object_registry::ObjectRegistry,
    },
    rpc::{RpcEndpoint, RpcTable},
    types::NetworkId,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReplicationEvent {
    /// A create arrived for an object this side did not have
    Spawn(NetworkId),
    /// The remote host destroyed an object
    Despawn(NetworkId),
}

/// Applies state packets from the authoritative side to a local registry
pub struct StateUpdateReader<'a, C> {
    pub registry: &'a mut ObjectRegistry,
    pub factory: &'a mut dyn ObjectFactory,
    pub rpc_endpoint: &'a mut RpcEndpoint,
    pub rpc_table: &'a mut RpcTable<C>,
    pub context: &'a mut C,
}

impl<'a, C> StateUpdateReader<'a, C> {
    /// Apply one state packet. Events for everything applied are pushed to
    /// `events`, including when reading stops early with an error.
    pub fn read(
        &mut self,
        reader: &mut ByteReader,
        events: &mut Vec<ReplicationEvent>,
    ) -> Result<(), ReplicationError> {
        // Creates
        let create_count = u8::de(reader)?;
        for _ in 0..create_count {
            self.read_create(reader, events)?;
        }

        // Updates
        let update_count = u8::de(reader)?;
        for _ in 0..update_count {
            let network_id = NetworkId::de(reader)?;
            let object = self
                .registry
                .get_mut(&network_id)
                .ok_or(ReplicationError::UnknownObject { network_id })?;
            object.read_components(reader)?;
        }

        // Destroys
        let destroy_count = u8::de(reader)?;
        for _ in 0..destroy_count {
            let network_id = NetworkId::de(reader)?;
            if let Some(object) = self.registry.remove(&network_id) {
                self.factory.destroy_object(object);
                events.push(ReplicationEvent::Despawn(network_id));
            }
        }

        // Remote calls
        let rpc_count = u8::de(reader)?;
        for _ in 0..rpc_count {
            self.rpc_endpoint
                .read_execute(reader, &mut *self.rpc_table, &mut *self.context, None)?;
        }

        Ok(())
    }

    fn read_create(
        &mut self,
        reader: &mut ByteReader,
        events: &mut Vec<ReplicationEvent>,
    ) -> Result<(), ReplicationError> {
        let network_id = NetworkId::de(reader)?;
        let type_name = String::de(reader)?;

        if !self.registry.contains(&network_id) {
            let object = self
                .factory
                .create_object(&type_name)
                .ok_or(ReplicationError::UnknownObjectType { type_name })?;
            self.registry.insert_with_id(network_id, object);
            events.push(ReplicationEvent::Spawn(network_id));
        }

        match self.registry.get_mut(&network_id) {
            Some(object) => object.read_components(reader),
            None => {
                warn!("object {} missing right after creation", network_id);
                Err(ReplicationError::UnknownObject { network_id })
            }
        }
    }
}
