use skein_serde::{ByteReader, ByteWrite, Serde};

use crate::{
    replication::{
        diff_mask::DiffMask, error::ReplicationError, network_component::NetworkComponent,
        replicate::Replicate,
    },
    types::NetworkId,
};

/// An object whose components are kept in sync across the network. The
/// component order is part of the wire format: a component's position is its
/// bit in the presence mask.
pub struct ReplicatedObject {
    network_id: NetworkId,
    type_name: String,
    components: Vec<NetworkComponent>,
}

impl ReplicatedObject {
    /// Create an object not yet registered, so without a network id
    pub fn new(type_name: &str) -> Self {
        Self {
            network_id: 0,
            type_name: type_name.to_string(),
            components: Vec::new(),
        }
    }

    pub fn with_component<R: Replicate>(mut self, component: R) -> Self {
        self.add_component(component);
        self
    }

    pub fn add_component<R: Replicate>(&mut self, component: R) {
        self.components.push(NetworkComponent::new(component));
    }

    pub fn network_id(&self) -> NetworkId {
        self.network_id
    }

    pub(crate) fn set_network_id(&mut self, network_id: NetworkId) {
        self.network_id = network_id;
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// The component at `index`, if it is an `R`
    pub fn component<R: Replicate>(&self, index: usize) -> Option<&R> {
        self.components.get(index)?.get::<R>()
    }

    pub fn component_mut<R: Replicate>(&mut self, index: usize) -> Option<&mut R> {
        self.components.get_mut(index)?.get_mut::<R>()
    }

    /// The first component that is an `R`
    pub fn find_component<R: Replicate>(&self) -> Option<&R> {
        self.components.iter().find_map(NetworkComponent::get::<R>)
    }

    pub fn find_component_mut<R: Replicate>(&mut self) -> Option<&mut R> {
        self.components
            .iter_mut()
            .find_map(NetworkComponent::get_mut::<R>)
    }

    pub fn update_state_masks(&mut self) {
        for component in &mut self.components {
            component.update_state_mask();
        }
    }

    pub fn state_masks(&self) -> impl Iterator<Item = DiffMask> + '_ {
        self.components.iter().map(NetworkComponent::state_mask)
    }

    /// Write a component block: a presence mask, then for each present
    /// component its field mask and the selected fields
    pub fn write_components(&self, masks: &[DiffMask], writer: &mut dyn ByteWrite) {
        let mut presence = DiffMask::EMPTY;
        for (index, mask) in masks.iter().enumerate().take(self.components.len()) {
            if !mask.is_clear() {
                presence.set_bit(index);
            }
        }
        presence.ser(writer);

        for (index, component) in self.components.iter().enumerate() {
            if presence.bit(index) {
                masks[index].ser(writer);
                component.write(&masks[index], writer);
            }
        }
    }

    /// Apply a component block written by `write_components`
    pub fn read_components(&mut self, reader: &mut ByteReader) -> Result<(), ReplicationError> {
        let presence = DiffMask::de(reader)?;
        for index in 0..DiffMask::MAX_BITS {
            if !presence.bit(index) {
                continue;
            }
            let component =
                self.components
                    .get_mut(index)
                    .ok_or(ReplicationError::UnknownComponent {
                        network_id: self.network_id,
                        index,
                    })?;
            let mask = DiffMask::de(reader)?;
            component.read(&mask, reader)?;
        }
        Ok(())
    }
}
