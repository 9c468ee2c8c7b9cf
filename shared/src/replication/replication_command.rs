use crate::{
    replication::{diff_mask::DiffMask, replicated_object::ReplicatedObject},
    types::NetworkId,
};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CommandType {
    Create,
    Update,
    Destroy,
}

/// What one peer still needs to hear about one object. Field masks
/// accumulate across state updates until they are written into a packet.
#[derive(Clone, Debug)]
pub struct ReplicationCommand {
    network_id: NetworkId,
    command_type: CommandType,
    state_masks: Vec<DiffMask>,
    has_dirty_state: bool,
}

impl ReplicationCommand {
    pub fn create(object: &ReplicatedObject) -> Self {
        Self {
            network_id: object.network_id(),
            command_type: CommandType::Create,
            state_masks: vec![DiffMask::FULL; object.component_count()],
            has_dirty_state: true,
        }
    }

    pub fn destroy(network_id: NetworkId) -> Self {
        Self {
            network_id,
            command_type: CommandType::Destroy,
            state_masks: Vec::new(),
            has_dirty_state: true,
        }
    }

    pub fn network_id(&self) -> NetworkId {
        self.network_id
    }

    pub fn command_type(&self) -> CommandType {
        self.command_type
    }

    pub fn state_masks(&self) -> &[DiffMask] {
        &self.state_masks
    }

    pub fn has_dirty_state(&self) -> bool {
        self.has_dirty_state
    }

    pub(crate) fn set_command_type(&mut self, command_type: CommandType) {
        self.command_type = command_type;
    }

    pub(crate) fn mark_destroyed(&mut self) {
        self.command_type = CommandType::Destroy;
        self.has_dirty_state = true;
    }

    /// Fold the object's latest state masks in. A create is always dirty.
    pub fn update_state_masks(&mut self, object: &ReplicatedObject) {
        if self.command_type == CommandType::Destroy {
            return;
        }
        self.add_state_masks(object.state_masks());
        self.has_dirty_state = self.command_type == CommandType::Create
            || self.state_masks.iter().any(|mask| !mask.is_clear());
    }

    /// OR `masks` into the accumulated masks
    pub fn add_state_masks(&mut self, masks: impl IntoIterator<Item = DiffMask>) {
        for (index, mask) in masks.into_iter().enumerate() {
            match self.state_masks.get_mut(index) {
                Some(current) => current.or(&mask),
                None => self.state_masks.push(mask),
            }
        }
    }

    /// The masks have been written into a packet
    pub fn clear_state_masks(&mut self) {
        for mask in &mut self.state_masks {
            mask.clear();
        }
        self.has_dirty_state = false;
    }

    /// Mark every field of every component for sending
    pub fn reset_state_masks(&mut self) {
        for mask in &mut self.state_masks {
            *mask = DiffMask::FULL;
        }
        self.has_dirty_state = true;
    }
}
