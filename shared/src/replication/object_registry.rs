use std::collections::BTreeMap;

use log::warn;

use crate::{replication::replicated_object::ReplicatedObject, types::NetworkId};

/// Every replicated object known to one side, keyed by network id
pub struct ObjectRegistry {
    objects: BTreeMap<NetworkId, ReplicatedObject>,
    next_network_id: NetworkId,
}

impl ObjectRegistry {
    pub fn new() -> Self {
        Self {
            objects: BTreeMap::new(),
            next_network_id: 1,
        }
    }

    /// Register an object under the next network id
    pub fn insert(&mut self, mut object: ReplicatedObject) -> NetworkId {
        let network_id = self.next_network_id;
        self.next_network_id += 1;
        object.set_network_id(network_id);
        self.objects.insert(network_id, object);
        network_id
    }

    /// Register an object under an id chosen by the remote host
    pub fn insert_with_id(&mut self, network_id: NetworkId, mut object: ReplicatedObject) {
        object.set_network_id(network_id);
        if self.objects.insert(network_id, object).is_some() {
            warn!("replaced existing object {}", network_id);
        }
    }

    pub fn get(&self, network_id: &NetworkId) -> Option<&ReplicatedObject> {
        self.objects.get(network_id)
    }

    pub fn get_mut(&mut self, network_id: &NetworkId) -> Option<&mut ReplicatedObject> {
        self.objects.get_mut(network_id)
    }

    pub fn remove(&mut self, network_id: &NetworkId) -> Option<ReplicatedObject> {
        self.objects.remove(network_id)
    }

    pub fn contains(&self, network_id: &NetworkId) -> bool {
        self.objects.contains_key(network_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReplicatedObject> {
        self.objects.values()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Rebuild every object's state masks from its dirty fields
    pub fn update_state_masks(&mut self) {
        for object in self.objects.values_mut() {
            object.update_state_masks();
        }
    }

    pub fn clear(&mut self) {
        self.objects.clear();
    }
}

impl Default for ObjectRegistry {
    fn default() -> Self {
        Self::new()
    }
}
