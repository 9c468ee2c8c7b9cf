use crate::replication::replicated_object::ReplicatedObject;

/// Builds the local counterpart of objects created by the remote host
pub trait ObjectFactory {
    /// An empty object of the named type, with its components in wire order.
    /// None if the type is unknown.
    fn create_object(&mut self, type_name: &str) -> Option<ReplicatedObject>;

    /// Called with an object the remote host has destroyed
    fn destroy_object(&mut self, object: ReplicatedObject);
}
