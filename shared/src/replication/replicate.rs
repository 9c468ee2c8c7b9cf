use std::any::Any;

use crate::replication::sync_var::Field;

/// A replicated component: an ordered list of fields. A field's position is
/// its bit in the component's diff mask, so the order is part of the wire
/// format. Implement with [`impl_replicate!`](crate::impl_replicate).
pub trait Replicate: Any {
    fn fields(&self) -> Vec<&dyn Field>;
    fn fields_mut(&mut self) -> Vec<&mut dyn Field>;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Implements [`Replicate`] for a struct of SyncVars, listing its fields in
/// wire order:
///
/// ```
/// use skein_shared::{impl_replicate, SyncVar};
///
/// struct Health {
///     current: SyncVar<i32>,
///     maximum: SyncVar<i32>,
/// }
///
/// impl_replicate!(Health { current, maximum });
/// ```
#[macro_export]
macro_rules! impl_replicate {
    ($component:ty { $($field:ident),* $(,)? }) => {
        impl $crate::Replicate for $component {
            fn fields(&self) -> Vec<&dyn $crate::Field> {
                vec![$(&self.$field as &dyn $crate::Field),*]
            }

            fn fields_mut(&mut self) -> Vec<&mut dyn $crate::Field> {
                vec![$(&mut self.$field as &mut dyn $crate::Field),*]
            }

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }

            fn as_any_mut(&mut self) -> &mut dyn ::std::any::Any {
                self
            }
        }
    };
}
