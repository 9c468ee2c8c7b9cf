use skein_serde::{ByteReader, ByteWrite, SerdeErr};

use crate::replication::{diff_mask::DiffMask, replicate::Replicate};

/// A component attached to a replicated object, together with the mask of
/// fields that changed since the last state update
pub struct NetworkComponent {
    inner: Box<dyn Replicate>,
    state_mask: DiffMask,
}

impl NetworkComponent {
    pub fn new<R: Replicate>(component: R) -> Self {
        Self {
            inner: Box::new(component),
            state_mask: DiffMask::EMPTY,
        }
    }

    /// Rebuild the state mask from the fields' dirty flags, then clear them
    pub fn update_state_mask(&mut self) {
        self.state_mask.clear();
        for (index, field) in self.inner.fields_mut().into_iter().enumerate() {
            if field.is_dirty() {
                self.state_mask.set_bit(index);
                field.clear_dirty();
            }
        }
    }

    pub fn state_mask(&self) -> DiffMask {
        self.state_mask
    }

    pub fn field_count(&self) -> usize {
        self.inner.fields().len()
    }

    /// Write the fields selected by `mask`, in order
    pub fn write(&self, mask: &DiffMask, writer: &mut dyn ByteWrite) {
        for (index, field) in self.inner.fields().into_iter().enumerate() {
            if mask.bit(index) {
                field.write(writer);
            }
        }
    }

    /// Read the fields selected by `mask`, in order
    pub fn read(&mut self, mask: &DiffMask, reader: &mut ByteReader) -> Result<(), SerdeErr> {
        for (index, field) in self.inner.fields_mut().into_iter().enumerate() {
            if mask.bit(index) {
                field.read(reader)?;
            }
        }
        Ok(())
    }

    pub fn get<R: Replicate>(&self) -> Option<&R> {
        self.inner.as_any().downcast_ref::<R>()
    }

    pub fn get_mut<R: Replicate>(&mut self) -> Option<&mut R> {
        self.inner.as_any_mut().downcast_mut::<R>()
    }
}
