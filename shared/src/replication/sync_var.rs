use std::{any::Any, ops::Deref};

use skein_serde::{ByteReader, ByteWrite, Serde, SerdeErr};

/// One assignment to a SyncVar
#[derive(Clone, Debug, PartialEq)]
pub struct Change<T> {
    pub previous: T,
    pub current: T,
}

/// A replicated value. Assigning a different value marks it dirty so the next
/// state update carries it.
///
/// Once `watch` has been called, every assignment, including one that leaves
/// the value unchanged, is recorded as a [`Change`] for the owner to drain
/// with `take_changes`. An unwatched SyncVar records nothing.
#[derive(Clone, Debug)]
pub struct SyncVar<T: Serde> {
    value: T,
    dirty: bool,
    watched: bool,
    changes: Vec<Change<T>>,
}

impl<T: Serde> SyncVar<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            dirty: false,
            watched: false,
            changes: Vec::new(),
        }
    }

    /// Start recording assignments
    pub fn watch(&mut self) {
        self.watched = true;
    }

    /// Stop recording assignments and discard any not yet taken
    pub fn unwatch(&mut self) {
        self.watched = false;
        self.changes.clear();
    }

    pub fn is_watched(&self) -> bool {
        self.watched
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    pub fn set(&mut self, value: T) {
        if value != self.value {
            self.dirty = true;
        }
        let previous = std::mem::replace(&mut self.value, value);
        if self.watched {
            self.changes.push(Change {
                previous,
                current: self.value.clone(),
            });
        }
    }

    pub fn take_changes(&mut self) -> Vec<Change<T>> {
        std::mem::take(&mut self.changes)
    }
}

impl<T: Serde + Default> Default for SyncVar<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Serde> Deref for SyncVar<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

/// Type-erased view of a SyncVar, as seen by its component
pub trait Field: Any {
    fn is_dirty(&self) -> bool;
    fn clear_dirty(&mut self);
    fn write(&self, writer: &mut dyn ByteWrite);
    /// Decode a value and assign it
    fn read(&mut self, reader: &mut ByteReader) -> Result<(), SerdeErr>;
}

impl<T: Serde + 'static> Field for SyncVar<T> {
    fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    fn write(&self, writer: &mut dyn ByteWrite) {
        self.value.ser(writer);
    }

    fn read(&mut self, reader: &mut ByteReader) -> Result<(), SerdeErr> {
        let value = T::de(reader)?;
        self.set(value);
        Ok(())
    }
}
