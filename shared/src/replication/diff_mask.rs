use skein_serde::{ByteReader, ByteWrite, Serde, SerdeErr};

/// One bit per field (or per component, for presence masks). All bits set
/// means "everything", as sent with a fresh create.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct DiffMask(u32);

impl DiffMask {
    pub const EMPTY: DiffMask = DiffMask(0);
    pub const FULL: DiffMask = DiffMask(u32::MAX);
    pub const MAX_BITS: usize = 32;

    pub fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub fn bits(&self) -> u32 {
        self.0
    }

    pub fn bit(&self, index: usize) -> bool {
        index < Self::MAX_BITS && self.0 & (1 << index) != 0
    }

    pub fn set_bit(&mut self, index: usize) {
        if index < Self::MAX_BITS {
            self.0 |= 1 << index;
        }
    }

    pub fn is_clear(&self) -> bool {
        self.0 == 0
    }

    pub fn or(&mut self, other: &DiffMask) {
        self.0 |= other.0;
    }

    pub fn clear(&mut self) {
        self.0 = 0;
    }
}

// Encoded as a signed 32-bit integer, so FULL appears on the wire as -1
impl Serde for DiffMask {
    fn ser(&self, writer: &mut dyn ByteWrite) {
        (self.0 as i32).ser(writer);
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        Ok(Self(i32::de(reader)? as u32))
    }

    fn byte_length(&self) -> usize {
        4
    }
}
