use crate::{ByteCounter, ByteReader, ByteWrite, SerdeErr};

/// A type which can be written to and read from skein's byte streams
pub trait Serde: Sized + Clone + PartialEq {
    /// Serialize Self to a ByteWrite
    fn ser(&self, writer: &mut dyn ByteWrite);

    /// Parse Self from a ByteReader
    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr>;

    /// Return the number of bytes Self would occupy on the wire
    fn byte_length(&self) -> usize {
        let mut counter = ByteCounter::new();
        self.ser(&mut counter);
        counter.count()
    }
}
