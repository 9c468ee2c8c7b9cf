use crate::SerdeErr;

/// Cursor over a received byte slice
pub struct ByteReader<'b> {
    buffer: &'b [u8],
    position: usize,
}

impl<'b> ByteReader<'b> {
    pub fn new(buffer: &'b [u8]) -> Self {
        Self {
            buffer,
            position: 0,
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len() - self.position
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn read_byte(&mut self) -> Result<u8, SerdeErr> {
        let bytes = self.read_bytes(1)?;
        Ok(bytes[0])
    }

    pub fn read_bytes(&mut self, length: usize) -> Result<&'b [u8], SerdeErr> {
        if length > self.remaining() {
            return Err(SerdeErr::UnexpectedEnd {
                needed: length,
                remaining: self.remaining(),
            });
        }
        let buffer = self.buffer;
        let start = self.position;
        self.position += length;
        Ok(&buffer[start..self.position])
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], SerdeErr> {
        let mut output = [0; N];
        output.copy_from_slice(self.read_bytes(N)?);
        Ok(output)
    }

    /// Run `read`, then hand back the exact bytes it consumed
    pub fn capture<F>(&mut self, read: F) -> Result<&'b [u8], SerdeErr>
    where
        F: FnOnce(&mut Self) -> Result<(), SerdeErr>,
    {
        let buffer = self.buffer;
        let start = self.position;
        read(self)?;
        Ok(&buffer[start..self.position])
    }
}
