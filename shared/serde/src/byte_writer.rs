/// Sink for encoded bytes. Implemented by the real writer and by a counter
/// used to measure an entry before committing it to a packet.
pub trait ByteWrite {
    fn write_byte(&mut self, byte: u8);
    fn write_bytes(&mut self, bytes: &[u8]) {
        for byte in bytes {
            self.write_byte(*byte);
        }
    }
    fn is_counter(&self) -> bool;
}

// ByteWriter

#[derive(Default)]
pub struct ByteWriter {
    buffer: Vec<u8>,
}

impl ByteWriter {
    pub fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
        }
    }

    pub fn bytes_written(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    pub fn to_bytes(self) -> Box<[u8]> {
        self.buffer.into_boxed_slice()
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.buffer
    }
}

impl ByteWrite for ByteWriter {
    fn write_byte(&mut self, byte: u8) {
        self.buffer.push(byte);
    }

    fn write_bytes(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    fn is_counter(&self) -> bool {
        false
    }
}

// ByteCounter

/// Counts how many bytes would be written, without storing them
#[derive(Default)]
pub struct ByteCounter {
    count: usize,
}

impl ByteCounter {
    pub fn new() -> Self {
        Self { count: 0 }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Whether the counted bytes, added to `used`, would exceed `budget`
    pub fn overflows(&self, used: usize, budget: usize) -> bool {
        used + self.count > budget
    }
}

impl ByteWrite for ByteCounter {
    fn write_byte(&mut self, _byte: u8) {
        self.count += 1;
    }

    fn write_bytes(&mut self, bytes: &[u8]) {
        self.count += bytes.len();
    }

    fn is_counter(&self) -> bool {
        true
    }
}
