use crate::{ByteReader, ByteWrite, Serde, SerdeErr};

macro_rules! impl_serde_le {
    ($($type:ty),*) => {$(
        impl Serde for $type {
            fn ser(&self, writer: &mut dyn ByteWrite) {
                writer.write_bytes(&self.to_le_bytes());
            }

            fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
                Ok(<$type>::from_le_bytes(reader.read_array()?))
            }

            fn byte_length(&self) -> usize {
                std::mem::size_of::<$type>()
            }
        }
    )*};
}

impl_serde_le!(u8, u16, u32, i32, f32);

impl Serde for bool {
    fn ser(&self, writer: &mut dyn ByteWrite) {
        writer.write_byte(u8::from(*self));
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        match reader.read_byte()? {
            0 => Ok(false),
            1 => Ok(true),
            value => Err(SerdeErr::InvalidBool { value }),
        }
    }

    fn byte_length(&self) -> usize {
        1
    }
}

// Strings are a 7-bit varint byte length followed by UTF-8 bytes

fn write_varint(writer: &mut dyn ByteWrite, mut value: u32) {
    while value >= 0x80 {
        writer.write_byte((value as u8) | 0x80);
        value >>= 7;
    }
    writer.write_byte(value as u8);
}

fn read_varint(reader: &mut ByteReader) -> Result<u32, SerdeErr> {
    let mut value: u32 = 0;
    for shift in (0..35).step_by(7) {
        let byte = reader.read_byte()?;
        value |= u32::from(byte & 0x7f) << shift;
        if byte & 0x80 == 0 {
            return Ok(value);
        }
    }
    Err(SerdeErr::MalformedLength)
}

/// Bytes taken by the length prefix of a string `length` bytes long
pub fn varint_length(length: usize) -> usize {
    let mut value = length;
    let mut bytes = 1;
    while value >= 0x80 {
        value >>= 7;
        bytes += 1;
    }
    bytes
}

impl Serde for String {
    fn ser(&self, writer: &mut dyn ByteWrite) {
        write_varint(writer, self.len() as u32);
        writer.write_bytes(self.as_bytes());
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        let length = read_varint(reader)? as usize;
        let bytes = reader.read_bytes(length)?;
        std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|_| SerdeErr::InvalidUtf8 { length })
    }

    fn byte_length(&self) -> usize {
        varint_length(self.len()) + self.len()
    }
}
