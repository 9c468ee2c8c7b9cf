use skein_serde::{ByteReader, ByteWrite, ByteWriter, Serde, SerdeErr};

use crate::types::CallIndex;

/// A remote call type. The name identifies it on the wire and must be unique
/// within a protocol.
pub trait Rpc: Sized + 'static {
    const NAME: &'static str;
    /// Reliable calls are resent until delivered and execute in call order
    const RELIABLE: bool;

    fn write_args(&self, writer: &mut dyn ByteWrite);
    fn read_args(reader: &mut ByteReader) -> Result<Self, SerdeErr>;
}

/// An outgoing remote call with its arguments already encoded
#[derive(Clone, Debug, PartialEq)]
pub struct RpcCall {
    name: String,
    reliable: bool,
    call_index: Option<CallIndex>,
    args: Box<[u8]>,
}

impl RpcCall {
    pub fn new<R: Rpc>(rpc: &R) -> Self {
        let mut writer = ByteWriter::new();
        rpc.write_args(&mut writer);
        Self {
            name: R::NAME.to_string(),
            reliable: R::RELIABLE,
            call_index: None,
            args: writer.to_bytes(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_reliable(&self) -> bool {
        self.reliable
    }

    /// The call's position in its sender's order, once it has been sent
    pub fn call_index(&self) -> Option<CallIndex> {
        self.call_index
    }

    pub(crate) fn set_call_index(&mut self, call_index: CallIndex) {
        self.call_index = Some(call_index);
    }

    /// Write as an RPC entry: name, call index for reliable calls, then the
    /// arguments
    pub fn write(&self, writer: &mut dyn ByteWrite) {
        self.name.ser(writer);
        if self.reliable {
            self.call_index.unwrap_or_default().ser(writer);
        }
        writer.write_bytes(&self.args);
    }
}
