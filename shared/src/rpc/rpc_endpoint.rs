use std::{cmp::Ordering, collections::BTreeMap};

use log::{trace, warn};
use skein_serde::{ByteReader, Serde};

use crate::{
    hub::ConnectionKey,
    rpc::{RpcCall, RpcError, RpcTable},
    types::CallIndex,
};

struct BufferedCall {
    name: String,
    args: Box<[u8]>,
}

/// One side of an ordered remote call channel. Reliable calls are numbered on
/// the way out and run strictly in that order on the way in, whatever order
/// their packets arrive in.
pub struct RpcEndpoint {
    next_outgoing_index: CallIndex,
    expected_incoming_index: CallIndex,
    gap_buffer: BTreeMap<CallIndex, BufferedCall>,
}

impl RpcEndpoint {
    pub fn new() -> Self {
        Self {
            next_outgoing_index: 0,
            expected_incoming_index: 0,
            gap_buffer: BTreeMap::new(),
        }
    }

    /// Forget all call numbering, as for a fresh connection
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Number a reliable call the first time it is sent. Resends keep their
    /// original index.
    pub fn assign_index(&mut self, call: &mut RpcCall) {
        if call.is_reliable() && call.call_index().is_none() {
            call.set_call_index(self.next_outgoing_index);
            self.next_outgoing_index = self.next_outgoing_index.wrapping_add(1);
        }
    }

    /// Read one call entry and run it, or hold it until the calls before it
    /// have run
    pub fn read_execute<C>(
        &mut self,
        reader: &mut ByteReader,
        table: &mut RpcTable<C>,
        context: &mut C,
        caller: Option<ConnectionKey>,
    ) -> Result<(), RpcError> {
        let name = String::de(reader)?;
        let (reliable, skip) = table
            .signature(&name)
            .ok_or_else(|| RpcError::UnknownCall { name: name.clone() })?;

        if !reliable {
            let args = reader.capture(skip)?;
            return table.dispatch(&name, context, caller, args);
        }

        let call_index = CallIndex::de(reader)?;
        let args = reader.capture(skip)?;
        match call_index.cmp(&self.expected_incoming_index) {
            Ordering::Equal => {
                // The index is spent even if the call fails to run
                self.expected_incoming_index = self.expected_incoming_index.wrapping_add(1);
                let result = table.dispatch(&name, context, caller, args);
                self.run_buffered(table, context, caller);
                result?;
            }
            Ordering::Greater => {
                self.gap_buffer.insert(
                    call_index,
                    BufferedCall {
                        name,
                        args: args.into(),
                    },
                );
            }
            Ordering::Less => {
                trace!("dropping already executed call {} #{}", name, call_index);
            }
        }
        Ok(())
    }

    fn run_buffered<C>(
        &mut self,
        table: &mut RpcTable<C>,
        context: &mut C,
        caller: Option<ConnectionKey>,
    ) {
        while let Some(entry) = self.gap_buffer.first_entry() {
            if *entry.key() != self.expected_incoming_index {
                break;
            }
            let call = entry.remove();
            self.expected_incoming_index = self.expected_incoming_index.wrapping_add(1);
            if let Err(error) = table.dispatch(&call.name, context, caller, &call.args) {
                warn!("buffered call {} failed to run: {}", call.name, error);
            }
        }
    }

    pub fn expected_incoming_index(&self) -> CallIndex {
        self.expected_incoming_index
    }

    pub fn buffered_calls(&self) -> usize {
        self.gap_buffer.len()
    }
}

impl Default for RpcEndpoint {
    fn default() -> Self {
        Self::new()
    }
}
