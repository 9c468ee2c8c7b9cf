use std::collections::HashMap;

use skein_serde::{ByteReader, SerdeErr};

use crate::{
    hub::ConnectionKey,
    rpc::{Rpc, RpcError},
};

type Dispatch<C> =
    Box<dyn FnMut(&mut C, Option<ConnectionKey>, &mut ByteReader) -> Result<(), SerdeErr>>;

struct RpcEntry<C> {
    reliable: bool,
    skip: fn(&mut ByteReader) -> Result<(), SerdeErr>,
    dispatch: Dispatch<C>,
}

fn skip_args<R: Rpc>(reader: &mut ByteReader) -> Result<(), SerdeErr> {
    R::read_args(reader).map(|_| ())
}

/// Maps remote call names to the code that decodes and runs them. `C` is the
/// context handed to every handler, alongside the calling peer when the
/// caller is a client.
pub struct RpcTable<C> {
    entries: HashMap<&'static str, RpcEntry<C>>,
}

impl<C> RpcTable<C> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Register `handler` to run for every received `R`. Registering a name
    /// twice replaces the earlier handler.
    pub fn register<R, F>(&mut self, mut handler: F)
    where
        R: Rpc,
        F: FnMut(&mut C, Option<ConnectionKey>, R) + 'static,
    {
        let dispatch: Dispatch<C> = Box::new(move |context, caller, reader| {
            let rpc = R::read_args(reader)?;
            handler(context, caller, rpc);
            Ok(())
        });
        self.entries.insert(
            R::NAME,
            RpcEntry {
                reliable: R::RELIABLE,
                skip: skip_args::<R>,
                dispatch,
            },
        );
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Reliability of a registered call, and a reader that consumes its
    /// arguments without running it
    pub(crate) fn signature(
        &self,
        name: &str,
    ) -> Option<(bool, fn(&mut ByteReader) -> Result<(), SerdeErr>)> {
        self.entries
            .get(name)
            .map(|entry| (entry.reliable, entry.skip))
    }

    pub(crate) fn dispatch(
        &mut self,
        name: &str,
        context: &mut C,
        caller: Option<ConnectionKey>,
        args: &[u8],
    ) -> Result<(), RpcError> {
        let entry = self
            .entries
            .get_mut(name)
            .ok_or_else(|| RpcError::UnknownCall {
                name: name.to_string(),
            })?;
        (entry.dispatch)(context, caller, &mut ByteReader::new(args))?;
        Ok(())
    }
}

impl<C> Default for RpcTable<C> {
    fn default() -> Self {
        Self::new()
    }
}
