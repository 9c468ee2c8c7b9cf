//! # Skein Client
//! The connecting side of a skein session. Performs the handshake with a
//! server, applies its state updates to a local pool of replicated objects
//! and sends it remote calls, resending reliable ones that were lost.

#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]

pub mod shared {
    pub use skein_shared::{
        impl_replicate, ByteReader, ByteWrite, ConnectionConfig, ConnectionKey, NetworkId,
        ObjectFactory, ObjectRegistry, ReplicatedObject, Rpc, RpcTable, Serde, SerdeErr,
        SocketFactory, SyncVar,
    };
}

mod client;
mod error;
mod events;

pub use client::{Client, ClientConfig};
pub use error::ClientError;
pub use events::ClientEvent;
