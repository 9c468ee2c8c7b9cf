//! # Skein Server
//! The authoritative side of a skein session. Accepts clients over UDP,
//! replicates registered objects to every connected user and exchanges
//! ordered remote calls with them.

#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]

pub mod shared {
    pub use skein_shared::{
        impl_replicate, ByteReader, ByteWrite, ConnectionConfig, ConnectionKey, NetworkId,
        ObjectRegistry, ReplicatedObject, Rpc, RpcTable, Serde, SerdeErr, SocketFactory,
        SyncVar,
    };
}

mod error;
mod events;
mod server;
mod user;

pub use error::ServerError;
pub use events::ServerEvent;
pub use server::{Server, ServerConfig};
pub use user::User;
