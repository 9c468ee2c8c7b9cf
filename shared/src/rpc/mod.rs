mod error;
mod rpc_call;
mod rpc_endpoint;
mod rpc_table;

pub use error::RpcError;
pub use rpc_call::{Rpc, RpcCall};
pub use rpc_endpoint::RpcEndpoint;
pub use rpc_table::RpcTable;
