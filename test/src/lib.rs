//! Test support for skein: an in-memory lossy network, a small shared
//! protocol, and a harness that ticks one server and any number of clients
//! together.

pub mod helpers;
pub mod test_protocol;

pub use helpers::{init_logging, Harness, TestClient, TestServer, SERVER_PORT, TICK};
pub use local_socket::LocalNetwork;
pub use test_protocol::{rpc_table, unit, CallLog, Chat, Label, Move, Ping, Position, TestFactory};
