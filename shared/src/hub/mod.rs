mod connection_hub;
mod connection_key;
mod error;

pub use connection_hub::ConnectionHub;
pub use connection_key::ConnectionKey;
pub use error::HubError;
