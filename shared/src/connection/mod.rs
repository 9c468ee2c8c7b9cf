mod connection;
mod connection_config;
mod connection_state;
mod delivery_ledger;
mod error;
mod packet_notifiable;
mod packet_type;
mod reorder_buffer;
mod rtt_estimator;

pub use connection::Connection;
pub use connection_config::ConnectionConfig;
pub use connection_state::ConnectionState;
pub use delivery_ledger::{DeliveryLedger, DeliveryOutcome};
pub use error::ConnectionError;
pub use packet_notifiable::PacketNotifiable;
pub use packet_type::{peek_packet_type, PacketType, ServiceType};
pub use reorder_buffer::ReorderBuffer;
pub use rtt_estimator::RttEstimator;
