use std::{default::Default, time::Duration};

use skein_shared::ConnectionConfig;

/// Contains Config properties which will be used by the Server
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Used to configure the connections with Clients
    pub connection: ConnectionConfig,
    /// Largest state packet payload the server will assemble, in bytes
    pub max_packet_size: usize,
    /// Minimum time between two state updates. `send_state_updates` does
    /// nothing when called sooner.
    pub state_update_interval: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            connection: ConnectionConfig::default(),
            max_packet_size: 1450,
            state_update_interval: Duration::from_secs_f64(1.0 / 30.0),
        }
    }
}
