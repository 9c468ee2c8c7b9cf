use std::{default::Default, time::Duration};

/// Contains Config properties which will be used by a Server or Client
#[derive(Clone, Debug)]
pub struct ConnectionConfig {
    /// How often to resend a connection request while waiting for an accept
    pub connection_request_interval: Duration,
    /// How long to keep requesting before giving up on a handshake
    pub handshake_timeout: Duration,
    /// Starting value of the RTT estimate, its deviation and the delivery
    /// timeout
    pub initial_timeout: Duration,
    /// Weight given to each new RTT sample in the smoothed RTT
    pub rtt_weight: f32,
    /// Weight given to each new sample in the smoothed RTT deviation
    pub deviation_weight: f32,
    /// Factor the delivery timeout grows by on each tick that saw a timeout
    pub timeout_backoff: f32,
    /// Maximum time without sending before a heartbeat goes out
    pub heartbeat_interval: Duration,
    /// Maximum time without hearing from the remote host before the
    /// connection is dropped
    pub disconnection_timeout: Duration,
    /// Number of datagrams a connection will queue between updates. Further
    /// datagrams are dropped
    pub inbound_capacity: usize,
    /// How close to the 16-bit boundary sequence ids must be for a small id
    /// to be read as having wrapped around
    pub wraparound_window: u16,
}

impl ConnectionConfig {
    /// Create a new ConnectionConfig, used to initialize a Connection
    pub fn new(
        heartbeat_interval: Duration,
        disconnection_timeout: Duration,
        initial_timeout: Duration,
    ) -> Self {
        Self {
            heartbeat_interval,
            disconnection_timeout,
            initial_timeout,
            ..Self::default()
        }
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            connection_request_interval: Duration::from_millis(500),
            handshake_timeout: Duration::from_secs(20),
            initial_timeout: Duration::from_millis(500),
            rtt_weight: 0.125,
            deviation_weight: 0.25,
            timeout_backoff: 1.5,
            heartbeat_interval: Duration::from_secs(1),
            disconnection_timeout: Duration::from_secs(20),
            inbound_capacity: 32,
            wraparound_window: 1000,
        }
    }
}
