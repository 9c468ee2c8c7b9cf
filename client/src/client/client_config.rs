use std::default::Default;

use skein_shared::ConnectionConfig;

/// Contains Config properties which will be used by a Client
#[derive(Clone, Debug, Default)]
pub struct ClientConfig {
    /// Used to configure the connection with the Server
    pub connection: ConnectionConfig,
}
