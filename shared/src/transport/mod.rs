use std::net::SocketAddr;

mod error;
mod udp;

pub use error::TransportError;
pub use udp::{UdpSocket, UdpSocketFactory};

/// A non-blocking datagram socket bound to one local address
pub trait Socket {
    /// The address this socket is actually bound to
    fn local_address(&self) -> SocketAddr;

    /// Read the next queued datagram into `buffer`. Returns `Ok(None)` once
    /// nothing more is available without blocking.
    fn receive(&mut self, buffer: &mut [u8]) -> Result<Option<(usize, SocketAddr)>, TransportError>;

    /// Queue `payload` for delivery to `address`
    fn send(&mut self, address: &SocketAddr, payload: &[u8]) -> Result<(), TransportError>;
}

/// Creates sockets on demand for the ConnectionHub
pub trait SocketFactory {
    fn bind(&mut self, address: &SocketAddr) -> Result<Box<dyn Socket>, TransportError>;
}
