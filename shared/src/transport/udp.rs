use std::{io, net::SocketAddr};

use crate::transport::{Socket, SocketFactory, TransportError};

/// Socket backed by a non-blocking std UdpSocket
pub struct UdpSocket {
    socket: std::net::UdpSocket,
    local_address: SocketAddr,
}

impl UdpSocket {
    pub fn bind(address: &SocketAddr) -> Result<Self, TransportError> {
        let bind_error = |source| TransportError::Bind {
            address: *address,
            source,
        };
        let socket = std::net::UdpSocket::bind(address).map_err(bind_error)?;
        socket.set_nonblocking(true).map_err(bind_error)?;
        let local_address = socket.local_addr().map_err(bind_error)?;
        Ok(Self {
            socket,
            local_address,
        })
    }
}

// Resets and refusals are the OS reporting an unreachable peer
fn is_peer_failure(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::ConnectionReset | io::ErrorKind::ConnectionRefused
    )
}

impl Socket for UdpSocket {
    fn local_address(&self) -> SocketAddr {
        self.local_address
    }

    /// `recv_from` reports a reset without the address of the peer that
    /// caused it, so every receive failure comes back as an untagged `Io`
    /// error. Only `send` can attribute a failure to a peer.
    fn receive(&mut self, buffer: &mut [u8]) -> Result<Option<(usize, SocketAddr)>, TransportError> {
        match self.socket.recv_from(buffer) {
            Ok((length, address)) => Ok(Some((length, address))),
            Err(ref error) if error.kind() == io::ErrorKind::WouldBlock => Ok(None),
            Err(error) => Err(TransportError::Io(error)),
        }
    }

    fn send(&mut self, address: &SocketAddr, payload: &[u8]) -> Result<(), TransportError> {
        match self.socket.send_to(payload, address) {
            Ok(_) => Ok(()),
            Err(source) if is_peer_failure(&source) => Err(TransportError::Peer {
                address: *address,
                source,
            }),
            Err(source) => Err(TransportError::Io(source)),
        }
    }
}

/// Binds real UDP sockets
#[derive(Default)]
pub struct UdpSocketFactory;

impl SocketFactory for UdpSocketFactory {
    fn bind(&mut self, address: &SocketAddr) -> Result<Box<dyn Socket>, TransportError> {
        Ok(Box::new(UdpSocket::bind(address)?))
    }
}
