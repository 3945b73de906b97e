//! # Link Module
//!
//! Sends rover packets to the receiver over UDP.
//!
//! This module handles:
//! - Resolving the receiver host once at startup
//! - Binding a single process-wide datagram socket
//! - Fire-and-forget transmission (no acknowledgment, no retries)

pub mod transport;

use async_trait::async_trait;
use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use tokio::net::UdpSocket;
use tracing::{debug, info};

use crate::error::{Result, RoverLinkError};
pub use transport::PacketTransport;

/// Default receiver host
pub const DEFAULT_HOST: &str = "localhost";

/// Default receiver port
pub const DEFAULT_PORT: u16 = 12345;

/// UDP sender bound to one receiver address
pub struct UdpLink {
    socket: UdpSocket,
    target: SocketAddr,
}

impl std::fmt::Debug for UdpLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UdpLink")
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

impl UdpLink {
    /// Resolve the receiver and bind a local socket
    ///
    /// IPv4 addresses are preferred when the host resolves to both families.
    ///
    /// # Errors
    ///
    /// Returns `Transport` error if the host does not resolve or the socket
    /// cannot be bound.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use rover_link::link::UdpLink;
    ///
    /// #[tokio::main(flavor = "current_thread")]
    /// async fn main() -> anyhow::Result<()> {
    ///     let link = UdpLink::open("localhost", 12345).await?;
    ///     println!("Sending to {}", link.target());
    ///     Ok(())
    /// }
    /// ```
    pub async fn open(host: &str, port: u16) -> Result<Self> {
        let addrs: Vec<SocketAddr> = tokio::net::lookup_host((host, port))
            .await
            .map_err(|e| RoverLinkError::Transport(format!("Failed to resolve {}: {}", host, e)))?
            .collect();

        let target = addrs
            .iter()
            .find(|addr| addr.is_ipv4())
            .or_else(|| addrs.first())
            .copied()
            .ok_or_else(|| RoverLinkError::Transport(format!("No address found for {}", host)))?;

        let bind_addr: SocketAddr = if target.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };

        let socket = UdpSocket::bind(bind_addr)
            .await
            .map_err(|e| {
                RoverLinkError::Transport(format!("Failed to bind {}: {}", bind_addr, e))
            })?;

        info!("Sending rover packets to {} ({}:{})", target, host, port);

        Ok(Self { socket, target })
    }

    /// Resolved receiver address
    pub fn target(&self) -> SocketAddr {
        self.target
    }
}

#[async_trait]
impl PacketTransport for UdpLink {
    async fn send(&mut self, payload: &[u8]) -> io::Result<usize> {
        let sent = self.socket.send_to(payload, self.target).await?;
        debug!("Sent datagram ({} bytes) to {}", sent, self.target);
        Ok(sent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_target() {
        assert_eq!(DEFAULT_HOST, "localhost");
        assert_eq!(DEFAULT_PORT, 12345);
    }

    #[tokio::test]
    async fn test_open_resolves_ipv4_literal() {
        let link = UdpLink::open("127.0.0.1", 40000).await.unwrap();
        assert_eq!(link.target(), "127.0.0.1:40000".parse::<SocketAddr>().unwrap());
    }

    #[tokio::test]
    async fn test_send_reaches_receiver() {
        let receiver = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let port = receiver.local_addr().unwrap().port();

        let mut link = UdpLink::open("127.0.0.1", port).await.unwrap();
        let sent = link.send(b"D_200_200_200_50_50_50").await.unwrap();
        assert_eq!(sent, 22);

        let mut buf = [0u8; 64];
        let (len, _) = receiver.recv_from(&mut buf).await.unwrap();
        assert_eq!(&buf[..len], b"D_200_200_200_50_50_50");
    }

    #[tokio::test]
    async fn test_each_send_is_one_datagram() {
        let receiver = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let port = receiver.local_addr().unwrap().port();

        let mut link = UdpLink::open("127.0.0.1", port).await.unwrap();
        link.send(b"A_128_128_128_255_128_128").await.unwrap();
        link.send(b"A_128_128_128_128_128_128").await.unwrap();

        let mut buf = [0u8; 64];
        let (len, _) = receiver.recv_from(&mut buf).await.unwrap();
        assert_eq!(&buf[..len], b"A_128_128_128_255_128_128");
        let (len, _) = receiver.recv_from(&mut buf).await.unwrap();
        assert_eq!(&buf[..len], b"A_128_128_128_128_128_128");
    }

    #[tokio::test]
    async fn test_open_unresolvable_host_fails() {
        let result = UdpLink::open("host.invalid", DEFAULT_PORT).await;

        match result {
            Err(RoverLinkError::Transport(msg)) => assert!(msg.contains("host.invalid")),
            other => panic!("Expected Transport error, got: {:?}", other),
        }
    }
}
