//! Trait abstraction for packet transmission to enable testing

use async_trait::async_trait;
use std::io;

/// Trait for fire-and-forget packet transmission
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PacketTransport: Send {
    /// Send one packet, returning the number of bytes handed to the network
    async fn send(&mut self, payload: &[u8]) -> io::Result<usize>;
}
