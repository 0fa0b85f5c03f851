//! Capability traits over the underlying Bluetooth stack.
//!
//! The negotiator and supervisor consume these traits; platform backends
//! (see [`crate::bluez`]) supply them. Keeping the seam here enables testing
//! the whole connection core against mock transports with no hardware.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::device::{Address, RemotePeer};
use crate::error::Result;
use crate::service::ServiceId;

/// Asynchronous link-level notification from the transport layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    /// A previously open link to the given peer closed.
    LinkLost(Address),
    /// A link to the given peer came up.
    LinkEstablished(Address),
    /// The adapter's power state changed.
    AdapterPowered(bool),
}

/// Bluetooth stack capabilities consumed by the connection core.
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait Transport: Send + Sync {
    /// Whether the required runtime permission/capability is granted.
    ///
    /// Checked before any transport attempt; absence is a hard failure and
    /// is never retried by the core.
    fn has_permission(&self) -> bool;

    /// Enumerate bonded (paired) peers.
    async fn bonded_peers(&self) -> Result<Vec<RemotePeer>>;

    /// Open a bidirectional byte stream to a peer for a given service.
    ///
    /// May fail with a transport I/O error at any point, including after a
    /// partial handshake.
    async fn open_stream(
        &self,
        address: &Address,
        service: &ServiceId,
    ) -> Result<Box<dyn CommandStream>>;

    /// Subscribe to link-level and adapter power events.
    async fn events(&self) -> Result<mpsc::Receiver<LinkEvent>>;
}

/// An open bidirectional command stream to a peer.
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait CommandStream: Send {
    /// Write the whole buffer to the stream.
    async fn write_all(&mut self, data: &[u8]) -> Result<()>;

    /// Flush buffered output.
    async fn flush(&mut self) -> Result<()>;

    /// Whether the underlying transport still reports the stream open.
    async fn is_open(&self) -> bool;

    /// Close the stream.
    async fn close(&mut self) -> Result<()>;
}
