//! Connection negotiation and the command-send path.
//!
//! [`MediaController`] owns at most one active stream to the current target
//! peer. Connecting runs the service-identifier fallback cascade; sending
//! encodes a passthrough packet and writes it, treating any write failure as
//! an implicit disconnect. Callers share the controller behind an async
//! mutex so negotiations serialize and send never observes torn state.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::command::MediaCommand;
use crate::device::RemotePeer;
use crate::error::{ControlError, Result};
use crate::service::{ServiceId, SERVICE_CANDIDATES};
use crate::transport::{CommandStream, Transport};

/// Upper bound on a single stream-open attempt.
///
/// The transport layer may hang an open indefinitely (out-of-range peer,
/// stuck handshake); this bound keeps one bad attempt from stalling the
/// whole retry loop.
const OPEN_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(15);

/// Connection lifecycle state.
///
/// Invariant: the controller holds a stream iff the state is `Connected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// Negotiates and owns the command channel to the target peer.
pub struct MediaController {
    transport: Arc<dyn Transport>,
    state: ConnectionState,
    stream: Option<Box<dyn CommandStream>>,
    service: Option<ServiceId>,
    peer: Option<RemotePeer>,
}

impl MediaController {
    /// Create a disconnected controller over the given transport.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            state: ConnectionState::Disconnected,
            stream: None,
            service: None,
            peer: None,
        }
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// The peer the controller is currently connected to, if any.
    pub fn connected_peer(&self) -> Option<&RemotePeer> {
        self.peer.as_ref()
    }

    /// The service identifier that won the negotiation, if connected.
    pub fn connected_service(&self) -> Option<ServiceId> {
        self.service
    }

    /// Negotiate a stream to the given peer.
    ///
    /// Fails immediately with [`ControlError::PermissionDenied`] when the
    /// required capability is missing, without touching the transport.
    /// Otherwise any existing stream is torn down first (even when already
    /// connected to the same peer, so a stale or half-open stream is never
    /// reused), then each candidate service is tried in declared order.
    /// The first candidate that opens wins. If every candidate fails, the
    /// state stays `Disconnected` and [`ControlError::NegotiationExhausted`]
    /// is returned.
    pub async fn connect(&mut self, peer: &RemotePeer) -> Result<()> {
        if !self.transport.has_permission() {
            warn!("Cannot connect: Bluetooth permission not granted");
            return Err(ControlError::PermissionDenied);
        }

        self.disconnect().await;
        self.state = ConnectionState::Connecting;
        info!("Connecting to {}", peer);

        for service in &SERVICE_CANDIDATES {
            debug!("Trying service {} on {}", service, peer.address);
            match timeout(
                OPEN_ATTEMPT_TIMEOUT,
                self.transport.open_stream(&peer.address, service),
            )
            .await
            {
                Ok(Ok(stream)) => {
                    info!("Connected to {} via {}", peer, service);
                    self.stream = Some(stream);
                    self.service = Some(*service);
                    self.peer = Some(peer.clone());
                    self.state = ConnectionState::Connected;
                    return Ok(());
                }
                Ok(Err(e)) => {
                    debug!("Service {} failed: {}", service, e);
                }
                Err(_) => {
                    warn!("Service {} open attempt timed out", service);
                }
            }
        }

        warn!("All candidate services failed for {}", peer);
        self.state = ConnectionState::Disconnected;
        Err(ControlError::NegotiationExhausted)
    }

    /// Encode and send a media command on the active stream.
    ///
    /// Any write or flush failure is treated as a link failure: the stream
    /// is released, the state drops to `Disconnected`, and the caller is
    /// expected to trigger reconnection. A successful write does not imply
    /// the peer acted on the command.
    pub async fn send(&mut self, command: MediaCommand) -> Result<()> {
        if self.state != ConnectionState::Connected {
            debug!("Not connected, dropping command {}", command);
            return Err(ControlError::NotConnected);
        }

        let packet = command.passthrough_packet();
        let write_result = match self.stream.as_mut() {
            Some(stream) => match stream.write_all(&packet).await {
                Ok(()) => stream.flush().await,
                Err(e) => Err(e),
            },
            None => return Err(ControlError::NotConnected),
        };

        match write_result {
            Ok(()) => {
                debug!("Sent command: {}", command);
                Ok(())
            }
            Err(e) => {
                warn!("Send failed, dropping link: {}", e);
                self.disconnect().await;
                Err(ControlError::LinkFailure(e.to_string()))
            }
        }
    }

    /// Whether the controller is connected and the stream is still open.
    ///
    /// The second check catches links that died without an explicit
    /// disconnect notification.
    pub async fn is_connected(&self) -> bool {
        match (self.state, &self.stream) {
            (ConnectionState::Connected, Some(stream)) => stream.is_open().await,
            _ => false,
        }
    }

    /// Tear down any active stream.
    ///
    /// Safe to call in any state. Close-time I/O errors are suppressed; the
    /// state is unconditionally reset to `Disconnected`.
    pub async fn disconnect(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            info!("Closing stream to {:?}", self.peer.as_ref().map(|p| &p.name));
            if let Err(e) = stream.close().await {
                debug!("Ignoring close error: {}", e);
            }
        }
        self.service = None;
        self.peer = None;
        self.state = ConnectionState::Disconnected;
    }

    #[cfg(test)]
    fn holds_stream(&self) -> bool {
        self.stream.is_some()
    }
}
