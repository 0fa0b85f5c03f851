//! BlueZ-backed transport implementation.
//!
//! Supplies the [`Transport`] capabilities over the BlueZ D-Bus API and
//! RFCOMM sockets. Linux only; requires the bluetooth daemon.

use async_trait::async_trait;
use bluer::rfcomm::{SocketAddr, Stream};
use futures::StreamExt;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::device::{Address, RemotePeer};
use crate::error::{ControlError, Result};
use crate::service::ServiceId;
use crate::transport::{CommandStream, LinkEvent, Transport};

/// Transport over the local BlueZ adapter.
pub struct BlueZTransport {
    session: bluer::Session,
    adapter: bluer::Adapter,
}

impl BlueZTransport {
    /// Connect to the bluetooth daemon and grab the default adapter.
    pub async fn new() -> Result<Self> {
        let session = bluer::Session::new().await.map_err(|e| {
            ControlError::BlueZ(format!("Failed to create BlueZ session: {}", e))
        })?;

        let adapter = session.default_adapter().await.map_err(|e| {
            ControlError::BlueZ(format!("Failed to get adapter: {}", e))
        })?;

        info!("Using Bluetooth adapter: {}", adapter.name());
        Ok(Self { session, adapter })
    }

    /// Adapter name (e.g., "hci0").
    pub fn adapter_name(&self) -> &str {
        self.adapter.name()
    }

    /// Whether the adapter is powered on.
    pub async fn is_powered(&self) -> Result<bool> {
        self.adapter.is_powered().await.map_err(|e| {
            ControlError::BlueZ(format!("Failed to get power state: {}", e))
        })
    }

    /// Get a reference to the underlying bluer session.
    pub fn session(&self) -> &bluer::Session {
        &self.session
    }

    fn parse_address(address: &Address) -> Result<bluer::Address> {
        address
            .0
            .parse()
            .map_err(|_| ControlError::DeviceNotFound(address.0.clone()))
    }
}

#[async_trait]
impl Transport for BlueZTransport {
    /// On Linux the capability check is access to the bluetooth daemon,
    /// which is established at construction; a transport that failed to
    /// construct never exists.
    fn has_permission(&self) -> bool {
        true
    }

    async fn bonded_peers(&self) -> Result<Vec<RemotePeer>> {
        let addresses = self.adapter.device_addresses().await.map_err(|e| {
            ControlError::BlueZ(format!("Failed to list devices: {}", e))
        })?;

        let mut peers = Vec::new();
        for addr in addresses {
            let device = match self.adapter.device(addr) {
                Ok(device) => device,
                Err(e) => {
                    warn!("Failed to get device {}: {}", addr, e);
                    continue;
                }
            };
            if !device.is_paired().await.unwrap_or(false) {
                continue;
            }
            let name = match device.name().await.ok().flatten() {
                Some(name) => name,
                None => device
                    .alias()
                    .await
                    .unwrap_or_else(|_| "Unknown".to_string()),
            };
            peers.push(RemotePeer::new(Address::from(addr), name));
        }

        debug!("Found {} bonded peer(s)", peers.len());
        Ok(peers)
    }

    async fn open_stream(
        &self,
        address: &Address,
        service: &ServiceId,
    ) -> Result<Box<dyn CommandStream>> {
        if !self.is_powered().await? {
            return Err(ControlError::AdapterPoweredOff);
        }

        let addr = Self::parse_address(address)?;
        debug!(
            "Opening RFCOMM channel {} ({}) on {}",
            service.channel, service.label, address
        );

        let stream = Stream::connect(SocketAddr::new(addr, service.channel))
            .await
            .map_err(|e| ControlError::LinkFailure(e.to_string()))?;

        Ok(Box::new(RfcommCommandStream { stream }))
    }

    async fn events(&self) -> Result<mpsc::Receiver<LinkEvent>> {
        let (tx, rx) = mpsc::channel(32);

        // Adapter power transitions.
        let mut adapter_events = self.adapter.events().await.map_err(|e| {
            ControlError::BlueZ(format!("Failed to monitor adapter: {}", e))
        })?;
        let power_tx = tx.clone();
        tokio::spawn(async move {
            while let Some(event) = adapter_events.next().await {
                if let bluer::AdapterEvent::PropertyChanged(bluer::AdapterProperty::Powered(
                    powered,
                )) = event
                {
                    debug!("Adapter powered: {}", powered);
                    if power_tx.send(LinkEvent::AdapterPowered(powered)).await.is_err() {
                        break;
                    }
                }
            }
        });

        // Connected-property transitions of bonded peers.
        let addresses = self.adapter.device_addresses().await.map_err(|e| {
            ControlError::BlueZ(format!("Failed to list devices: {}", e))
        })?;
        for addr in addresses {
            let device = match self.adapter.device(addr) {
                Ok(device) => device,
                Err(e) => {
                    warn!("Failed to get device {}: {}", addr, e);
                    continue;
                }
            };
            if !device.is_paired().await.unwrap_or(false) {
                continue;
            }
            let mut device_events = match device.events().await {
                Ok(events) => events,
                Err(e) => {
                    warn!("Failed to monitor device {}: {}", addr, e);
                    continue;
                }
            };
            let link_tx = tx.clone();
            tokio::spawn(async move {
                while let Some(event) = device_events.next().await {
                    if let bluer::DeviceEvent::PropertyChanged(
                        bluer::DeviceProperty::Connected(connected),
                    ) = event
                    {
                        let address = Address::from(addr);
                        debug!("Device {} connected: {}", address, connected);
                        let event = if connected {
                            LinkEvent::LinkEstablished(address)
                        } else {
                            LinkEvent::LinkLost(address)
                        };
                        if link_tx.send(event).await.is_err() {
                            break;
                        }
                    }
                }
            });
        }

        Ok(rx)
    }
}

/// RFCOMM socket wrapped as a command stream.
struct RfcommCommandStream {
    stream: Stream,
}

#[async_trait]
impl CommandStream for RfcommCommandStream {
    async fn write_all(&mut self, data: &[u8]) -> Result<()> {
        self.stream.write_all(data).await?;
        Ok(())
    }

    async fn flush(&mut self) -> Result<()> {
        self.stream.flush().await?;
        Ok(())
    }

    async fn is_open(&self) -> bool {
        self.stream.peer_addr().is_ok()
    }

    async fn close(&mut self) -> Result<()> {
        self.stream.shutdown().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    // Note: These tests require a real Bluetooth adapter and BlueZ running.
    // They are marked as ignored by default.

    use super::*;

    #[tokio::test]
    #[ignore = "requires real Bluetooth hardware"]
    async fn transport_creation() {
        let transport = BlueZTransport::new().await;
        assert!(transport.is_ok() || matches!(transport.err(), Some(ControlError::BlueZ(_))));
    }

    #[tokio::test]
    #[ignore = "requires real Bluetooth hardware"]
    async fn lists_bonded_peers() {
        if let Ok(transport) = BlueZTransport::new().await {
            let peers = transport.bonded_peers().await;
            assert!(peers.is_ok());
        }
    }

    #[tokio::test]
    #[ignore = "requires real Bluetooth hardware"]
    async fn event_subscription() {
        if let Ok(transport) = BlueZTransport::new().await {
            let events = transport.events().await;
            assert!(events.is_ok());
        }
    }
}
