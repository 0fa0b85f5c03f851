//! # avremote
//!
//! Resilient Bluetooth media-remote channel with AVRCP passthrough commands.
//!
//! This crate maintains a point-to-point command channel to a single paired
//! audio-control peer and keeps it alive across spontaneous drops (peer
//! power cycles, radio interference, peer out of range).
//!
//! ## Features
//!
//! - Multi-service connect cascade: candidate service identifiers are tried
//!   in a fixed order, first success wins
//! - Minimal AVRCP passthrough command encoding (play/pause, track skip,
//!   volume, stop, seek)
//! - Supervised, bounded, non-overlapping reconnection driven by link-loss
//!   and adapter power events
//! - Transport abstraction with a BlueZ/RFCOMM backend on Linux
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use avremote::{
//!     select_target, LinkEvent, MediaCommand, MediaController, NoOpSink,
//!     ReconnectSupervisor, RetryPolicy,
//! };
//! use avremote::bluez::BlueZTransport;
//! use tokio::sync::Mutex;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let transport = Arc::new(BlueZTransport::new().await?);
//!
//!     // Resolve the target among bonded peers.
//!     let peers = transport.bonded_peers().await?;
//!     let target = select_target(&peers, "Pixel").ok_or("no target")?;
//!
//!     // Connect and send a command.
//!     let controller = Arc::new(Mutex::new(MediaController::new(transport.clone())));
//!     controller.lock().await.connect(&target).await?;
//!     controller.lock().await.send(MediaCommand::PlayPause).await?;
//!
//!     // Supervise the link until shutdown.
//!     let supervisor = ReconnectSupervisor::new(
//!         controller,
//!         target,
//!         RetryPolicy::default(),
//!         Arc::new(NoOpSink),
//!     );
//!     let events = transport.events().await?;
//!     supervisor.run(events).await;
//!     Ok(())
//! }
//! ```

pub mod command;
pub mod controller;
pub mod device;
pub mod error;
pub mod service;
pub mod supervisor;
pub mod transport;

#[cfg(target_os = "linux")]
pub mod bluez;

// Re-exports for convenience
pub use command::{MediaCommand, PASSTHROUGH_LEN};
pub use controller::{ConnectionState, MediaController};
pub use device::{select_target, Address, RemotePeer};
pub use error::{ControlError, Result};
pub use service::{ServiceId, SERVICE_CANDIDATES};
pub use supervisor::{
    CallbackSink, NoOpSink, ReconnectSupervisor, RetryPolicy, StatusSink, SupervisorStatus,
};
pub use transport::{CommandStream, LinkEvent, Transport};

#[cfg(target_os = "linux")]
pub use bluez::BlueZTransport;
