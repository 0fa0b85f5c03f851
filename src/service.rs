//! Transport-level service identifiers and the connect fallback order.
//!
//! The exact service a peer advertises for media control is not guaranteed,
//! so connecting tries a fixed ordered list of candidates: the AVRCP profile
//! identifiers first, then the generic serial port profile. The first
//! candidate that opens a stream wins.

use std::fmt;

use uuid::{uuid, Uuid};

/// A transport-level service to request when opening a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceId {
    /// SDP service class UUID.
    pub uuid: Uuid,
    /// RFCOMM channel hint, used when SDP resolution is unavailable.
    pub channel: u8,
    /// Short label for logging.
    pub label: &'static str,
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.label, self.uuid)
    }
}

/// AVRCP controller service class.
pub const AVRCP_CONTROLLER: ServiceId = ServiceId {
    uuid: uuid!("0000110e-0000-1000-8000-00805f9b34fb"),
    channel: 23,
    label: "avrcp-controller",
};

/// AVRCP target service class.
pub const AVRCP_TARGET: ServiceId = ServiceId {
    uuid: uuid!("0000110c-0000-1000-8000-00805f9b34fb"),
    channel: 23,
    label: "avrcp-target",
};

/// Serial Port Profile, the generic fallback.
pub const SERIAL_PORT: ServiceId = ServiceId {
    uuid: uuid!("00001101-0000-1000-8000-00805f9b34fb"),
    channel: 1,
    label: "serial-port",
};

/// Candidate services in connect order, most specific first.
pub const SERVICE_CANDIDATES: [ServiceId; 3] = [AVRCP_CONTROLLER, AVRCP_TARGET, SERIAL_PORT];
