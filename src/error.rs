//! Error types for remote-control operations.

use thiserror::Error;

/// Remote-control specific error types.
#[derive(Error, Debug)]
pub enum ControlError {
    /// Required Bluetooth permission/capability is not granted.
    #[error("Bluetooth permission not granted")]
    PermissionDenied,

    /// Every candidate service identifier failed to open a stream.
    #[error("No candidate service accepted a connection")]
    NegotiationExhausted,

    /// No active connection to the target peer.
    #[error("Not connected to a remote peer")]
    NotConnected,

    /// An established stream failed mid-operation.
    #[error("Link failure: {0}")]
    LinkFailure(String),

    /// Peer not found or address not parseable.
    #[error("Remote peer not found: {0}")]
    DeviceNotFound(String),

    /// Adapter is powered off.
    #[error("Bluetooth adapter is powered off")]
    AdapterPoweredOff,

    /// BlueZ D-Bus error.
    #[error("BlueZ error: {0}")]
    BlueZ(String),

    /// Operation timed out.
    #[error("Operation timed out")]
    Timeout,

    /// Operation cancelled by shutdown.
    #[error("Operation cancelled")]
    Cancelled,

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type for remote-control operations.
pub type Result<T> = std::result::Result<T, ControlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formats() {
        let err = ControlError::PermissionDenied;
        assert!(err.to_string().contains("permission"));

        let err = ControlError::LinkFailure("broken pipe".to_string());
        assert!(err.to_string().contains("Link failure"));
        assert!(err.to_string().contains("broken pipe"));

        let err = ControlError::DeviceNotFound("AA:BB:CC:DD:EE:FF".to_string());
        assert!(err.to_string().contains("AA:BB:CC:DD:EE:FF"));
    }

    #[test]
    fn io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "test");
        let err: ControlError = io_err.into();
        assert!(matches!(err, ControlError::Io(_)));
    }
}
