//! Media command encoding.
//!
//! Maps high-level media actions to a minimal AVRCP passthrough packet.
//! This is deliberately not a full AVRCP implementation; each command is a
//! single fixed-length passthrough frame carrying one operation code.

use std::fmt;

/// Transaction label used for every passthrough frame.
const TRANSACTION_LABEL: u8 = 0x00;

/// PDU identifier for a passthrough command.
const PDU_PASSTHROUGH: u8 = 0x48;

/// Length of an encoded passthrough packet in bytes.
pub const PASSTHROUGH_LEN: usize = 5;

/// A media remote-control action with its AVRCP operation code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaCommand {
    PlayPause,
    Next,
    Previous,
    VolumeUp,
    VolumeDown,
    Stop,
    FastForward,
    Rewind,
}

impl MediaCommand {
    /// All commands, in a stable order.
    pub const ALL: [MediaCommand; 8] = [
        MediaCommand::PlayPause,
        MediaCommand::Next,
        MediaCommand::Previous,
        MediaCommand::VolumeUp,
        MediaCommand::VolumeDown,
        MediaCommand::Stop,
        MediaCommand::FastForward,
        MediaCommand::Rewind,
    ];

    /// AVRCP operation code for this command.
    pub const fn opcode(self) -> u8 {
        match self {
            MediaCommand::PlayPause => 0x46,
            MediaCommand::Next => 0x4B,
            MediaCommand::Previous => 0x4C,
            MediaCommand::VolumeUp => 0x41,
            MediaCommand::VolumeDown => 0x42,
            MediaCommand::Stop => 0x45,
            MediaCommand::FastForward => 0x49,
            MediaCommand::Rewind => 0x48,
        }
    }

    /// Encode as a passthrough packet.
    ///
    /// Layout: transaction label, passthrough PDU id, operation code,
    /// operation data length, subunit type & id.
    pub const fn passthrough_packet(self) -> [u8; PASSTHROUGH_LEN] {
        [
            TRANSACTION_LABEL,
            PDU_PASSTHROUGH,
            self.opcode(),
            0x00,
            0x00,
        ]
    }
}

impl fmt::Display for MediaCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MediaCommand::PlayPause => "play/pause",
            MediaCommand::Next => "next",
            MediaCommand::Previous => "previous",
            MediaCommand::VolumeUp => "volume up",
            MediaCommand::VolumeDown => "volume down",
            MediaCommand::Stop => "stop",
            MediaCommand::FastForward => "fast forward",
            MediaCommand::Rewind => "rewind",
        };
        write!(f, "{}", name)
    }
}
