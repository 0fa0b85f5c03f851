//! Remote peer representation and target selection.

use std::fmt;

/// Bluetooth device address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address(pub String);

impl Address {
    /// Create from a MAC address string (e.g., "00:11:22:33:44:55").
    pub fn new(addr: impl Into<String>) -> Self {
        Self(addr.into().to_uppercase())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(target_os = "linux")]
impl From<bluer::Address> for Address {
    fn from(addr: bluer::Address) -> Self {
        Self(addr.to_string().to_uppercase())
    }
}

/// The single bonded peer this session manages.
///
/// Immutable once selected; replacing the target tears down any active
/// connection first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemotePeer {
    /// Stable Bluetooth address.
    pub address: Address,
    /// Human-readable device name.
    pub name: String,
}

impl RemotePeer {
    pub fn new(address: Address, name: impl Into<String>) -> Self {
        Self {
            address,
            name: name.into(),
        }
    }
}

impl fmt::Display for RemotePeer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.address)
    }
}

/// Pick the target peer from a list of bonded peers by name fragment.
///
/// Case-insensitive substring match; the first matching peer wins. Returns
/// `None` if no bonded peer matches.
pub fn select_target(peers: &[RemotePeer], name_fragment: &str) -> Option<RemotePeer> {
    let fragment = name_fragment.to_lowercase();
    peers
        .iter()
        .find(|p| p.name.to_lowercase().contains(&fragment))
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    mod address {
        use super::*;

        #[test]
        fn normalizes_to_uppercase() {
            let addr = Address::new("aa:bb:cc:dd:ee:ff");
            assert_eq!(addr.0, "AA:BB:CC:DD:EE:FF");
        }

        #[test]
        fn display_round_trips() {
            let addr = Address::new("00:11:22:33:44:55");
            assert_eq!(addr.to_string(), "00:11:22:33:44:55");
        }
    }

    mod select_target {
        use super::*;

        fn bonded() -> Vec<RemotePeer> {
            vec![
                RemotePeer::new(Address::new("00:11:22:33:44:55"), "Car Stereo"),
                RemotePeer::new(Address::new("66:77:88:99:AA:BB"), "Pixel 7"),
                RemotePeer::new(Address::new("CC:DD:EE:FF:00:11"), "Pixel Buds"),
            ]
        }

        #[test]
        fn matches_case_insensitive_fragment() {
            let target = select_target(&bonded(), "pixel").unwrap();
            assert_eq!(target.name, "Pixel 7");
        }

        #[test]
        fn first_match_wins() {
            let target = select_target(&bonded(), "PIXEL").unwrap();
            assert_eq!(target.address, Address::new("66:77:88:99:AA:BB"));
        }

        #[test]
        fn no_match_returns_none() {
            assert!(select_target(&bonded(), "headphones").is_none());
        }

        #[test]
        fn empty_list_returns_none() {
            assert!(select_target(&[], "pixel").is_none());
        }
    }
}
