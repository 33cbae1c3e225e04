//! Network interface snapshot types

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationalStatus {
    Up,
    Down,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterfaceKind {
    Ethernet,
    Wireless,
    Loopback,
    Tunnel,
    Other,
}

/// One network interface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkInterfaceInfo {
    pub name: String,
    pub description: String,
    pub kind: InterfaceKind,
    pub status: OperationalStatus,
    /// Link speed in bits per second, when the driver reports one
    pub speed_bps: Option<u64>,
    /// Unicast addresses (IPv4 and IPv6)
    pub addresses: Vec<String>,
    /// MAC address, e.g. "aa:bb:cc:dd:ee:ff"
    pub mac_address: String,
}
