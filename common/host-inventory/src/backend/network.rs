//! Network interface table backed by sysinfo and sysfs
//!
//! sysinfo supplies names, MAC and IP addresses; link state, speed and kind
//! come from `/sys/class/net/<iface>` where it exists.

use std::path::{Path, PathBuf};

use sysinfo::Networks;

use super::InterfaceTable;
use crate::config::NetworkConfig;
use crate::error::InventoryResult;
use crate::types::{InterfaceKind, NetworkInterfaceInfo, OperationalStatus};

const IFF_UP: u32 = 0x1;

/// Native interface table
pub struct SysinfoInterfaces {
    sysfs: SysfsNet,
}

impl SysinfoInterfaces {
    pub fn new(config: &NetworkConfig) -> Self {
        Self {
            sysfs: SysfsNet::new(&config.sysfs_root),
        }
    }
}

impl InterfaceTable for SysinfoInterfaces {
    fn interfaces(&self) -> InventoryResult<Vec<NetworkInterfaceInfo>> {
        let networks = Networks::new_with_refreshed_list();

        let mut interfaces: Vec<NetworkInterfaceInfo> = networks
            .iter()
            .map(|(name, data)| {
                let kind = self.sysfs.kind(name);
                NetworkInterfaceInfo {
                    name: name.clone(),
                    description: self.sysfs.description(name, kind),
                    kind,
                    status: self.sysfs.status(name),
                    speed_bps: self.sysfs.speed_bps(name),
                    addresses: data
                        .ip_networks()
                        .iter()
                        .filter(|ip| !ip.addr.is_multicast())
                        .map(|ip| ip.addr.to_string())
                        .collect(),
                    mac_address: data.mac_address().to_string(),
                }
            })
            .collect();

        interfaces.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(interfaces)
    }
}

/// Reader for the per-interface sysfs attributes
pub struct SysfsNet {
    root: PathBuf,
}

impl SysfsNet {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    fn attr(&self, iface: &str, name: &str) -> Option<String> {
        std::fs::read_to_string(self.root.join(iface).join(name))
            .ok()
            .map(|s| s.trim().to_string())
    }

    pub fn status(&self, iface: &str) -> OperationalStatus {
        match self.attr(iface, "operstate").as_deref() {
            Some("up") => OperationalStatus::Up,
            Some("down") | Some("lowerlayerdown") | Some("notpresent") => OperationalStatus::Down,
            // Loopback and many virtual links report "unknown"; fall back to the admin flag
            Some(_) => match self.flags(iface) {
                Some(flags) if flags & IFF_UP != 0 => OperationalStatus::Up,
                Some(_) => OperationalStatus::Down,
                None => OperationalStatus::Unknown,
            },
            None => OperationalStatus::Unknown,
        }
    }

    fn flags(&self, iface: &str) -> Option<u32> {
        let raw = self.attr(iface, "flags")?;
        u32::from_str_radix(raw.trim_start_matches("0x"), 16).ok()
    }

    /// Link speed in bits per second; sysfs reports Mbps and -1 when unknown
    pub fn speed_bps(&self, iface: &str) -> Option<u64> {
        let mbps: i64 = self.attr(iface, "speed")?.parse().ok()?;
        if mbps > 0 {
            Some(mbps as u64 * 1_000_000)
        } else {
            None
        }
    }

    pub fn kind(&self, iface: &str) -> InterfaceKind {
        if self.root.join(iface).join("wireless").exists() {
            return InterfaceKind::Wireless;
        }
        // ARPHRD_* values from if_arp.h
        match self.attr(iface, "type").and_then(|t| t.parse::<u32>().ok()) {
            Some(1) => InterfaceKind::Ethernet,
            Some(772) => InterfaceKind::Loopback,
            Some(768 | 769 | 776 | 778 | 65534) => InterfaceKind::Tunnel,
            _ => InterfaceKind::Other,
        }
    }

    pub fn description(&self, iface: &str, kind: InterfaceKind) -> String {
        let label = match kind {
            InterfaceKind::Ethernet => "Ethernet",
            InterfaceKind::Wireless => "Wireless",
            InterfaceKind::Loopback => "Loopback",
            InterfaceKind::Tunnel => "Tunnel",
            InterfaceKind::Other => "Network interface",
        };
        let driver = std::fs::read_link(self.root.join(iface).join("device").join("driver"))
            .ok()
            .and_then(|p| p.file_name().map(|n| n.to_string_lossy().to_string()));
        match driver {
            Some(driver) => format!("{} ({})", label, driver),
            None => label.to_string(),
        }
    }
}
