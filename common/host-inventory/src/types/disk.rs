//! Volume snapshot types

use serde::{Deserialize, Serialize};

use crate::format::usage_percent;

/// One mounted volume
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiskInfo {
    /// Mount point (drive identifier)
    pub drive: String,
    /// Device or volume label
    pub label: String,
    /// "Fixed" or "Removable", plus the media kind when known
    pub drive_type: String,
    /// Filesystem format (e.g. "ext4", "ntfs", "apfs")
    pub filesystem: String,
    pub total_bytes: u64,
    pub free_bytes: u64,
}

impl DiskInfo {
    pub fn used_bytes(&self) -> u64 {
        self.total_bytes.saturating_sub(self.free_bytes)
    }

    /// Used share of capacity in percent; 0.0 for zero-capacity volumes
    pub fn usage_percent(&self) -> f64 {
        usage_percent(self.total_bytes, self.free_bytes)
    }

    /// A volume is ready when it reports any capacity at all
    pub fn is_ready(&self) -> bool {
        self.total_bytes > 0
    }
}

/// Free-function form of [`DiskInfo::usage_percent`]
pub fn disk_usage_percent(disk: &DiskInfo) -> f64 {
    disk.usage_percent()
}
