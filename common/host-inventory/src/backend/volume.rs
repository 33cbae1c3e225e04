//! Volume table backed by sysinfo

use sysinfo::{Disk, DiskKind, Disks};

use super::VolumeTable;
use crate::error::InventoryResult;
use crate::types::DiskInfo;

/// Native volume table
pub struct SysinfoVolumes;

fn drive_type(disk: &Disk) -> String {
    let media = if disk.is_removable() { "Removable" } else { "Fixed" };
    match disk.kind() {
        DiskKind::SSD => format!("{} (SSD)", media),
        DiskKind::HDD => format!("{} (HDD)", media),
        DiskKind::Unknown(_) => media.to_string(),
    }
}

impl VolumeTable for SysinfoVolumes {
    fn volumes(&self) -> InventoryResult<Vec<DiskInfo>> {
        let disks = Disks::new_with_refreshed_list();

        Ok(disks
            .iter()
            .map(|disk| DiskInfo {
                drive: disk.mount_point().to_string_lossy().to_string(),
                label: disk.name().to_string_lossy().to_string(),
                drive_type: drive_type(disk),
                filesystem: disk.file_system().to_string_lossy().to_string(),
                total_bytes: disk.total_space(),
                free_bytes: disk.available_space(),
            })
            .collect())
    }
}
