//! Host identity, uptime and memory totals

use sysinfo::{MemoryRefreshKind, RefreshKind, System};

use crate::format::format_uptime;
use crate::types::SystemInfo;

/// Collect the static facts about this host
pub fn system_info() -> SystemInfo {
    let sys = System::new_with_specifics(
        RefreshKind::new().with_memory(MemoryRefreshKind::new().with_ram()),
    );
    let uptime_seconds = System::uptime();

    SystemInfo {
        hostname: System::host_name(),
        user_name: current_user(),
        os_name: System::name(),
        os_version: System::long_os_version().or_else(System::os_version),
        kernel_version: System::kernel_version(),
        architecture: std::env::consts::ARCH.to_string(),
        is_64_bit: cfg!(target_pointer_width = "64"),
        processor_count: std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1),
        uptime_seconds,
        uptime: format_uptime(uptime_seconds),
        total_memory_bytes: sys.total_memory(),
        available_memory_bytes: sys.available_memory(),
    }
}

fn current_user() -> Option<String> {
    ["USER", "USERNAME", "LOGNAME"]
        .iter()
        .find_map(|key| std::env::var(key).ok().filter(|v| !v.is_empty()))
}
