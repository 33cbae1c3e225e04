//! Host-level summary types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ErrorKind;

/// Static facts about the host plus uptime and memory totals
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemInfo {
    pub hostname: Option<String>,
    pub user_name: Option<String>,
    pub os_name: Option<String>,
    pub os_version: Option<String>,
    pub kernel_version: Option<String>,
    pub architecture: String,
    pub is_64_bit: bool,
    pub processor_count: usize,
    pub uptime_seconds: u64,
    /// e.g. "3d 4h 12m 5s"
    pub uptime: String,
    pub total_memory_bytes: u64,
    pub available_memory_bytes: u64,
}

/// One reading of the resource sampler
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceUsage {
    pub cpu_percent: f32,
    pub total_memory_bytes: u64,
    pub available_memory_bytes: u64,
    pub memory_used_percent: f64,
    pub sampled_at: DateTime<Utc>,
}

/// Counts shown next to the dashboard gauges
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuickStats {
    pub processes: Option<usize>,
    pub services: Option<usize>,
    pub network_interfaces: Option<usize>,
    pub ready_drives: Option<usize>,
}

/// Usage of the first ready volume
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiskGauge {
    pub drive: String,
    pub usage_percent: f64,
}

/// A dashboard section that could not be filled this cycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionError {
    pub section: String,
    pub kind: ErrorKind,
    pub message: String,
}

/// One refresh cycle; failed sections are `None` and listed in `errors`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dashboard {
    pub usage: Option<ResourceUsage>,
    pub disk: Option<DiskGauge>,
    pub stats: QuickStats,
    pub uptime: String,
    pub errors: Vec<SectionError>,
}
