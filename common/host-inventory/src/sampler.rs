//! Caller-owned resource usage sampler

use chrono::Utc;
use sysinfo::{CpuRefreshKind, MemoryRefreshKind, RefreshKind, System, MINIMUM_CPU_UPDATE_INTERVAL};

use crate::error::{InventoryError, InventoryResult};
use crate::format::usage_percent;
use crate::types::ResourceUsage;

/// Samples coarse CPU and memory usage on demand
///
/// CPU usage is a delta between two refreshes, so the sampler keeps its own
/// counters between calls. Create one per dashboard (or per caller) and keep
/// it for as long as readings are wanted; dropping it releases everything.
pub struct ResourceSampler {
    system: System,
    primed: bool,
}

impl ResourceSampler {
    pub fn new() -> Self {
        let system = System::new_with_specifics(
            RefreshKind::new()
                .with_cpu(CpuRefreshKind::new().with_cpu_usage())
                .with_memory(MemoryRefreshKind::new().with_ram()),
        );
        Self {
            system,
            primed: false,
        }
    }

    /// Take one reading
    ///
    /// The first call waits the minimum CPU update interval so its CPU figure
    /// is a real measurement rather than zero.
    pub async fn sample(&mut self) -> InventoryResult<ResourceUsage> {
        if !self.primed {
            self.system.refresh_cpu_usage();
            tokio::time::sleep(MINIMUM_CPU_UPDATE_INTERVAL).await;
            self.primed = true;
        }
        self.system.refresh_cpu_usage();
        self.system.refresh_memory();

        if self.system.cpus().is_empty() {
            return Err(InventoryError::Unavailable("CPU usage counters".into()));
        }

        let total = self.system.total_memory();
        let available = self.system.available_memory();
        if total == 0 {
            return Err(InventoryError::Unavailable("memory counters".into()));
        }

        Ok(ResourceUsage {
            cpu_percent: self.system.global_cpu_usage(),
            total_memory_bytes: total,
            available_memory_bytes: available,
            memory_used_percent: usage_percent(total, available),
            sampled_at: Utc::now(),
        })
    }
}

impl Default for ResourceSampler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sample_is_within_bounds() {
        let mut sampler = ResourceSampler::new();
        let usage = sampler.sample().await.unwrap();
        assert!(usage.cpu_percent >= 0.0);
        assert!(usage.total_memory_bytes > 0);
        assert!(usage.available_memory_bytes <= usage.total_memory_bytes);
        assert!((0.0..=100.0).contains(&usage.memory_used_percent));

        // Second reading skips the priming delay
        let again = sampler.sample().await.unwrap();
        assert!(again.sampled_at >= usage.sampled_at);
    }
}
