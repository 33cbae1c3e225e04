//! The host inventory facade
//!
//! [`HostInventory`] is the single entry point callers use. It holds no
//! mutable state: every call asks the OS (through [`Backends`]) for a fresh
//! snapshot, so clones can be shared freely across tasks.

use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::backend::Backends;
use crate::config::InventoryConfig;
use crate::error::{InventoryError, InventoryResult};
use crate::host;
use crate::sampler::ResourceSampler;
use crate::types::{
    rank_by_memory, Dashboard, DiskGauge, DiskInfo, Listing, LogEntry, LogQuery,
    NetworkInterfaceInfo, PingResult, ProcessInfo, QuickStats, SectionError, ServiceAction,
    ServiceInfo, ServiceStatus, SystemInfo,
};
use crate::wait::{wait_for_status, WaitOutcome};

// Roughly 30 years
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

#[derive(Clone)]
pub struct HostInventory {
    backends: Backends,
    config: InventoryConfig,
}

impl HostInventory {
    /// Facade over the running host
    pub fn native(config: InventoryConfig) -> Self {
        Self::with_backends(Backends::native(&config), config)
    }

    pub fn with_backends(backends: Backends, config: InventoryConfig) -> Self {
        Self { backends, config }
    }

    pub fn config(&self) -> &InventoryConfig {
        &self.config
    }

    // ========================================================================
    // Host
    // ========================================================================

    pub fn system_info(&self) -> SystemInfo {
        host::system_info()
    }

    // ========================================================================
    // Processes
    // ========================================================================

    /// Every process visible at the current privilege level
    pub fn list_processes(&self) -> InventoryResult<Listing<ProcessInfo>> {
        let mut listing = Listing::collect(self.backends.processes.snapshot()?);
        listing
            .items
            .sort_by(|a, b| a.name.cmp(&b.name).then(a.pid.cmp(&b.pid)));
        if listing.skipped > 0 {
            tracing::debug!(skipped = listing.skipped, "skipped inaccessible processes");
        }
        Ok(listing)
    }

    /// Processes whose name contains `needle`
    pub fn find_processes(
        &self,
        needle: &str,
        case_insensitive: bool,
    ) -> InventoryResult<Listing<ProcessInfo>> {
        let listing = self.list_processes()?;
        if case_insensitive {
            let needle = needle.to_lowercase();
            Ok(listing.retain(|p| p.name.to_lowercase().contains(&needle)))
        } else {
            Ok(listing.retain(|p| p.name.contains(needle)))
        }
    }

    /// The `n` processes with the most resident memory
    pub fn top_memory_consumers(&self, n: usize) -> InventoryResult<Vec<ProcessInfo>> {
        Ok(rank_by_memory(self.list_processes()?.into_items(), n))
    }

    /// Forcefully end a process
    ///
    /// Not idempotent: once the process is gone a repeated call reports
    /// `NotFound`. Never retried.
    pub async fn terminate_process(&self, pid: u32) -> InventoryResult<()> {
        tracing::info!(pid, "terminating process");
        match self.backends.processes.terminate(pid).await {
            Ok(()) => {
                tracing::info!(pid, "process terminated");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(pid, error = %e, "terminate failed");
                Err(e)
            }
        }
    }

    // ========================================================================
    // Services
    // ========================================================================

    /// Services, optionally restricted to one status (`None` lists all)
    pub async fn list_services(
        &self,
        status: Option<ServiceStatus>,
    ) -> InventoryResult<Listing<ServiceInfo>> {
        let mut listing = Listing::collect(self.backends.services.list().await?);
        listing.items.sort_by(|a, b| a.display_name.cmp(&b.display_name));
        if listing.skipped > 0 {
            tracing::debug!(skipped = listing.skipped, "skipped unreadable services");
        }
        Ok(match status {
            Some(status) => listing.retain(|s| s.status == status),
            None => listing,
        })
    }

    /// Services whose name or display name contains `needle`, ignoring case
    pub async fn find_services(&self, needle: &str) -> InventoryResult<Listing<ServiceInfo>> {
        let needle = needle.to_lowercase();
        Ok(self.list_services(None).await?.retain(|s| {
            s.name.to_lowercase().contains(&needle) || s.display_name.to_lowercase().contains(&needle)
        }))
    }

    /// Start, stop or restart a service and wait for the target status
    ///
    /// `timeout` bounds the whole operation, including both halves of a
    /// restart. Starting a running service (or stopping a stopped one)
    /// succeeds without touching it.
    pub async fn control_service(
        &self,
        name: &str,
        action: ServiceAction,
        timeout: Duration,
    ) -> InventoryResult<ServiceInfo> {
        self.control_service_with_cancel(name, action, timeout, &CancellationToken::new())
            .await
    }

    /// [`control_service`](Self::control_service) with a way to stop waiting
    ///
    /// Cancelling returns `Cancelled` as soon as possible; an action already
    /// handed to the service manager is not undone.
    pub async fn control_service_with_cancel(
        &self,
        name: &str,
        action: ServiceAction,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> InventoryResult<ServiceInfo> {
        let deadline = deadline_after(timeout);
        let services = self.backends.services.as_ref();

        let current = services.query(name).await?;
        if action != ServiceAction::Restart && current.status == action.target_status() {
            tracing::info!(service = name, %action, "service already in target state");
            return Ok(current);
        }

        tracing::info!(service = name, %action, timeout_secs = timeout.as_secs_f64(), "controlling service");

        if action != ServiceAction::Start && current.status != ServiceStatus::Stopped {
            services.stop(name).await?;
            let stopped = self
                .await_status(name, ServiceStatus::Stopped, deadline, timeout, cancel)
                .await?;
            if action == ServiceAction::Stop {
                tracing::info!(service = name, "service stopped");
                return Ok(stopped);
            }
        }

        services.start(name).await?;
        let running = self
            .await_status(name, ServiceStatus::Running, deadline, timeout, cancel)
            .await?;
        tracing::info!(service = name, %action, "service running");
        Ok(running)
    }

    async fn await_status(
        &self,
        name: &str,
        target: ServiceStatus,
        deadline: Instant,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> InventoryResult<ServiceInfo> {
        let outcome = wait_for_status(
            self.backends.services.as_ref(),
            name,
            target,
            deadline,
            self.config.services.poll_interval(),
            cancel,
        )
        .await?;

        match outcome {
            WaitOutcome::Reached(info) => Ok(info),
            WaitOutcome::TimedOut(last) => {
                tracing::warn!(service = name, ?target, last = ?last.map(|s| s.status), "status wait timed out");
                Err(InventoryError::Timeout {
                    what: format!("service {} to become {:?}", name, target),
                    secs: timeout.as_secs_f64(),
                })
            }
            WaitOutcome::Cancelled(_) => {
                tracing::info!(service = name, ?target, "status wait cancelled by caller");
                Err(InventoryError::Cancelled(format!("service {}", name)))
            }
        }
    }

    // ========================================================================
    // Volumes & interfaces
    // ========================================================================

    /// Mounted volumes; with `ready_only` zero-capacity volumes are left out
    pub fn list_drives(&self, ready_only: bool) -> InventoryResult<Vec<DiskInfo>> {
        let mut drives = self.backends.volumes.volumes()?;
        if ready_only {
            drives.retain(DiskInfo::is_ready);
        }
        Ok(drives)
    }

    pub fn list_network_interfaces(&self) -> InventoryResult<Vec<NetworkInterfaceInfo>> {
        self.backends.interfaces.interfaces()
    }

    // ========================================================================
    // Ping
    // ========================================================================

    /// Send `count` independent echo probes to `host`
    ///
    /// Always returns exactly `count` results. Each probe is bounded by
    /// `timeout`, so the call finishes within roughly `count * timeout` plus
    /// the configured inter-probe interval.
    pub async fn ping(&self, host: &str, timeout: Duration, count: u32) -> Vec<PingResult> {
        let interval = Duration::from_millis(self.config.ping.interval_ms);
        let mut results = Vec::with_capacity(count as usize);

        for seq in 0..count {
            if seq > 0 && !interval.is_zero() {
                tokio::time::sleep(interval).await;
            }
            let result = match tokio::time::timeout(timeout, self.backends.pinger.probe(host, timeout)).await {
                Ok(result) => result,
                Err(_elapsed) => PingResult::failed("Request timed out"),
            };
            tracing::debug!(host, seq, success = result.success, rtt_ms = result.roundtrip_ms, "ping probe");
            results.push(result);
        }

        results
    }

    // ========================================================================
    // Event log
    // ========================================================================

    /// Most recent entries of a log, newest first
    ///
    /// `max_entries` is capped by the configured maximum. The store's answer
    /// is re-filtered, re-ordered and cut here, so the bound and the ordering
    /// hold whatever the store returns.
    pub async fn tail_event_log(&self, query: LogQuery) -> InventoryResult<Vec<LogEntry>> {
        let mut query = query;
        query.max_entries = query.max_entries.min(self.config.event_log.max_entries_cap);
        if query.max_entries == 0 {
            return Ok(Vec::new());
        }

        let entries = self.backends.logs.read(&query).await?;
        let entries = query.apply(entries);
        tracing::debug!(log = %query.log, returned = entries.len(), "read event log");
        Ok(entries)
    }

    // ========================================================================
    // Dashboard
    // ========================================================================

    /// One refresh cycle of the overview gauges
    ///
    /// Every section is queried on its own; a failing section is recorded in
    /// `errors` and the rest of the dashboard is still filled.
    pub async fn dashboard(&self, sampler: &mut ResourceSampler) -> Dashboard {
        let mut errors = Vec::new();

        let usage = section(&mut errors, "usage", sampler.sample().await);

        let drives = section(&mut errors, "drives", self.list_drives(true));
        let disk = drives.as_ref().and_then(|d| d.first()).map(|d| DiskGauge {
            drive: d.drive.clone(),
            usage_percent: d.usage_percent(),
        });

        let stats = QuickStats {
            processes: section(&mut errors, "processes", self.list_processes()).map(|l| l.len()),
            services: section(&mut errors, "services", self.list_services(None).await).map(|l| l.len()),
            network_interfaces: section(&mut errors, "network_interfaces", self.list_network_interfaces())
                .map(|i| i.len()),
            ready_drives: drives.map(|d| d.len()),
        };

        Dashboard {
            usage,
            disk,
            stats,
            uptime: crate::format::format_uptime(sysinfo::System::uptime()),
            errors,
        }
    }
}

/// Deadline `timeout` from now; timeouts past the clock's range mean "no deadline"
fn deadline_after(timeout: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(timeout)
        .unwrap_or_else(|| now + FAR_FUTURE)
}

fn section<T>(errors: &mut Vec<SectionError>, name: &str, result: InventoryResult<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(section = name, error = %e, "dashboard section unavailable");
            errors.push(SectionError {
                section: name.to_string(),
                kind: e.kind(),
                message: e.to_string(),
            });
            None
        }
    }
}
