//! Process table backed by sysinfo

use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sysinfo::{Pid, Process, ProcessRefreshKind, ProcessStatus, RefreshKind, System, ThreadKind};

use super::ProcessTable;
use crate::config::ProcessConfig;
use crate::error::{InventoryError, InventoryResult};
use crate::types::ProcessInfo;

const SETTLE_POLL: Duration = Duration::from_millis(20);

/// Native process table
pub struct SysinfoProcessTable {
    settle: Duration,
}

impl SysinfoProcessTable {
    pub fn new(config: &ProcessConfig) -> Self {
        Self {
            settle: Duration::from_millis(config.terminate_settle_ms),
        }
    }
}

fn load_processes(with_memory: bool) -> System {
    let kind = if with_memory {
        ProcessRefreshKind::new().with_memory()
    } else {
        ProcessRefreshKind::new()
    };
    System::new_with_specifics(RefreshKind::new().with_processes(kind))
}

fn describe(pid: Pid, process: &Process) -> InventoryResult<ProcessInfo> {
    let name = process.name().to_string_lossy().to_string();
    if name.is_empty() {
        return Err(InventoryError::access_denied(format!("read process {}", pid)));
    }

    let start_time = match process.start_time() {
        0 => None,
        secs => DateTime::<Utc>::from_timestamp(secs as i64, 0),
    };

    Ok(ProcessInfo {
        name,
        pid: pid.as_u32(),
        memory_bytes: process.memory(),
        thread_count: process.tasks().map_or(1, |tasks| tasks.len().max(1)),
        responsive: is_responsive(process.status()),
        start_time,
    })
}

fn is_responsive(status: ProcessStatus) -> bool {
    !matches!(
        status,
        ProcessStatus::Stop | ProcessStatus::Zombie | ProcessStatus::Dead | ProcessStatus::Tracing
    )
}

/// Userland threads are listed per task on Linux; kernel threads are real entries
fn is_userland_thread(kind: Option<ThreadKind>) -> bool {
    matches!(kind, Some(ThreadKind::Userland))
}

/// Whether `pid` names a live process (zombies count as exited)
fn is_alive(pid: u32) -> bool {
    let sys = load_processes(false);
    sys.process(Pid::from_u32(pid)).is_some_and(|p| {
        !is_userland_thread(p.thread_kind())
            && !matches!(p.status(), ProcessStatus::Zombie | ProcessStatus::Dead)
    })
}

#[cfg(unix)]
fn send_kill(pid: u32) -> InventoryResult<()> {
    let raw = libc::pid_t::try_from(pid)
        .map_err(|_| InventoryError::not_found("process", pid.to_string()))?;
    // SAFETY: kill(2) only takes integers. `raw` is positive, so exactly one
    // process is targeted, never a process group.
    let rc = unsafe { libc::kill(raw, libc::SIGKILL) };
    if rc == 0 {
        return Ok(());
    }

    let err = std::io::Error::last_os_error();
    match err.raw_os_error() {
        Some(libc::ESRCH) => Err(InventoryError::not_found("process", pid.to_string())),
        Some(libc::EPERM) => Err(InventoryError::access_denied(format!(
            "terminate process {}",
            pid
        ))),
        _ => Err(InventoryError::Unknown(format!(
            "terminate process {}: {}",
            pid, err
        ))),
    }
}

#[cfg(not(unix))]
fn send_kill(pid: u32) -> InventoryResult<()> {
    let sys = load_processes(false);
    match sys.process(Pid::from_u32(pid)) {
        None => Err(InventoryError::not_found("process", pid.to_string())),
        Some(process) if process.kill() => Ok(()),
        Some(_) => Err(InventoryError::Unknown(format!(
            "terminate process {} was refused by the OS",
            pid
        ))),
    }
}

#[async_trait]
impl ProcessTable for SysinfoProcessTable {
    fn snapshot(&self) -> InventoryResult<Vec<InventoryResult<ProcessInfo>>> {
        let sys = load_processes(true);
        let entries = sys
            .processes()
            .iter()
            .filter(|(_, process)| !is_userland_thread(process.thread_kind()))
            .map(|(pid, process)| describe(*pid, process))
            .collect();
        Ok(entries)
    }

    async fn terminate(&self, pid: u32) -> InventoryResult<()> {
        if pid == 0 || !is_alive(pid) {
            return Err(InventoryError::not_found("process", pid.to_string()));
        }

        send_kill(pid)?;

        let deadline = Instant::now() + self.settle;
        while Instant::now() < deadline {
            if !is_alive(pid) {
                return Ok(());
            }
            tokio::time::sleep(SETTLE_POLL).await;
        }

        tracing::debug!(pid, "process still present after settle period");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_responsive_mapping() {
        assert!(is_responsive(ProcessStatus::Run));
        assert!(is_responsive(ProcessStatus::Sleep));
        assert!(is_responsive(ProcessStatus::Idle));
        assert!(!is_responsive(ProcessStatus::Zombie));
        assert!(!is_responsive(ProcessStatus::Stop));
    }

    #[test]
    fn test_kernel_threads_are_not_hidden() {
        assert!(is_userland_thread(Some(ThreadKind::Userland)));
        assert!(!is_userland_thread(Some(ThreadKind::Kernel)));
        assert!(!is_userland_thread(None));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_snapshot_lists_kthreadd() {
        // pid 2 is kthreadd unless we are in a pid namespace without it
        let sys = load_processes(false);
        let visible_kernel_thread = sys
            .process(Pid::from_u32(2))
            .is_some_and(|p| p.thread_kind() == Some(ThreadKind::Kernel));
        if !visible_kernel_thread {
            return;
        }

        let table = SysinfoProcessTable::new(&ProcessConfig::default());
        let entries = table.snapshot().unwrap();
        assert!(entries
            .iter()
            .filter_map(|e| e.as_ref().ok())
            .any(|p| p.pid == 2));
        assert!(is_alive(2));
    }

    #[test]
    fn test_snapshot_contains_current_process() {
        let table = SysinfoProcessTable::new(&ProcessConfig::default());
        let me = std::process::id();
        let entries = table.snapshot().unwrap();
        let found = entries
            .iter()
            .filter_map(|e| e.as_ref().ok())
            .find(|p| p.pid == me)
            .expect("current process should be listed");
        assert!(found.memory_bytes > 0);
        assert!(found.thread_count >= 1);
    }

    #[tokio::test]
    async fn test_terminate_pid_zero_is_not_found() {
        let table = SysinfoProcessTable::new(&ProcessConfig::default());
        let err = table.terminate(0).await.unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::NotFound);
    }
}
