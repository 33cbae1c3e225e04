//! Process snapshot types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One process as seen at query time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessInfo {
    /// Executable name
    pub name: String,
    /// Process id; the OS may reuse it after the process exits
    pub pid: u32,
    /// Resident memory in bytes
    pub memory_bytes: u64,
    /// Number of threads, including the main thread
    pub thread_count: usize,
    /// False for stopped, traced, zombie or dead processes
    pub responsive: bool,
    /// Start time, when the OS reports one
    pub start_time: Option<DateTime<Utc>>,
}

/// Order processes by resident memory (largest first), ties by pid, and keep `n`
pub fn rank_by_memory(mut processes: Vec<ProcessInfo>, n: usize) -> Vec<ProcessInfo> {
    processes.sort_by(|a, b| {
        b.memory_bytes
            .cmp(&a.memory_bytes)
            .then_with(|| a.pid.cmp(&b.pid))
    });
    processes.truncate(n);
    processes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proc(pid: u32, memory_bytes: u64) -> ProcessInfo {
        ProcessInfo {
            name: format!("p{}", pid),
            pid,
            memory_bytes,
            thread_count: 1,
            responsive: true,
            start_time: None,
        }
    }

    #[test]
    fn test_rank_by_memory_descending_with_pid_ties() {
        let ranked = rank_by_memory(
            vec![proc(9, 100), proc(3, 500), proc(7, 100), proc(1, 100), proc(4, 900)],
            4,
        );
        let order: Vec<u32> = ranked.iter().map(|p| p.pid).collect();
        assert_eq!(order, vec![4, 3, 1, 7]);
    }

    #[test]
    fn test_rank_by_memory_short_input() {
        let ranked = rank_by_memory(vec![proc(2, 10)], 10);
        assert_eq!(ranked.len(), 1);
        assert!(rank_by_memory(Vec::new(), 3).is_empty());
        assert!(rank_by_memory(vec![proc(2, 10)], 0).is_empty());
    }
}
