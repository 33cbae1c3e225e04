//! In-memory backends for deterministic tests
//!
//! Enabled for this crate's own tests and for dependents through the `fake`
//! feature.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use super::{Backends, EventLogStore, InterfaceTable, Pinger, ProcessTable, ServiceManager, VolumeTable};
use crate::error::{InventoryError, InventoryResult};
use crate::types::{
    DiskInfo, LogEntry, LogQuery, NetworkInterfaceInfo, PingResult, ProcessInfo, ServiceInfo,
    ServiceStatus,
};

/// Process table held in memory; terminating removes the entry
#[derive(Default)]
pub struct FakeProcessTable {
    processes: Mutex<BTreeMap<u32, ProcessInfo>>,
    protected: Mutex<HashSet<u32>>,
    unreadable: usize,
}

impl FakeProcessTable {
    pub fn new(processes: Vec<ProcessInfo>) -> Self {
        Self {
            processes: Mutex::new(processes.into_iter().map(|p| (p.pid, p)).collect()),
            ..Default::default()
        }
    }

    /// Report `count` extra entries the caller may not read
    pub fn with_unreadable(mut self, count: usize) -> Self {
        self.unreadable = count;
        self
    }

    /// Refuse to terminate `pid`
    pub fn protect(self, pid: u32) -> Self {
        self.protected.lock().unwrap().insert(pid);
        self
    }
}

#[async_trait]
impl ProcessTable for FakeProcessTable {
    fn snapshot(&self) -> InventoryResult<Vec<InventoryResult<ProcessInfo>>> {
        let mut entries: Vec<InventoryResult<ProcessInfo>> = self
            .processes
            .lock()
            .unwrap()
            .values()
            .cloned()
            .map(Ok)
            .collect();
        entries.extend(
            (0..self.unreadable).map(|i| Err(InventoryError::access_denied(format!("read process #{}", i)))),
        );
        Ok(entries)
    }

    async fn terminate(&self, pid: u32) -> InventoryResult<()> {
        if self.protected.lock().unwrap().contains(&pid) {
            return Err(InventoryError::access_denied(format!("terminate process {}", pid)));
        }
        match self.processes.lock().unwrap().remove(&pid) {
            Some(_) => Ok(()),
            None => Err(InventoryError::not_found("process", pid.to_string())),
        }
    }
}

/// Service manager held in memory
///
/// Requests move a service through `Pending` and settle after `settle_polls`
/// status queries, mimicking an asynchronous service manager. Services named
/// in `stuck` never leave `Pending`.
#[derive(Default)]
pub struct FakeServiceManager {
    services: Mutex<BTreeMap<String, (ServiceInfo, Option<(ServiceStatus, u32)>)>>,
    stuck: Mutex<HashSet<String>>,
    protected: Mutex<HashSet<String>>,
    requests: Mutex<Vec<(String, &'static str)>>,
    settle_polls: u32,
}

impl FakeServiceManager {
    pub fn new(services: Vec<ServiceInfo>) -> Self {
        Self {
            services: Mutex::new(
                services
                    .into_iter()
                    .map(|s| (s.name.clone(), (s, None)))
                    .collect(),
            ),
            settle_polls: 1,
            ..Default::default()
        }
    }

    pub fn stuck(self, name: &str) -> Self {
        self.stuck.lock().unwrap().insert(name.to_string());
        self
    }

    pub fn protect(self, name: &str) -> Self {
        self.protected.lock().unwrap().insert(name.to_string());
        self
    }

    /// Control requests received so far, as (service, verb)
    pub fn requests(&self) -> Vec<(String, &'static str)> {
        self.requests.lock().unwrap().clone()
    }

    fn request(&self, name: &str, verb: &'static str, target: ServiceStatus) -> InventoryResult<()> {
        if self.protected.lock().unwrap().contains(name) {
            return Err(InventoryError::access_denied(format!("{} service {}", verb, name)));
        }
        let mut services = self.services.lock().unwrap();
        let (info, transition) = services
            .get_mut(name)
            .ok_or_else(|| InventoryError::not_found("service", name))?;
        self.requests.lock().unwrap().push((name.to_string(), verb));
        if info.status != target {
            info.status = ServiceStatus::Pending;
            *transition = Some((target, self.settle_polls));
        }
        Ok(())
    }
}

#[async_trait]
impl ServiceManager for FakeServiceManager {
    async fn list(&self) -> InventoryResult<Vec<InventoryResult<ServiceInfo>>> {
        Ok(self
            .services
            .lock()
            .unwrap()
            .values()
            .map(|(info, _)| Ok(info.clone()))
            .collect())
    }

    async fn query(&self, name: &str) -> InventoryResult<ServiceInfo> {
        let stuck = self.stuck.lock().unwrap().contains(name);
        let mut services = self.services.lock().unwrap();
        let (info, transition) = services
            .get_mut(name)
            .ok_or_else(|| InventoryError::not_found("service", name))?;

        if let Some((target, remaining)) = transition.as_mut() {
            if !stuck {
                if *remaining == 0 {
                    info.status = *target;
                    *transition = None;
                } else {
                    *remaining -= 1;
                }
            }
        }
        Ok(info.clone())
    }

    async fn start(&self, name: &str) -> InventoryResult<()> {
        self.request(name, "start", ServiceStatus::Running)
    }

    async fn stop(&self, name: &str) -> InventoryResult<()> {
        self.request(name, "stop", ServiceStatus::Stopped)
    }
}

pub struct FakeVolumes(pub Vec<DiskInfo>);

impl VolumeTable for FakeVolumes {
    fn volumes(&self) -> InventoryResult<Vec<DiskInfo>> {
        Ok(self.0.clone())
    }
}

pub struct FakeInterfaces(pub Vec<NetworkInterfaceInfo>);

impl InterfaceTable for FakeInterfaces {
    fn interfaces(&self) -> InventoryResult<Vec<NetworkInterfaceInfo>> {
        Ok(self.0.clone())
    }
}

/// Event log held in memory; `None` simulates a host without a log subsystem
pub struct FakeEventLog {
    pub log: String,
    pub entries: Option<Vec<LogEntry>>,
}

#[async_trait]
impl EventLogStore for FakeEventLog {
    async fn read(&self, query: &LogQuery) -> InventoryResult<Vec<LogEntry>> {
        if !query.log.eq_ignore_ascii_case(&self.log) {
            return Err(InventoryError::not_found("event log", &query.log));
        }
        match &self.entries {
            // Unordered and unbounded on purpose; the facade must order and cut
            Some(entries) => Ok(entries.iter().filter(|e| query.matches(e)).cloned().collect()),
            None => Err(InventoryError::Unavailable("event log subsystem".into())),
        }
    }
}

/// Pinger that answers for `reachable` hosts and lets others time out
pub struct FakePinger {
    pub reachable: Vec<String>,
}

#[async_trait]
impl Pinger for FakePinger {
    async fn probe(&self, host: &str, timeout: Duration) -> PingResult {
        if self.reachable.iter().any(|h| h == host) {
            PingResult {
                success: true,
                roundtrip_ms: 1,
                ttl: Some(64),
                reply_from: Some(host.to_string()),
                error: None,
            }
        } else {
            tokio::time::sleep(timeout).await;
            PingResult::failed("Request timed out")
        }
    }
}

/// Handles to the fakes behind a [`Backends`] bundle
pub struct FakeHost {
    pub processes: Arc<FakeProcessTable>,
    pub services: Arc<FakeServiceManager>,
    pub backends: Backends,
}

impl FakeHost {
    pub fn new(
        processes: FakeProcessTable,
        services: FakeServiceManager,
        volumes: Vec<DiskInfo>,
        interfaces: Vec<NetworkInterfaceInfo>,
        log: FakeEventLog,
        reachable: Vec<String>,
    ) -> Self {
        let processes = Arc::new(processes);
        let services = Arc::new(services);
        let backends = Backends {
            processes: processes.clone(),
            services: services.clone(),
            volumes: Arc::new(FakeVolumes(volumes)),
            interfaces: Arc::new(FakeInterfaces(interfaces)),
            logs: Arc::new(log),
            pinger: Arc::new(FakePinger { reachable }),
        };
        Self {
            processes,
            services,
            backends,
        }
    }
}
