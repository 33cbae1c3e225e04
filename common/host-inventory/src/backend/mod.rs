//! OS backends behind the facade
//!
//! Each OS surface the facade touches sits behind one trait so the facade
//! can be driven by native implementations in production and by in-memory
//! fakes in tests.

mod command;
pub mod journal;
pub mod network;
pub mod ping;
pub mod process;
pub mod systemd;
pub mod volume;

#[cfg(any(test, feature = "fake"))]
pub mod fake;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::InventoryConfig;
use crate::error::InventoryResult;
use crate::types::{DiskInfo, LogEntry, LogQuery, NetworkInterfaceInfo, PingResult, ProcessInfo, ServiceInfo};

/// Process table: enumerate and terminate by pid
#[async_trait]
pub trait ProcessTable: Send + Sync {
    /// Every visible process; entries the OS would not describe are `Err`
    fn snapshot(&self) -> InventoryResult<Vec<InventoryResult<ProcessInfo>>>;

    /// Forcefully end `pid`
    async fn terminate(&self, pid: u32) -> InventoryResult<()>;
}

/// Service control manager
#[async_trait]
pub trait ServiceManager: Send + Sync {
    async fn list(&self) -> InventoryResult<Vec<InventoryResult<ServiceInfo>>>;

    /// Current state of one service, `NotFound` when the name is unknown
    async fn query(&self, name: &str) -> InventoryResult<ServiceInfo>;

    /// Ask the manager to start `name`; returns once the request is queued
    async fn start(&self, name: &str) -> InventoryResult<()>;

    /// Ask the manager to stop `name`; returns once the request is queued
    async fn stop(&self, name: &str) -> InventoryResult<()>;
}

/// Mounted filesystem volumes
pub trait VolumeTable: Send + Sync {
    fn volumes(&self) -> InventoryResult<Vec<DiskInfo>>;
}

/// Network interface table
pub trait InterfaceTable: Send + Sync {
    fn interfaces(&self) -> InventoryResult<Vec<NetworkInterfaceInfo>>;
}

/// Event log store
#[async_trait]
pub trait EventLogStore: Send + Sync {
    /// Entries matching `query`; callers re-apply ordering and bounds
    async fn read(&self, query: &LogQuery) -> InventoryResult<Vec<LogEntry>>;
}

/// ICMP echo
#[async_trait]
pub trait Pinger: Send + Sync {
    /// Send one echo request; failures are reported in the result
    async fn probe(&self, host: &str, timeout: Duration) -> PingResult;
}

/// The set of backends a facade talks to
#[derive(Clone)]
pub struct Backends {
    pub processes: Arc<dyn ProcessTable>,
    pub services: Arc<dyn ServiceManager>,
    pub volumes: Arc<dyn VolumeTable>,
    pub interfaces: Arc<dyn InterfaceTable>,
    pub logs: Arc<dyn EventLogStore>,
    pub pinger: Arc<dyn Pinger>,
}

impl Backends {
    /// Backends that talk to the running host
    pub fn native(config: &InventoryConfig) -> Self {
        Self {
            processes: Arc::new(process::SysinfoProcessTable::new(&config.processes)),
            services: Arc::new(systemd::SystemctlServices::new(&config.services)),
            volumes: Arc::new(volume::SysinfoVolumes),
            interfaces: Arc::new(network::SysinfoInterfaces::new(&config.network)),
            logs: Arc::new(journal::Journalctl::new(&config.event_log)),
            pinger: Arc::new(ping::PingCommand::new(&config.ping)),
        }
    }
}
