//! Service snapshot types

use serde::{Deserialize, Serialize};

/// Coarse service state as reported by the service manager
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceStatus {
    Running,
    Stopped,
    Paused,
    /// Transitioning between states
    Pending,
}

/// One service; `name` is the unique key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub display_name: String,
    pub name: String,
    pub status: ServiceStatus,
    /// How the service is started (e.g. "enabled", "disabled", "static")
    pub start_type: String,
}

/// Mutating action on a service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceAction {
    Start,
    Stop,
    /// Stop, wait for Stopped, then Start
    Restart,
}

impl ServiceAction {
    /// Status the service must reach for the action to count as done
    pub fn target_status(self) -> ServiceStatus {
        match self {
            ServiceAction::Stop => ServiceStatus::Stopped,
            ServiceAction::Start | ServiceAction::Restart => ServiceStatus::Running,
        }
    }
}

impl std::fmt::Display for ServiceAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ServiceAction::Start => "start",
            ServiceAction::Stop => "stop",
            ServiceAction::Restart => "restart",
        };
        f.write_str(s)
    }
}
