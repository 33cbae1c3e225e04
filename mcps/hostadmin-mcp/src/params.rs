//! Parameter types for Host Admin MCP tools

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct ListProcessesParams {
    #[schemars(description = "Only processes whose name contains this text (optional)")]
    #[serde(default)]
    pub name: Option<String>,

    #[schemars(description = "Match `name` case-sensitively (default: false)")]
    #[serde(default)]
    pub case_sensitive: Option<bool>,
}

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct TopMemoryParams {
    #[schemars(description = "How many processes to return (default from server config)")]
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct TerminateProcessParams {
    #[schemars(description = "Process id to terminate")]
    pub pid: u32,

    #[schemars(description = "Must be true; terminating a process cannot be undone")]
    #[serde(default)]
    pub confirm: Option<bool>,
}

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct ListServicesParams {
    #[schemars(description = "Status filter: running, stopped, paused, pending or all (default: all)")]
    #[serde(default)]
    pub status: Option<String>,

    #[schemars(description = "Only services whose name or display name contains this text (optional)")]
    #[serde(default)]
    pub search: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ControlServiceParams {
    #[schemars(description = "Service name, e.g. \"nginx\" or \"nginx.service\"")]
    pub name: String,

    #[schemars(description = "One of: start, stop, restart")]
    pub action: String,

    #[schemars(description = "Seconds to wait for the target status (clamped to server max)")]
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    #[schemars(description = "Must be true; the service state will change")]
    #[serde(default)]
    pub confirm: Option<bool>,
}

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct ListDrivesParams {
    #[schemars(description = "Leave out volumes that report no capacity (default: true)")]
    #[serde(default)]
    pub ready_only: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct PingParams {
    #[schemars(description = "Host name or IP address")]
    pub host: String,

    #[schemars(description = "Per-probe timeout in milliseconds (optional, clamped to server max)")]
    #[serde(default)]
    pub timeout_ms: Option<u64>,

    #[schemars(description = "Number of probes (optional, clamped to server max)")]
    #[serde(default)]
    pub count: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct TailEventLogParams {
    #[schemars(
        description = "Log name: all, application, system, kernel, user, unit:<service> or identifier:<tag>"
    )]
    pub log: String,

    #[schemars(description = "Maximum entries to return, newest first (optional)")]
    #[serde(default)]
    pub max_entries: Option<usize>,

    #[schemars(description = "Only entries at or after this RFC 3339 timestamp (optional)")]
    #[serde(default)]
    pub since: Option<String>,

    #[schemars(description = "Only entries at or before this RFC 3339 timestamp (optional)")]
    #[serde(default)]
    pub until: Option<String>,

    #[schemars(description = "Severity filter: error, warning, information or all (default: all)")]
    #[serde(default)]
    pub severity: Option<String>,
}
