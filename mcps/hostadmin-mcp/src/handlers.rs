//! Tool handlers
//!
//! Each handler turns tool parameters into one facade call and renders the
//! snapshot as JSON. Destructive handlers check `confirm` before touching the
//! facade.

use std::time::Duration;

use chrono::{DateTime, Utc};
use host_inventory::{
    format_bytes, DiskInfo, HostInventory, LogEntry, LogQuery, PingResult, ProcessInfo,
    ResourceSampler, ServiceAction, ServiceInfo, ServiceStatus, Severity,
};
use rmcp::{model::CallToolResult, ErrorData as McpError};
use serde::Serialize;
use tokio::sync::Mutex;

use crate::params::*;
use crate::result::{inventory_error_to_mcp, invalid_params, json_success, require_confirm};

// ============================================================================
// Response Views
// ============================================================================

#[derive(Debug, Serialize)]
struct ProcessView {
    #[serde(flatten)]
    info: ProcessInfo,
    memory: String,
}

impl From<ProcessInfo> for ProcessView {
    fn from(info: ProcessInfo) -> Self {
        let memory = format_bytes(info.memory_bytes);
        Self { info, memory }
    }
}

#[derive(Debug, Serialize)]
struct ProcessListing {
    count: usize,
    skipped: usize,
    processes: Vec<ProcessView>,
}

#[derive(Debug, Serialize)]
struct ServiceListing {
    count: usize,
    skipped: usize,
    services: Vec<ServiceInfo>,
}

#[derive(Debug, Serialize)]
struct DriveView {
    #[serde(flatten)]
    disk: DiskInfo,
    used_bytes: u64,
    usage_percent: f64,
    total: String,
    free: String,
}

impl From<DiskInfo> for DriveView {
    fn from(disk: DiskInfo) -> Self {
        Self {
            used_bytes: disk.used_bytes(),
            usage_percent: disk.usage_percent(),
            total: format_bytes(disk.total_bytes),
            free: format_bytes(disk.free_bytes),
            disk,
        }
    }
}

#[derive(Debug, Serialize)]
struct LogEntryView {
    summary: String,
    #[serde(flatten)]
    entry: LogEntry,
}

#[derive(Debug, Serialize)]
struct PingReport {
    host: String,
    sent: usize,
    received: usize,
    results: Vec<PingResult>,
}

#[derive(Debug, Serialize)]
struct TerminateReport {
    pid: u32,
    terminated: bool,
}

// ============================================================================
// Parameter Parsing
// ============================================================================

fn parse_status(status: Option<&str>) -> Result<Option<ServiceStatus>, McpError> {
    match status.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
        None | Some("") | Some("all") => Ok(None),
        Some("running") => Ok(Some(ServiceStatus::Running)),
        Some("stopped") => Ok(Some(ServiceStatus::Stopped)),
        Some("paused") => Ok(Some(ServiceStatus::Paused)),
        Some("pending") => Ok(Some(ServiceStatus::Pending)),
        Some(other) => Err(invalid_params(format!("unknown service status: {}", other))),
    }
}

fn parse_action(action: &str) -> Result<ServiceAction, McpError> {
    match action.trim().to_ascii_lowercase().as_str() {
        "start" => Ok(ServiceAction::Start),
        "stop" => Ok(ServiceAction::Stop),
        "restart" => Ok(ServiceAction::Restart),
        other => Err(invalid_params(format!(
            "unknown service action: {} (expected start, stop or restart)",
            other
        ))),
    }
}

fn parse_severity(severity: Option<&str>) -> Result<Option<Severity>, McpError> {
    match severity.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
        None | Some("") | Some("all") => Ok(None),
        Some("error") => Ok(Some(Severity::Error)),
        Some("warning") => Ok(Some(Severity::Warning)),
        Some("information") | Some("info") => Ok(Some(Severity::Information)),
        Some(other) => Err(invalid_params(format!("unknown severity: {}", other))),
    }
}

fn parse_time(field: &str, value: Option<&str>) -> Result<Option<DateTime<Utc>>, McpError> {
    value
        .map(|v| {
            DateTime::parse_from_rfc3339(v)
                .map(|t| t.with_timezone(&Utc))
                .map_err(|e| invalid_params(format!("{} is not an RFC 3339 timestamp: {}", field, e)))
        })
        .transpose()
}

// ============================================================================
// Handlers
// ============================================================================

pub fn get_system_info(inventory: &HostInventory) -> Result<CallToolResult, McpError> {
    json_success(&inventory.system_info())
}

pub fn list_processes(
    inventory: &HostInventory,
    params: ListProcessesParams,
) -> Result<CallToolResult, McpError> {
    let listing = match params.name.as_deref() {
        Some(name) => {
            inventory.find_processes(name, !params.case_sensitive.unwrap_or(false))
        }
        None => inventory.list_processes(),
    }
    .map_err(inventory_error_to_mcp)?;

    json_success(&ProcessListing {
        count: listing.len(),
        skipped: listing.skipped,
        processes: listing.into_items().into_iter().map(ProcessView::from).collect(),
    })
}

pub fn top_memory_consumers(
    inventory: &HostInventory,
    params: TopMemoryParams,
) -> Result<CallToolResult, McpError> {
    let limit = params
        .limit
        .unwrap_or(inventory.config().processes.top_default);
    let top = inventory
        .top_memory_consumers(limit)
        .map_err(inventory_error_to_mcp)?;
    let views: Vec<ProcessView> = top.into_iter().map(ProcessView::from).collect();
    json_success(&views)
}

pub async fn terminate_process(
    inventory: &HostInventory,
    params: TerminateProcessParams,
) -> Result<CallToolResult, McpError> {
    require_confirm(params.confirm, "terminate_process")?;
    inventory
        .terminate_process(params.pid)
        .await
        .map_err(inventory_error_to_mcp)?;
    json_success(&TerminateReport {
        pid: params.pid,
        terminated: true,
    })
}

pub async fn list_services(
    inventory: &HostInventory,
    params: ListServicesParams,
) -> Result<CallToolResult, McpError> {
    let status = parse_status(params.status.as_deref())?;

    let mut listing = match params.search.as_deref() {
        Some(search) => inventory.find_services(search).await,
        None => inventory.list_services(None).await,
    }
    .map_err(inventory_error_to_mcp)?;

    if let Some(status) = status {
        listing = listing.retain(|s| s.status == status);
    }

    json_success(&ServiceListing {
        count: listing.len(),
        skipped: listing.skipped,
        services: listing.into_items(),
    })
}

pub async fn control_service(
    inventory: &HostInventory,
    params: ControlServiceParams,
) -> Result<CallToolResult, McpError> {
    let action = parse_action(&params.action)?;
    require_confirm(params.confirm, "control_service")?;

    let timeout = inventory
        .config()
        .services
        .effective_timeout(params.timeout_secs.map(Duration::from_secs));
    let info = inventory
        .control_service(&params.name, action, timeout)
        .await
        .map_err(inventory_error_to_mcp)?;
    json_success(&info)
}

pub fn list_drives(
    inventory: &HostInventory,
    params: ListDrivesParams,
) -> Result<CallToolResult, McpError> {
    let drives = inventory
        .list_drives(params.ready_only.unwrap_or(true))
        .map_err(inventory_error_to_mcp)?;
    let views: Vec<DriveView> = drives.into_iter().map(DriveView::from).collect();
    json_success(&views)
}

pub fn list_network_interfaces(inventory: &HostInventory) -> Result<CallToolResult, McpError> {
    let interfaces = inventory
        .list_network_interfaces()
        .map_err(inventory_error_to_mcp)?;
    json_success(&interfaces)
}

pub async fn ping(inventory: &HostInventory, params: PingParams) -> Result<CallToolResult, McpError> {
    let config = &inventory.config().ping;
    let count = params.count.unwrap_or(config.default_count);
    if count == 0 {
        return Err(invalid_params("count must be at least 1"));
    }
    let count = count.min(config.max_count);
    let timeout = config.effective_timeout(params.timeout_ms);

    let results = inventory.ping(&params.host, timeout, count).await;
    json_success(&PingReport {
        host: params.host,
        sent: results.len(),
        received: results.iter().filter(|r| r.success).count(),
        results,
    })
}

pub async fn tail_event_log(
    inventory: &HostInventory,
    params: TailEventLogParams,
) -> Result<CallToolResult, McpError> {
    let config = &inventory.config().event_log;
    let max_entries = params.max_entries.unwrap_or(config.default_max_entries);

    let mut query = LogQuery::new(params.log, max_entries);
    if let Some(since) = parse_time("since", params.since.as_deref())? {
        query = query.since(since);
    }
    if let Some(until) = parse_time("until", params.until.as_deref())? {
        query = query.until(until);
    }
    if let Some(severity) = parse_severity(params.severity.as_deref())? {
        query = query.severity(severity);
    }

    let summary_chars = config.summary_chars;
    let entries = inventory
        .tail_event_log(query)
        .await
        .map_err(inventory_error_to_mcp)?;
    let views: Vec<LogEntryView> = entries
        .into_iter()
        .map(|entry| LogEntryView {
            summary: entry.summary(summary_chars),
            entry,
        })
        .collect();
    json_success(&views)
}

pub async fn get_resource_usage(sampler: &Mutex<ResourceSampler>) -> Result<CallToolResult, McpError> {
    let usage = sampler
        .lock()
        .await
        .sample()
        .await
        .map_err(inventory_error_to_mcp)?;
    json_success(&usage)
}

pub async fn get_dashboard(
    inventory: &HostInventory,
    sampler: &Mutex<ResourceSampler>,
) -> Result<CallToolResult, McpError> {
    let mut sampler = sampler.lock().await;
    json_success(&inventory.dashboard(&mut *sampler).await)
}
