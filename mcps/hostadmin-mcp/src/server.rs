//! MCP Server implementation for host administration
//!
//! Each tool delegates to its handler; the server itself only holds the
//! facade and the resource sampler shared by the usage tools.

use std::sync::Arc;

use host_inventory::{HostInventory, InventoryConfig, ResourceSampler};
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, ServerCapabilities, ServerInfo, Tool},
    tool, tool_handler, tool_router, ErrorData as McpError,
};
use serde_json::Value;
use tokio::sync::Mutex;

use crate::handlers;
use crate::params::*;

const SERVER_NAME: &str = "hostadmin";

const INSTRUCTIONS: &str = "Host administration MCP server - inspect processes, services, \
     drives, network interfaces and event logs, ping hosts, and terminate processes or \
     start/stop/restart services. Destructive tools require \"confirm\": true.";

/// Error type for in-process tool calls
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("tool not found: {0}")]
    ToolNotFound(String),

    #[error("invalid parameters: {0}")]
    InvalidParams(#[from] serde_json::Error),

    #[error("mcp error: {}", .0.message)]
    Mcp(McpError),
}

impl From<McpError> for DispatchError {
    fn from(err: McpError) -> Self {
        DispatchError::Mcp(err)
    }
}

pub type DispatchResult<T> = Result<T, DispatchError>;

/// The Host Admin MCP Server
#[derive(Clone)]
pub struct HostAdminMcpServer {
    inventory: HostInventory,
    sampler: Arc<Mutex<ResourceSampler>>,
    tool_router: ToolRouter<Self>,
}

// ============================================================================
// Tool Router - Each tool delegates to its handler
// ============================================================================

#[tool_router]
impl HostAdminMcpServer {
    /// Create a server for this host, loading config from standard locations
    pub fn new() -> Self {
        Self::with_config(InventoryConfig::load(None))
    }

    pub fn with_config(config: InventoryConfig) -> Self {
        Self::with_inventory(HostInventory::native(config))
    }

    /// Create a server over an existing facade
    pub fn with_inventory(inventory: HostInventory) -> Self {
        Self {
            inventory,
            sampler: Arc::new(Mutex::new(ResourceSampler::new())),
            tool_router: Self::tool_router(),
        }
    }

    pub fn inventory(&self) -> &HostInventory {
        &self.inventory
    }

    #[tool(
        description = "Get host information: hostname, user, OS name and version, kernel, architecture, processor count, uptime and memory totals"
    )]
    async fn get_system_info(&self) -> Result<CallToolResult, McpError> {
        handlers::get_system_info(&self.inventory)
    }

    #[tool(
        description = "List running processes with pid, memory, thread count and responsiveness; optionally filter by name"
    )]
    async fn list_processes(
        &self,
        Parameters(params): Parameters<ListProcessesParams>,
    ) -> Result<CallToolResult, McpError> {
        handlers::list_processes(&self.inventory, params)
    }

    #[tool(description = "List the processes using the most resident memory, largest first")]
    async fn top_memory_consumers(
        &self,
        Parameters(params): Parameters<TopMemoryParams>,
    ) -> Result<CallToolResult, McpError> {
        handlers::top_memory_consumers(&self.inventory, params)
    }

    #[tool(description = "Forcefully terminate a process by pid (requires confirm: true)")]
    async fn terminate_process(
        &self,
        Parameters(params): Parameters<TerminateProcessParams>,
    ) -> Result<CallToolResult, McpError> {
        handlers::terminate_process(&self.inventory, params).await
    }

    #[tool(description = "List system services with status and start type; filter by status or search text")]
    async fn list_services(
        &self,
        Parameters(params): Parameters<ListServicesParams>,
    ) -> Result<CallToolResult, McpError> {
        handlers::list_services(&self.inventory, params).await
    }

    #[tool(
        description = "Start, stop or restart a service and wait for it to reach the target status (requires confirm: true)"
    )]
    async fn control_service(
        &self,
        Parameters(params): Parameters<ControlServiceParams>,
    ) -> Result<CallToolResult, McpError> {
        handlers::control_service(&self.inventory, params).await
    }

    #[tool(description = "List mounted drives with label, type, filesystem, capacity and usage")]
    async fn list_drives(
        &self,
        Parameters(params): Parameters<ListDrivesParams>,
    ) -> Result<CallToolResult, McpError> {
        handlers::list_drives(&self.inventory, params)
    }

    #[tool(
        description = "List network interfaces with status, type, link speed, IP addresses and MAC address"
    )]
    async fn list_network_interfaces(&self) -> Result<CallToolResult, McpError> {
        handlers::list_network_interfaces(&self.inventory)
    }

    #[tool(description = "Ping a host; every probe is independent and bounded by the timeout")]
    async fn ping(&self, Parameters(params): Parameters<PingParams>) -> Result<CallToolResult, McpError> {
        handlers::ping(&self.inventory, params).await
    }

    #[tool(
        description = "Read the most recent event log entries, newest first, filtered by time range and severity"
    )]
    async fn tail_event_log(
        &self,
        Parameters(params): Parameters<TailEventLogParams>,
    ) -> Result<CallToolResult, McpError> {
        handlers::tail_event_log(&self.inventory, params).await
    }

    #[tool(description = "Sample current CPU and memory usage")]
    async fn get_resource_usage(&self) -> Result<CallToolResult, McpError> {
        handlers::get_resource_usage(&self.sampler).await
    }

    #[tool(
        description = "One dashboard refresh: CPU and memory usage, first drive usage, process/service/interface counts and uptime"
    )]
    async fn get_dashboard(&self) -> Result<CallToolResult, McpError> {
        handlers::get_dashboard(&self.inventory, &self.sampler).await
    }
}

// ============================================================================
// Server Handler Implementation
// ============================================================================

#[tool_handler]
impl rmcp::ServerHandler for HostAdminMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(INSTRUCTIONS.into()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

impl Default for HostAdminMcpServer {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// In-process Calls
// ============================================================================

impl HostAdminMcpServer {
    pub fn server_name(&self) -> &str {
        SERVER_NAME
    }

    pub fn list_tools(&self) -> Vec<Tool> {
        self.tool_router.list_all()
    }

    /// Execute a tool by name without going through a transport
    pub async fn call_tool(&self, name: &str, params: Value) -> DispatchResult<CallToolResult> {
        tracing::debug!(tool = name, "in-process tool call");
        let result = match name {
            "get_system_info" => self.get_system_info().await,
            "list_processes" => self.list_processes(Parameters(serde_json::from_value(params)?)).await,
            "top_memory_consumers" => {
                self.top_memory_consumers(Parameters(serde_json::from_value(params)?))
                    .await
            }
            "terminate_process" => {
                self.terminate_process(Parameters(serde_json::from_value(params)?))
                    .await
            }
            "list_services" => self.list_services(Parameters(serde_json::from_value(params)?)).await,
            "control_service" => {
                self.control_service(Parameters(serde_json::from_value(params)?))
                    .await
            }
            "list_drives" => self.list_drives(Parameters(serde_json::from_value(params)?)).await,
            "list_network_interfaces" => self.list_network_interfaces().await,
            "ping" => self.ping(Parameters(serde_json::from_value(params)?)).await,
            "tail_event_log" => {
                self.tail_event_log(Parameters(serde_json::from_value(params)?))
                    .await
            }
            "get_resource_usage" => self.get_resource_usage().await,
            "get_dashboard" => self.get_dashboard().await,
            _ => return Err(DispatchError::ToolNotFound(name.to_string())),
        };
        result.map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use host_inventory::backend::fake::{FakeEventLog, FakeHost, FakeProcessTable, FakeServiceManager};
    use host_inventory::{LogEntry, ProcessInfo, ServiceInfo, ServiceStatus, Severity};
    use rmcp::model::ErrorCode;
    use serde_json::json;

    fn fake_host() -> FakeHost {
        let processes = FakeProcessTable::new(vec![
            ProcessInfo {
                name: "postgres".into(),
                pid: 4242,
                memory_bytes: 64 * 1024 * 1024,
                thread_count: 8,
                responsive: true,
                start_time: None,
            },
            ProcessInfo {
                name: "bash".into(),
                pid: 77,
                memory_bytes: 4 * 1024 * 1024,
                thread_count: 1,
                responsive: true,
                start_time: None,
            },
        ]);
        let services = FakeServiceManager::new(vec![
            ServiceInfo {
                display_name: "PostgreSQL database server".into(),
                name: "postgresql".into(),
                status: ServiceStatus::Stopped,
                start_type: "enabled".into(),
            },
            ServiceInfo {
                display_name: "OpenSSH server daemon".into(),
                name: "sshd".into(),
                status: ServiceStatus::Running,
                start_type: "enabled".into(),
            },
        ])
        .protect("sshd");
        let entries = (0..30)
            .map(|i| LogEntry {
                severity: if i % 2 == 0 { Severity::Warning } else { Severity::Information },
                timestamp: chrono::DateTime::from_timestamp(1_700_000_000 + i * 60, 0).unwrap(),
                source: "kernel".into(),
                event_id: None,
                message: format!("line one {}\nline two", i),
            })
            .collect();

        FakeHost::new(
            processes,
            services,
            vec![],
            vec![],
            FakeEventLog {
                log: "kernel".into(),
                entries: Some(entries),
            },
            vec!["127.0.0.1".into()],
        )
    }

    fn server(host: &FakeHost) -> HostAdminMcpServer {
        let mut config = InventoryConfig::default();
        config.services.poll_interval_ms = 5;
        HostAdminMcpServer::with_inventory(HostInventory::with_backends(host.backends.clone(), config))
    }

    fn text(result: &CallToolResult) -> String {
        match &result.content[0].raw {
            rmcp::model::RawContent::Text(t) => t.text.clone(),
            other => panic!("unexpected content: {:?}", other),
        }
    }

    fn body(result: &CallToolResult) -> Value {
        serde_json::from_str(&text(result)).unwrap()
    }

    fn mcp_error(err: DispatchError) -> McpError {
        match err {
            DispatchError::Mcp(e) => e,
            other => panic!("expected an MCP error, got {:?}", other),
        }
    }

    #[test]
    fn test_list_tools() {
        let host = fake_host();
        let server = server(&host);
        assert_eq!(server.server_name(), "hostadmin");

        let tools = server.list_tools();
        assert_eq!(tools.len(), 12);

        let names: Vec<&str> = tools.iter().map(|t| t.name.as_ref()).collect();
        for expected in [
            "get_system_info",
            "terminate_process",
            "control_service",
            "tail_event_log",
            "get_dashboard",
        ] {
            assert!(names.contains(&expected), "missing tool {}", expected);
        }
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let host = fake_host();
        let result = server(&host).call_tool("format_disk", json!({})).await;
        assert!(matches!(result, Err(DispatchError::ToolNotFound(_))));
    }

    #[tokio::test]
    async fn test_bad_params() {
        let host = fake_host();
        let result = server(&host)
            .call_tool("terminate_process", json!({ "pid": "not-a-number" }))
            .await;
        assert!(matches!(result, Err(DispatchError::InvalidParams(_))));
    }

    #[tokio::test]
    async fn test_list_processes_filter() {
        let host = fake_host();
        let result = server(&host)
            .call_tool("list_processes", json!({ "name": "POST" }))
            .await
            .unwrap();
        let body = body(&result);
        assert_eq!(body["count"], 1);
        assert_eq!(body["processes"][0]["pid"], 4242);
        assert_eq!(body["processes"][0]["memory"], "64.00 MB");
    }

    #[tokio::test]
    async fn test_terminate_requires_confirm() {
        let host = fake_host();
        let server = server(&host);

        let err = mcp_error(
            server
                .call_tool("terminate_process", json!({ "pid": 4242 }))
                .await
                .unwrap_err(),
        );
        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);

        // Nothing was terminated
        let listing = server.inventory().list_processes().unwrap();
        assert!(listing.items.iter().any(|p| p.pid == 4242));

        server
            .call_tool("terminate_process", json!({ "pid": 4242, "confirm": true }))
            .await
            .unwrap();
        let err = mcp_error(
            server
                .call_tool("terminate_process", json!({ "pid": 4242, "confirm": true }))
                .await
                .unwrap_err(),
        );
        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
    }

    #[tokio::test]
    async fn test_control_service_requires_confirm() {
        let host = fake_host();
        let err = mcp_error(
            server(&host)
                .call_tool("control_service", json!({ "name": "postgresql", "action": "start" }))
                .await
                .unwrap_err(),
        );
        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
        assert!(host.services.requests().is_empty());
    }

    #[tokio::test]
    async fn test_control_service_start() {
        let host = fake_host();
        let result = server(&host)
            .call_tool(
                "control_service",
                json!({ "name": "postgresql", "action": "start", "timeout_secs": 5, "confirm": true }),
            )
            .await
            .unwrap();
        assert_eq!(body(&result)["status"], "running");
    }

    #[tokio::test]
    async fn test_control_service_access_denied() {
        let host = fake_host();
        let err = mcp_error(
            server(&host)
                .call_tool(
                    "control_service",
                    json!({ "name": "sshd", "action": "stop", "confirm": true }),
                )
                .await
                .unwrap_err(),
        );
        assert_eq!(err.code, ErrorCode::INVALID_REQUEST);
        assert!(err.message.contains("administrator privileges may be required"));
    }

    #[tokio::test]
    async fn test_list_services_by_status() {
        let host = fake_host();
        let result = server(&host)
            .call_tool("list_services", json!({ "status": "running" }))
            .await
            .unwrap();
        let body = body(&result);
        assert_eq!(body["count"], 1);
        assert_eq!(body["services"][0]["name"], "sshd");
    }

    #[tokio::test]
    async fn test_ping_clamps_count() {
        let host = fake_host();
        let result = server(&host)
            .call_tool("ping", json!({ "host": "127.0.0.1", "count": 500, "timeout_ms": 50 }))
            .await
            .unwrap();
        let body = body(&result);
        assert_eq!(body["sent"], 20);
        assert_eq!(body["received"], 20);
    }

    #[tokio::test]
    async fn test_ping_clamps_timeout() {
        let host = fake_host();
        let mut config = InventoryConfig::default();
        config.ping.max_timeout_ms = 50;
        let server =
            HostAdminMcpServer::with_inventory(HostInventory::with_backends(host.backends.clone(), config));

        let start = std::time::Instant::now();
        let result = server
            .call_tool("ping", json!({ "host": "10.255.255.1", "count": 1, "timeout_ms": 60_000 }))
            .await
            .unwrap();
        assert!(start.elapsed() < std::time::Duration::from_secs(5));
        let body = body(&result);
        assert_eq!(body["sent"], 1);
        assert_eq!(body["received"], 0);
    }

    #[tokio::test]
    async fn test_tail_event_log() {
        let host = fake_host();
        let result = server(&host)
            .call_tool(
                "tail_event_log",
                json!({ "log": "kernel", "max_entries": 5, "severity": "warning" }),
            )
            .await
            .unwrap();
        let entries = body(&result);
        let entries = entries.as_array().unwrap();
        assert_eq!(entries.len(), 5);
        assert_eq!(entries[0]["message"], "line one 28\nline two");
        assert_eq!(entries[0]["summary"], "line one 28 line two");
        assert!(entries.iter().all(|e| e["severity"] == "warning"));
    }

    #[tokio::test]
    async fn test_tail_unknown_log() {
        let host = fake_host();
        let err = mcp_error(
            server(&host)
                .call_tool("tail_event_log", json!({ "log": "security" }))
                .await
                .unwrap_err(),
        );
        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
    }
}
