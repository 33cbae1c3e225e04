//! Host Admin MCP Library
//!
//! MCP tool server over the [`host_inventory`] facade. Every tool is a thin
//! call into the facade with JSON output; destructive tools
//! (`terminate_process`, `control_service`) require `"confirm": true`.
//!
//! # Usage as Library
//!
//! ```rust,ignore
//! use hostadmin_mcp::HostAdminMcpServer;
//!
//! let server = HostAdminMcpServer::new();
//! let result = server
//!     .call_tool("top_memory_consumers", serde_json::json!({ "limit": 5 }))
//!     .await?;
//! ```

pub mod handlers;
pub mod init;
pub mod params;
pub mod result;
pub mod server;

// Re-export main server type
pub use server::{DispatchError, DispatchResult, HostAdminMcpServer};

// Re-export parameter types for direct API usage
pub use params::*;
