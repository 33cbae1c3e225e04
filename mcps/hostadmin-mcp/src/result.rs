//! Tool response and error helpers

use host_inventory::{ErrorKind, InventoryError};
use rmcp::{
    model::{CallToolResult, Content},
    ErrorData as McpError,
};
use serde::Serialize;

/// Pretty-printed JSON text content
pub fn json_success<T: Serialize>(data: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(data)
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

pub fn invalid_params(message: impl Into<String>) -> McpError {
    McpError::invalid_params(message.into(), None)
}

/// Map a facade error onto the protocol
///
/// Unknown targets are the caller's mistake, refusals carry the elevation
/// hint, and everything else is a server-side failure.
pub fn inventory_error_to_mcp(err: InventoryError) -> McpError {
    let data = serde_json::json!({ "kind": err.kind(), "hint": err.hint() });
    match err.kind() {
        ErrorKind::NotFound => McpError::invalid_params(err.to_string(), Some(data)),
        ErrorKind::AccessDenied => McpError::invalid_request(err.to_string(), Some(data)),
        _ => McpError::internal_error(err.to_string(), Some(data)),
    }
}

/// Refuse a destructive tool call unless the caller confirmed it
pub fn require_confirm(confirm: Option<bool>, action: &str) -> Result<(), McpError> {
    if confirm == Some(true) {
        Ok(())
    } else {
        Err(invalid_params(format!(
            "{} is destructive; call again with \"confirm\": true",
            action
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use host_inventory::ELEVATION_HINT;
    use rmcp::model::ErrorCode;

    #[test]
    fn test_json_success() {
        let result = json_success(&serde_json::json!({ "value": 42 })).unwrap();
        assert!(!result.is_error.unwrap_or(false));
        assert_eq!(result.content.len(), 1);
    }

    #[test]
    fn test_not_found_maps_to_invalid_params() {
        let err = inventory_error_to_mcp(InventoryError::not_found("service", "ghost"));
        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
        assert!(err.message.contains("ghost"));
    }

    #[test]
    fn test_access_denied_carries_hint() {
        let err = inventory_error_to_mcp(InventoryError::access_denied("stop service sshd"));
        assert_eq!(err.code, ErrorCode::INVALID_REQUEST);
        assert!(err.message.contains(ELEVATION_HINT));
        let data = err.data.unwrap();
        assert_eq!(data["kind"], "access_denied");
        assert_eq!(data["hint"], ELEVATION_HINT);
    }

    #[test]
    fn test_timeout_maps_to_internal_error() {
        let err = inventory_error_to_mcp(InventoryError::Timeout {
            what: "service web".into(),
            secs: 1.0,
        });
        assert_eq!(err.code, ErrorCode::INTERNAL_ERROR);
    }

    #[test]
    fn test_require_confirm() {
        assert!(require_confirm(Some(true), "terminate_process").is_ok());
        assert!(require_confirm(Some(false), "terminate_process").is_err());
        let err = require_confirm(None, "control_service").unwrap_err();
        assert!(err.message.contains("confirm"));
    }
}
