//! ICMP echo results

use serde::{Deserialize, Serialize};

/// Outcome of a single echo probe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PingResult {
    pub success: bool,
    /// Round trip in milliseconds; 0 when the probe failed
    pub roundtrip_ms: u64,
    pub ttl: Option<u32>,
    /// Address that answered
    pub reply_from: Option<String>,
    /// Why the probe failed
    pub error: Option<String>,
}

impl PingResult {
    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            success: false,
            roundtrip_ms: 0,
            ttl: None,
            reply_from: None,
            error: Some(reason.into()),
        }
    }
}
