//! ICMP echo through the system `ping` binary
//!
//! Each probe is one `ping -c 1` invocation so a lost reply never delays the
//! next probe beyond its own timeout.

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;

use super::command::{output_text, run};
use super::Pinger;
use crate::config::PingConfig;
use crate::types::PingResult;

static TTL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)ttl=(\d+)").expect("Invalid regex"));
static TIME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"time[=<]([\d.]+)\s*ms").expect("Invalid regex"));
// The address may itself end in "::"; only the one colon before the space is punctuation
static FROM_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"from ([\w:.%-]+?):?(?:\s|$)").expect("Invalid regex"));

/// Native pinger
pub struct PingCommand {
    binary: String,
}

impl PingCommand {
    pub fn new(config: &PingConfig) -> Self {
        Self {
            binary: config.binary.clone(),
        }
    }
}

#[async_trait]
impl Pinger for PingCommand {
    async fn probe(&self, host: &str, timeout: Duration) -> PingResult {
        if host.is_empty() || host.starts_with('-') || host.chars().any(char::is_whitespace) {
            return PingResult::failed(format!("invalid host: {:?}", host));
        }

        // ping's own deadline is whole seconds; the outer timeout is exact
        let wait_secs = timeout.as_secs_f64().ceil().max(1.0) as u64;
        let wait = wait_secs.to_string();
        let args = ["-n", "-c", "1", "-W", wait.as_str(), host];

        match run(&self.binary, &args, timeout).await {
            Ok(output) => {
                let (stdout, stderr) = output_text(&output);
                if output.status.success() {
                    parse_reply(&stdout)
                        .unwrap_or_else(|| PingResult::failed("unrecognised ping output"))
                } else if !stderr.trim().is_empty() {
                    PingResult::failed(stderr.trim())
                } else {
                    PingResult::failed("Request timed out")
                }
            }
            Err(e) => PingResult::failed(e.to_string()),
        }
    }
}

/// Extract one echo reply from ping's output
fn parse_reply(stdout: &str) -> Option<PingResult> {
    let line = stdout.lines().find(|l| TIME_REGEX.is_match(l))?;

    let time_ms: f64 = TIME_REGEX.captures(line)?.get(1)?.as_str().parse().ok()?;
    let ttl = TTL_REGEX
        .captures(line)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok());
    let reply_from = FROM_REGEX
        .captures(line)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string());

    Some(PingResult {
        success: true,
        roundtrip_ms: time_ms.round() as u64,
        ttl,
        reply_from,
        error: None,
    })
}
