//! Configuration for the inventory facade
//!
//! Every field has a default, so an empty file (or no file at all) yields a
//! working configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Environment variable pointing at an explicit config file
pub const CONFIG_ENV: &str = "HOSTADMIN_CONFIG_PATH";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InventoryConfig {
    #[serde(default)]
    pub services: ServiceConfig,
    #[serde(default)]
    pub ping: PingConfig,
    #[serde(default)]
    pub event_log: EventLogConfig,
    #[serde(default)]
    pub processes: ProcessConfig,
    #[serde(default)]
    pub network: NetworkConfig,
}

// ============================================================================
// Sections
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Path to systemctl
    #[serde(default = "default_systemctl")]
    pub systemctl: String,
    /// Status wait used when the caller gives none
    #[serde(default = "default_service_timeout")]
    pub default_timeout_secs: u64,
    /// Hard cap on any status wait
    #[serde(default = "default_service_max_timeout")]
    pub max_timeout_secs: u64,
    /// Delay between status polls while waiting
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
    /// Timeout for a single systemctl invocation
    #[serde(default = "default_command_timeout")]
    pub command_timeout_secs: u64,
}

fn default_systemctl() -> String {
    "systemctl".to_string()
}

fn default_service_timeout() -> u64 {
    10
}

fn default_service_max_timeout() -> u64 {
    120
}

fn default_poll_interval() -> u64 {
    250
}

fn default_command_timeout() -> u64 {
    15
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            systemctl: default_systemctl(),
            default_timeout_secs: default_service_timeout(),
            max_timeout_secs: default_service_max_timeout(),
            poll_interval_ms: default_poll_interval(),
            command_timeout_secs: default_command_timeout(),
        }
    }
}

impl ServiceConfig {
    /// Resolve a caller-supplied timeout against the default and the cap
    pub fn effective_timeout(&self, requested: Option<Duration>) -> Duration {
        let max = Duration::from_secs(self.max_timeout_secs);
        requested
            .unwrap_or(Duration::from_secs(self.default_timeout_secs))
            .min(max)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PingConfig {
    /// Path to the ping binary
    #[serde(default = "default_ping_binary")]
    pub binary: String,
    #[serde(default = "default_ping_timeout")]
    pub default_timeout_ms: u64,
    #[serde(default = "default_ping_count")]
    pub default_count: u32,
    #[serde(default = "default_ping_max_count")]
    pub max_count: u32,
    /// Hard cap on the per-probe timeout
    #[serde(default = "default_ping_max_timeout")]
    pub max_timeout_ms: u64,
    /// Pause between probes
    #[serde(default)]
    pub interval_ms: u64,
}

fn default_ping_binary() -> String {
    "ping".to_string()
}

fn default_ping_timeout() -> u64 {
    1000
}

fn default_ping_count() -> u32 {
    4
}

fn default_ping_max_count() -> u32 {
    20
}

fn default_ping_max_timeout() -> u64 {
    10_000
}

impl Default for PingConfig {
    fn default() -> Self {
        Self {
            binary: default_ping_binary(),
            default_timeout_ms: default_ping_timeout(),
            default_count: default_ping_count(),
            max_count: default_ping_max_count(),
            max_timeout_ms: default_ping_max_timeout(),
            interval_ms: 0,
        }
    }
}

impl PingConfig {
    /// Per-probe timeout for a caller-supplied value, capped
    pub fn effective_timeout(&self, requested_ms: Option<u64>) -> Duration {
        Duration::from_millis(
            requested_ms
                .unwrap_or(self.default_timeout_ms)
                .min(self.max_timeout_ms),
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLogConfig {
    /// Path to journalctl
    #[serde(default = "default_journalctl")]
    pub journalctl: String,
    #[serde(default = "default_max_entries")]
    pub default_max_entries: usize,
    /// Hard cap on entries returned by one query
    #[serde(default = "default_max_entries_cap")]
    pub max_entries_cap: usize,
    /// Length of the single-line message summary
    #[serde(default = "default_summary_chars")]
    pub summary_chars: usize,
    #[serde(default = "default_command_timeout")]
    pub command_timeout_secs: u64,
}

fn default_journalctl() -> String {
    "journalctl".to_string()
}

fn default_max_entries() -> usize {
    20
}

fn default_max_entries_cap() -> usize {
    500
}

fn default_summary_chars() -> usize {
    200
}

impl Default for EventLogConfig {
    fn default() -> Self {
        Self {
            journalctl: default_journalctl(),
            default_max_entries: default_max_entries(),
            max_entries_cap: default_max_entries_cap(),
            summary_chars: default_summary_chars(),
            command_timeout_secs: default_command_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessConfig {
    /// Default `n` for the top memory consumers view
    #[serde(default = "default_top")]
    pub top_default: usize,
    /// How long to wait for a killed process to disappear
    #[serde(default = "default_settle")]
    pub terminate_settle_ms: u64,
}

fn default_top() -> usize {
    10
}

fn default_settle() -> u64 {
    500
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            top_default: default_top(),
            terminate_settle_ms: default_settle(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Root of the per-interface sysfs tree
    #[serde(default = "default_sysfs_root")]
    pub sysfs_root: PathBuf,
}

fn default_sysfs_root() -> PathBuf {
    PathBuf::from("/sys/class/net")
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            sysfs_root: default_sysfs_root(),
        }
    }
}

// ============================================================================
// Loading
// ============================================================================

impl InventoryConfig {
    /// Parse a TOML config file
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))
    }

    /// Load config from the first location that parses
    ///
    /// Searched in order:
    /// 1. `HOSTADMIN_CONFIG_PATH` env var
    /// 2. `explicit` (e.g. a `--config` flag)
    /// 3. `./hostadmin.toml`
    /// 4. `$XDG_CONFIG_HOME/hostadmin/config.toml`
    /// 5. `~/.hostadmin.toml`
    /// 6. Default config if none found
    pub fn load(explicit: Option<&Path>) -> Self {
        for path in Self::candidate_paths(explicit) {
            if !path.exists() {
                continue;
            }
            match Self::from_file(&path) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    return config;
                }
                Err(e) => {
                    tracing::warn!("{:#}", e);
                }
            }
        }

        tracing::info!("Using default configuration");
        Self::default()
    }

    fn candidate_paths(explicit: Option<&Path>) -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if let Ok(env_path) = std::env::var(CONFIG_ENV) {
            let path = PathBuf::from(&env_path);
            if !path.exists() {
                tracing::warn!("{}={} does not exist", CONFIG_ENV, env_path);
            }
            paths.push(path);
        }

        if let Some(path) = explicit {
            paths.push(path.to_path_buf());
        }

        paths.push(PathBuf::from("hostadmin.toml"));

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("hostadmin").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".hostadmin.toml"));
        }

        paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: InventoryConfig = toml::from_str("").unwrap();
        assert_eq!(config.services.default_timeout_secs, 10);
        assert_eq!(config.ping.default_count, 4);
        assert_eq!(config.event_log.max_entries_cap, 500);
        assert_eq!(config.processes.top_default, 10);
        assert_eq!(config.network.sysfs_root, PathBuf::from("/sys/class/net"));
    }

    #[test]
    fn test_partial_section_override() {
        let config: InventoryConfig = toml::from_str(
            r#"
            [services]
            poll_interval_ms = 50

            [ping]
            interval_ms = 500
            "#,
        )
        .unwrap();
        assert_eq!(config.services.poll_interval_ms, 50);
        assert_eq!(config.services.systemctl, "systemctl");
        assert_eq!(config.ping.interval_ms, 500);
        assert_eq!(config.ping.binary, "ping");
    }

    #[test]
    fn test_ping_timeout_is_capped() {
        let ping = PingConfig::default();
        assert_eq!(ping.effective_timeout(None), Duration::from_millis(1000));
        assert_eq!(ping.effective_timeout(Some(250)), Duration::from_millis(250));
        assert_eq!(ping.effective_timeout(Some(u64::MAX)), Duration::from_secs(10));
    }

    #[test]
    fn test_effective_timeout_is_capped() {
        let services = ServiceConfig::default();
        assert_eq!(services.effective_timeout(None), Duration::from_secs(10));
        assert_eq!(
            services.effective_timeout(Some(Duration::from_secs(3))),
            Duration::from_secs(3)
        );
        assert_eq!(
            services.effective_timeout(Some(Duration::from_secs(3600))),
            Duration::from_secs(120)
        );
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[event_log]\ndefault_max_entries = 50").unwrap();
        let config = InventoryConfig::from_file(file.path()).unwrap();
        assert_eq!(config.event_log.default_max_entries, 50);
    }

    #[test]
    fn test_from_file_reports_parse_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[ping]\ndefault_count = \"four\"").unwrap();
        let err = InventoryConfig::from_file(file.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse config"));
    }
}
