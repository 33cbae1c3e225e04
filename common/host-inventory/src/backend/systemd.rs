//! Service manager backed by systemd's `systemctl`
//!
//! Services are keyed by their unit stem (`ssh` for `ssh.service`). Start and
//! stop requests are queued with `--no-block`; the facade observes the
//! transition through [`ServiceManager::query`].

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;

use super::command::{output_text, run};
use super::ServiceManager;
use crate::config::ServiceConfig;
use crate::error::{InventoryError, InventoryResult};
use crate::types::{ServiceInfo, ServiceStatus};

const SHOW_PROPERTIES: &str =
    "--property=Id,Description,LoadState,ActiveState,SubState,UnitFileState,FreezerState";

/// Native service manager
pub struct SystemctlServices {
    systemctl: String,
    timeout: Duration,
}

impl SystemctlServices {
    pub fn new(config: &ServiceConfig) -> Self {
        Self {
            systemctl: config.systemctl.clone(),
            timeout: config.command_timeout(),
        }
    }

    async fn systemctl(&self, args: &[&str]) -> InventoryResult<(bool, String, String)> {
        let output = run(&self.systemctl, args, self.timeout).await?;
        let (stdout, stderr) = output_text(&output);
        Ok((output.status.success(), stdout, stderr))
    }

    async fn control(&self, verb: &str, name: &str) -> InventoryResult<()> {
        let unit = unit_name(name)?;
        let (ok, _, stderr) = self
            .systemctl(&[verb, "--no-block", "--no-ask-password", &unit])
            .await?;
        if ok {
            tracing::debug!(unit = %unit, verb, "systemctl request queued");
            return Ok(());
        }
        Err(classify_failure(&format!("{} service {}", verb, name), name, &stderr))
    }
}

#[async_trait]
impl ServiceManager for SystemctlServices {
    async fn list(&self) -> InventoryResult<Vec<InventoryResult<ServiceInfo>>> {
        let (ok, units, stderr) = self
            .systemctl(&[
                "list-units",
                "--type=service",
                "--all",
                "--no-legend",
                "--no-pager",
                "--plain",
            ])
            .await?;
        if !ok {
            return Err(classify_failure("list services", "", &stderr));
        }

        // Start types are best effort; a failure here only blanks the column
        let start_types = match self
            .systemctl(&["list-unit-files", "--type=service", "--no-legend", "--no-pager"])
            .await
        {
            Ok((true, files, _)) => parse_unit_files(&files),
            Ok((false, _, stderr)) => {
                tracing::warn!("list-unit-files failed: {}", stderr.trim());
                HashMap::new()
            }
            Err(e) => {
                tracing::warn!("list-unit-files failed: {}", e);
                HashMap::new()
            }
        };

        Ok(parse_list_units(&units, &start_types))
    }

    async fn query(&self, name: &str) -> InventoryResult<ServiceInfo> {
        let unit = unit_name(name)?;
        let (ok, stdout, stderr) = self
            .systemctl(&["show", &unit, SHOW_PROPERTIES, "--no-pager"])
            .await?;
        if !ok {
            return Err(classify_failure(&format!("query service {}", name), name, &stderr));
        }
        parse_show(name, &stdout)
    }

    async fn start(&self, name: &str) -> InventoryResult<()> {
        self.control("start", name).await
    }

    async fn stop(&self, name: &str) -> InventoryResult<()> {
        self.control("stop", name).await
    }
}

// ============================================================================
// Parsing
// ============================================================================

/// Full unit name for a service key, rejecting anything that could be an option
fn unit_name(name: &str) -> InventoryResult<String> {
    let valid = !name.is_empty()
        && !name.starts_with('-')
        && !name.chars().any(|c| c.is_whitespace() || c == '/');
    if !valid {
        return Err(InventoryError::not_found("service", name));
    }
    if name.ends_with(".service") {
        Ok(name.to_string())
    } else {
        Ok(format!("{}.service", name))
    }
}

fn service_key(unit: &str) -> &str {
    unit.strip_suffix(".service").unwrap_or(unit)
}

fn map_status(active: &str, freezer: Option<&str>) -> ServiceStatus {
    if freezer == Some("frozen") {
        return ServiceStatus::Paused;
    }
    match active {
        "active" => ServiceStatus::Running,
        "inactive" | "failed" => ServiceStatus::Stopped,
        _ => ServiceStatus::Pending,
    }
}

/// Parse `systemctl list-unit-files --no-legend` into unit -> state
fn parse_unit_files(output: &str) -> HashMap<String, String> {
    output
        .lines()
        .filter_map(|line| {
            let mut cols = line.split_whitespace();
            let unit = cols.next()?;
            let state = cols.next()?;
            Some((unit.to_string(), state.to_string()))
        })
        .collect()
}

/// Parse `systemctl list-units --plain --no-legend`
///
/// Units systemd knows only by reference (LOAD = not-found) are reported as
/// per-item `NotFound` so the listing can count them as skipped.
fn parse_list_units(
    output: &str,
    start_types: &HashMap<String, String>,
) -> Vec<InventoryResult<ServiceInfo>> {
    output
        .lines()
        .filter_map(|line| {
            let line = line.trim_start_matches(['●', '*', ' ']);
            let mut cols = line.split_whitespace();
            let unit = cols.next()?;
            let load = cols.next()?;
            let active = cols.next()?;
            let _sub = cols.next()?;
            let description = cols.collect::<Vec<_>>().join(" ");

            if load != "loaded" {
                return Some(Err(InventoryError::not_found("service", service_key(unit))));
            }

            Some(Ok(ServiceInfo {
                display_name: if description.is_empty() {
                    service_key(unit).to_string()
                } else {
                    description
                },
                name: service_key(unit).to_string(),
                status: map_status(active, None),
                start_type: start_types.get(unit).cloned().unwrap_or_default(),
            }))
        })
        .collect()
}

/// Parse `systemctl show --property=...` key=value output
fn parse_show(name: &str, output: &str) -> InventoryResult<ServiceInfo> {
    let props: HashMap<&str, &str> = output
        .lines()
        .filter_map(|line| line.split_once('='))
        .collect();

    match props.get("LoadState").copied() {
        Some("loaded") => {}
        Some("not-found") | None => return Err(InventoryError::not_found("service", name)),
        Some(other) => {
            return Err(InventoryError::Unknown(format!(
                "service {} is {}",
                name, other
            )))
        }
    }

    let unit = props.get("Id").copied().unwrap_or(name);
    let description = props.get("Description").copied().unwrap_or_default();
    let active = props.get("ActiveState").copied().unwrap_or_default();

    Ok(ServiceInfo {
        display_name: if description.is_empty() {
            service_key(unit).to_string()
        } else {
            description.to_string()
        },
        name: service_key(unit).to_string(),
        status: map_status(active, props.get("FreezerState").copied()),
        start_type: props
            .get("UnitFileState")
            .copied()
            .unwrap_or_default()
            .to_string(),
    })
}

/// Turn systemctl's stderr into an error kind
fn classify_failure(action: &str, name: &str, stderr: &str) -> InventoryError {
    let lower = stderr.to_lowercase();
    if lower.contains("access denied")
        || lower.contains("authentication required")
        || lower.contains("permission denied")
        || lower.contains("not authorized")
    {
        InventoryError::access_denied(action)
    } else if lower.contains("not found") || lower.contains("not loaded") || lower.contains("does not exist") {
        InventoryError::not_found("service", name)
    } else {
        InventoryError::Unknown(format!("{}: {}", action, stderr.trim()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const LIST_UNITS: &str = "\
ssh.service                 loaded    active   running OpenBSD Secure Shell server
cron.service                loaded    inactive dead    Regular background program processing daemon
● nfs-server.service        not-found inactive dead    nfs-server.service
postgresql.service          loaded    activating start PostgreSQL RDBMS
bare.service                loaded    failed   failed
";

    const UNIT_FILES: &str = "\
ssh.service         enabled  enabled
cron.service        disabled enabled
postgresql.service  static   -
";

    #[test]
    fn test_parse_list_units() {
        let start_types = parse_unit_files(UNIT_FILES);
        let parsed = parse_list_units(LIST_UNITS, &start_types);
        assert_eq!(parsed.len(), 5);

        let ok: Vec<&ServiceInfo> = parsed.iter().filter_map(|r| r.as_ref().ok()).collect();
        assert_eq!(ok.len(), 4);

        assert_eq!(ok[0].name, "ssh");
        assert_eq!(ok[0].display_name, "OpenBSD Secure Shell server");
        assert_eq!(ok[0].status, ServiceStatus::Running);
        assert_eq!(ok[0].start_type, "enabled");

        assert_eq!(ok[1].status, ServiceStatus::Stopped);
        assert_eq!(ok[1].start_type, "disabled");

        assert_eq!(ok[2].status, ServiceStatus::Pending);
        assert_eq!(ok[2].start_type, "static");

        // no description falls back to the key, failed counts as stopped
        assert_eq!(ok[3].display_name, "bare");
        assert_eq!(ok[3].status, ServiceStatus::Stopped);
        assert_eq!(ok[3].start_type, "");

        assert!(matches!(
            parsed[2].as_ref().unwrap_err().kind(),
            ErrorKind::NotFound
        ));
    }

    #[test]
    fn test_parse_show() {
        let out = "Id=ssh.service\nDescription=OpenBSD Secure Shell server\nLoadState=loaded\n\
                   ActiveState=active\nSubState=running\nUnitFileState=enabled\nFreezerState=running\n";
        let info = parse_show("ssh", out).unwrap();
        assert_eq!(info.name, "ssh");
        assert_eq!(info.status, ServiceStatus::Running);
        assert_eq!(info.start_type, "enabled");
    }

    #[test]
    fn test_parse_show_frozen_is_paused() {
        let out = "Id=batch.service\nLoadState=loaded\nActiveState=active\nFreezerState=frozen\n";
        assert_eq!(parse_show("batch", out).unwrap().status, ServiceStatus::Paused);
    }

    #[test]
    fn test_parse_show_not_found() {
        let out = "Id=NoSuchService.service\nLoadState=not-found\nActiveState=inactive\n";
        let err = parse_show("NoSuchService", out).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_unit_name() {
        assert_eq!(unit_name("ssh").unwrap(), "ssh.service");
        assert_eq!(unit_name("ssh.service").unwrap(), "ssh.service");
        assert!(unit_name("--all").is_err());
        assert!(unit_name("a b").is_err());
        assert!(unit_name("").is_err());
    }

    #[test]
    fn test_classify_failure() {
        let denied = classify_failure(
            "stop service ssh",
            "ssh",
            "Failed to stop ssh.service: Access denied",
        );
        assert_eq!(denied.kind(), ErrorKind::AccessDenied);

        let auth = classify_failure(
            "start service ssh",
            "ssh",
            "Failed to start ssh.service: Interactive authentication required.",
        );
        assert_eq!(auth.kind(), ErrorKind::AccessDenied);

        let missing = classify_failure(
            "start service nope",
            "nope",
            "Failed to start nope.service: Unit nope.service not found.",
        );
        assert_eq!(missing.kind(), ErrorKind::NotFound);

        let other = classify_failure("start service x", "x", "Job failed");
        assert_eq!(other.kind(), ErrorKind::Unknown);
    }
}
