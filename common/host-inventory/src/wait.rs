//! Cancellable, deadline-bounded wait for a service status

use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::backend::ServiceManager;
use crate::error::InventoryResult;
use crate::types::{ServiceInfo, ServiceStatus};

/// How a status wait ended
#[derive(Debug, Clone, PartialEq)]
pub enum WaitOutcome {
    /// The service reached the target status
    Reached(ServiceInfo),
    /// The deadline passed; carries the last observed state
    TimedOut(Option<ServiceInfo>),
    /// The caller stopped waiting; the OS action keeps running
    Cancelled(Option<ServiceInfo>),
}

/// Poll `name` until it reports `target`, the deadline passes or `cancel` fires
///
/// The first query happens immediately. Only query failures (for example the
/// service disappearing) are errors; running out of time is an outcome.
pub async fn wait_for_status(
    services: &dyn ServiceManager,
    name: &str,
    target: ServiceStatus,
    deadline: Instant,
    poll_interval: Duration,
    cancel: &CancellationToken,
) -> InventoryResult<WaitOutcome> {
    let mut last = None;

    loop {
        let info = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Ok(WaitOutcome::Cancelled(last)),
            _ = tokio::time::sleep_until(deadline) => return Ok(WaitOutcome::TimedOut(last)),
            result = services.query(name) => result?,
        };

        if info.status == target {
            return Ok(WaitOutcome::Reached(info));
        }
        tracing::trace!(service = name, status = ?info.status, target = ?target, "waiting for status");
        last = Some(info);

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Ok(WaitOutcome::Cancelled(last)),
            _ = tokio::time::sleep_until(deadline) => return Ok(WaitOutcome::TimedOut(last)),
            _ = tokio::time::sleep(poll_interval) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::fake::FakeServiceManager;
    use crate::error::ErrorKind;

    fn service(name: &str, status: ServiceStatus) -> ServiceInfo {
        ServiceInfo {
            display_name: name.to_uppercase(),
            name: name.to_string(),
            status,
            start_type: "enabled".into(),
        }
    }

    fn deadline(ms: u64) -> Instant {
        Instant::now() + Duration::from_millis(ms)
    }

    #[tokio::test]
    async fn test_already_at_target() {
        let services = FakeServiceManager::new(vec![service("web", ServiceStatus::Running)]);
        let outcome = wait_for_status(
            &services,
            "web",
            ServiceStatus::Running,
            deadline(1000),
            Duration::from_millis(10),
            &CancellationToken::new(),
        )
        .await
        .unwrap();
        assert!(matches!(outcome, WaitOutcome::Reached(info) if info.status == ServiceStatus::Running));
    }

    #[tokio::test]
    async fn test_reaches_target_after_transition() {
        let services = FakeServiceManager::new(vec![service("web", ServiceStatus::Stopped)]);
        services.start("web").await.unwrap();
        let outcome = wait_for_status(
            &services,
            "web",
            ServiceStatus::Running,
            deadline(2000),
            Duration::from_millis(5),
            &CancellationToken::new(),
        )
        .await
        .unwrap();
        assert!(matches!(outcome, WaitOutcome::Reached(_)));
    }

    #[tokio::test]
    async fn test_times_out_with_last_state() {
        let services = FakeServiceManager::new(vec![service("db", ServiceStatus::Stopped)]).stuck("db");
        services.start("db").await.unwrap();

        let start = std::time::Instant::now();
        let outcome = wait_for_status(
            &services,
            "db",
            ServiceStatus::Running,
            deadline(100),
            Duration::from_millis(10),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        assert!(start.elapsed() < Duration::from_secs(2));
        match outcome {
            WaitOutcome::TimedOut(Some(last)) => assert_eq!(last.status, ServiceStatus::Pending),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_cancel_returns_promptly() {
        let services = FakeServiceManager::new(vec![service("db", ServiceStatus::Stopped)]).stuck("db");
        services.start("db").await.unwrap();

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(30)).await;
            trigger.cancel();
        });

        let start = std::time::Instant::now();
        let outcome = wait_for_status(
            &services,
            "db",
            ServiceStatus::Running,
            deadline(10_000),
            Duration::from_millis(5),
            &cancel,
        )
        .await
        .unwrap();

        assert!(matches!(outcome, WaitOutcome::Cancelled(_)));
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_unknown_service_is_an_error() {
        let services = FakeServiceManager::new(vec![]);
        let err = wait_for_status(
            &services,
            "ghost",
            ServiceStatus::Running,
            deadline(1000),
            Duration::from_millis(5),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
