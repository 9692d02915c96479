//! Long-poll a remote operation until it reaches a terminal status.
//!
//! Domain registration, CI runs and infrastructure applies all finish
//! minutes after the request that started them. They share this one helper:
//! the caller supplies how to fetch the current status and how to classify
//! it, the helper supplies the waiting.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use tokio::time::{Instant, sleep};
use tracing::{debug, instrument};

use crate::domain::TaskError;

/// How often to check and how long to keep checking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    /// `None` polls until a terminal status arrives, however long that takes.
    pub timeout: Option<Duration>,
}

impl PollPolicy {
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(30);
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3600);

    pub fn new(interval: Duration, timeout: Option<Duration>) -> Self {
        Self { interval, timeout }
    }

    /// Build from configuration seconds; a timeout of `0` means unbounded.
    pub fn from_secs(interval_secs: u64, timeout_secs: u64) -> Self {
        Self {
            interval: Duration::from_secs(interval_secs),
            timeout: (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs)),
        }
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_INTERVAL, Some(Self::DEFAULT_TIMEOUT))
    }
}

/// Classification of a fetched status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollStatus {
    Pending,
    Succeeded,
    Failed,
}

/// Fetch a status until `classify` calls it terminal.
///
/// Returns the succeeding status. A failing status becomes
/// [`TaskError::PollFailed`] immediately, a fetch error aborts with that
/// error, and a pending status past the policy's timeout becomes
/// [`TaskError::PollTimeout`].
#[instrument(skip_all, fields(operation = %operation))]
pub async fn poll_until_terminal<S, F, Fut, C>(
    operation: &str,
    policy: &PollPolicy,
    mut fetch: F,
    classify: C,
) -> Result<S, TaskError>
where
    S: fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<S, TaskError>>,
    C: Fn(&S) -> PollStatus,
{
    let started = Instant::now();
    let mut checks = 0u32;

    loop {
        let status = fetch().await?;
        checks += 1;

        match classify(&status) {
            PollStatus::Succeeded => {
                debug!(%status, checks, "Operation succeeded");
                return Ok(status);
            }
            PollStatus::Failed => {
                return Err(TaskError::PollFailed {
                    operation: operation.to_string(),
                    status: status.to_string(),
                });
            }
            PollStatus::Pending => {
                let elapsed = started.elapsed();
                if policy.timeout.is_some_and(|limit| elapsed >= limit) {
                    return Err(TaskError::PollTimeout {
                        operation: operation.to_string(),
                        last_status: status.to_string(),
                        elapsed_secs: elapsed.as_secs(),
                    });
                }
                debug!(%status, checks, "Still pending");
                sleep(policy.interval).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;

    fn classify(status: &String) -> PollStatus {
        match status.as_str() {
            "done" => PollStatus::Succeeded,
            "broken" => PollStatus::Failed,
            _ => PollStatus::Pending,
        }
    }

    fn unbounded() -> PollPolicy {
        PollPolicy::new(Duration::from_secs(30), None)
    }

    #[tokio::test(start_paused = true)]
    async fn n_pending_then_success_checks_n_plus_one_times() {
        let n = 4;
        let mut statuses: VecDeque<String> = std::iter::repeat_n("running".to_string(), n)
            .chain(std::iter::once("done".to_string()))
            .collect();
        let mut checks = 0;

        let result = poll_until_terminal(
            "test op",
            &unbounded(),
            || {
                checks += 1;
                let next = statuses.pop_front();
                async move { next.ok_or_else(|| TaskError::validation("exhausted")) }
            },
            classify,
        )
        .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(checks, n + 1);
    }

    #[tokio::test(start_paused = true)]
    async fn failure_status_stops_without_further_checks() {
        let mut statuses: VecDeque<String> =
            ["running", "broken", "done"].map(String::from).into();
        let mut checks = 0;

        let err = poll_until_terminal(
            "deploy",
            &unbounded(),
            || {
                checks += 1;
                let next = statuses.pop_front();
                async move { next.ok_or_else(|| TaskError::validation("exhausted")) }
            },
            classify,
        )
        .await
        .unwrap_err();

        assert_eq!(checks, 2);
        assert_eq!(
            err,
            TaskError::PollFailed {
                operation: "deploy".into(),
                status: "broken".into(),
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_error_aborts_polling() {
        let mut checks = 0;
        let err = poll_until_terminal(
            "lookup",
            &unbounded(),
            || {
                checks += 1;
                async { Err::<String, _>(TaskError::http("Registrar", "503")) }
            },
            classify,
        )
        .await
        .unwrap_err();

        assert_eq!(checks, 1);
        assert!(matches!(err, TaskError::Http { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn pending_past_the_bound_times_out() {
        let policy = PollPolicy::new(Duration::from_secs(30), Some(Duration::from_secs(90)));
        let mut checks = 0;

        let err = poll_until_terminal(
            "ci run",
            &policy,
            || {
                checks += 1;
                async { Ok::<_, TaskError>("queued".to_string()) }
            },
            classify,
        )
        .await
        .unwrap_err();

        // checks at 0s, 30s, 60s and 90s
        assert_eq!(checks, 4);
        assert_eq!(
            err,
            TaskError::PollTimeout {
                operation: "ci run".into(),
                last_status: "queued".into(),
                elapsed_secs: 90,
            }
        );
    }

    #[test]
    fn zero_timeout_means_unbounded() {
        assert_eq!(PollPolicy::from_secs(5, 0).timeout, None);
        assert_eq!(
            PollPolicy::from_secs(5, 60).timeout,
            Some(Duration::from_secs(60))
        );
    }
}
