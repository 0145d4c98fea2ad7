//! Wait - Poll a remote object until its lifecycle reaches a terminal state
//!
//! Provisioning on the platform is asynchronous and variable-latency: a
//! dedicated cluster takes tens of minutes, an API key seconds. Every
//! mutating operation follows the same shape — issue the request, then poll
//! the object's status until its phase becomes terminal. This module
//! implements that loop once; resource modules supply their phase vocabulary
//! and poll policy.

use std::cmp;
use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;

/// Synthetic phase reported when a deprovision wait observes that the object
/// is no longer visible through the API.
pub const PHASE_GONE: &str = "GONE";

/// Classification of a lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseClass {
    /// Terminal: the operation completed
    Success,
    /// Terminal: the operation failed
    Failure,
    /// Work in progress; keep polling
    Transient,
    /// Not present in the table; treated as a failure rather than polled
    /// forever, so API evolution surfaces as an error instead of a hang
    Unknown,
}

/// Mapping from phase strings to their classification
///
/// Each resource family declares its own vocabulary
/// (PROVISIONING/PROVISIONED, IN_PROGRESS/DONE, DEPROVISIONING/INACTIVE, ...)
/// as a table. Phases not in the table classify as [`PhaseClass::Unknown`].
#[derive(Debug, Clone, Default)]
pub struct PhaseTable {
    classes: HashMap<String, PhaseClass>,
}

impl PhaseTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn success(mut self, phase: &str) -> Self {
        self.classes.insert(phase.to_string(), PhaseClass::Success);
        self
    }

    pub fn failure(mut self, phase: &str) -> Self {
        self.classes.insert(phase.to_string(), PhaseClass::Failure);
        self
    }

    pub fn transient(mut self, phase: &str) -> Self {
        self.classes.insert(phase.to_string(), PhaseClass::Transient);
        self
    }

    pub fn classify(&self, phase: &str) -> PhaseClass {
        self.classes
            .get(phase)
            .copied()
            .unwrap_or(PhaseClass::Unknown)
    }
}

/// One observation of a remote object's lifecycle status
#[derive(Debug, Clone, PartialEq)]
pub struct StatusReport {
    pub phase: String,
    /// Error message the API attached to the status, if any
    pub detail: Option<String>,
}

impl StatusReport {
    pub fn new(phase: impl Into<String>) -> Self {
        Self {
            phase: phase.into(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Failure of a single status probe
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProbeError {
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("transport error: {message}")]
    Transport { message: String, retryable: bool },
}

impl ProbeError {
    /// True when the response says the object is not visible.
    ///
    /// The platform returns 403 instead of 404 for missing objects behind
    /// some IAM-scoped endpoints, so both count as "gone" here.
    pub fn is_gone(&self) -> bool {
        matches!(self, Self::Http { status: 404 | 403, .. })
    }

    /// True for infrastructure noise worth polling through: throttling,
    /// server errors, and transport failures flagged retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http { status, .. } => *status == 429 || (500..=599).contains(status),
            Self::Transport { retryable, .. } => *retryable,
        }
    }
}

/// Whether the wait follows a creating/updating or a deleting operation
///
/// The distinction matters for not-found responses: during a deprovision
/// wait they confirm the object is gone; during a provision wait they are
/// eventual-consistency lag for a bounded grace window and an error after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitMode {
    Provision,
    Deprovision,
}

/// How often and for how long to poll
#[derive(Debug, Clone)]
pub struct PollPolicy {
    /// Time between polls
    pub interval: Duration,
    /// Total time budget; expiry yields [`WaitOutcome::TimedOut`]
    pub timeout: Duration,
    /// How long a not-found response after creation is tolerated as
    /// eventual-consistency lag before it becomes a failure
    pub not_found_grace: Duration,
    /// Multiplier applied to the interval after each poll; 1.0 keeps the
    /// interval fixed
    pub backoff_factor: f64,
    /// Upper bound on the interval when backoff is enabled
    pub max_interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            timeout: Duration::from_secs(15 * 60),
            not_found_grace: Duration::from_secs(60),
            backoff_factor: 1.0,
            max_interval: Duration::from_secs(60),
        }
    }
}

impl PollPolicy {
    /// Fixed-interval polling with the given total budget
    pub fn fixed(interval: Duration, timeout: Duration) -> Self {
        Self {
            interval,
            timeout,
            ..Self::default()
        }
    }

    /// Grow the interval by `factor` after each poll, capped at `max_interval`
    pub fn with_backoff(mut self, factor: f64, max_interval: Duration) -> Self {
        self.backoff_factor = factor.max(1.0);
        self.max_interval = max_interval;
        self
    }

    pub fn with_not_found_grace(mut self, grace: Duration) -> Self {
        self.not_found_grace = grace;
        self
    }
}

/// Result of a wait
#[derive(Debug, Clone, PartialEq)]
pub enum WaitOutcome {
    /// A terminal-success phase was observed (or, for deprovision waits, the
    /// object disappeared — reported as [`PHASE_GONE`])
    Success { phase: String },
    /// A terminal-failure or unknown phase was observed, or the probe failed
    /// with a non-retryable error
    Failure {
        phase: Option<String>,
        detail: String,
    },
    /// The deadline elapsed while the object was still in a transient phase
    TimedOut {
        last_phase: Option<String>,
        waited: Duration,
    },
    /// The caller's cancellation token fired
    Cancelled,
}

impl WaitOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Polls a remote object's status until it reaches a terminal state
///
/// A waiter is built fresh for each operation and consumed by [`Waiter::wait`].
/// It owns no client: the caller supplies a probe closure that performs one
/// status read, which keeps the waiter decoupled from any API client type.
pub struct Waiter {
    kind: String,
    target: String,
    scope: Option<String>,
    table: PhaseTable,
    policy: PollPolicy,
    mode: WaitMode,
    cancel: Option<CancellationToken>,
}

impl Waiter {
    /// Wait for a created or updated object to finish provisioning
    pub fn provision(kind: impl Into<String>, target: impl Into<String>, table: PhaseTable) -> Self {
        Self::new(kind, target, table, WaitMode::Provision)
    }

    /// Wait for a deleted object to finish deprovisioning
    pub fn deprovision(
        kind: impl Into<String>,
        target: impl Into<String>,
        table: PhaseTable,
    ) -> Self {
        Self::new(kind, target, table, WaitMode::Deprovision)
    }

    fn new(
        kind: impl Into<String>,
        target: impl Into<String>,
        table: PhaseTable,
        mode: WaitMode,
    ) -> Self {
        Self {
            kind: kind.into(),
            target: target.into(),
            scope: None,
            table,
            policy: PollPolicy::default(),
            mode,
            cancel: None,
        }
    }

    pub fn with_policy(mut self, policy: PollPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Parent scope, used only in log and error messages
    pub fn in_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    fn describe(&self) -> String {
        match &self.scope {
            Some(scope) => format!("{} {} in {}", self.kind, self.target, scope),
            None => format!("{} {}", self.kind, self.target),
        }
    }

    /// Run the poll loop
    ///
    /// The probe is invoked once per iteration and should perform a single
    /// status read. The deadline is checked every iteration and bounds every
    /// sleep, so the loop never polls past it; cancellation interrupts a
    /// sleep that is already in progress.
    pub async fn wait<F, Fut>(self, mut probe: F) -> WaitOutcome
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<StatusReport, ProbeError>>,
    {
        let started = Instant::now();
        let deadline = started + self.policy.timeout;
        let mut interval = self.policy.interval;
        let mut last_phase: Option<String> = None;

        loop {
            if let Some(token) = &self.cancel
                && token.is_cancelled()
            {
                return WaitOutcome::Cancelled;
            }

            let now = Instant::now();
            if now >= deadline {
                return WaitOutcome::TimedOut {
                    last_phase,
                    waited: now - started,
                };
            }

            match probe().await {
                Ok(report) => match self.table.classify(&report.phase) {
                    PhaseClass::Success => {
                        log::debug!("{} reached phase {}", self.describe(), report.phase);
                        return WaitOutcome::Success {
                            phase: report.phase,
                        };
                    }
                    PhaseClass::Failure => {
                        let detail = report.detail.unwrap_or_else(|| {
                            format!("{} entered terminal phase {}", self.kind, report.phase)
                        });
                        return WaitOutcome::Failure {
                            phase: Some(report.phase),
                            detail,
                        };
                    }
                    PhaseClass::Transient => {
                        log::debug!("waiting for {}: phase {}", self.describe(), report.phase);
                        last_phase = Some(report.phase);
                    }
                    PhaseClass::Unknown => {
                        return WaitOutcome::Failure {
                            detail: format!(
                                "unexpected phase \"{}\" reported for {}",
                                report.phase,
                                self.describe()
                            ),
                            phase: Some(report.phase),
                        };
                    }
                },
                Err(err) if err.is_gone() => match self.mode {
                    WaitMode::Deprovision => {
                        log::debug!("{} is gone", self.describe());
                        return WaitOutcome::Success {
                            phase: PHASE_GONE.to_string(),
                        };
                    }
                    WaitMode::Provision => {
                        if started.elapsed() <= self.policy.not_found_grace {
                            log::debug!(
                                "{} not visible yet, still inside the not-found grace window",
                                self.describe()
                            );
                        } else {
                            return WaitOutcome::Failure {
                                phase: None,
                                detail: format!(
                                    "{} still not found after the {:?} grace window elapsed",
                                    self.describe(),
                                    self.policy.not_found_grace
                                ),
                            };
                        }
                    }
                },
                Err(err) if err.is_retryable() => {
                    log::warn!("transient error polling {}: {err}", self.describe());
                }
                Err(err) => {
                    return WaitOutcome::Failure {
                        phase: None,
                        detail: err.to_string(),
                    };
                }
            }

            let now = Instant::now();
            if now >= deadline {
                return WaitOutcome::TimedOut {
                    last_phase,
                    waited: now - started,
                };
            }
            let wake = cmp::min(now + interval, deadline);
            if let Some(token) = &self.cancel {
                tokio::select! {
                    _ = token.cancelled() => return WaitOutcome::Cancelled,
                    _ = sleep_until(wake) => {}
                }
            } else {
                sleep_until(wake).await;
            }

            if self.policy.backoff_factor > 1.0 {
                interval = cmp::min(
                    interval.mul_f64(self.policy.backoff_factor),
                    self.policy.max_interval,
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn provision_table() -> PhaseTable {
        PhaseTable::new()
            .transient("PROVISIONING")
            .success("PROVISIONED")
            .failure("FAILED")
    }

    fn fast_policy() -> PollPolicy {
        PollPolicy::fixed(Duration::from_millis(10), Duration::from_secs(5))
    }

    #[test]
    fn phase_table_classifies_unlisted_phases_as_unknown() {
        let table = provision_table();
        assert_eq!(table.classify("PROVISIONED"), PhaseClass::Success);
        assert_eq!(table.classify("FAILED"), PhaseClass::Failure);
        assert_eq!(table.classify("PROVISIONING"), PhaseClass::Transient);
        assert_eq!(table.classify("DEGRADED"), PhaseClass::Unknown);
    }

    #[tokio::test(start_paused = true)]
    async fn terminal_phase_on_first_poll_stops_polling() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let outcome = Waiter::provision("network", "n-1", provision_table())
            .with_policy(fast_policy())
            .wait(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Ok(StatusReport::new("PROVISIONED")) }
            })
            .await;

        assert_eq!(
            outcome,
            WaitOutcome::Success {
                phase: "PROVISIONED".to_string()
            }
        );
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn transient_phases_poll_until_success() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let begun = Instant::now();

        let outcome = Waiter::provision("network", "n-1", provision_table())
            .with_policy(fast_policy())
            .wait(move || {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Ok(StatusReport::new("PROVISIONING"))
                    } else {
                        Ok(StatusReport::new("PROVISIONED"))
                    }
                }
            })
            .await;

        assert!(outcome.is_success());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // two sleeps of one interval each before the terminal poll
        assert!(begun.elapsed() >= Duration::from_millis(20));
        assert!(begun.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn never_terminal_phase_times_out_with_bounded_polls() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let outcome = Waiter::provision("network", "n-1", provision_table())
            .with_policy(PollPolicy::fixed(
                Duration::from_millis(100),
                Duration::from_secs(1),
            ))
            .wait(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Ok(StatusReport::new("PROVISIONING")) }
            })
            .await;

        match outcome {
            WaitOutcome::TimedOut { last_phase, waited } => {
                assert_eq!(last_phase.as_deref(), Some("PROVISIONING"));
                assert!(waited >= Duration::from_secs(1));
            }
            other => panic!("expected TimedOut, got {:?}", other),
        }
        // one poll per interval, never unbounded
        let polls = calls.load(Ordering::SeqCst);
        assert!((9..=11).contains(&polls), "polled {} times", polls);
    }

    #[tokio::test(start_paused = true)]
    async fn deprovision_wait_treats_404_as_gone() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let outcome = Waiter::deprovision("network", "n-1", PhaseTable::new().transient("DEPROVISIONING"))
            .with_policy(fast_policy())
            .wait(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                async {
                    Err(ProbeError::Http {
                        status: 404,
                        message: "not found".to_string(),
                    })
                }
            })
            .await;

        assert_eq!(
            outcome,
            WaitOutcome::Success {
                phase: PHASE_GONE.to_string()
            }
        );
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn deprovision_wait_treats_403_as_gone() {
        let outcome = Waiter::deprovision("identity_pool", "pool-1", PhaseTable::new())
            .with_policy(fast_policy())
            .wait(|| async {
                Err(ProbeError::Http {
                    status: 403,
                    message: "forbidden".to_string(),
                })
            })
            .await;

        assert!(outcome.is_success());
    }

    #[tokio::test(start_paused = true)]
    async fn provision_wait_tolerates_404_inside_the_grace_window() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let policy = PollPolicy::fixed(Duration::from_millis(10), Duration::from_secs(5))
            .with_not_found_grace(Duration::from_millis(100));
        let outcome = Waiter::provision("network", "n-1", provision_table())
            .with_policy(policy)
            .wait(move || {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 3 {
                        Err(ProbeError::Http {
                            status: 404,
                            message: "not found".to_string(),
                        })
                    } else {
                        Ok(StatusReport::new("PROVISIONED"))
                    }
                }
            })
            .await;

        assert!(outcome.is_success());
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn provision_wait_fails_when_404_outlives_the_grace_window() {
        let policy = PollPolicy::fixed(Duration::from_millis(50), Duration::from_secs(60))
            .with_not_found_grace(Duration::from_millis(100));
        let outcome = Waiter::provision("network", "n-1", provision_table())
            .with_policy(policy)
            .wait(|| async {
                Err(ProbeError::Http {
                    status: 404,
                    message: "not found".to_string(),
                })
            })
            .await;

        match outcome {
            WaitOutcome::Failure { phase, detail } => {
                assert!(phase.is_none());
                assert!(detail.contains("not found"));
            }
            other => panic!("expected Failure, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn failure_detail_comes_from_the_final_report() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let outcome = Waiter::provision("stream_cluster", "lkc-1", provision_table())
            .with_policy(fast_policy())
            .wait(move || {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Ok(StatusReport::new("PROVISIONING"))
                    } else {
                        Ok(StatusReport::new("FAILED").with_detail("quota exceeded in region"))
                    }
                }
            })
            .await;

        assert_eq!(
            outcome,
            WaitOutcome::Failure {
                phase: Some("FAILED".to_string()),
                detail: "quota exceeded in region".to_string(),
            }
        );
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_phase_fails_instead_of_polling_forever() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let outcome = Waiter::provision("network", "n-1", provision_table())
            .with_policy(fast_policy())
            .wait(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Ok(StatusReport::new("MIGRATING")) }
            })
            .await;

        match outcome {
            WaitOutcome::Failure { phase, detail } => {
                assert_eq!(phase.as_deref(), Some("MIGRATING"));
                assert!(detail.contains("unexpected phase"));
            }
            other => panic!("expected Failure, got {:?}", other),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn retryable_errors_are_polled_through() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let outcome = Waiter::provision("network", "n-1", provision_table())
            .with_policy(fast_policy())
            .wait(move || {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                async move {
                    match n {
                        0 => Err(ProbeError::Transport {
                            message: "connection reset".to_string(),
                            retryable: true,
                        }),
                        1 => Err(ProbeError::Http {
                            status: 503,
                            message: "unavailable".to_string(),
                        }),
                        _ => Ok(StatusReport::new("PROVISIONED")),
                    }
                }
            })
            .await;

        assert!(outcome.is_success());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn non_retryable_probe_error_is_fatal() {
        let outcome = Waiter::provision("network", "n-1", provision_table())
            .with_policy(fast_policy())
            .wait(|| async {
                Err(ProbeError::Http {
                    status: 400,
                    message: "malformed request".to_string(),
                })
            })
            .await;

        match outcome {
            WaitOutcome::Failure { phase, detail } => {
                assert!(phase.is_none());
                assert!(detail.contains("400"));
            }
            other => panic!("expected Failure, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_interrupts_a_started_sleep() {
        let token = CancellationToken::new();
        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            canceller.cancel();
        });

        let outcome = Waiter::provision("network", "n-1", provision_table())
            .with_policy(PollPolicy::fixed(
                Duration::from_secs(60),
                Duration::from_secs(3600),
            ))
            .with_cancellation(token)
            .wait(|| async { Ok(StatusReport::new("PROVISIONING")) })
            .await;

        assert_eq!(outcome, WaitOutcome::Cancelled);
    }

    #[tokio::test(start_paused = true)]
    async fn identical_probe_sequences_yield_identical_outcomes() {
        for _ in 0..2 {
            let outcome = Waiter::provision("network", "n-1", provision_table())
                .with_policy(fast_policy())
                .wait(|| async { Ok(StatusReport::new("PROVISIONED")) })
                .await;
            assert_eq!(
                outcome,
                WaitOutcome::Success {
                    phase: "PROVISIONED".to_string()
                }
            );
        }
    }

    #[tokio::test(start_paused = true)]
    async fn backoff_grows_the_interval_up_to_the_cap() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let policy = PollPolicy::fixed(Duration::from_millis(100), Duration::from_secs(2))
            .with_backoff(2.0, Duration::from_millis(400));
        // intervals: 100, 200, 400, 400, ... -> 6 polls fit into 2s
        let outcome = Waiter::provision("network", "n-1", provision_table())
            .with_policy(policy)
            .wait(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Ok(StatusReport::new("PROVISIONING")) }
            })
            .await;

        assert!(matches!(outcome, WaitOutcome::TimedOut { .. }));
        let polls = calls.load(Ordering::SeqCst);
        assert!(polls < 10, "backoff should reduce poll count, got {}", polls);
        assert!(polls >= 5, "expected at least 5 polls, got {}", polls);
    }
}
