use std::{fmt, future::Future, time::Duration};

use tokio::time::{Instant, sleep};
use tracing::debug;

use crate::error::MatchError;

/// Synchronisation step a wait belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitPhase {
    /// Both readiness flags.
    Readiness,
    /// Both move fields.
    Moves,
}

impl fmt::Display for WaitPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaitPhase::Readiness => f.write_str("both players to be ready"),
            WaitPhase::Moves => f.write_str("both moves"),
        }
    }
}

/// How a bounded wait ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome<T> {
    /// The probe produced a value.
    Done(T),
    /// The budget ran out first.
    TimedOut,
}

/// Budget and cadence of a bounded wait.
#[derive(Debug, Clone, Copy)]
pub struct PollPolicy {
    /// Pause between two probes.
    pub interval: Duration,
    /// Total time allowed before giving up.
    pub timeout: Duration,
}

/// Run `probe` immediately, then once per interval, until it yields a value or the
/// budget is exhausted.
///
/// A probe that is satisfied on its first call returns without sleeping. No probe runs
/// once the deadline is reached, so the last read happens strictly inside the budget and a
/// wait that never succeeds takes `timeout` rounded up to a whole number of intervals.
/// Probe errors end the wait at once.
pub async fn poll_until<T, F, Fut>(
    policy: PollPolicy,
    mut probe: F,
) -> Result<PollOutcome<T>, MatchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>, MatchError>>,
{
    // `None` only for budgets past the clock's range, which never run out.
    let deadline = Instant::now().checked_add(policy.timeout);
    let mut ticks: u32 = 0;

    loop {
        if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            debug!(ticks, "poll budget exhausted");
            return Ok(PollOutcome::TimedOut);
        }
        ticks += 1;
        if let Some(value) = probe().await? {
            debug!(ticks, "poll satisfied");
            return Ok(PollOutcome::Done(value));
        }
        sleep(policy.interval).await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicU32, Ordering},
    };

    use super::*;

    fn policy(interval: u64, timeout: u64) -> PollPolicy {
        PollPolicy {
            interval: Duration::from_secs(interval),
            timeout: Duration::from_secs(timeout),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn immediate_success_does_not_sleep() {
        let start = Instant::now();
        let outcome = poll_until(policy(1, 10), || async { Ok::<_, MatchError>(Some(7)) })
            .await
            .unwrap();
        assert_eq!(outcome, PollOutcome::Done(7));
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_at_the_deadline() {
        let calls = Arc::new(AtomicU32::new(0));
        let start = Instant::now();
        let counter = calls.clone();
        let outcome = poll_until(policy(1, 5), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, MatchError>(None::<()>) }
        })
        .await
        .unwrap();

        assert_eq!(outcome, PollOutcome::TimedOut);
        assert_eq!(start.elapsed(), Duration::from_secs(5));
        assert_eq!(calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn never_probes_at_the_deadline() {
        let last_probe = Arc::new(std::sync::Mutex::new(Duration::ZERO));
        let start = Instant::now();
        let seen = last_probe.clone();
        let outcome = poll_until(policy(1, 10), move || {
            *seen.lock().unwrap() = start.elapsed();
            async { Ok::<_, MatchError>(None::<()>) }
        })
        .await
        .unwrap();

        assert_eq!(outcome, PollOutcome::TimedOut);
        assert_eq!(*last_probe.lock().unwrap(), Duration::from_secs(9));
        assert_eq!(start.elapsed(), Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn oversized_budget_still_polls() {
        let outcome = poll_until(
            PollPolicy {
                interval: Duration::from_secs(1),
                timeout: Duration::MAX,
            },
            || async { Ok::<_, MatchError>(Some(1)) },
        )
        .await
        .unwrap();
        assert_eq!(outcome, PollOutcome::Done(1));
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_on_a_later_tick() {
        let calls = Arc::new(AtomicU32::new(0));
        let start = Instant::now();
        let counter = calls.clone();
        let outcome = poll_until(policy(1, 60), move || {
            let seen = counter.fetch_add(1, Ordering::SeqCst);
            async move { Ok::<_, MatchError>((seen == 3).then_some("ready")) }
        })
        .await
        .unwrap();

        assert_eq!(outcome, PollOutcome::Done("ready"));
        assert_eq!(start.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn probe_errors_stop_the_wait() {
        let result = poll_until(policy(1, 60), || async {
            Err::<Option<()>, _>(MatchError::InvalidState("boom".into()))
        })
        .await;
        assert!(matches!(result, Err(MatchError::InvalidState(_))));
    }
}
