//! First-of-two completion between a future and a timeout.

use std::future::Future;
use std::time::Duration;

/// Which side of a race finished first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RaceOutcome<T> {
    /// The future completed within the bound.
    Completed(T),
    /// The bound elapsed first; the future was dropped.
    TimedOut,
}

impl<T> RaceOutcome<T> {
    pub fn completed(self) -> Option<T> {
        match self {
            Self::Completed(value) => Some(value),
            Self::TimedOut => None,
        }
    }
}

/// Race `future` against `timeout`.
///
/// A future that resolves at the same instant the timeout fires counts as
/// completed. The losing future is dropped, not awaited.
pub async fn first_of<F>(future: F, timeout: Duration) -> RaceOutcome<F::Output>
where
    F: Future,
{
    match tokio::time::timeout(timeout, future).await {
        Ok(value) => RaceOutcome::Completed(value),
        Err(_) => RaceOutcome::TimedOut,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future;
    use tokio::time::{sleep, Instant};

    #[tokio::test(start_paused = true)]
    async fn fast_future_wins() {
        let outcome = first_of(
            async {
                sleep(Duration::from_millis(500)).await;
                7
            },
            Duration::from_secs(2),
        )
        .await;
        assert_eq!(outcome, RaceOutcome::Completed(7));
    }

    #[tokio::test(start_paused = true)]
    async fn immediate_value_wins() {
        let started = Instant::now();
        let outcome = first_of(async { false }, Duration::from_secs(2)).await;

        assert_eq!(outcome.completed(), Some(false));
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_bounds_wait() {
        let started = Instant::now();
        let outcome = first_of(future::pending::<bool>(), Duration::from_secs(2)).await;

        assert_eq!(outcome, RaceOutcome::TimedOut);
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(2));
        assert!(elapsed < Duration::from_millis(2100));
    }
}
