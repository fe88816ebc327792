//! Deadline race for asynchronous operations

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

/// The raced operation did not settle before its deadline
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Timed out in {}ms", .timeout.as_millis())]
pub struct TimeoutError {
    timeout: Duration,
}

impl TimeoutError {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Deadline that was exceeded
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// Race `future` against a deadline of `timeout` from now
///
/// The deadline is fixed when this function is called, not when the returned
/// future is first polled. A zero timeout fails without polling `future`, and
/// a timeout too large to be represented as an instant never fires.
/// Whichever side loses is dropped: the timer when `future` settles first,
/// `future` itself when the deadline passes.
pub fn run_with_timeout<F>(
    future: F,
    timeout: Duration,
) -> impl Future<Output = Result<F::Output, TimeoutError>>
where
    F: Future,
{
    let deadline = Instant::now().checked_add(timeout);

    async move {
        if timeout.is_zero() {
            return Err(TimeoutError::new(timeout));
        }

        match deadline {
            Some(deadline) => tokio::time::timeout_at(deadline, future)
                .await
                .map_err(|_| TimeoutError::new(timeout)),
            None => Ok(future.await),
        }
    }
}
