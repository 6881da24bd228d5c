//! Browser-side timeout for futures that have no timer of their own.

use std::future::Future;
use std::pin::pin;
use std::time::Duration;

use futures_util::future::{Either, select};
use gloo_timers::future::TimeoutFuture;

/// The wrapped future did not finish in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("timed out after {0:?}")]
pub struct Elapsed(pub Duration);

/// Convert a duration to the `u32` milliseconds `setTimeout` takes,
/// saturating at `u32::MAX`.
#[must_use]
pub fn millis(duration: Duration) -> u32 {
    u32::try_from(duration.as_millis()).unwrap_or(u32::MAX)
}

/// Run `future` until it completes or `limit` elapses.
///
/// The future is dropped on timeout, which aborts an in-flight `fetch`.
///
/// # Errors
///
/// Returns [`Elapsed`] if the timer fires first.
#[allow(clippy::future_not_send)] // WASM is single-threaded; timers are !Send
pub async fn with_timeout<F: Future>(future: F, limit: Duration) -> Result<F::Output, Elapsed> {
    let future = pin!(future);
    let timer = pin!(TimeoutFuture::new(millis(limit)));
    match select(future, timer).await {
        Either::Left((output, _)) => Ok(output),
        Either::Right(((), _)) => Err(Elapsed(limit)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn millis_saturates() {
        assert_eq!(millis(Duration::from_millis(100)), 100);
        assert_eq!(millis(Duration::from_secs(60)), 60_000);
        assert_eq!(millis(Duration::from_secs(u64::MAX)), u32::MAX);
    }
}
