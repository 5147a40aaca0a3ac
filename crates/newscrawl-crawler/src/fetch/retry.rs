//! Fixed-delay retry loop for page fetches.
//!
//! Every attempt, successful or not, is followed by the same pause: sources
//! are paced deliberately, not only when they push back. Exhausting the
//! attempt budget yields `None`; the caller never sees the last error.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Runs `operation` up to `max_attempts` times, sleeping `delay` after each
/// attempt (including the successful one).
///
/// `label` identifies the request in logs. A `max_attempts` of `0` is
/// treated as `1`.
pub(crate) async fn retry_with_fixed_delay<T, E, F, Fut>(
    label: &str,
    max_attempts: u32,
    delay: Duration,
    mut operation: F,
) -> Option<T>
where
    E: Display,
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let max_attempts = max_attempts.max(1);

    for attempt in 1..=max_attempts {
        match operation(attempt).await {
            Ok(value) => {
                tokio::time::sleep(delay).await;
                return Some(value);
            }
            Err(err) => {
                tracing::warn!(
                    attempt,
                    max_attempts,
                    url = label,
                    error = %err,
                    "fetch attempt failed"
                );
            }
        }
        tokio::time::sleep(delay).await;
    }

    tracing::error!(url = label, max_attempts, "fetch failed after retries");
    None
}
