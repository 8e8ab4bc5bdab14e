//! Caller-side retry and timeout for remote place calls.
//!
//! The gateway never retries on its own. The coordinator repeats search and
//! details calls through [`retry_with_backoff`] and bounds every remote call
//! with [`call_with_timeout`].

use std::future::Future;
use std::time::Duration;

use venuemap_gateway::RemoteError;

/// Transport failures, 5xx responses and caller-side timeouts can clear up
/// on their own. API status errors and malformed bodies cannot.
pub(crate) fn is_retriable(err: &RemoteError) -> bool {
    match err {
        RemoteError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        RemoteError::Timeout { .. } => true,
        RemoteError::Api { .. }
        | RemoteError::Deserialize { .. }
        | RemoteError::Incomplete { .. }
        | RemoteError::EmptyPlaceId
        | RemoteError::InvalidBaseUrl { .. } => false,
    }
}

const MAX_BACKOFF: Duration = Duration::from_secs(10);

/// Delay before the `retry`-th repeat (1-based): `base_ms` doubled per
/// earlier retry, capped at [`MAX_BACKOFF`], then scaled by `jitter`.
fn backoff_delay(retry: u32, base_ms: u64, jitter: f64) -> Duration {
    let doublings = retry.saturating_sub(1).min(10);
    let nominal = Duration::from_millis(base_ms.saturating_mul(1 << doublings));
    nominal.min(MAX_BACKOFF).mul_f64(jitter)
}

/// Calls `operation` until it succeeds, fails permanently, or has been
/// repeated `max_retries` times.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, RemoteError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, RemoteError>>,
{
    let mut retries = 0;
    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if retries < max_retries && is_retriable(&err) => err,
            Err(err) => return Err(err),
        };
        retries += 1;
        let delay = backoff_delay(retries, backoff_base_ms, 0.75 + rand::random::<f64>() * 0.5);
        tracing::warn!(retry = retries, max_retries, ?delay, error = %err, "retrying places call");
        tokio::time::sleep(delay).await;
    }
}

/// Awaits `fut` for at most `limit`.
///
/// # Errors
///
/// Returns [`RemoteError::Timeout`] naming `operation` when the limit
/// elapses, or whatever error `fut` itself resolves to.
pub(crate) async fn call_with_timeout<T, Fut>(
    operation: &str,
    limit: Duration,
    fut: Fut,
) -> Result<T, RemoteError>
where
    Fut: Future<Output = Result<T, RemoteError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(RemoteError::Timeout {
            operation: operation.to_owned(),
            after_ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
        }),
    }
}
