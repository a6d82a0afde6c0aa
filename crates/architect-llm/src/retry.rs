//! Retry only transient errors, with exponential backoff: base 2s, cap
//! 60s, for `retries + 1` total attempts. Authentication and
//! malformed-request errors are never retried.

use std::future::Future;
use std::time::Duration;

use crate::error::{LlmError, LlmResult};

const BASE_SECS: f64 = 2.0;
const CAP_SECS: f64 = 60.0;

pub async fn with_retries<F, Fut, T>(retries: u32, mut attempt_fn: F) -> LlmResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = LlmResult<T>>,
{
    let attempts = retries.saturating_add(1);
    let mut last_err: Option<LlmError> = None;

    for attempt in 0..attempts {
        match attempt_fn().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() && attempt + 1 < attempts => {
                let backoff = backoff_for(attempt);
                tracing::warn!(
                    attempt = attempt + 1,
                    max_attempts = attempts,
                    backoff_secs = backoff.as_secs_f64(),
                    error = %err,
                    "transient LLM error, retrying"
                );
                tokio::time::sleep(backoff).await;
                last_err = Some(err);
            }
            Err(err) => return Err(err),
        }
    }

    Err(last_err.expect("loop body always returns or records an error before attempts are exhausted"))
}

fn backoff_for(attempt: u32) -> Duration {
    let secs = (BASE_SECS * 2f64.powi(attempt as i32)).min(CAP_SECS);
    Duration::from_secs_f64(secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test(start_paused = true)]
    async fn succeeds_without_retry_on_first_try() {
        let calls = AtomicU32::new(0);
        let result: LlmResult<&'static str> = with_retries(3, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok("ok") }
        })
        .await;
        assert_eq!(result.unwrap(), "ok");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn retries_transient_errors_until_success() {
        let calls = AtomicU32::new(0);
        let result: LlmResult<&'static str> = with_retries(3, || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(LlmError::Timeout)
                } else {
                    Ok("recovered")
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), "recovered");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausts_retries_and_returns_last_error() {
        let calls = AtomicU32::new(0);
        let result: LlmResult<()> = with_retries(2, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(LlmError::Timeout) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn non_transient_error_never_retries() {
        let calls = AtomicU32::new(0);
        let result: LlmResult<()> = with_retries(5, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(LlmError::MalformedRequest("bad schema".to_string())) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
