//! Exponential backoff for provider calls (`spec.md` §4.A, §7
//! `ProviderUnavailable` policy).

use std::time::Duration;
use tracing::warn;

use crate::error::{ProviderError, Result};

/// Retry `op` up to `max_attempts` times with exponential backoff
/// (`base * 2^attempt`, no jitter needed at this scale), surfacing
/// [`ProviderError::Unavailable`] once attempts are exhausted.
pub async fn with_backoff<T, F, Fut>(
    max_attempts: u32,
    base: Duration,
    mut op: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let mut attempt = 0;
    loop {
        attempt += 1;
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < max_attempts => {
                let delay = base * 2u32.saturating_pow(attempt - 1);
                warn!(attempt, ?delay, error = %err, "provider call failed, retrying");
                tokio::time::sleep(delay).await;
            }
            Err(err) => {
                return Err(ProviderError::Unavailable {
                    attempts: attempt,
                    message: err.to_string(),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn succeeds_after_transient_failures() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls2 = calls.clone();
        let result = with_backoff(5, Duration::from_millis(1), move || {
            let calls = calls2.clone();
            async move {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    Err(ProviderError::NoProvider("embed"))
                } else {
                    Ok(n)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 2);
    }

    #[tokio::test]
    async fn surfaces_unavailable_once_attempts_exhausted() {
        let result: Result<()> = with_backoff(3, Duration::from_millis(1), || async {
            Err(ProviderError::NoProvider("embed"))
        })
        .await;
        assert!(matches!(
            result,
            Err(ProviderError::Unavailable { attempts: 3, .. })
        ));
    }
}
