use std::future::Future;

use crate::error::{Result, StorageError};

/// How often a unit of work is rerun after a serialization failure or deadlock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3)
    }
}

/// Run `op` until it succeeds, fails with a non-retryable error, or the
/// policy is exhausted, in which case a `Conflict` is returned.
pub async fn run<T, F, Fut>(policy: RetryPolicy, operation: &str, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 1;

    loop {
        match op().await {
            Err(err) if err.is_retryable() => {
                if attempt >= policy.max_attempts {
                    tracing::warn!(operation, attempt, "Giving up after conflicting writes: {err}");
                    return Err(StorageError::Conflict(format!(
                        "{operation} kept conflicting with concurrent writes; please retry"
                    )));
                }

                tracing::warn!(operation, attempt, "Retrying after conflicting write: {err}");
                attempt += 1;
            }
            other => return other,
        }
    }
}
