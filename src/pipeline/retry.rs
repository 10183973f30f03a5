//! Reusable retry policy for transient upstream failures
//!
//! One policy, parameterized once, instead of ad-hoc retry-with-sleep at
//! every call site.

use std::future::Future;
use std::time::Duration;

use crate::Result;

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Run an operation, retrying transient failures with a linearly
    /// increasing delay. Permanent and fatal errors return immediately.
    pub async fn run<T, F, Fut>(&self, what: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 1u32;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() && attempt < self.max_attempts => {
                    let delay = self.base_delay * attempt;
                    tracing::warn!(
                        error = %err,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "{what} failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
