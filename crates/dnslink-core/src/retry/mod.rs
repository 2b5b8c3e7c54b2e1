//! Retry primitive shared by every pipeline stage
//!
//! Backends never retry on their own. A stage that wants retries wraps a
//! single-shot call in [`retry`] with its own [`RetryPolicy`].
//!
//! ## Semantics
//!
//! 1. Invoke the operation
//! 2. `Ok` → return immediately
//! 3. `Err` classified [`Disposition::Fatal`] → return that error immediately
//! 4. `Err` classified [`Disposition::Retryable`] → sleep `interval`, try again
//! 5. After `max_attempts` retryable failures → [`Error::RetryExhausted`]
//!
//! Attempts are strictly sequential. The sleep suspends only the calling task.

use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{Disposition, Error, Result};

/// Retry budget and failure classification for one call site
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,

    /// Delay between consecutive attempts
    pub interval: Duration,

    /// Decides whether a failure is worth another attempt
    pub classifier: fn(&Error) -> Disposition,
}

impl RetryPolicy {
    /// Policy using the default classification ([`Error::disposition`])
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            interval,
            classifier: Error::disposition,
        }
    }

    /// A single attempt, no retries
    pub fn once() -> Self {
        Self::new(1, Duration::ZERO)
    }

    /// Replace the failure classifier
    pub fn with_classifier(mut self, classifier: fn(&Error) -> Disposition) -> Self {
        self.classifier = classifier;
        self
    }

    /// Classify a failure under this policy
    pub fn classify(&self, error: &Error) -> Disposition {
        (self.classifier)(error)
    }
}

/// Run `operation` under `policy`
///
/// `operation` receives the 1-based attempt number. `resource` names what is
/// being retried in logs and in the exhaustion error.
pub async fn retry<T, F, Fut>(policy: &RetryPolicy, resource: &str, mut operation: F) -> Result<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    if policy.max_attempts == 0 {
        return Err(Error::config(format!(
            "Retry budget for {} must allow at least one attempt",
            resource
        )));
    }

    let mut attempt = 1;
    loop {
        match operation(attempt).await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(resource, attempt, "Succeeded after retry");
                }
                return Ok(value);
            }
            Err(e) => {
                if policy.classify(&e) == Disposition::Fatal {
                    debug!(resource, attempt, error = %e, "Fatal failure, not retrying");
                    return Err(e);
                }

                warn!(
                    resource,
                    attempt,
                    max_attempts = policy.max_attempts,
                    error = %e,
                    "Attempt failed"
                );

                if attempt >= policy.max_attempts {
                    return Err(Error::RetryExhausted {
                        resource: resource.to_string(),
                        attempts: attempt,
                        last: Box::new(e),
                    });
                }

                tokio::time::sleep(policy.interval).await;
                attempt += 1;
            }
        }
    }
}
