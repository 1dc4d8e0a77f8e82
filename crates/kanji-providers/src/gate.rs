//! Admission control and timeouts for provider calls
//!
//! Every call to an external collaborator runs through a `ProviderGate`:
//! a semaphore bounds how many invocations run at once, waiting for a slot is
//! bounded by the queue timeout, and the invocation itself is bounded by the
//! call timeout. Dropping the returned future (client disconnect) releases the
//! slot and drops the provider future with it.

use kanji_core::{ProviderError, ProviderLimits};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;

#[derive(Debug, Clone)]
pub struct ProviderGate {
    provider: String,
    semaphore: Arc<Semaphore>,
    limits: ProviderLimits,
}

impl ProviderGate {
    pub fn new(provider: impl Into<String>, limits: ProviderLimits) -> Self {
        Self {
            provider: provider.into(),
            semaphore: Arc::new(Semaphore::new(limits.max_concurrent.max(1))),
            limits,
        }
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn limits(&self) -> ProviderLimits {
        self.limits
    }

    /// Free slots right now
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Run `call` once a slot is free, within the configured time budget.
    pub async fn run<T, F>(&self, call: F) -> Result<T, ProviderError>
    where
        F: Future<Output = Result<T, ProviderError>>,
    {
        let _permit = match tokio::time::timeout(self.limits.queue_timeout, self.semaphore.acquire())
            .await
        {
            Ok(Ok(permit)) => permit,
            Ok(Err(_)) | Err(_) => {
                tracing::warn!(
                    provider = %self.provider,
                    max_concurrent = self.limits.max_concurrent,
                    queue_timeout_ms = self.limits.queue_timeout.as_millis() as u64,
                    "Provider at capacity, refusing call"
                );
                return Err(ProviderError::Busy {
                    provider: self.provider.clone(),
                });
            }
        };

        let started = Instant::now();
        match tokio::time::timeout(self.limits.timeout, call).await {
            Ok(result) => {
                tracing::debug!(
                    provider = %self.provider,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    ok = result.is_ok(),
                    "Provider call finished"
                );
                result
            }
            Err(_) => {
                let timeout_ms = self.limits.timeout.as_millis() as u64;
                tracing::warn!(provider = %self.provider, timeout_ms, "Provider call timed out");
                Err(ProviderError::Timeout {
                    provider: self.provider.clone(),
                    timeout_ms,
                })
            }
        }
    }
}
