//! Retry decorator around an [`LlmPort`].
//!
//! Wraps any LLM client with bounded retries and exponential backoff.
//! Invalid-response errors are not retried; the payload will not improve
//! by asking again.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::infrastructure::ports::{LlmError, LlmPort, LlmRequest, LlmResponse};

#[derive(Debug, Clone, Copy)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub base_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay_ms: 500,
        }
    }
}

pub struct ResilientLlmClient {
    inner: Arc<dyn LlmPort>,
    config: RetryConfig,
}

impl ResilientLlmClient {
    pub fn new(inner: Arc<dyn LlmPort>, config: RetryConfig) -> Self {
        Self { inner, config }
    }
}

#[async_trait]
impl LlmPort for ResilientLlmClient {
    async fn generate(&self, request: LlmRequest) -> Result<LlmResponse, LlmError> {
        let mut attempt = 0;
        loop {
            match self.inner.generate(request.clone()).await {
                Ok(response) => return Ok(response),
                Err(e @ LlmError::InvalidResponse(_)) => return Err(e),
                Err(e) => {
                    if attempt >= self.config.max_retries {
                        return Err(e);
                    }
                    let delay = self.config.base_delay_ms * 2u64.pow(attempt);
                    tracing::warn!(
                        error = %e,
                        attempt = attempt + 1,
                        delay_ms = delay,
                        "LLM request failed, retrying"
                    );
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                    attempt += 1;
                }
            }
        }
    }
}
