use super::response::{ChatMessage, ProviderResponse};
use super::traits::Provider;
use crate::error::LlmError;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

/// Check if an error is non-retryable (client errors that won't resolve with retries).
fn is_non_retryable(err: &anyhow::Error) -> bool {
    if let Some(LlmError::Auth { .. }) = err.downcast_ref::<LlmError>() {
        return true;
    }

    if let Some(reqwest_err) = err.downcast_ref::<reqwest::Error>()
        && let Some(status) = reqwest_err.status()
    {
        let code = status.as_u16();
        return status.is_client_error() && code != 429 && code != 408;
    }

    // Provider errors carry the status as "(400 Bad Request)".
    let msg = err.to_string();
    msg.split(|c: char| !c.is_ascii_digit())
        .filter_map(|word| word.parse::<u16>().ok())
        .find(|code| (400..500).contains(code))
        .is_some_and(|code| code != 429 && code != 408)
}

/// Delay before the attempt following `attempt` (1-based): `base * 2^(attempt-1)`.
pub fn backoff_delay(base_backoff_ms: u64, attempt: u32) -> Duration {
    let factor = 1u64 << attempt.saturating_sub(1).min(16);
    Duration::from_millis(base_backoff_ms.saturating_mul(factor))
}

/// Provider wrapper with bounded retry and exponential backoff.
pub struct ReliableProvider {
    inner: Box<dyn Provider>,
    max_attempts: u32,
    base_backoff_ms: u64,
}

impl ReliableProvider {
    pub fn new(inner: Box<dyn Provider>, max_attempts: u32, base_backoff_ms: u64) -> Self {
        Self {
            inner,
            max_attempts: max_attempts.max(1),
            base_backoff_ms,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }
}

impl Provider for ReliableProvider {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn warmup(&self) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + '_>> {
        Box::pin(async move {
            if let Err(e) = self.inner.warmup().await {
                tracing::warn!(provider = self.inner.name(), "Warmup failed (non-fatal): {e}");
            }
            Ok(())
        })
    }

    fn chat_with_history<'a>(
        &'a self,
        system_prompt: Option<&'a str>,
        messages: &'a [ChatMessage],
        model: &'a str,
        temperature: f64,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<ProviderResponse>> + Send + 'a>> {
        Box::pin(async move {
            let provider_name = self.inner.name();
            let mut failures = Vec::new();

            for attempt in 1..=self.max_attempts {
                match self
                    .inner
                    .chat_with_history(system_prompt, messages, model, temperature)
                    .await
                {
                    Ok(resp) => {
                        if attempt > 1 {
                            tracing::info!(
                                provider = provider_name,
                                attempt,
                                "Provider recovered after retries"
                            );
                        }
                        return Ok(resp);
                    }
                    Err(e) => {
                        let non_retryable = is_non_retryable(&e);
                        failures.push(format!(
                            "{provider_name} attempt {attempt}/{}: {e}",
                            self.max_attempts
                        ));

                        if non_retryable {
                            tracing::warn!(provider = provider_name, "Non-retryable error, giving up");
                            break;
                        }

                        if attempt < self.max_attempts {
                            let delay = backoff_delay(self.base_backoff_ms, attempt);
                            tracing::warn!(
                                provider = provider_name,
                                attempt,
                                max_attempts = self.max_attempts,
                                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                                "Provider call failed, retrying"
                            );
                            tokio::time::sleep(delay).await;
                        }
                    }
                }
            }

            let attempts = u32::try_from(failures.len()).unwrap_or(u32::MAX);
            Err(LlmError::Exhausted {
                attempts,
                failures: failures.join("\n"),
            }
            .into())
        })
    }
}
