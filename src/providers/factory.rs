use super::gemini::GeminiProvider;
use super::reliable::ReliableProvider;
use super::traits::Provider;
use crate::config::Config;

/// Build the Gemini provider described by `config`, wrapped in retry/backoff.
pub fn create_resilient_provider(config: &Config) -> Box<dyn Provider> {
    let gemini = GeminiProvider::with_base_url(
        config.api_key.as_deref(),
        &config.api_base_url,
        config.reliability.request_timeout_secs,
    );
    if !gemini.has_api_key() {
        tracing::warn!("No Gemini API key configured; model calls will fail");
    }

    Box::new(ReliableProvider::new(
        Box::new(gemini),
        config.reliability.provider_retries,
        config.reliability.provider_backoff_ms,
    ))
}
