use super::response::{ChatMessage, ProviderResponse};
use std::future::Future;
use std::pin::Pin;

pub trait Provider: Send + Sync {
    /// Provider identifier (e.g. "gemini").
    fn name(&self) -> &str;

    /// Send the whole transcript plus an optional system instruction.
    fn chat_with_history<'a>(
        &'a self,
        system_prompt: Option<&'a str>,
        messages: &'a [ChatMessage],
        model: &'a str,
        temperature: f64,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<ProviderResponse>> + Send + 'a>>;

    /// Warm up the HTTP connection pool.
    fn warmup(&self) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + '_>> {
        Box::pin(async move { Ok(()) })
    }
}
