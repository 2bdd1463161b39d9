#![allow(dead_code)]

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use sinu::providers::{ChatMessage, Provider, ProviderResponse};

/// Replays a fixed sequence of tutor replies. `Err` entries simulate a
/// provider whose retries are exhausted.
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<Result<String, String>>>,
    seen: Arc<Mutex<Vec<Vec<ChatMessage>>>>,
}

impl ScriptedProvider {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = Result<S, S>>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(
                replies
                    .into_iter()
                    .map(|r| r.map(Into::into).map_err(Into::into))
                    .collect(),
            ),
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Transcripts sent to the provider, one per call.
    pub fn seen(&self) -> Arc<Mutex<Vec<Vec<ChatMessage>>>> {
        Arc::clone(&self.seen)
    }
}

impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn chat_with_history<'a>(
        &'a self,
        _system_prompt: Option<&'a str>,
        messages: &'a [ChatMessage],
        _model: &'a str,
        _temperature: f64,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<ProviderResponse>> + Send + 'a>> {
        Box::pin(async move {
            self.seen
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .push(messages.to_vec());
            let next = self
                .replies
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .pop_front();
            match next {
                Some(Ok(text)) => Ok(ProviderResponse::text_only(text)),
                Some(Err(cause)) => anyhow::bail!(cause),
                None => anyhow::bail!("script exhausted"),
            }
        })
    }
}
