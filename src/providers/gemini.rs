//! Google Gemini `generateContent` provider.
//!
//! Authentication is a plain API key, resolved from (in order) the value
//! passed in, `GEMINI_API_KEY`, then `GOOGLE_API_KEY`.

use super::gemini_types::{
    Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, Part,
};
use super::http_client::build_provider_client_with_timeout;
use super::response::{ChatMessage, MessageRole, ProviderResponse};
use super::scrub::{api_error, sanitize_api_error};
use super::traits::Provider;
use crate::error::LlmError;
use reqwest::Client;
use std::future::Future;
use std::pin::Pin;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const MAX_OUTPUT_TOKENS: u32 = 8192;
const PROVIDER: &str = "gemini";

pub struct GeminiProvider {
    api_key: Option<String>,
    base_url: String,
    client: Client,
}

impl GeminiProvider {
    pub fn with_base_url(api_key: Option<&str>, base_url: &str, timeout_secs: u64) -> Self {
        let resolved_key = api_key
            .filter(|key| !key.trim().is_empty())
            .map(String::from)
            .or_else(|| std::env::var("GEMINI_API_KEY").ok())
            .or_else(|| std::env::var("GOOGLE_API_KEY").ok());

        Self {
            api_key: resolved_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            client: build_provider_client_with_timeout(timeout_secs),
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn api_key(&self) -> Result<&str, LlmError> {
        self.api_key.as_deref().ok_or_else(|| LlmError::Auth {
            provider: PROVIDER.into(),
        })
    }

    fn model_name(model: &str) -> String {
        if model.starts_with("models/") {
            model.to_string()
        } else {
            format!("models/{model}")
        }
    }

    fn build_request(
        system_prompt: Option<&str>,
        messages: &[ChatMessage],
        temperature: f64,
    ) -> GenerateContentRequest {
        let contents = messages
            .iter()
            .map(|message| Content {
                role: Some(
                    match message.role {
                        MessageRole::User => "user",
                        MessageRole::Model => "model",
                    }
                    .to_string(),
                ),
                parts: vec![Part {
                    text: message.text.clone(),
                }],
            })
            .collect();

        GenerateContentRequest {
            contents,
            system_instruction: system_prompt.map(|system| Content {
                role: None,
                parts: vec![Part {
                    text: system.to_string(),
                }],
            }),
            generation_config: GenerationConfig {
                temperature,
                max_output_tokens: MAX_OUTPUT_TOKENS,
            },
        }
    }

    fn extract_text(result: &GenerateContentResponse) -> Result<String, LlmError> {
        let candidate = result
            .candidates
            .as_ref()
            .and_then(|c| c.first())
            .ok_or_else(|| LlmError::EmptyResponse {
                provider: PROVIDER.into(),
                reason: "no candidates".into(),
            })?;

        if let Some(reason) = candidate.finish_reason.as_deref() {
            tracing::debug!(finish_reason = reason, "Gemini candidate finished");
        }

        let text = candidate
            .content
            .as_ref()
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|part| part.text.as_deref())
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(LlmError::EmptyResponse {
                provider: PROVIDER.into(),
                reason: format!(
                    "empty candidate (finish reason: {})",
                    candidate.finish_reason.as_deref().unwrap_or("unknown")
                ),
            });
        }

        Ok(text)
    }

    async fn call_api(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> anyhow::Result<GenerateContentResponse> {
        let api_key = self.api_key()?;
        let url = format!(
            "{}/v1beta/{}:generateContent",
            self.base_url,
            Self::model_name(model)
        );

        let response = self
            .client
            .post(url)
            .query(&[("key", api_key)])
            .json(request)
            .send()
            .await
            .map_err(|e| LlmError::Request {
                provider: PROVIDER.into(),
                message: sanitize_api_error(&e.to_string()),
            })?;

        if !response.status().is_success() {
            return Err(api_error(PROVIDER, response).await);
        }

        let result: GenerateContentResponse = response.json().await?;
        if let Some(err) = result.error.as_ref() {
            return Err(LlmError::Request {
                provider: PROVIDER.into(),
                message: format!("API error: {}", sanitize_api_error(&err.message)),
            }
            .into());
        }

        Ok(result)
    }
}

impl Provider for GeminiProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn chat_with_history<'a>(
        &'a self,
        system_prompt: Option<&'a str>,
        messages: &'a [ChatMessage],
        model: &'a str,
        temperature: f64,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<ProviderResponse>> + Send + 'a>> {
        Box::pin(async move {
            let request = Self::build_request(system_prompt, messages, temperature);
            let result = self.call_api(model, &request).await?;
            let text = Self::extract_text(&result)?;

            let mut provider_response = if let Some(usage) = result.usage_metadata {
                ProviderResponse::with_usage(
                    text,
                    usage.prompt_token_count,
                    usage.candidates_token_count,
                )
            } else {
                ProviderResponse::text_only(text)
            };
            if let Some(model_version) = result.model_version {
                provider_response = provider_response.with_model(model_version);
            }
            Ok(provider_response)
        })
    }

    fn warmup(&self) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + '_>> {
        Box::pin(async move {
            // Any response, even 404, means TLS and DNS are ready.
            let _ = self.client.get(&self.base_url).send().await;
            Ok(())
        })
    }
}
