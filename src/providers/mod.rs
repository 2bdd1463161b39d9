pub mod factory;
pub mod gemini;
mod gemini_types;
pub mod http_client;
pub mod reliable;
pub mod response;
pub mod scrub;
pub mod traits;

pub use factory::create_resilient_provider;
pub use gemini::GeminiProvider;
pub use http_client::build_provider_client_with_timeout;
pub use reliable::ReliableProvider;
pub use response::{ChatMessage, MessageRole, ProviderResponse};
pub use scrub::{api_error, sanitize_api_error, scrub_secret_patterns};
pub use traits::Provider;
