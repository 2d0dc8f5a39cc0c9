//! Outbound text generation: the request a proxy hands to a hosted model and
//! the backend seam that carries it.

use async_trait::async_trait;
use shared::error::GenerationError;

mod gemini;

pub use gemini::{GeminiClient, DEFAULT_BASE_URL, DEFAULT_MODEL};

pub const JSON_MIME_TYPE: &str = "application/json";

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub model: String,
    pub system_instruction: String,
    /// User-turn payload, sent verbatim as a single text part.
    pub contents: String,
    pub temperature: f32,
    pub response_mime_type: String,
}

#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Returns the model's raw text output. An empty string is a valid return
    /// value here; deciding whether it is usable is up to the caller.
    async fn generate(
        &self,
        api_key: &str,
        request: &GenerationRequest,
    ) -> Result<String, GenerationError>;
}
