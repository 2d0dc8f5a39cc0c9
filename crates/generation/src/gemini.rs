use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use shared::error::GenerationError;
use tracing::debug;
use url::Url;

use crate::{GenerationBackend, GenerationRequest};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-3.1-pro-preview";

const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    temperature: f32,
    response_mime_type: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig<'a>,
}

impl<'a> From<&'a GenerationRequest> for GenerateContentRequest<'a> {
    fn from(request: &'a GenerationRequest) -> Self {
        Self {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: &request.system_instruction,
                }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part {
                    text: &request.contents,
                }],
            }],
            generation_config: GenerationConfig {
                temperature: request.temperature,
                response_mime_type: &request.response_mime_type,
            },
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Text of the first candidate, parts concatenated in order.
    fn text(self) -> String {
        self.candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

/// `generateContent` client for the hosted Gemini REST API.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: Client,
    base_url: Url,
}

impl GeminiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, GenerationError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(GenerationError::transport)?;
        Ok(Self {
            http,
            base_url: parse_base_url(base_url)?,
        })
    }

    fn endpoint(&self, model: &str) -> Result<Url, GenerationError> {
        self.base_url
            .join(&format!("v1beta/models/{model}:generateContent"))
            .map_err(GenerationError::transport)
    }
}

fn parse_base_url(raw: &str) -> Result<Url, GenerationError> {
    let raw = raw.trim();
    let with_slash = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };
    Url::parse(&with_slash)
        .map_err(|e| GenerationError::Transport(format!("invalid base url '{raw}': {e}")))
}

#[async_trait]
impl GenerationBackend for GeminiClient {
    async fn generate(
        &self,
        api_key: &str,
        request: &GenerationRequest,
    ) -> Result<String, GenerationError> {
        let url = self.endpoint(&request.model)?;
        debug!(model = %request.model, %url, "calling generation api");

        let response = self
            .http
            .post(url)
            .header(API_KEY_HEADER, api_key)
            .json(&GenerateContentRequest::from(request))
            .send()
            .await
            .map_err(GenerationError::transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: GenerateContentResponse =
            response.json().await.map_err(GenerationError::transport)?;
        Ok(body.text())
    }
}

#[cfg(test)]
#[path = "tests/gemini_tests.rs"]
mod tests;
