use std::sync::Arc;

use generation::{GenerationBackend, GenerationRequest, DEFAULT_MODEL, JSON_MIME_TYPE};
use shared::{
    error::{ConfigurationError, GenerationError},
    protocol::{GestureEvent, WorkflowResult, MAX_CONTENT_CHARS},
};
use tracing::{error, info, warn};

pub mod credential;
pub mod instruction;
pub mod normalize;

use credential::CredentialSource;
use normalize::NormalizationPipeline;

pub const DEFAULT_TEMPERATURE: f32 = 0.1;

#[derive(Debug, Clone, PartialEq)]
pub struct Sampling {
    pub model: String,
    pub temperature: f32,
}

impl Default for Sampling {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

/// Everything a workflow call needs. Read-only once built; cloned per request.
#[derive(Clone)]
pub struct WorkflowContext {
    pub backend: Arc<dyn GenerationBackend>,
    pub credentials: Arc<dyn CredentialSource>,
    pub system_instruction: Arc<str>,
    pub sampling: Sampling,
    pub normalizer: Arc<NormalizationPipeline>,
}

impl WorkflowContext {
    pub fn new(
        backend: Arc<dyn GenerationBackend>,
        credentials: Arc<dyn CredentialSource>,
        system_instruction: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            backend,
            credentials,
            system_instruction: system_instruction.into(),
            sampling: Sampling::default(),
            normalizer: Arc::new(NormalizationPipeline::default()),
        }
    }

    pub fn with_sampling(mut self, sampling: Sampling) -> Self {
        self.sampling = sampling;
        self
    }
}

/// Runs one gesture through the generation API.
///
/// Only a missing credential is reported as an error, and in that case no
/// outbound call is made. Every generation failure is logged and replaced by
/// [`WorkflowResult::fallback`].
pub async fn run_workflow(
    ctx: &WorkflowContext,
    event: &GestureEvent,
) -> Result<WorkflowResult, ConfigurationError> {
    let Some(api_key) = ctx.credentials.api_key() else {
        warn!(var = ctx.credentials.name(), "generation credential missing");
        return Err(ConfigurationError::MissingCredential {
            var: ctx.credentials.name().to_string(),
        });
    };

    info!(
        gesture = %event.gesture,
        command = %event.command,
        selected_chars = event.selected_text.chars().count(),
        "workflow requested"
    );

    match generate_result(ctx, &api_key, event).await {
        Ok(result) => {
            info!(action = %result.action, haptic = %result.haptic_feedback, "workflow generated");
            Ok(result)
        }
        Err(error) => {
            error!(%error, "generation failed; returning fallback notification");
            Ok(WorkflowResult::fallback())
        }
    }
}

pub fn build_request(
    ctx: &WorkflowContext,
    event: &GestureEvent,
) -> Result<GenerationRequest, GenerationError> {
    Ok(GenerationRequest {
        model: ctx.sampling.model.clone(),
        system_instruction: ctx.system_instruction.to_string(),
        contents: serde_json::to_string(event)?,
        temperature: ctx.sampling.temperature,
        response_mime_type: JSON_MIME_TYPE.to_string(),
    })
}

async fn generate_result(
    ctx: &WorkflowContext,
    api_key: &str,
    event: &GestureEvent,
) -> Result<WorkflowResult, GenerationError> {
    let request = build_request(ctx, event)?;
    let text = ctx.backend.generate(api_key, &request).await?;
    parse_workflow_result(&ctx.normalizer, &text)
}

/// Normalizes raw model text, parses it, and checks the parsed result against
/// the schema limits that serde alone cannot express.
pub fn parse_workflow_result(
    normalizer: &NormalizationPipeline,
    raw: &str,
) -> Result<WorkflowResult, GenerationError> {
    let text = normalizer.normalize(raw);
    if text.is_empty() {
        return Err(GenerationError::EmptyResponse);
    }
    let result: WorkflowResult = serde_json::from_str(text)?;
    validate_result(&result)?;
    Ok(result)
}

pub fn validate_result(result: &WorkflowResult) -> Result<(), GenerationError> {
    let chars = result.content_chars();
    if chars > MAX_CONTENT_CHARS {
        return Err(GenerationError::SchemaViolation(format!(
            "content is {chars} chars, limit is {MAX_CONTENT_CHARS}"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
