//! Pre-parse cleanup of model output.
//!
//! Models asked for bare JSON still wrap it in markdown fences or prose now
//! and then. Each step here peels one kind of wrapping and returns a subslice
//! of its input; the parser only ever sees what the pipeline hands it.

pub trait ResponseNormalizer: Send + Sync {
    fn normalize<'a>(&self, text: &'a str) -> &'a str;
}

pub struct TrimWhitespace;

impl ResponseNormalizer for TrimWhitespace {
    fn normalize<'a>(&self, text: &'a str) -> &'a str {
        text.trim()
    }
}

/// Removes a surrounding ```` ``` ```` fence, with or without a language tag.
pub struct StripCodeFence;

const FENCE: &str = "```";

impl ResponseNormalizer for StripCodeFence {
    fn normalize<'a>(&self, text: &'a str) -> &'a str {
        let trimmed = text.trim();
        let Some(body) = trimmed.strip_prefix(FENCE) else {
            return text;
        };
        let body = body.trim_start_matches(|c: char| c.is_ascii_alphanumeric());
        let body = body.strip_suffix(FENCE).unwrap_or(body);
        body.trim()
    }
}

/// Keeps the span from the first `{` to the last `}`, dropping any prose the
/// model put around the object. Text without such a span passes through.
pub struct ExtractJsonObject;

impl ResponseNormalizer for ExtractJsonObject {
    fn normalize<'a>(&self, text: &'a str) -> &'a str {
        match (text.find('{'), text.rfind('}')) {
            (Some(start), Some(end)) if start < end => &text[start..=end],
            _ => text,
        }
    }
}

pub struct NormalizationPipeline {
    steps: Vec<Box<dyn ResponseNormalizer>>,
}

impl Default for NormalizationPipeline {
    fn default() -> Self {
        Self::new()
            .with_step(TrimWhitespace)
            .with_step(StripCodeFence)
            .with_step(ExtractJsonObject)
    }
}

impl NormalizationPipeline {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    pub fn with_step(mut self, step: impl ResponseNormalizer + 'static) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    pub fn normalize<'a>(&self, text: &'a str) -> &'a str {
        self.steps
            .iter()
            .fold(text, |current, step| step.normalize(current))
    }
}

#[cfg(test)]
#[path = "tests/normalize_tests.rs"]
mod tests;
