//! System instruction sent with every generation call.
//!
//! The instruction is data, not code: a template with `{{name}}` interpolation
//! points rendered once from [`InstructionVars`]. Single braces are literal, so
//! the embedded JSON schema needs no escaping.

use shared::protocol::MAX_CONTENT_CHARS;
use thiserror::Error;

pub const DEFAULT_TEMPLATE: &str = r#"You are {{persona}}.
Your Role: Gesture -> generate React Native telehealth code -> insert via JSON.

Available Mock API Endpoints (Base URL: /api):
{{api_endpoints}}

Rules:
1. React Native telehealth only (patient fetch, vitals charts, booking UI).
2. Cursor.IDE format ({{code_style}}).
3. {{domain_context}}.
4. Forms MUST include real-time validation feedback and clear error messages using React state.
5. Use the provided mock API endpoints in generated code.
6. Output MUST be STRICT JSON matching this schema:
{
  "action": "code_insert" | "notification",
  "content": "string (max {{max_content_chars}} chars)",
  "haptic_feedback": "short_vibrate" | "long_pulse" | "none",
  "next_gesture": "string"
}
Respond ONLY with the JSON object. No markdown, no explanations."#;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("unknown placeholder `{{{{{0}}}}}` in instruction template")]
    UnknownPlaceholder(String),
    #[error("unterminated placeholder at byte {0} in instruction template")]
    Unterminated(usize),
}

#[derive(Debug, Clone)]
pub struct InstructionVars {
    pub persona: String,
    pub code_style: String,
    pub domain_context: String,
    pub api_endpoints: Vec<String>,
    pub max_content_chars: usize,
}

impl Default for InstructionVars {
    fn default() -> Self {
        Self {
            persona: "CursorGenie, an intelligent AI plugin for Logitech MX Master4 (Actions Ring) + MX Creative Console in Cursor.IDE".into(),
            code_style: "async functions, hooks, Tailwind".into(),
            domain_context: "Bengaluru hospital context (vitals monitoring, appointment flow)".into(),
            api_endpoints: vec![
                "GET /patients: Fetch all patients".into(),
                "GET /patients/:id: Fetch single patient".into(),
                "POST /patients: Create new patient (Body: { name, age, symptoms })".into(),
            ],
            max_content_chars: MAX_CONTENT_CHARS,
        }
    }
}

impl InstructionVars {
    fn lookup(&self, name: &str) -> Option<String> {
        match name {
            "persona" => Some(self.persona.clone()),
            "code_style" => Some(self.code_style.clone()),
            "domain_context" => Some(self.domain_context.clone()),
            "api_endpoints" => Some(
                self.api_endpoints
                    .iter()
                    .map(|endpoint| format!("- {endpoint}"))
                    .collect::<Vec<_>>()
                    .join("\n"),
            ),
            "max_content_chars" => Some(self.max_content_chars.to_string()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct InstructionTemplate {
    text: String,
}

impl Default for InstructionTemplate {
    fn default() -> Self {
        Self::new(DEFAULT_TEMPLATE)
    }
}

impl InstructionTemplate {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn render(&self, vars: &InstructionVars) -> Result<String, TemplateError> {
        let mut out = String::with_capacity(self.text.len());
        let mut rest = self.text.as_str();
        let mut offset = 0;

        while let Some(start) = rest.find("{{") {
            out.push_str(&rest[..start]);
            let after_open = &rest[start + 2..];
            let Some(end) = after_open.find("}}") else {
                return Err(TemplateError::Unterminated(offset + start));
            };
            let name = after_open[..end].trim();
            let value = vars
                .lookup(name)
                .ok_or_else(|| TemplateError::UnknownPlaceholder(name.to_string()))?;
            out.push_str(&value);

            let consumed = start + 2 + end + 2;
            offset += consumed;
            rest = &rest[consumed..];
        }
        out.push_str(rest);
        Ok(out)
    }
}

#[cfg(test)]
#[path = "tests/instruction_tests.rs"]
mod tests;
