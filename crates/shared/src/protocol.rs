use serde::{Deserialize, Serialize};

use crate::domain::{Action, Command, Gesture, HapticFeedback};

/// Upper bound on `WorkflowResult::content`, counted in characters.
pub const MAX_CONTENT_CHARS: usize = 300;

pub const FALLBACK_CONTENT: &str = "Error generating telehealth code.";
pub const FALLBACK_NEXT_GESTURE: &str = "Thumb press to retry";

pub fn workflow_route() -> &'static str {
    "/api/workflow"
}

pub fn healthz_route() -> &'static str {
    "/healthz"
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GestureEvent {
    pub gesture: Gesture,
    #[serde(default)]
    pub selected_text: String,
    pub command: Command,
}

impl GestureEvent {
    pub fn new(gesture: Gesture, command: Command, selected_text: impl Into<String>) -> Self {
        Self {
            gesture,
            selected_text: selected_text.into(),
            command,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowResult {
    pub action: Action,
    pub content: String,
    pub haptic_feedback: HapticFeedback,
    pub next_gesture: String,
}

impl WorkflowResult {
    /// The notification returned in place of any generation failure.
    pub fn fallback() -> Self {
        Self {
            action: Action::Notification,
            content: FALLBACK_CONTENT.to_string(),
            haptic_feedback: HapticFeedback::None,
            next_gesture: FALLBACK_NEXT_GESTURE.to_string(),
        }
    }

    pub fn content_chars(&self) -> usize {
        self.content.chars().count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
