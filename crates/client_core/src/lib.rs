//! Gesture input collection for the workflow proxy: the current input
//! snapshot, a debounced submit loop, and the HTTP transport it talks through.

pub mod collector;
pub mod transport;

pub use collector::{
    CollectorConfig, CollectorEvent, CollectorState, GestureCollector, DEFAULT_DEBOUNCE,
    DEFAULT_HAPTIC_PULSE,
};
pub use transport::{HttpWorkflowTransport, TransportError, WorkflowTransport};

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
