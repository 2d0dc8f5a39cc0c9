use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use shared::{
    domain::{Command, Gesture, HapticFeedback},
    protocol::{GestureEvent, WorkflowResult},
};
use tokio::{
    sync::{broadcast, mpsc, RwLock},
    task::JoinHandle,
    time::{sleep, timeout},
};
use tracing::{debug, error, info};

use crate::transport::WorkflowTransport;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(200);
pub const DEFAULT_HAPTIC_PULSE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// Quiet period after the last trigger before a submission goes out.
    pub debounce: Duration,
    /// How long the haptic indicator stays active after a result.
    pub haptic_pulse: Duration,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            haptic_pulse: DEFAULT_HAPTIC_PULSE,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CollectorState {
    pub input: GestureEvent,
    pub output: Option<WorkflowResult>,
    pub loading: bool,
    pub haptic_active: bool,
    pub last_result_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CollectorEvent {
    Submitted(GestureEvent),
    ResultReceived(WorkflowResult),
    HapticPulse { kind: HapticFeedback },
    HapticReleased,
    SubmitFailed { message: String },
}

/// Holds the current gesture input and turns bursts of triggers into single
/// workflow submissions.
pub struct GestureCollector {
    state: Arc<RwLock<CollectorState>>,
    triggers: mpsc::UnboundedSender<GestureEvent>,
    events: broadcast::Sender<CollectorEvent>,
    worker: JoinHandle<()>,
}

impl GestureCollector {
    pub fn spawn(transport: Arc<dyn WorkflowTransport>, config: CollectorConfig) -> Self {
        let state = Arc::new(RwLock::new(CollectorState::default()));
        let (triggers, trigger_rx) = mpsc::unbounded_channel();
        let (events, _) = broadcast::channel(64);

        let worker = tokio::spawn(
            Worker {
                transport,
                config,
                state: state.clone(),
                events: events.clone(),
                release_task: None,
            }
            .run(trigger_rx),
        );

        Self {
            state,
            triggers,
            events,
            worker,
        }
    }

    pub async fn set_gesture(&self, gesture: Gesture) {
        self.state.write().await.input.gesture = gesture;
    }

    pub async fn set_command(&self, command: Command) {
        self.state.write().await.input.command = command;
    }

    pub async fn set_selected_text(&self, text: impl Into<String>) {
        self.state.write().await.input.selected_text = text.into();
    }

    /// Queues the current input for submission. Returns `false` when the
    /// trigger was dropped because a submission is still in flight.
    pub async fn trigger(&self) -> bool {
        let snapshot = {
            let state = self.state.read().await;
            if state.loading {
                debug!("trigger ignored while a workflow request is in flight");
                return false;
            }
            state.input.clone()
        };
        self.triggers.send(snapshot).is_ok()
    }

    pub async fn snapshot(&self) -> CollectorState {
        self.state.read().await.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CollectorEvent> {
        self.events.subscribe()
    }
}

impl Drop for GestureCollector {
    fn drop(&mut self) {
        self.worker.abort();
    }
}

struct Worker {
    transport: Arc<dyn WorkflowTransport>,
    config: CollectorConfig,
    state: Arc<RwLock<CollectorState>>,
    events: broadcast::Sender<CollectorEvent>,
    release_task: Option<JoinHandle<()>>,
}

impl Worker {
    async fn run(mut self, mut triggers: mpsc::UnboundedReceiver<GestureEvent>) {
        while let Some(mut pending) = triggers.recv().await {
            // Trailing edge: every trigger inside the window restarts it and
            // replaces the snapshot that will be sent.
            loop {
                match timeout(self.config.debounce, triggers.recv()).await {
                    Ok(Some(next)) => pending = next,
                    Ok(None) => return,
                    Err(_) => break,
                }
            }

            self.submit(pending).await;

            // Triggers that slipped in while loading are discarded, not replayed.
            while triggers.try_recv().is_ok() {}
        }
    }

    async fn submit(&mut self, event: GestureEvent) {
        self.state.write().await.loading = true;
        let _ = self.events.send(CollectorEvent::Submitted(event.clone()));
        info!(gesture = %event.gesture, command = %event.command, "submitting workflow");

        let outcome = self.transport.submit(&event).await;

        let mut state = self.state.write().await;
        state.loading = false;
        match outcome {
            Ok(result) => {
                state.output = Some(result.clone());
                state.last_result_at = Some(Utc::now());
                let kind = result.haptic_feedback;
                if !kind.is_silent() {
                    state.haptic_active = true;
                }
                drop(state);

                let _ = self.events.send(CollectorEvent::ResultReceived(result));
                if !kind.is_silent() {
                    self.pulse(kind);
                }
            }
            Err(err) => {
                drop(state);
                error!(error = %err, "workflow submission failed");
                let _ = self.events.send(CollectorEvent::SubmitFailed {
                    message: err.to_string(),
                });
            }
        }
    }

    fn pulse(&mut self, kind: HapticFeedback) {
        let _ = self.events.send(CollectorEvent::HapticPulse { kind });

        if let Some(previous) = self.release_task.take() {
            previous.abort();
        }
        let state = self.state.clone();
        let events = self.events.clone();
        let duration = self.config.haptic_pulse;
        self.release_task = Some(tokio::spawn(async move {
            sleep(duration).await;
            state.write().await.haptic_active = false;
            let _ = events.send(CollectorEvent::HapticReleased);
        }));
    }
}

#[cfg(test)]
#[path = "tests/collector_tests.rs"]
mod tests;
