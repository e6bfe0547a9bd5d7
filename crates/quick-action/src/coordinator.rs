//! Session state machine.
//!
//! The coordinator is the only writer of [`SessionState`]. Hotkey presses,
//! keystrokes, transcripts and tray actions all arrive as [`SessionEvent`]s
//! on one channel and are handled one at a time, in arrival order.

use crate::{
    Notifier, SessionEvent, SessionState,
    surface::Surface,
    voice_control::VoiceControl,
};

use quick_action_core::dispatch::DispatchEngine;

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// Committed input that opens command management instead of dispatching.
pub const MANAGEMENT_SENTINEL: &str = "11";

/// Owner of the launcher session: visibility, input buffer and capture.
///
/// `S` is the window and `V` the voice pipeline, both swapped for fakes in
/// tests.
pub struct SessionCoordinator<S, V> {
    state: SessionState,
    surface: S,
    voice: V,
    dispatch: DispatchEngine,
    notifier: Arc<dyn Notifier>,
    events: mpsc::Sender<SessionEvent>,
}

impl<S: Surface, V: VoiceControl> SessionCoordinator<S, V> {
    /// `events` is handed to the voice pipeline so transcripts come back
    /// through the same queue as every other event.
    pub fn new(
        surface: S,
        voice: V,
        dispatch: DispatchEngine,
        notifier: Arc<dyn Notifier>,
        events: mpsc::Sender<SessionEvent>,
    ) -> Self {
        Self {
            state: SessionState::default(),
            surface,
            voice,
            dispatch,
            notifier,
            events,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Apply one event. Returns `false` once shutdown has been handled.
    #[instrument(skip(self), fields(visible = self.state.visible))]
    pub fn handle(&mut self, event: SessionEvent) -> bool {
        match event {
            SessionEvent::Toggle => {
                if self.state.visible {
                    self.dismiss();
                } else {
                    self.activate();
                }
            }
            SessionEvent::Typed(text) if self.state.visible => {
                self.state.buffer.push_str(&text);
                self.surface.render(&self.state.buffer);
            }
            SessionEvent::Backspace if self.state.visible => {
                self.state.buffer.pop();
                self.surface.render(&self.state.buffer);
            }
            SessionEvent::Commit if self.state.visible => self.commit(),
            SessionEvent::Escape | SessionEvent::FocusLost if self.state.visible => {
                self.dismiss();
            }
            SessionEvent::Transcript { session_id, text } => self.transcript(session_id, &text),
            SessionEvent::OpenManagement => self.open_management(),
            SessionEvent::Shutdown => {
                if self.state.visible {
                    self.dismiss();
                }
                info!("Coordinator shut down");
                return false;
            }
            ignored => debug!(event = ?ignored, "Ignored while hidden"),
        }

        true
    }

    fn activate(&mut self) {
        let session_id = Uuid::new_v4();

        self.state.visible = true;
        self.state.buffer.clear();
        self.state.session_id = Some(session_id);

        self.surface.render("");
        self.surface.show();
        self.surface.focus();

        if let Err(e) = self.voice.start(session_id, self.events.clone()) {
            warn!(%session_id, error = ?e, "Voice capture unavailable for this session");
        }
        self.state.capturing = true;
        self.surface.set_listening(true);

        info!(%session_id, "Session shown");
    }

    fn dismiss(&mut self) {
        self.state.buffer.clear();

        if self.state.capturing {
            self.voice.stop();
            self.state.capturing = false;
            self.surface.set_listening(false);
        }

        self.state.visible = false;
        self.surface.render("");
        self.surface.hide();

        if let Some(session_id) = self.state.session_id.take() {
            info!(%session_id, "Session hidden");
        }
    }

    fn commit(&mut self) {
        let input = std::mem::take(&mut self.state.buffer);
        let session_id = self.state.session_id;

        if input == MANAGEMENT_SENTINEL {
            self.surface.render("");
            self.open_management();
            return;
        }

        match self.dispatch.execute(&input) {
            Ok(report) => {
                info!(
                    session_id = ?session_id,
                    matches = report.matched,
                    launched = report.launched,
                    "Committed input dispatched"
                );
                for failure in &report.failures {
                    self.notifier.launch_failed(failure);
                }
            }
            Err(e) => {
                error!(session_id = ?session_id, error = ?e, "Dispatch failed");
                self.notifier.launch_failed(&e);
            }
        }

        self.dismiss();
    }

    fn transcript(&mut self, session_id: Uuid, text: &str) {
        if !self.state.visible || self.state.session_id != Some(session_id) {
            debug!(%session_id, "Dropping transcript from an inactive session");
            return;
        }

        self.state.append(text);
        self.surface.render(&self.state.buffer);
        self.surface.focus();
    }

    fn open_management(&mut self) {
        if let Err(e) = self.surface.open_management() {
            error!(error = ?e, "Failed to open command management");
        }
    }
}
