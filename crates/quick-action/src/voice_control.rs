use crate::{AppResult, SessionEvent};

use quick_action_core::voice::VoiceCapture;

use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};
use uuid::Uuid;

/// What the coordinator needs from the voice pipeline.
pub trait VoiceControl {
    /// Start capturing; transcripts arrive as [`SessionEvent::Transcript`]
    /// tagged with `session_id`.
    fn start(&mut self, session_id: Uuid, events: mpsc::Sender<SessionEvent>) -> AppResult<()>;
    /// Stop capturing. No transcript is sent after this returns.
    fn stop(&mut self);
}

impl VoiceControl for VoiceCapture {
    fn start(&mut self, session_id: Uuid, events: mpsc::Sender<SessionEvent>) -> AppResult<()> {
        VoiceCapture::start(self, move |text| {
            match events.try_send(SessionEvent::Transcript { session_id, text }) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => warn!(%session_id, "Event queue full, transcript dropped"),
                Err(TrySendError::Closed(_)) => debug!(%session_id, "Coordinator gone, transcript dropped"),
            }
        })?;
        Ok(())
    }

    fn stop(&mut self) {
        // Joins the capture thread, which may be mid-transcription.
        tokio::task::block_in_place(|| VoiceCapture::stop(self));
    }
}

/// `None` means voice input is disabled; the launcher works typed-only.
impl<V: VoiceControl> VoiceControl for Option<V> {
    fn start(&mut self, session_id: Uuid, events: mpsc::Sender<SessionEvent>) -> AppResult<()> {
        match self {
            Some(voice) => voice.start(session_id, events),
            None => Ok(()),
        }
    }

    fn stop(&mut self) {
        if let Some(voice) = self {
            voice.stop();
        }
    }
}
