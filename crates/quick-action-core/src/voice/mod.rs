//! Continuous voice capture: utterance in, normalized text out.

mod capture;
mod normalizer;

pub use {
    capture::{SourceFactory, VoiceCapture, VoiceCaptureConfig, transcribe_with_fallback},
    normalizer::{DEFAULT_NUMBER_WORDS, NumberWords, normalize},
};

use crate::CoreResult;

use std::{sync::atomic::AtomicBool, time::Duration};

/// Speech-to-text boundary.
pub trait Transcriber: Send {
    /// Transcribe 16 kHz mono `samples` as `language` (e.g. `"de"`).
    fn transcribe(&mut self, samples: &[f32], language: &str) -> CoreResult<String>;
}

/// Audio boundary handing out one utterance at a time.
///
/// Implementations may hold `!Send` device handles; they are created and
/// dropped on the capture thread.
pub trait UtteranceSource {
    /// Wait for the next utterance.
    ///
    /// Returns `Ok(None)` when no speech started within `timeout`, or as soon
    /// as `running` is cleared.
    fn next_utterance(
        &mut self,
        running: &AtomicBool,
        timeout: Duration,
    ) -> CoreResult<Option<Vec<f32>>>;
}
