use crate::{
    CoreError, CoreResult,
    voice::{NumberWords, Transcriber, UtteranceSource, normalize},
};

use std::{
    panic::Location,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread::JoinHandle,
    time::Duration,
};

use error_location::ErrorLocation;
use tracing::{debug, error, info, instrument, warn};

/// Opens the audio source on the capture thread.
pub type SourceFactory = Arc<dyn Fn() -> CoreResult<Box<dyn UtteranceSource>> + Send + Sync>;

/// Language policy and listening limits for the capture loop.
#[derive(Debug, Clone)]
pub struct VoiceCaptureConfig {
    /// Tried first for every utterance.
    pub primary_language: String,
    /// Tried when the primary attempt fails or comes back empty.
    pub fallback_language: String,
    /// How long one wait for speech may last before `running` is re-checked.
    pub listen_timeout: Duration,
}

/// Background listen/transcribe loop with cooperative cancellation.
///
/// At most one loop runs at a time. The transcriber is moved into the loop
/// thread and handed back through its `JoinHandle`, so `stop` always
/// recovers it for the next `start`.
pub struct VoiceCapture {
    config: VoiceCaptureConfig,
    words: Arc<NumberWords>,
    open_source: SourceFactory,
    transcriber: Option<Box<dyn Transcriber>>,
    running: Arc<AtomicBool>,
    worker: Option<JoinHandle<Box<dyn Transcriber>>>,
}

impl VoiceCapture {
    /// Idle pipeline. `open_source` is called on the capture thread at
    /// every `start`, so device handles never cross threads.
    pub fn new(
        config: VoiceCaptureConfig,
        words: NumberWords,
        open_source: SourceFactory,
        transcriber: Box<dyn Transcriber>,
    ) -> Self {
        Self {
            config,
            words: Arc::new(words),
            open_source,
            transcriber: Some(transcriber),
            running: Arc::new(AtomicBool::new(false)),
            worker: None,
        }
    }

    #[cfg(test)]
    pub(crate) fn is_running(&self) -> bool {
        self.worker.is_some() && self.running.load(Ordering::Acquire)
    }

    /// Start a capture loop delivering normalized text to `on_result`.
    ///
    /// A loop that is already running is stopped and joined first.
    /// `on_result` runs on the capture thread and must only forward.
    ///
    /// # Errors
    ///
    /// Fails if the transcriber was lost to a panicked loop, or the thread
    /// cannot be spawned.
    #[track_caller]
    #[instrument(skip(self, on_result))]
    pub fn start<F>(&mut self, on_result: F) -> CoreResult<()>
    where
        F: Fn(String) + Send + 'static,
    {
        if self.worker.is_some() {
            debug!("Capture loop already active, restarting");
            self.stop();
        }

        let transcriber = self
            .transcriber
            .take()
            .ok_or_else(|| CoreError::TranscriptionFailed {
                source: "speech engine was lost by a crashed capture loop".into(),
                location: ErrorLocation::from(Location::caller()),
            })?;

        // Fresh flag per loop: a late store from an old loop cannot revive it.
        let running = Arc::new(AtomicBool::new(true));
        self.running = Arc::clone(&running);

        let loop_state = CaptureLoop {
            running,
            config: self.config.clone(),
            words: Arc::clone(&self.words),
            open_source: Arc::clone(&self.open_source),
        };

        let worker = std::thread::Builder::new()
            .name("voice-capture".to_string())
            .spawn(move || loop_state.run(transcriber, on_result))
            .map_err(|e| CoreError::DeviceError {
                reason: format!("Failed to spawn capture thread: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        self.worker = Some(worker);
        info!("Voice capture started");

        Ok(())
    }

    /// Stop the loop and wait for it to exit.
    ///
    /// Once this returns, `on_result` will not be called again.
    #[instrument(skip(self))]
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Release);

        let Some(worker) = self.worker.take() else {
            return;
        };

        match worker.join() {
            Ok(transcriber) => {
                self.transcriber = Some(transcriber);
                info!("Voice capture stopped");
            }
            Err(_) => error!("Capture thread panicked; voice input disabled"),
        }
    }
}

impl Drop for VoiceCapture {
    fn drop(&mut self) {
        self.stop();
    }
}

struct CaptureLoop {
    running: Arc<AtomicBool>,
    config: VoiceCaptureConfig,
    words: Arc<NumberWords>,
    open_source: SourceFactory,
}

impl CaptureLoop {
    fn run<F>(self, mut transcriber: Box<dyn Transcriber>, on_result: F) -> Box<dyn Transcriber>
    where
        F: Fn(String),
    {
        let mut source = match (self.open_source)() {
            Ok(source) => source,
            Err(e) => {
                error!(error = ?e, "Failed to open audio source");
                self.running.store(false, Ordering::Release);
                return transcriber;
            }
        };

        while self.running.load(Ordering::Acquire) {
            let samples = match source.next_utterance(&self.running, self.config.listen_timeout) {
                Ok(Some(samples)) => samples,
                Ok(None) => continue,
                Err(e) => {
                    error!(error = ?e, "Audio source failed, stopping capture loop");
                    self.running.store(false, Ordering::Release);
                    break;
                }
            };

            let Some(text) = transcribe_with_fallback(
                transcriber.as_mut(),
                &samples,
                &self.config.primary_language,
                &self.config.fallback_language,
            ) else {
                continue;
            };

            let text = normalize(&text, &self.words);

            // Checked after the slow transcription: stop may have begun.
            if self.running.load(Ordering::Acquire) {
                debug!(text_len = text.len(), "Transcript ready");
                on_result(text);
            }
        }

        transcriber
    }
}

/// Transcribe in `primary`, falling back to `fallback` when the primary
/// attempt errors or returns blank text. `None` means nothing was recognised.
pub fn transcribe_with_fallback(
    transcriber: &mut dyn Transcriber,
    samples: &[f32],
    primary: &str,
    fallback: &str,
) -> Option<String> {
    for language in [primary, fallback] {
        match transcriber.transcribe(samples, language) {
            Ok(text) if !text.trim().is_empty() => return Some(text.trim().to_string()),
            Ok(_) => debug!(language, "Empty transcription"),
            Err(e) => warn!(language, error = ?e, "Transcription attempt failed"),
        }
    }

    None
}
