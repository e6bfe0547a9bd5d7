use crate::{
    CoreError, CoreResult,
    audio::{
        AudioCapturer, SegmenterConfig, StreamResampler, UtteranceSegmenter,
        resampler::WHISPER_SAMPLE_RATE,
    },
    voice::UtteranceSource,
};

use std::{
    panic::Location,
    sync::atomic::{AtomicBool, Ordering},
    time::{Duration, Instant},
};

use crossbeam_channel::{Receiver, RecvTimeoutError};
use error_location::ErrorLocation;
use tracing::{debug, info, instrument};

/// How often a blocked listener re-checks its `running` flag.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Utterances from the default microphone at the whisper rate.
///
/// Each chunk is resampled as it arrives, so the detector and the
/// transcriber both see 16 kHz audio.
pub struct MicrophoneSource {
    /// Owns the stream; dropping it disconnects `chunks`.
    _capturer: AudioCapturer,
    chunks: Receiver<Vec<f32>>,
    segmenter: UtteranceSegmenter,
    resampler: Option<StreamResampler>,
}

impl MicrophoneSource {
    /// Open the default input device and start streaming.
    #[track_caller]
    #[instrument(skip(segmentation))]
    pub fn open(segmentation: &SegmenterConfig) -> CoreResult<Self> {
        let mut capturer = AudioCapturer::new()?;
        let sample_rate = capturer.sample_rate();

        let resampler = if sample_rate != WHISPER_SAMPLE_RATE {
            debug!(
                input_rate = sample_rate,
                output_rate = WHISPER_SAMPLE_RATE,
                "Resampler configured"
            );
            Some(StreamResampler::new(sample_rate)?)
        } else {
            None
        };

        let segmenter = UtteranceSegmenter::new(segmentation);

        let chunks = capturer.start()?;

        info!(sample_rate, "Microphone listening");

        Ok(Self {
            _capturer: capturer,
            chunks,
            segmenter,
            resampler,
        })
    }

    fn resample_chunk(&mut self, chunk: Vec<f32>) -> CoreResult<Vec<f32>> {
        match self.resampler {
            Some(ref mut resampler) => resampler.process(&chunk),
            None => Ok(chunk),
        }
    }
}

impl UtteranceSource for MicrophoneSource {
    #[track_caller]
    fn next_utterance(
        &mut self,
        running: &AtomicBool,
        timeout: Duration,
    ) -> CoreResult<Option<Vec<f32>>> {
        let deadline = Instant::now() + timeout;

        // Leftover samples from the previous call may already hold a phrase.
        if let Some(samples) = self.segmenter.push(&[]) {
            return Ok(Some(samples));
        }

        loop {
            if !running.load(Ordering::Acquire) {
                return Ok(None);
            }

            if !self.segmenter.in_speech() && Instant::now() >= deadline {
                return Ok(None);
            }

            match self.chunks.recv_timeout(POLL_INTERVAL) {
                Ok(chunk) => {
                    let chunk = self.resample_chunk(chunk)?;
                    if let Some(samples) = self.segmenter.push(&chunk) {
                        debug!(sample_count = samples.len(), "Utterance captured");
                        return Ok(Some(samples));
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(CoreError::DeviceError {
                        reason: "Audio stream closed".to_string(),
                        location: ErrorLocation::from(Location::caller()),
                    });
                }
            }
        }
    }
}
