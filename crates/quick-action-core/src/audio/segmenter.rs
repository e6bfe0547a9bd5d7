//! VAD-driven utterance segmentation.
//!
//! Audio at 16 kHz is cut into fixed frames and each frame is classified by
//! a [`SpeechDetector`]. An utterance opens on the first speech frame and
//! closes after a run of non-speech frames or at the phrase length limit.

use crate::audio::{
    resampler::WHISPER_SAMPLE_RATE,
    vad::{EarshotDetector, SpeechDetector, VadAggressiveness},
};

/// Segmentation parameters. Samples are always at the whisper rate.
#[derive(Debug, Clone)]
pub struct SegmenterConfig {
    /// Frame length for the speech decision, snapped to 10, 20 or 30 ms.
    pub frame_ms: u32,
    /// Noise rejection level of the detector.
    pub aggressiveness: VadAggressiveness,
    /// Trailing silence that closes an utterance.
    pub silence_ms: u32,
    /// Hard cap on utterance length.
    pub max_phrase_ms: u32,
    /// Utterances with less speech than this are discarded as noise.
    pub min_speech_ms: u32,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            frame_ms: 30,
            aggressiveness: VadAggressiveness::default(),
            silence_ms: 700,
            max_phrase_ms: 8_000,
            min_speech_ms: 200,
        }
    }
}

/// Frame lengths the detector accepts.
pub(crate) fn vad_frame_ms(frame_ms: u32) -> u32 {
    match frame_ms {
        0..=10 => 10,
        11..=20 => 20,
        _ => 30,
    }
}

/// Splits a continuous 16 kHz sample stream into utterances.
pub struct UtteranceSegmenter {
    detector: Box<dyn SpeechDetector>,
    frame_len: usize,
    silence_limit_frames: usize,
    max_samples: usize,
    min_speech_frames: usize,
    pending: Vec<f32>,
    speech: Vec<f32>,
    in_speech: bool,
    silence_frames: usize,
    speech_frames: usize,
}

impl UtteranceSegmenter {
    /// Segmenter backed by the earshot detector.
    pub fn new(config: &SegmenterConfig) -> Self {
        Self::with_detector(config, Box::new(EarshotDetector::new(config.aggressiveness)))
    }

    /// Segmenter with a caller-supplied frame classifier.
    pub fn with_detector(config: &SegmenterConfig, detector: Box<dyn SpeechDetector>) -> Self {
        let frame_ms = vad_frame_ms(config.frame_ms);
        let rate = WHISPER_SAMPLE_RATE as usize;
        let frames_in = |ms: u32| (ms as usize).div_ceil(frame_ms as usize);

        Self {
            detector,
            frame_len: rate * frame_ms as usize / 1000,
            silence_limit_frames: frames_in(config.silence_ms).max(1),
            max_samples: rate * config.max_phrase_ms as usize / 1000,
            min_speech_frames: frames_in(config.min_speech_ms),
            pending: Vec::new(),
            speech: Vec::new(),
            in_speech: false,
            silence_frames: 0,
            speech_frames: 0,
        }
    }

    /// Whether an utterance is currently open.
    pub fn in_speech(&self) -> bool {
        self.in_speech
    }

    /// Feed samples; returns the first utterance they complete, if any.
    ///
    /// Samples past a completed utterance stay buffered for the next call,
    /// so `push(&[])` drains them.
    pub fn push(&mut self, samples: &[f32]) -> Option<Vec<f32>> {
        self.pending.extend_from_slice(samples);

        let mut consumed = 0;
        let mut completed = None;

        while self.pending.len() - consumed >= self.frame_len {
            let frame = self.pending[consumed..consumed + self.frame_len].to_vec();
            consumed += self.frame_len;

            if let Some(utterance) = self.process_frame(frame) {
                completed = Some(utterance);
                break;
            }
        }

        self.pending.drain(..consumed);
        completed
    }

    fn process_frame(&mut self, frame: Vec<f32>) -> Option<Vec<f32>> {
        let is_speech = self.detector.is_speech(&frame);

        if is_speech {
            self.in_speech = true;
            self.silence_frames = 0;
            self.speech_frames += 1;
            self.speech.extend_from_slice(&frame);
        } else if self.in_speech {
            self.silence_frames += 1;
            self.speech.extend_from_slice(&frame);
        } else {
            return None;
        }

        let closed_by_silence = self.silence_frames >= self.silence_limit_frames;
        let closed_by_length = self.max_samples > 0 && self.speech.len() >= self.max_samples;
        if !(closed_by_silence || closed_by_length) {
            return None;
        }

        let utterance = std::mem::take(&mut self.speech);
        let speech_frames = self.speech_frames;
        self.in_speech = false;
        self.silence_frames = 0;
        self.speech_frames = 0;

        (speech_frames >= self.min_speech_frames).then_some(utterance)
    }
}
