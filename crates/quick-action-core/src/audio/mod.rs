//! Microphone input, speech detection and local transcription.

pub(crate) mod capture;
pub(crate) mod engine;
pub(crate) mod resampler;
pub(crate) mod segmenter;
mod source;
pub(crate) mod vad;

pub(crate) use capture::AudioCapturer;

pub use {
    engine::SttEngine,
    resampler::StreamResampler,
    segmenter::{SegmenterConfig, UtteranceSegmenter},
    source::MicrophoneSource,
    vad::{EarshotDetector, SpeechDetector, VadAggressiveness},
};
