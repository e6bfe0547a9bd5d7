//! Frame-level speech detection.

use earshot::{VoiceActivityDetector, VoiceActivityProfile};
use tracing::trace;

/// Decides whether one 16 kHz frame contains speech.
pub trait SpeechDetector: Send {
    /// Classify `frame`. Frames are 10, 20 or 30 ms of mono audio.
    fn is_speech(&mut self, frame: &[f32]) -> bool;
}

/// How eagerly non-speech noise is rejected.
///
/// Higher levels trade quiet or clipped speech for fewer false triggers
/// from keystrokes and room noise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VadAggressiveness {
    /// Fewest missed words.
    Quality,
    /// Tuned for low-bitrate speech.
    LowBitrate,
    /// Balanced default.
    #[default]
    Aggressive,
    /// Strongest noise rejection.
    VeryAggressive,
}

impl VadAggressiveness {
    /// Map a `0..=3` level; anything above 3 is the most aggressive.
    pub fn from_level(level: u8) -> Self {
        match level {
            0 => Self::Quality,
            1 => Self::LowBitrate,
            2 => Self::Aggressive,
            _ => Self::VeryAggressive,
        }
    }

    fn profile(self) -> VoiceActivityProfile {
        match self {
            Self::Quality => VoiceActivityProfile::QUALITY,
            Self::LowBitrate => VoiceActivityProfile::LBR,
            Self::Aggressive => VoiceActivityProfile::AGGRESSIVE,
            Self::VeryAggressive => VoiceActivityProfile::VERY_AGGRESSIVE,
        }
    }
}

/// WebRTC-style detector from the `earshot` crate.
pub struct EarshotDetector {
    detector: VoiceActivityDetector,
    scratch: Vec<i16>,
}

impl EarshotDetector {
    /// Detector with the given noise rejection level.
    pub fn new(aggressiveness: VadAggressiveness) -> Self {
        Self {
            detector: VoiceActivityDetector::new(aggressiveness.profile()),
            scratch: Vec::new(),
        }
    }
}

impl SpeechDetector for EarshotDetector {
    fn is_speech(&mut self, frame: &[f32]) -> bool {
        self.scratch.clear();
        self.scratch
            .extend(frame.iter().map(|s| (s.clamp(-1.0, 1.0) * 32_767.0) as i16));

        match self.detector.predict_16khz(&self.scratch) {
            Ok(speech) => speech,
            Err(_) => {
                trace!(frame_len = frame.len(), "Frame length rejected by VAD");
                false
            }
        }
    }
}
