use crate::config::{
    DEFAULT_FALLBACK_LANGUAGE, DEFAULT_LISTEN_TIMEOUT_MS, DEFAULT_MIN_SPEECH_MS,
    DEFAULT_PHRASE_TIME_LIMIT_MS, DEFAULT_PRIMARY_LANGUAGE, DEFAULT_SILENCE_DURATION_MS,
    DEFAULT_VAD_AGGRESSIVENESS, default_true,
};

use quick_action_core::{
    audio::{SegmenterConfig, VadAggressiveness},
    voice::{NumberWords, VoiceCaptureConfig},
};

use std::{collections::BTreeMap, time::Duration};

use serde::{Deserialize, Serialize};

/// Voice capture configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    /// Start voice capture whenever the input window is shown.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Whisper language code tried first.
    pub primary_language: String,
    /// Whisper language code tried when the first attempt yields nothing.
    pub fallback_language: String,
    /// Longest wait for speech before the loop re-checks for stop.
    pub listen_timeout_ms: u64,
    /// Longest single utterance.
    pub phrase_time_limit_ms: u32,
    /// Voice activity detector noise rejection, 0 (lenient) to 3 (strict).
    pub vad_aggressiveness: u8,
    /// Trailing silence that ends an utterance.
    pub silence_duration_ms: u32,
    /// Shorter bursts of sound are ignored.
    pub min_speech_ms: u32,
    /// Per-language `{word: digit}` tables replacing the built-in ones.
    pub number_words: BTreeMap<String, BTreeMap<String, String>>,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            primary_language: DEFAULT_PRIMARY_LANGUAGE.to_string(),
            fallback_language: DEFAULT_FALLBACK_LANGUAGE.to_string(),
            listen_timeout_ms: DEFAULT_LISTEN_TIMEOUT_MS,
            phrase_time_limit_ms: DEFAULT_PHRASE_TIME_LIMIT_MS,
            vad_aggressiveness: DEFAULT_VAD_AGGRESSIVENESS,
            silence_duration_ms: DEFAULT_SILENCE_DURATION_MS,
            min_speech_ms: DEFAULT_MIN_SPEECH_MS,
            number_words: BTreeMap::new(),
        }
    }
}

impl VoiceConfig {
    /// Language policy and listen limit for the capture loop.
    pub fn capture_config(&self) -> VoiceCaptureConfig {
        VoiceCaptureConfig {
            primary_language: self.primary_language.clone(),
            fallback_language: self.fallback_language.clone(),
            listen_timeout: Duration::from_millis(self.listen_timeout_ms),
        }
    }

    /// Segmentation parameters for the microphone source.
    pub fn segmenter_config(&self) -> SegmenterConfig {
        SegmenterConfig {
            aggressiveness: VadAggressiveness::from_level(self.vad_aggressiveness),
            silence_ms: self.silence_duration_ms,
            max_phrase_ms: self.phrase_time_limit_ms,
            min_speech_ms: self.min_speech_ms,
            ..SegmenterConfig::default()
        }
    }

    /// Built-in tables with configured languages replaced wholesale.
    pub fn number_words(&self) -> NumberWords {
        let mut languages = NumberWords::default_languages();
        for (language, table) in &self.number_words {
            languages.insert(language.clone(), table.clone());
        }
        NumberWords::from_languages(&languages)
    }
}
