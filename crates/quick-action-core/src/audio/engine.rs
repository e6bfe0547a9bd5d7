use crate::{CoreError, CoreResult, voice::Transcriber};

use std::{panic::Location, path::Path};

use error_location::ErrorLocation;
use tracing::{debug, info, instrument};
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

/// Local whisper.cpp transcription engine.
pub struct SttEngine {
    ctx: WhisperContext,
}

impl SttEngine {
    /// Load the model at `model_path`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ModelNotFound`] if the file is missing, or
    /// [`CoreError::TranscriptionFailed`] if whisper rejects it.
    #[track_caller]
    #[instrument(skip(model_path))]
    pub fn new<P: AsRef<Path>>(model_path: P, use_gpu: bool) -> CoreResult<Self> {
        let path = model_path.as_ref();

        if !path.exists() {
            return Err(CoreError::ModelNotFound {
                path: path.to_path_buf(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let mut params = WhisperContextParameters::default();
        params.use_gpu(use_gpu);

        let ctx = WhisperContext::new_with_params(
            path.to_str().ok_or(CoreError::ModelNotFound {
                path: path.to_path_buf(),
                location: ErrorLocation::from(Location::caller()),
            })?,
            params,
        )
        .map_err(|e| CoreError::TranscriptionFailed {
            source: Box::new(e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!(model_path = ?path, use_gpu, "Whisper model loaded");

        Ok(Self { ctx })
    }
}

impl Transcriber for SttEngine {
    #[track_caller]
    #[instrument(skip(self, samples))]
    fn transcribe(&mut self, samples: &[f32], language: &str) -> CoreResult<String> {
        if samples.is_empty() {
            return Err(CoreError::NoAudioCaptured {
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });

        params.set_language(Some(language));
        params.set_print_progress(false);
        params.set_print_special(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);
        params.set_suppress_blank(true);
        params.set_suppress_nst(true);
        params.set_single_segment(true);

        let mut state = self
            .ctx
            .create_state()
            .map_err(|e| CoreError::TranscriptionFailed {
                source: Box::new(e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        state
            .full(params, samples)
            .map_err(|e| CoreError::TranscriptionFailed {
                source: Box::new(e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let num_segments = state.full_n_segments();
        let mut result = String::new();

        for i in 0..num_segments {
            let segment = state
                .get_segment(i)
                .ok_or_else(|| CoreError::TranscriptionFailed {
                    source: format!("Failed to get segment {}", i).into(),
                    location: ErrorLocation::from(Location::caller()),
                })?;

            result.push_str(&segment.to_string());
            result.push(' ');
        }

        let transcription = clean_transcript(&result);

        debug!(
            language,
            sample_count = samples.len(),
            segment_count = num_segments,
            text_len = transcription.len(),
            "Transcription complete"
        );

        Ok(transcription)
    }
}

/// Strip whisper's non-speech markers and trailing sentence punctuation.
///
/// Bracketed spans like `[BLANK_AUDIO]` or `(upbeat music)` are removed, so
/// a silent utterance comes back empty and counts as "nothing recognised".
pub(crate) fn clean_transcript(raw: &str) -> String {
    let mut spoken = String::with_capacity(raw.len());
    let mut depth = 0usize;

    for c in raw.chars() {
        match c {
            '[' | '(' => depth += 1,
            ']' | ')' => depth = depth.saturating_sub(1),
            _ if depth == 0 => spoken.push(c),
            _ => {}
        }
    }

    spoken
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_end_matches(['.', '!', '?', ','])
        .trim_end()
        .to_string()
}
