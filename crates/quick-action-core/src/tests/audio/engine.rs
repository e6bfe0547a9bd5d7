use crate::{CoreError, audio::SttEngine, audio::engine::clean_transcript, voice::Transcriber};

use std::path::PathBuf;

/// WHAT: SttEngine rejects a non-existent model path
/// WHY: A missing model must disable voice input, not crash later
#[test]
fn given_invalid_model_path_when_creating_engine_then_model_not_found_error() {
    // Given: Path to a model that does not exist
    let invalid_path = PathBuf::from("/nonexistent/model.bin");

    // When: Loading the engine
    let result = SttEngine::new(&invalid_path, false);

    // Then: ModelNotFound
    assert!(matches!(result, Err(CoreError::ModelNotFound { .. })));
}

/// WHAT: Blank-audio markers are stripped to nothing
/// WHY: Empty text triggers the fallback language instead of a bogus event
#[test]
fn given_blank_audio_marker_when_cleaning_then_empty() {
    assert_eq!(clean_transcript(" [BLANK_AUDIO] "), "");
    assert_eq!(clean_transcript("(upbeat music)"), "");
}

/// WHAT: Trailing sentence punctuation is removed, inner text kept
/// WHY: "open browser." must match the registry entry "open browser"
#[test]
fn given_sentence_punctuation_when_cleaning_then_trailing_marks_removed() {
    assert_eq!(clean_transcript(" open browser."), "open browser");
    assert_eq!(clean_transcript("set volume zwei!"), "set volume zwei");
    assert_eq!(clean_transcript("open  [noise]  mail"), "open mail");
}

/// WHAT: Empty samples cause NoAudioCaptured
/// WHY: Transcription should never run on nothing
#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
#[allow(clippy::unwrap_used)]
fn given_empty_samples_when_transcribing_then_no_audio_captured_error() {
    // Given: Engine with a real model
    let model_path = std::env::var("TEST_WHISPER_MODEL_PATH")
        .unwrap_or_else(|_| "models/ggml-base.bin".to_string());
    let mut engine = SttEngine::new(&model_path, false).unwrap();

    // When: Transcribing no samples
    let result = engine.transcribe(&[], "de");

    // Then: NoAudioCaptured
    assert!(matches!(result, Err(CoreError::NoAudioCaptured { .. })));
}
