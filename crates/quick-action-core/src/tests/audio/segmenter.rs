use crate::audio::{
    EarshotDetector, SegmenterConfig, SpeechDetector, UtteranceSegmenter, VadAggressiveness,
    segmenter::vad_frame_ms,
};

const SAMPLES_PER_MS: usize = 16;

/// Treats any frame with a sample above 0.1 as speech.
struct LevelDetector;

impl SpeechDetector for LevelDetector {
    fn is_speech(&mut self, frame: &[f32]) -> bool {
        frame.iter().any(|s| s.abs() > 0.1)
    }
}

/// Hears nothing, however loud the frame.
struct DeafDetector;

impl SpeechDetector for DeafDetector {
    fn is_speech(&mut self, _frame: &[f32]) -> bool {
        false
    }
}

fn config() -> SegmenterConfig {
    SegmenterConfig {
        frame_ms: 20,
        aggressiveness: VadAggressiveness::Aggressive,
        silence_ms: 200,
        max_phrase_ms: 1_000,
        min_speech_ms: 100,
    }
}

fn segmenter() -> UtteranceSegmenter {
    UtteranceSegmenter::with_detector(&config(), Box::new(LevelDetector))
}

fn speech(ms: usize) -> Vec<f32> {
    (0..ms * SAMPLES_PER_MS)
        .map(|i| (i as f32 * 0.3).sin() * 0.5)
        .collect()
}

fn silence(ms: usize) -> Vec<f32> {
    vec![0.0; ms * SAMPLES_PER_MS]
}

/// WHAT: Pure silence never opens an utterance
/// WHY: The listen timeout must be able to fire during quiet periods
#[test]
fn given_only_silence_when_pushing_then_no_utterance_and_not_in_speech() {
    // Given: A segmenter
    let mut segmenter = segmenter();

    // When: Two seconds of silence arrive
    let result = segmenter.push(&silence(2_000));

    // Then: Nothing completes and no utterance is open
    assert!(result.is_none());
    assert!(!segmenter.in_speech());
}

/// WHAT: Speech followed by enough silence closes one utterance
/// WHY: Each spoken phrase becomes exactly one transcription request
#[test]
fn given_speech_then_silence_when_pushing_then_one_utterance_returned() {
    // Given: A segmenter fed 400ms of speech
    let mut segmenter = segmenter();
    assert!(segmenter.push(&speech(400)).is_none());
    assert!(segmenter.in_speech());

    // When: The trailing silence arrives
    let utterance = segmenter.push(&silence(300));

    // Then: The utterance holds the speech plus its silence tail
    let utterance = utterance.unwrap_or_default();
    assert!(utterance.len() >= 400 * SAMPLES_PER_MS);
    assert!(utterance.len() <= 700 * SAMPLES_PER_MS);
    assert!(!segmenter.in_speech());
}

/// WHAT: Continuous speech is cut at the phrase limit
/// WHY: A bounded phrase guarantees the loop re-checks its running flag
#[test]
fn given_continuous_speech_when_exceeding_phrase_limit_then_utterance_cut() {
    // Given: A segmenter with a one second phrase limit
    let mut segmenter = segmenter();

    // When: Three seconds of speech arrive at once
    let utterance = segmenter.push(&speech(3_000));

    // Then: The first utterance is exactly the phrase limit
    assert_eq!(utterance.map(|u| u.len()), Some(1_000 * SAMPLES_PER_MS));

    // And: The remaining buffered speech yields the next cut
    assert_eq!(segmenter.push(&[]).map(|u| u.len()), Some(1_000 * SAMPLES_PER_MS));
}

/// WHAT: A burst shorter than the minimum speech length is discarded
/// WHY: A single misclassified frame should not reach the transcriber
#[test]
fn given_short_speech_burst_when_silence_follows_then_discarded() {
    // Given: A 40ms burst (below the 100ms minimum)
    let mut segmenter = segmenter();
    segmenter.push(&speech(40));

    // When: Silence closes it
    let result = segmenter.push(&silence(300));

    // Then: No utterance is produced and the segmenter is ready again
    assert!(result.is_none());
    assert!(!segmenter.in_speech());
}

/// WHAT: Loud frames the detector rejects never open an utterance
/// WHY: Typing happens while capture runs; keystroke noise is loud but not speech
#[test]
fn given_loud_non_speech_when_detector_rejects_then_no_utterance() {
    // Given: A segmenter whose detector hears no speech
    let mut segmenter = UtteranceSegmenter::with_detector(&config(), Box::new(DeafDetector));

    // When: Loud clicks arrive, then silence
    let clicks: Vec<f32> = (0..2_000 * SAMPLES_PER_MS)
        .map(|i| if i % 400 < 40 { 0.9 } else { 0.0 })
        .collect();
    let during = segmenter.push(&clicks);
    let after = segmenter.push(&silence(500));

    // Then: Nothing opens and nothing is produced
    assert!(during.is_none());
    assert!(after.is_none());
    assert!(!segmenter.in_speech());
}

/// WHAT: Digital silence is not speech to the earshot detector
/// WHY: A quiet room must let the listen timeout fire
#[test]
fn given_silent_frames_when_classified_by_earshot_then_not_speech() {
    // Given: The real detector at every aggressiveness level
    for level in 0..=3 {
        let mut detector = EarshotDetector::new(VadAggressiveness::from_level(level));

        // When/Then: 10, 20 and 30ms of silence are rejected
        for ms in [10, 20, 30] {
            assert!(!detector.is_speech(&silence(ms)), "level {} frame {}ms", level, ms);
        }
    }
}

/// WHAT: Configured frame lengths snap to what the detector accepts
/// WHY: The detector rejects frames that are not 10, 20 or 30ms long
#[test]
fn given_arbitrary_frame_lengths_when_snapping_then_detector_sizes() {
    assert_eq!(vad_frame_ms(0), 10);
    assert_eq!(vad_frame_ms(10), 10);
    assert_eq!(vad_frame_ms(15), 20);
    assert_eq!(vad_frame_ms(20), 20);
    assert_eq!(vad_frame_ms(25), 30);
    assert_eq!(vad_frame_ms(100), 30);
}

/// WHAT: Config levels map onto the four profiles, clamping high values
/// WHY: The level comes from a user-edited config file
#[test]
fn given_levels_when_mapping_aggressiveness_then_profiles_in_order() {
    assert_eq!(VadAggressiveness::from_level(0), VadAggressiveness::Quality);
    assert_eq!(VadAggressiveness::from_level(1), VadAggressiveness::LowBitrate);
    assert_eq!(VadAggressiveness::from_level(2), VadAggressiveness::Aggressive);
    assert_eq!(VadAggressiveness::from_level(3), VadAggressiveness::VeryAggressive);
    assert_eq!(VadAggressiveness::from_level(9), VadAggressiveness::VeryAggressive);
}
