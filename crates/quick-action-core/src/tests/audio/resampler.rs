use crate::audio::{StreamResampler, resampler::WHISPER_SAMPLE_RATE};

/// One FFT block of output latency plus rounding.
const LENGTH_TOLERANCE: usize = 1_200;

fn tone(len: usize) -> Vec<f32> {
    (0..len).map(|i| (i as f32 * 0.05).sin() * 0.5).collect()
}

fn expected_len(input_len: usize, input_rate: u32) -> usize {
    input_len * WHISPER_SAMPLE_RATE as usize / input_rate as usize
}

/// WHAT: Callback-sized 48kHz chunks come out at about a third the length
/// WHY: The detector and whisper both need 16kHz input
#[test]
#[allow(clippy::unwrap_used)]
fn given_48khz_chunks_when_streaming_then_total_matches_whisper_rate() {
    // Given: A resampler for a 48kHz microphone and one second of 10ms chunks
    let mut resampler = StreamResampler::new(48_000).unwrap();
    let input = tone(48_000);

    // When: Feeding it chunk by chunk
    let mut output = Vec::new();
    for chunk in input.chunks(480) {
        output.extend(resampler.process(chunk).unwrap());
    }

    // Then: Close to one second at 16kHz, all samples finite
    let expected = expected_len(input.len(), 48_000);
    assert!(
        output.len() <= expected && expected - output.len() < LENGTH_TOLERANCE,
        "Expected ~{} samples, got {}",
        expected,
        output.len()
    );
    assert!(output.iter().all(|s| s.is_finite()));
}

/// WHAT: Chunks smaller than a block are held back, not zero-padded
/// WHY: Padding every small chunk would insert gaps into the speech
#[test]
#[allow(clippy::unwrap_used)]
fn given_chunk_smaller_than_block_when_streaming_then_held_until_block_fills() {
    // Given: A 44.1kHz resampler
    let mut resampler = StreamResampler::new(44_100).unwrap();

    // When: One short chunk arrives
    let first = resampler.process(&tone(441)).unwrap();

    // Then: Nothing is emitted yet
    assert!(first.is_empty());

    // When: Enough further chunks arrive to complete several blocks
    let mut later = Vec::new();
    for _ in 0..20 {
        later.extend(resampler.process(&tone(441)).unwrap());
    }

    // Then: Output appears, bounded by the input duration
    assert!(!later.is_empty());
    assert!(later.len() <= expected_len(441 * 21, 44_100));
}

/// WHAT: Uneven chunking yields the same amount of audio as one big chunk
/// WHY: Callback sizes vary by backend; the result must not depend on them
#[test]
#[allow(clippy::unwrap_used)]
fn given_uneven_chunks_when_streaming_then_same_length_as_single_chunk() {
    // Given: The same signal, once whole and once in odd-sized pieces
    let input = tone(48_000);
    let mut whole = StreamResampler::new(48_000).unwrap();
    let mut pieces = StreamResampler::new(48_000).unwrap();

    // When: Resampling both ways
    let whole_out = whole.process(&input).unwrap();
    let mut pieces_out = Vec::new();
    for chunk in input.chunks(333) {
        pieces_out.extend(pieces.process(chunk).unwrap());
    }

    // Then: Identical lengths
    assert_eq!(whole_out.len(), pieces_out.len());
}

/// WHAT: An empty chunk produces nothing
/// WHY: The listener drains the segmenter with empty pushes
#[test]
#[allow(clippy::unwrap_used)]
fn given_empty_chunk_when_streaming_then_empty_output() {
    let mut resampler = StreamResampler::new(48_000).unwrap();

    assert!(resampler.process(&[]).unwrap().is_empty());
}
