use crate::audio::capture::downmix;

/// WHAT: Stereo frames are averaged into mono
/// WHY: The segmenter and whisper both expect a single channel
#[test]
fn given_stereo_frames_when_downmixing_then_channels_averaged() {
    // Given: Two interleaved stereo frames
    let data = [1.0f32, -1.0, 0.5, 0.5];

    // When: Downmixing with two channels
    let mono = downmix(&data, 2);

    // Then: One sample per frame, averaged
    assert_eq!(mono, vec![0.0, 0.5]);
}

/// WHAT: Mono input passes through unchanged
/// WHY: Avoids needless averaging for the common single-channel mic
#[test]
fn given_mono_samples_when_downmixing_then_unchanged() {
    // Given: Mono samples
    let data = [0.1f32, 0.2, 0.3];

    // When: Downmixing with one channel
    let mono = downmix(&data, 1);

    // Then: Identical output
    assert_eq!(mono, data.to_vec());
}

/// WHAT: A trailing partial frame is still averaged over what is present
/// WHY: Callbacks may deliver buffers that are not a multiple of channels
#[test]
fn given_partial_trailing_frame_when_downmixing_then_partial_frame_averaged() {
    // Given: Three samples of a stereo stream
    let data = [0.2f32, 0.4, 0.6];

    // When: Downmixing
    let mono = downmix(&data, 2);

    // Then: The lone trailing sample is kept as-is
    assert_eq!(mono.len(), 2);
    assert!((mono[0] - 0.3).abs() < f32::EPSILON);
    assert!((mono[1] - 0.6).abs() < f32::EPSILON);
}
