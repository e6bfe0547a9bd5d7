//! Streaming conversion from the device rate to the whisper rate.

use crate::{CoreError, CoreResult};

use std::panic::Location;

use audioadapter_buffers::direct::InterleavedSlice;
use error_location::ErrorLocation;
use rubato::{Fft, FixedSync, Resampler as RubatoResampler};
use tracing::{debug, instrument};

/// Sample rate whisper and the VAD expect.
pub(crate) const WHISPER_SAMPLE_RATE: u32 = 16_000;

/// Input frames per FFT block.
const BLOCK_FRAMES: usize = 1024;

/// Resamples microphone chunks as they arrive.
///
/// Callback chunks rarely line up with the FFT block size. Whatever does
/// not fill a block is carried into the next call rather than zero-padded,
/// so the output is one continuous signal across chunk boundaries.
pub struct StreamResampler {
    resampler: Fft<f32>,
    carry: Vec<f32>,
    block_out: Vec<f32>,
}

impl StreamResampler {
    /// Converter from `input_rate` to [`WHISPER_SAMPLE_RATE`].
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ResamplingError`] if rubato rejects the ratio.
    #[track_caller]
    #[instrument]
    pub fn new(input_rate: u32) -> CoreResult<Self> {
        let resampler = Fft::<f32>::new(
            input_rate as usize,
            WHISPER_SAMPLE_RATE as usize,
            BLOCK_FRAMES,
            2, // sub_chunks
            1, // mono
            FixedSync::Input,
        )
        .map_err(|e| CoreError::ResamplingError {
            reason: format!("Failed to create resampler: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let block_out = vec![0.0; resampler.output_frames_max()];

        debug!(
            input_rate,
            output_rate = WHISPER_SAMPLE_RATE,
            "Stream resampler ready"
        );

        Ok(Self {
            resampler,
            carry: Vec::with_capacity(BLOCK_FRAMES * 2),
            block_out,
        })
    }

    /// Resample `chunk`, returning every output sample now available.
    ///
    /// May return nothing while less than one block is buffered.
    #[track_caller]
    pub fn process(&mut self, chunk: &[f32]) -> CoreResult<Vec<f32>> {
        self.carry.extend_from_slice(chunk);

        let mut output = Vec::new();
        let mut consumed = 0;

        loop {
            let needed = self.resampler.input_frames_next();
            if self.carry.len() - consumed < needed {
                break;
            }

            let block = &self.carry[consumed..consumed + needed];
            let input = InterleavedSlice::new(block, 1, needed).map_err(|e| {
                CoreError::ResamplingError {
                    reason: format!("Failed to wrap input block: {}", e),
                    location: ErrorLocation::from(Location::caller()),
                }
            })?;

            let out_frames = self.block_out.len();
            let mut out = InterleavedSlice::new_mut(&mut self.block_out, 1, out_frames)
                .map_err(|e| CoreError::ResamplingError {
                    reason: format!("Failed to wrap output block: {}", e),
                    location: ErrorLocation::from(Location::caller()),
                })?;

            let (_, written) = self
                .resampler
                .process_into_buffer(&input, &mut out, None)
                .map_err(|e| CoreError::ResamplingError {
                    reason: format!("Resampling failed: {}", e),
                    location: ErrorLocation::from(Location::caller()),
                })?;

            output.extend_from_slice(&self.block_out[..written]);
            consumed += needed;
        }

        self.carry.drain(..consumed);
        Ok(output)
    }
}
