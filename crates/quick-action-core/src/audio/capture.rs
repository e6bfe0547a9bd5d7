use crate::{CoreError, CoreResult};

use std::{
    panic::Location,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

use cpal::{
    Device, Stream, StreamConfig,
    traits::{DeviceTrait, HostTrait, StreamTrait},
};
use crossbeam_channel::{Receiver, TrySendError, bounded};
use error_location::ErrorLocation;
use tracing::{debug, error, info, instrument, warn};

/// Chunks buffered between the audio callback and the listener.
///
/// At typical callback sizes (10ms) this covers several seconds, enough to
/// ride out one transcription without dropping the start of the next phrase.
pub(crate) const CHUNK_CHANNEL_CAPACITY: usize = 1024;

/// Streams mono samples from the default input device.
///
/// `Stream` is `!Send` on some backends, so the capturer must stay on the
/// thread that created it.
pub struct AudioCapturer {
    device: Device,
    config: StreamConfig,
    stream: Option<Stream>,
    /// Tells the audio callback to stop forwarding before the stream drops.
    shutdown: Arc<AtomicBool>,
    dropped_chunks: Arc<AtomicUsize>,
}

impl AudioCapturer {
    /// Open the default input device with its default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NoMicrophoneFound`] when no input device exists.
    #[track_caller]
    #[instrument]
    pub fn new() -> CoreResult<Self> {
        let host = cpal::default_host();

        let device = host
            .default_input_device()
            .ok_or(CoreError::NoMicrophoneFound {
                location: ErrorLocation::from(Location::caller()),
            })?;

        let config = device
            .default_input_config()
            .map_err(|e| CoreError::DeviceError {
                reason: format!("Failed to get config: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        info!(
            device_id = ?device.id(),
            sample_rate = config.sample_rate(),
            channels = config.channels(),
            "AudioCapturer initialized"
        );

        Ok(Self {
            device,
            config: config.into(),
            stream: None,
            shutdown: Arc::new(AtomicBool::new(false)),
            dropped_chunks: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Start streaming. Each received chunk is already downmixed to mono.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn start(&mut self) -> CoreResult<Receiver<Vec<f32>>> {
        self.stop();

        let (chunk_tx, chunk_rx) = bounded(CHUNK_CHANNEL_CAPACITY);
        let shutdown = Arc::clone(&self.shutdown);
        let dropped = Arc::clone(&self.dropped_chunks);
        let channels = usize::from(self.config.channels);

        self.shutdown.store(false, Ordering::Release);

        let stream = self
            .device
            .build_input_stream(
                &self.config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if shutdown.load(Ordering::Acquire) {
                        return;
                    }
                    // A full channel means the listener is stuck in a long
                    // transcription; the newest chunk is dropped.
                    if let Err(TrySendError::Full(_)) = chunk_tx.try_send(downmix(data, channels)) {
                        dropped.fetch_add(1, Ordering::Relaxed);
                    }
                },
                |err| {
                    error!("Audio stream error: {}", err);
                },
                None,
            )
            .map_err(|e| CoreError::DeviceError {
                reason: format!("Failed to build stream: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        stream.play().map_err(|e| CoreError::DeviceError {
            reason: format!("Failed to start stream: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        self.stream = Some(stream);
        info!("Audio capture started");

        Ok(chunk_rx)
    }

    /// Stop streaming. The chunk receiver disconnects once the stream drops.
    pub fn stop(&mut self) {
        self.shutdown.store(true, Ordering::Release);

        if let Some(stream) = self.stream.take() {
            drop(stream);
            let dropped = self.dropped_chunks.swap(0, Ordering::Relaxed);
            if dropped > 0 {
                warn!(dropped_chunks = dropped, "Audio chunks dropped while listener was busy");
            }
            debug!("Audio capture stopped");
        }
    }

    /// Device sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate
    }
}

impl Drop for AudioCapturer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Average interleaved frames down to a single channel.
pub(crate) fn downmix(data: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return data.to_vec();
    }

    data.chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect()
}
