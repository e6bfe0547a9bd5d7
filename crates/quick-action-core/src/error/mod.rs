use std::{panic::Location, path::PathBuf};

use error_location::ErrorLocation;
use thiserror::Error;

/// Core errors with source location tracking.
#[derive(Error, Debug)]
pub enum CoreError {
    /// No audio input device found.
    #[error("No microphone found {location}")]
    NoMicrophoneFound {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Whisper model file not found at specified path.
    #[error("Model not found at path: {path:?} {location}")]
    ModelNotFound {
        /// Path to the missing model file.
        path: PathBuf,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Transcription process failed.
    #[error("Transcription failed: {source} {location}")]
    TranscriptionFailed {
        /// Underlying error from whisper-rs.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// No audio data captured or provided.
    #[error("No audio captured {location}")]
    NoAudioCaptured {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Audio device operation failed.
    #[error("Audio device error: {reason} {location}")]
    DeviceError {
        /// Description of the device error.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Audio resampling failed.
    #[error("Resampling error: {reason} {location}")]
    ResamplingError {
        /// Description of the resampling error.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A required registry field was empty.
    #[error("Invalid command entry: {field} must not be empty {location}")]
    Validation {
        /// Name of the offending field.
        field: &'static str,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The command store could not be opened or migrated.
    #[error("Command store unavailable at {path:?}: {source} {location}")]
    StoreUnavailable {
        /// Path of the store that failed to open.
        path: PathBuf,
        /// Underlying SQLite error.
        #[source]
        source: rusqlite::Error,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A single registry statement failed.
    #[error("Command store query failed: {source} {location}")]
    StoreQuery {
        /// Underlying SQLite error.
        #[source]
        source: rusqlite::Error,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A resolved command could not be started.
    #[error("Failed to launch `{command}`: {source} {location}")]
    LaunchFailed {
        /// The command text that failed to start.
        command: String,
        /// Underlying process spawn error.
        #[source]
        source: std::io::Error,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

// Manual From with location tracking.
// Cannot use #[from] because it does not support extra fields.
impl From<rusqlite::Error> for CoreError {
    #[track_caller]
    fn from(source: rusqlite::Error) -> Self {
        CoreError::StoreQuery {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

/// Result type alias using [`CoreError`].
pub type Result<T> = std::result::Result<T, CoreError>;
