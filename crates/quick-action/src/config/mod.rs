mod hotkey_config;
mod launcher_config;
#[allow(clippy::module_inception)]
mod config;
mod registry_config;
mod voice_config;
mod whisper_config;

pub(crate) use {
    config::Config, hotkey_config::HotkeyConfig, launcher_config::LauncherConfig,
    registry_config::RegistryConfig, voice_config::VoiceConfig, whisper_config::WhisperConfig,
};

use std::path::PathBuf;

use directories::ProjectDirs;

pub(crate) const DEFAULT_HOTKEY: &str = "alt+space";
pub(crate) const DEFAULT_PRIMARY_LANGUAGE: &str = "de";
pub(crate) const DEFAULT_FALLBACK_LANGUAGE: &str = "en";
pub(crate) const DEFAULT_LISTEN_TIMEOUT_MS: u64 = 3_000;
pub(crate) const DEFAULT_PHRASE_TIME_LIMIT_MS: u32 = 8_000;
pub(crate) const DEFAULT_VAD_AGGRESSIVENESS: u8 = 2;
pub(crate) const DEFAULT_SILENCE_DURATION_MS: u32 = 700;
pub(crate) const DEFAULT_MIN_SPEECH_MS: u32 = 200;
pub(crate) const DEFAULT_MODEL_FILE: &str = "ggml-base.bin";
pub(crate) const DEFAULT_DATABASE_FILE: &str = "actions.db";

/// Platform project directories for config, data and logs.
pub(crate) fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "quick-action", "Quick-Action")
}

/// Data directory, falling back to the working directory.
pub(crate) fn data_dir() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

pub(crate) fn default_hotkey() -> String {
    DEFAULT_HOTKEY.to_string()
}

pub(crate) fn default_true() -> bool {
    true
}

pub(crate) fn default_model_path() -> PathBuf {
    data_dir().join("models").join(DEFAULT_MODEL_FILE)
}

pub(crate) fn default_database_path() -> PathBuf {
    data_dir().join(DEFAULT_DATABASE_FILE)
}
