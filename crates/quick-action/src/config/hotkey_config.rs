use crate::config::default_hotkey;

use serde::{Deserialize, Serialize};

/// Global hotkey configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HotkeyConfig {
    /// Key combination in `global-hotkey` syntax, e.g. `alt+space`.
    #[serde(default = "default_hotkey")]
    pub combination: String,
}

impl Default for HotkeyConfig {
    fn default() -> Self {
        Self {
            combination: default_hotkey(),
        }
    }
}
