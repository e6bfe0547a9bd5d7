use quick_action_core::dispatch::DEFAULT_TERMINAL;

use serde::{Deserialize, Serialize};

/// Process launch configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LauncherConfig {
    /// Terminal program and the flag that makes it run a command.
    /// Used for visible launches on Linux and BSD.
    #[serde(default = "default_terminal")]
    pub terminal: Vec<String>,
}

fn default_terminal() -> Vec<String> {
    DEFAULT_TERMINAL.iter().map(|s| s.to_string()).collect()
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            terminal: default_terminal(),
        }
    }
}
