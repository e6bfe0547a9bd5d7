use clap::{Args, Parser, Subcommand};
use quick_action_core::registry::RunMode;

/// Hotkey launcher: type or say `prefix value`, run the registered commands.
#[derive(Debug, Parser)]
#[command(name = "quick-action", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, PartialEq, Eq)]
pub enum Command {
    /// Start the launcher in the background (default).
    Run,
    /// List registered commands.
    List,
    /// Register a command.
    Add(EntryArgs),
    /// Remove every entry matching all fields exactly.
    Delete(EntryArgs),
    /// Interactive command management.
    Manage,
}

#[derive(Debug, Args, PartialEq, Eq)]
pub struct EntryArgs {
    /// First word of the input, e.g. `open`.
    pub prefix: String,
    /// Rest of the input, e.g. `browser`. Empty when omitted.
    pub value: Option<String>,
    /// Shell command to run.
    #[arg(short, long)]
    pub command: String,
    /// Run without a terminal window.
    #[arg(short, long)]
    pub silent: bool,
}

impl EntryArgs {
    pub fn value(&self) -> &str {
        self.value.as_deref().unwrap_or("")
    }

    pub fn run_mode(&self) -> RunMode {
        if self.silent {
            RunMode::Silent
        } else {
            RunMode::Visible
        }
    }
}
