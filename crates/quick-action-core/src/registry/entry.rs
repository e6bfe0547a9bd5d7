use std::fmt;

/// How a dispatched command's process is presented to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RunMode {
    /// Launch in a terminal that stays open after the command finishes.
    #[default]
    Visible,
    /// Launch detached, with no window.
    Silent,
}

impl RunMode {
    /// Integer flag stored in the `open_window` column.
    pub(crate) fn as_flag(self) -> i64 {
        match self {
            RunMode::Visible => 1,
            RunMode::Silent => 0,
        }
    }

    /// Any non-zero flag means a visible terminal, matching the column default.
    pub(crate) fn from_flag(flag: i64) -> Self {
        if flag == 0 {
            RunMode::Silent
        } else {
            RunMode::Visible
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunMode::Visible => f.pad("visible"),
            RunMode::Silent => f.pad("silent"),
        }
    }
}

/// Unique row identity assigned by the store on insert.
pub type EntryId = i64;

/// One persisted `prefix value -> command` mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandEntry {
    /// Store-assigned identity.
    pub id: EntryId,
    /// First token of the committed input.
    pub prefix: String,
    /// Remainder of the committed input, possibly empty.
    pub value: String,
    /// Shell-executable command text.
    pub command: String,
    /// Presentation of the launched process.
    pub run_mode: RunMode,
}

/// A command resolved for dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCommand {
    /// Shell-executable command text.
    pub command: String,
    /// Presentation of the launched process.
    pub run_mode: RunMode,
}
