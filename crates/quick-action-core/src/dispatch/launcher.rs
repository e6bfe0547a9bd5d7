//! Process-launch boundary.
//!
//! Commands run through the platform shell and are never waited on by the
//! caller. A detached thread reaps each child so no zombies pile up.

use crate::{CoreError, CoreResult, registry::RunMode};

use std::{
    panic::Location,
    process::{Child, Command, Stdio},
};

use error_location::ErrorLocation;
use tracing::{debug, instrument, warn};

/// Starts OS processes for resolved commands.
pub trait Launcher: Send + Sync {
    /// Start `command` under `run_mode`. Returns once the process is spawned.
    fn launch(&self, command: &str, run_mode: RunMode) -> CoreResult<()>;
}

/// Default terminal invocation for visible launches on Linux and BSD.
pub const DEFAULT_TERMINAL: &[&str] = &["x-terminal-emulator", "-e"];

/// Launches commands through the system shell.
#[derive(Debug, Clone)]
pub struct ShellLauncher {
    /// Terminal program plus the flag that makes it run a command.
    /// Only used for visible launches outside Windows and macOS.
    #[cfg_attr(any(target_os = "windows", target_os = "macos"), allow(dead_code))]
    terminal: Vec<String>,
}

impl ShellLauncher {
    /// Launcher using `terminal` for visible commands. An empty list means
    /// [`DEFAULT_TERMINAL`].
    pub fn new(terminal: Vec<String>) -> Self {
        let terminal = if terminal.is_empty() {
            DEFAULT_TERMINAL.iter().map(|s| s.to_string()).collect()
        } else {
            terminal
        };
        Self { terminal }
    }

    /// The exact process invocation for `command` under `run_mode`.
    pub fn build_command(&self, command: &str, run_mode: RunMode) -> Command {
        match run_mode {
            RunMode::Visible => self.visible_command(command),
            RunMode::Silent => silent_command(command),
        }
    }

    #[cfg(target_os = "windows")]
    fn visible_command(&self, command: &str) -> Command {
        use std::os::windows::process::CommandExt;

        // `start` opens a new console; `/K` keeps it open after the command.
        let mut cmd = Command::new("cmd");
        cmd.args(["/C", "start", "", "cmd", "/K"])
            .raw_arg(cmd_quoted(command));
        cmd
    }

    #[cfg(target_os = "macos")]
    fn visible_command(&self, command: &str) -> Command {
        let escaped = command.replace('\\', "\\\\").replace('"', "\\\"");
        let mut cmd = Command::new("osascript");
        cmd.args([
            "-e",
            &format!("tell application \"Terminal\" to do script \"{}\"", escaped),
            "-e",
            "tell application \"Terminal\" to activate",
        ]);
        cmd
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    fn visible_command(&self, command: &str) -> Command {
        // The trailing interactive shell keeps the terminal open.
        let script = format!("{}; exec \"${{SHELL:-sh}}\"", command);
        let (program, flags) = match self.terminal.split_first() {
            Some((program, flags)) => (program.as_str(), flags),
            None => (DEFAULT_TERMINAL[0], &[][..]),
        };
        let mut cmd = Command::new(program);
        cmd.args(flags).args(["sh", "-c", &script]);
        cmd
    }
}

impl Default for ShellLauncher {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

/// Wrap `command` for `cmd /C` or `cmd /K`.
///
/// cmd strips exactly the first and last quote of its command argument and
/// runs the rest verbatim. The C runtime escaping `Command::arg` applies
/// (`\"`) is not understood by cmd, so the text goes out as a raw argument.
#[cfg(target_os = "windows")]
pub(crate) fn cmd_quoted(command: &str) -> String {
    format!("\"{}\"", command)
}

#[cfg(target_os = "windows")]
fn silent_command(command: &str) -> Command {
    use std::os::windows::process::CommandExt;

    const CREATE_NO_WINDOW: u32 = 0x0800_0000;

    let mut cmd = Command::new("cmd");
    cmd.arg("/C")
        .raw_arg(cmd_quoted(command))
        .creation_flags(CREATE_NO_WINDOW)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    cmd
}

#[cfg(not(target_os = "windows"))]
fn silent_command(command: &str) -> Command {
    use std::os::unix::process::CommandExt;

    let mut cmd = Command::new("sh");
    cmd.args(["-c", command])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        // Own process group: unaffected by signals sent to the launcher.
        .process_group(0);
    cmd
}

impl Launcher for ShellLauncher {
    #[track_caller]
    #[instrument(skip(self))]
    fn launch(&self, command: &str, run_mode: RunMode) -> CoreResult<()> {
        let child = self
            .build_command(command, run_mode)
            .spawn()
            .map_err(|source| CoreError::LaunchFailed {
                command: command.to_string(),
                source,
                location: ErrorLocation::from(Location::caller()),
            })?;

        debug!(pid = child.id(), %run_mode, "Process launched");
        reap(child);

        Ok(())
    }
}

fn reap(mut child: Child) {
    let pid = child.id();
    let spawned = std::thread::Builder::new()
        .name(format!("reap-{}", pid))
        .spawn(move || match child.wait() {
            Ok(status) if !status.success() => debug!(pid, %status, "Launched process exited"),
            Ok(_) => {}
            Err(e) => warn!(pid, error = %e, "Failed to wait on launched process"),
        });

    if let Err(e) = spawned {
        warn!(pid, error = %e, "Could not spawn reaper thread");
    }
}
