use crate::{
    dispatch::{DEFAULT_TERMINAL, ShellLauncher},
    registry::RunMode,
};

use std::ffi::OsStr;

fn args_of(cmd: &std::process::Command) -> Vec<String> {
    cmd.get_args()
        .map(|a| a.to_string_lossy().into_owned())
        .collect()
}

/// WHAT: An empty terminal setting falls back to the default terminal
/// WHY: Config files that omit the terminal must still launch visibly
#[cfg(not(any(target_os = "windows", target_os = "macos")))]
#[test]
fn given_empty_terminal_when_building_visible_command_then_default_terminal_used() {
    // Given: A launcher with no terminal configured
    let launcher = ShellLauncher::new(Vec::new());

    // When: Building a visible command
    let cmd = launcher.build_command("htop", RunMode::Visible);

    // Then: The default terminal runs a shell that stays open
    assert_eq!(cmd.get_program(), OsStr::new(DEFAULT_TERMINAL[0]));
    let args = args_of(&cmd);
    assert_eq!(args[0], DEFAULT_TERMINAL[1]);
    assert_eq!(&args[1..3], ["sh", "-c"]);
    assert!(args[3].starts_with("htop; exec"));
}

/// WHAT: A configured terminal and its flags come first
/// WHY: Users pick their own terminal emulator
#[cfg(not(any(target_os = "windows", target_os = "macos")))]
#[test]
fn given_custom_terminal_when_building_visible_command_then_terminal_and_flags_used() {
    // Given: kitty with an extra flag
    let launcher = ShellLauncher::new(vec![
        "kitty".to_string(),
        "--hold".to_string(),
        "-e".to_string(),
    ]);

    // When: Building a visible command
    let cmd = launcher.build_command("top -d 1", RunMode::Visible);

    // Then: The terminal wraps the shell invocation
    assert_eq!(cmd.get_program(), OsStr::new("kitty"));
    let args = args_of(&cmd);
    assert_eq!(&args[..4], ["--hold", "-e", "sh", "-c"]);
    assert!(args[4].starts_with("top -d 1;"));
}

/// WHAT: Silent commands run directly through sh
/// WHY: Background commands must not open a terminal
#[cfg(not(target_os = "windows"))]
#[test]
fn given_silent_mode_when_building_command_then_plain_shell() {
    // Given: Any launcher
    let launcher = ShellLauncher::default();

    // When: Building a silent command
    let cmd = launcher.build_command("notify-send hi", RunMode::Silent);

    // Then: sh -c with the command verbatim
    assert_eq!(cmd.get_program(), OsStr::new("sh"));
    assert_eq!(args_of(&cmd), ["-c", "notify-send hi"]);
}

/// WHAT: Visible commands open a new console that stays open
/// WHY: Visible mode is for commands whose output the user wants to read
#[cfg(target_os = "windows")]
#[test]
fn given_visible_mode_when_building_command_then_new_console_kept_open() {
    let cmd = ShellLauncher::default().build_command("dir", RunMode::Visible);

    assert_eq!(cmd.get_program(), OsStr::new("cmd"));
    assert_eq!(args_of(&cmd), ["/C", "start", "", "cmd", "/K", "\"dir\""]);
}

/// WHAT: Silent commands run through cmd /C
/// WHY: Background commands must not open a console
#[cfg(target_os = "windows")]
#[test]
fn given_silent_mode_when_building_command_then_cmd_c() {
    let cmd = ShellLauncher::default().build_command("dir", RunMode::Silent);

    assert_eq!(cmd.get_program(), OsStr::new("cmd"));
    assert_eq!(args_of(&cmd), ["/C", "\"dir\""]);
}

/// WHAT: A command with a quoted program path reaches cmd unescaped
/// WHY: cmd does not understand `\"` escapes, so `"C:\Program Files\..."`
/// paths would fail with "not recognized" in both run modes
#[cfg(target_os = "windows")]
#[test]
fn given_quoted_program_path_when_building_commands_then_quotes_kept_verbatim() {
    // Given: A registered command whose program path contains a space
    let command = r#""C:\Program Files\App\app.exe" --open "my file.txt""#;
    let launcher = ShellLauncher::default();

    // When: Building both run modes
    let visible = launcher.build_command(command, RunMode::Visible);
    let silent = launcher.build_command(command, RunMode::Silent);

    // Then: The command argument is the command wrapped in one outer pair of
    // quotes, with the inner quotes untouched
    let expected = format!("\"{}\"", command);
    assert_eq!(args_of(&visible).last(), Some(&expected));
    assert_eq!(args_of(&silent), ["/C".to_string(), expected]);
    assert!(!args_of(&silent)[1].contains("\\\""));
}

/// WHAT: A program that does not exist fails to launch with its command named
/// WHY: Launch failures are reported to the user per command
#[cfg(not(any(target_os = "windows", target_os = "macos")))]
#[test]
fn given_missing_terminal_when_launching_visible_then_launch_failed() {
    use crate::{CoreError, dispatch::Launcher};

    // Given: A terminal program that cannot exist
    let launcher = ShellLauncher::new(vec!["/nonexistent/quick-action-terminal".to_string()]);

    // When: Launching visibly
    let result = launcher.launch("true", RunMode::Visible);

    // Then: LaunchFailed naming the command
    assert!(matches!(
        result,
        Err(CoreError::LaunchFailed { command, .. }) if command == "true"
    ));
}
