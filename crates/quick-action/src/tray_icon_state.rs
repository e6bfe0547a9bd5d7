/// Tray icon states corresponding to the launcher session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrayIconState {
    /// Input window hidden, waiting for the hotkey.
    Idle,
    /// Input window shown, voice capture active.
    Listening,
}
