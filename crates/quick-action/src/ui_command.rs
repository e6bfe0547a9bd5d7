use crate::TrayIconState;

/// Commands sent from the async runtime to the main UI thread.
///
/// The main thread owns the window and `TrayManager` (`TrayIcon` is `!Send`),
/// so every window and tray mutation flows through this enum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiCommand {
    /// Show and place the input window.
    Show,
    /// Hide the input window.
    Hide,
    /// Give the input window keyboard focus.
    Focus,
    /// Display the current buffer.
    Render(String),
    /// Update the tray icon to a new state.
    SetState(TrayIconState),
    /// Shut down the application. The main thread will exit the event loop.
    Shutdown,
}
