use uuid::Uuid;

/// Events consumed by the session coordinator.
///
/// Every producer (hotkey listener, voice loop, input window, tray) talks to
/// the coordinator only through this enum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The global hotkey was pressed.
    Toggle,
    /// Printable text typed into the input window.
    Typed(String),
    /// Backspace in the input window.
    Backspace,
    /// Enter in the input window.
    Commit,
    /// Escape in the input window.
    Escape,
    /// The input window lost keyboard focus.
    FocusLost,
    /// Normalized text from the voice loop.
    Transcript {
        /// Session that started the capture loop.
        session_id: Uuid,
        /// Recognised text, already normalized.
        text: String,
    },
    /// "Manage commands" was chosen from the tray menu.
    OpenManagement,
    /// Request application shutdown.
    Shutdown,
}
